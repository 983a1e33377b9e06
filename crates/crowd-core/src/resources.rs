use crate::geo::GeoPoint;
use crate::level::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OfficerStatus {
    Patrol,
    Monitoring,
    Deployed,
}

impl OfficerStatus {
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Good => OfficerStatus::Patrol,
            RiskLevel::Moderate => OfficerStatus::Monitoring,
            RiskLevel::Overcrowd | RiskLevel::Stampede => OfficerStatus::Deployed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OfficerStatus::Patrol => "patrol",
            OfficerStatus::Monitoring => "monitoring",
            OfficerStatus::Deployed => "deployed",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BarricadeStatus {
    Open,
    Closed,
}

impl BarricadeStatus {
    pub fn for_level(level: RiskLevel) -> Self {
        if level.is_elevated() {
            BarricadeStatus::Closed
        } else {
            BarricadeStatus::Open
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BarricadeStatus::Open => "open",
            BarricadeStatus::Closed => "closed",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MedicalStatus {
    Standby,
    Active,
}

impl MedicalStatus {
    pub fn for_level(level: RiskLevel) -> Self {
        if level == RiskLevel::Stampede {
            MedicalStatus::Active
        } else {
            MedicalStatus::Standby
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MedicalStatus::Standby => "standby",
            MedicalStatus::Active => "active",
        }
    }
}

macro_rules! display_via_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_via_as_str!(OfficerStatus, BarricadeStatus, MedicalStatus);

/// A field asset on the venue map.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Resource<S> {
    pub id: String,
    pub position: GeoPoint,
    pub status: S,
}

impl<S> Resource<S> {
    /// Ordinal part of ids shaped like `officer-3`.
    pub fn ordinal(&self) -> &str {
        self.id.rsplit('-').next().unwrap_or(&self.id)
    }
}

/// Directives issued for a level, in display order.
pub fn directives_for(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Good => &["Monitoring active", "Regular patrol schedule"],
        RiskLevel::Moderate => &["Increased monitoring", "Officer presence enhanced"],
        RiskLevel::Overcrowd => &[
            "Deploy more officers",
            "Control entry flow",
            "Activate crowd control measures",
        ],
        RiskLevel::Stampede => &[
            "EMERGENCY: Close nearby barricades",
            "Call medical team",
            "Re-route crowd",
            "Establish emergency corridors",
        ],
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DirectivePriority {
    Normal,
    High,
    Critical,
}

impl DirectivePriority {
    pub fn classify(directive: &str) -> Self {
        if directive.contains("EMERGENCY") {
            DirectivePriority::Critical
        } else if directive.contains("Deploy") || directive.contains("Control") {
            DirectivePriority::High
        } else {
            DirectivePriority::Normal
        }
    }
}

/// Safety posture produced alongside a [`crate::RiskSnapshot`] on the same tick.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SafetyActionsSnapshot {
    pub level: RiskLevel,
    pub actions: Vec<String>,
    pub officers: Vec<Resource<OfficerStatus>>,
    pub barricades: Vec<Resource<BarricadeStatus>>,
    pub medical: Vec<Resource<MedicalStatus>>,
}

impl SafetyActionsSnapshot {
    /// Assembles a snapshot for `level`. Statuses and directives come from the
    /// level alone; the caller supplies only positions.
    pub fn for_level(
        level: RiskLevel,
        officer_positions: impl IntoIterator<Item = GeoPoint>,
        barricade_positions: impl IntoIterator<Item = GeoPoint>,
        medical_positions: impl IntoIterator<Item = GeoPoint>,
    ) -> Self {
        let officer_status = OfficerStatus::for_level(level);
        let barricade_status = BarricadeStatus::for_level(level);
        let medical_status = MedicalStatus::for_level(level);

        Self {
            level,
            actions: directives_for(level).iter().map(|s| s.to_string()).collect(),
            officers: build_resources("officer", officer_positions, officer_status),
            barricades: build_resources("barricade", barricade_positions, barricade_status),
            medical: build_resources("medical", medical_positions, medical_status),
        }
    }

    pub fn total_resources(&self) -> usize {
        self.officers.len() + self.barricades.len() + self.medical.len()
    }

    pub fn any_officer_deployed(&self) -> bool {
        self.officers
            .iter()
            .any(|o| o.status == OfficerStatus::Deployed)
    }

    pub fn closed_barricades(&self) -> usize {
        self.barricades
            .iter()
            .filter(|b| b.status == BarricadeStatus::Closed)
            .count()
    }

    pub fn any_medical_active(&self) -> bool {
        self.medical.iter().any(|m| m.status == MedicalStatus::Active)
    }
}

fn build_resources<S: Copy>(
    prefix: &str,
    positions: impl IntoIterator<Item = GeoPoint>,
    status: S,
) -> Vec<Resource<S>> {
    positions
        .into_iter()
        .enumerate()
        .map(|(i, position)| Resource {
            id: format!("{prefix}-{i}"),
            position,
            status,
        })
        .collect()
}

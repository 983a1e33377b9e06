use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four-point crowd severity scale. Ordering follows severity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Good,
    Moderate,
    Overcrowd,
    Stampede,
}

impl RiskLevel {
    /// Lookup table order. Indices are stable and used for prediction drift.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Good,
        RiskLevel::Moderate,
        RiskLevel::Overcrowd,
        RiskLevel::Stampede,
    ];

    pub fn index(self) -> usize {
        match self {
            RiskLevel::Good => 0,
            RiskLevel::Moderate => 1,
            RiskLevel::Overcrowd => 2,
            RiskLevel::Stampede => 3,
        }
    }

    /// Table lookup clamped to the most severe level, so callers can step
    /// upward without wrapping back to `Good`.
    pub fn from_index_saturating(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Good => "good",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Overcrowd => "overcrowd",
            RiskLevel::Stampede => "stampede",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            RiskLevel::Good => "Good to go / Well managed / Low crowd",
            RiskLevel::Moderate => "Moderate crowd but no danger",
            RiskLevel::Overcrowd => "Overcrowd / Very much crowded / Attention needed",
            RiskLevel::Stampede => "Stampede / Red alert / Very much attention needed",
        }
    }

    pub fn base_confidence(self) -> f64 {
        match self {
            RiskLevel::Good => 0.95,
            RiskLevel::Moderate => 0.88,
            RiskLevel::Overcrowd => 0.82,
            RiskLevel::Stampede => 0.91,
        }
    }

    /// Overcrowd and stampede require operator attention.
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskLevel::Overcrowd | RiskLevel::Stampede)
    }

    /// Density band for a raw head count.
    pub fn from_detections(detections: u32) -> Self {
        match detections {
            0..=50 => RiskLevel::Good,
            51..=120 => RiskLevel::Moderate,
            121..=200 => RiskLevel::Overcrowd,
            _ => RiskLevel::Stampede,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "good" => Ok(RiskLevel::Good),
            "moderate" => Ok(RiskLevel::Moderate),
            "overcrowd" => Ok(RiskLevel::Overcrowd),
            "stampede" => Ok(RiskLevel::Stampede),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

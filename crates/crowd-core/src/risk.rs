use crate::level::RiskLevel;
use serde::{Deserialize, Serialize};

/// One assessment on the severity scale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskReading {
    pub level: RiskLevel,
    pub category: String,
    pub confidence: f64,
}

impl RiskReading {
    /// Reading carrying the table's category and base confidence for `level`.
    pub fn for_level(level: RiskLevel) -> Self {
        Self {
            level,
            category: level.category().to_string(),
            confidence: level.base_confidence().clamp(0.0, 1.0),
        }
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Telemetry produced by one generator tick. Never mutated after publication.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskSnapshot {
    pub current: RiskReading,
    pub detections: u32,
    pub next_10_min: RiskReading,
    pub next_30_min: RiskReading,
}

impl RiskSnapshot {
    pub fn new(
        current: RiskLevel,
        detections: u32,
        next_10_min: RiskLevel,
        next_30_min: RiskLevel,
    ) -> Self {
        Self {
            current: RiskReading::for_level(current),
            detections,
            next_10_min: RiskReading::for_level(next_10_min),
            next_30_min: RiskReading::for_level(next_30_min),
        }
    }

    pub fn level(&self) -> RiskLevel {
        self.current.level
    }

    /// Band the raw head count falls in, independent of the sampled level.
    pub fn density_band(&self) -> RiskLevel {
        RiskLevel::from_detections(self.detections)
    }
}

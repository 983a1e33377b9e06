//! Panels rendered from the telemetry store. Each one is a pure function of
//! the data handed to it; none of them keep state of their own.

pub mod actions_panel;
pub mod alerts_panel;
pub mod map_panel;
pub mod risk_panel;
pub mod upload_panel;
pub mod video_panel;

use crowd_core::RiskLevel;

/// CSS class carrying the colour of `level`.
pub fn level_class(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Good => "level-good",
        RiskLevel::Moderate => "level-moderate",
        RiskLevel::Overcrowd => "level-overcrowd",
        RiskLevel::Stampede => "level-stampede",
    }
}

pub mod alerts;
pub mod geo;
pub mod level;
pub mod resources;
pub mod risk;
pub mod upload;


pub use alerts::{Alert, AlertFeed, AlertKind, AlertPolicy, ALERT_FEED_CAPACITY};
pub use geo::GeoPoint;
pub use level::RiskLevel;
pub use resources::{
    directives_for, BarricadeStatus, DirectivePriority, MedicalStatus, OfficerStatus, Resource,
    SafetyActionsSnapshot,
};
pub use risk::{RiskReading, RiskSnapshot};
pub use upload::{UploadError, VideoFile, DEFAULT_MAX_UPLOAD_BYTES};

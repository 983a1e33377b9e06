pub mod context;
pub mod error;
pub mod generator;
pub mod overlay;
pub mod scheduler;
pub mod store;


pub use context::AnalysisContext;
pub use error::TelemetryError;
pub use generator::{
    generate_risk, generate_safety_actions, GeneratorConfig, ResourceLayout, TelemetryGenerator,
};
pub use overlay::{DetectionBox, OverlayFrame, VideoOverlay};
pub use scheduler::{ManualScheduler, Scheduler, TimerToken, TokioScheduler};
pub use store::{SubscriptionId, TelemetryStore, TelemetryUpdate, TelemetryView};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("analysis already running for {file}")]
    AlreadyRunning { file: String },
}

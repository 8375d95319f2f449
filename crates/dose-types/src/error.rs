use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Run lifecycle violation: {op} called while run phase is {phase}")]
    LifecycleViolation { op: &'static str, phase: String },

    #[error("Histogram mismatch: {0}")]
    HistogramMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DoseResult<T> = Result<T, DoseError>;

use thiserror::Error;

/// Failures of the training-side pipeline (ingest, dedup, feature construction).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// Fatal configuration problem: no source, unresolvable columns, bad knobs.
    #[error("configuration error: {0}")]
    Config(String),
    /// A step was called before the step it depends on.
    #[error("unready: {0}")]
    Unready(&'static str),
    #[error("missing column: {0}")]
    MissingColumn(&'static str),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Failures of the inference-side engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    /// No reading to anchor the forecast on. Recovered by `ForecastEngine::forecast`.
    #[error("insufficient history: no readings available")]
    InsufficientHistory,
    #[error("invalid horizons: {0}")]
    InvalidHorizons(String),
    #[error("model error: {0}")]
    Model(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScalerError {
    #[error("scaler has no fitted range for column {0:?}")]
    UnknownColumn(String),
    #[error("cannot fit scaler on empty column {0:?}")]
    EmptyColumn(String),
}

impl From<ScalerError> for PipelineError {
    fn from(e: ScalerError) -> Self {
        PipelineError::InvalidData(e.to_string())
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

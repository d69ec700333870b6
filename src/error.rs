use thiserror::Error;

use crate::domain::Cadence;

/// Failures raised by the frequency-normalization engine.
///
/// These are contract or data errors: the engine never returns a partially
/// merged table, so every variant aborts the whole operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A cadence code or level outside the closed set.
    #[error("invalid cadence: {0}")]
    InvalidCadence(String),

    /// Resampling to a finer cadence than the series was sampled at.
    #[error("cannot resample {native:?} data to finer {target:?} cadence")]
    UnsupportedDirection { native: Cadence, target: Cadence },

    /// No raw data is stored under the requested series name.
    #[error("series not found: {0}")]
    SeriesNotFound(String),

    /// A series name that does not follow `<Identifier>-<Source>-<Code>`.
    #[error("cannot derive cadence from series name '{0}'")]
    CadenceMismatch(String),

    /// A column required by a derived indicator is absent.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A period label that does not parse as a calendar period.
    #[error("invalid period label '{0}'")]
    InvalidPeriod(String),

    /// `merge` called with an empty series list.
    #[error("no series requested")]
    NoSeries,

    /// Reading the raw-series store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let exit_code = match err {
            EngineError::InvalidCadence(_)
            | EngineError::UnsupportedDirection { .. }
            | EngineError::CadenceMismatch(_)
            | EngineError::ColumnNotFound(_)
            | EngineError::InvalidPeriod(_) => 2,
            EngineError::SeriesNotFound(_) | EngineError::NoSeries => 3,
            EngineError::Storage(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

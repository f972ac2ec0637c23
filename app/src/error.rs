//! Command Error Type
//!
//! Every handler in [`commands`](crate::commands) returns [`CommandError`].
//! It wraps the library errors and adds the session-level failures (nothing
//! loaded yet, no forecast to export, bad horizon, article not in the
//! roster).
//!
//! Errors serialize as `{ "code": ..., "message": ... }` so a UI can show
//! the message and branch on the code.

use demand_learning::LearningError;
use demand_processing::ProcessingError;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::events::error_codes;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No data loaded. Upload a file first")]
    NoDataLoaded,

    #[error("No forecast available. Run a prediction first")]
    NoForecast,

    #[error("Horizon must be between {min} and {max} days, got {horizon}")]
    InvalidHorizon {
        horizon: usize,
        min: usize,
        max: usize,
    },

    #[error("Article '{0}' is not in the loaded table")]
    UnknownArticle(String),

    #[error("Failed to read file: {0}")]
    ReadError(String),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Learning(#[from] LearningError),
}

impl CommandError {
    /// Error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoDataLoaded => error_codes::NO_DATA_LOADED,
            Self::NoForecast => error_codes::NO_FORECAST,
            Self::InvalidHorizon { .. } => error_codes::INVALID_HORIZON,
            Self::UnknownArticle(_) => error_codes::UNKNOWN_ARTICLE,
            Self::ReadError(_) => error_codes::FILE_READ_ERROR,
            Self::Processing(e) => e.error_code(),
            Self::Learning(e) => e.error_code(),
        }
    }
}

impl serde::Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CommandError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

use crate::forecast::ForecastError;
use crate::model::ModelError;
use crate::scale::ScaleError;

/// Application-boundary error carrying a process exit code.
///
/// Core modules return typed errors (`ForecastError`, `ScaleError`,
/// `ModelError`); this type is what the binary surfaces to the shell.
///
/// Exit codes:
/// - 2: usage or input problems (bad flags, unreadable files, bad shapes)
/// - 3: no usable data after validation
/// - 4: runtime failure (inference, scaling, calendar arithmetic)
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

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let code = match &err {
            ForecastError::ShapeMismatch { .. }
            | ForecastError::InsufficientHistory { .. }
            | ForecastError::InvalidHorizon => 2,
            ForecastError::Model(_)
            | ForecastError::Scaler(_)
            | ForecastError::CalendarOverflow => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<ScaleError> for AppError {
    fn from(err: ScaleError) -> Self {
        let code = match &err {
            ScaleError::Io { .. } | ScaleError::Parse { .. } => 2,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let code = match &err {
            ModelError::Io { .. } | ModelError::Parse { .. } | ModelError::BadDimensions(_) => 2,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}

use thiserror::Error;

/// Rejected construction input: a distribution parameter outside its
/// admissible range, or an engine argument (sample count, bounds, table) that
/// cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name} must be {constraint}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ParamError {
    pub fn out_of_range(name: &'static str, value: f64, constraint: &'static str) -> Self {
        ParamError::OutOfRange {
            name,
            value,
            constraint,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ParamError::InvalidArgument(message.into())
    }
}

/// Check `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, ParamError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ParamError::out_of_range(name, value, "finite and > 0"))
    }
}

/// Check `value` is finite.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, ParamError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParamError::out_of_range(name, value, "finite"))
    }
}

/// Error surfaced at the CLI boundary, carrying the process exit code.
///
/// Exit codes: 2 invalid input, 3 insufficient data, 4 computation failure.
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

impl From<ParamError> for AppError {
    fn from(err: ParamError) -> Self {
        AppError::new(2, err.to_string())
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

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Unknown {what}: {value}")]
    Unknown { what: &'static str, value: String },

    #[error("{what} is out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{what} must be one of {allowed}, got {value}")]
    NotAllowed {
        what: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Building type not available for simulation: {0}")]
    Unavailable(String),
}

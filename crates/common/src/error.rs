use thiserror::Error;

/// Rejections raised while turning an inbound request body into a signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No data provided")]
    EmptyBody,
    #[error("Request body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid trading pair")]
    UnsupportedPair(String),
    #[error("Invalid signal type")]
    UnknownSignal(String),
    #[error("Field '{field}' must be a number")]
    NotANumber { field: &'static str },
    #[error("Field '{field}' = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ValidationError {
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            Self::MissingFields(fields) => fields,
            _ => &[],
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<&'static str>),
    #[error("ACCOUNT_ID must be an unsigned integer, got {0:?}")]
    InvalidAccountId(String),
    #[error("{name} has an invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

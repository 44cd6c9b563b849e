use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("API error: {status} - {body}")]
    Remote { status: StatusCode, body: String },
    #[error("Request to 3Commas failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected response from 3Commas: {0}")]
    MalformedResponse(String),
    #[error("Account {0} not found")]
    AccountNotFound(u64),
    #[error("Failed to create SmartTrade ({smart_trade}) and DCA Bot ({dca_bot})")]
    FallbackExhausted {
        smart_trade: Box<RelayError>,
        dca_bot: Box<RelayError>,
    },
}

impl RelayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}

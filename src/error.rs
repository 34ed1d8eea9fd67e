use std::time::Duration;

use thiserror::Error;

use crate::lease::LeaseName;

#[derive(Error, Debug)]
pub enum LeaseError {
    #[error("The HTTP request failed with error {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not lock mutex {name}: it is locked by someone else")]
    Contended { name: LeaseName },

    #[error("Token for mutex {name} is no longer valid")]
    Expired { name: LeaseName },

    #[error("Timeout elapsed. Could not lock mutex {name} within {timeout:?}")]
    TimedOut { name: LeaseName, timeout: Duration },

    #[error("Server answered {status} for mutex {name}")]
    UnexpectedStatus { name: LeaseName, status: u16 },

    #[error("Could not decode lease answer: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server granted the lease without a token")]
    EmptyToken,
}

impl LeaseError {
    pub fn is_contended(&self) -> bool {
        matches!(self, LeaseError::Contended { .. })
    }
}

pub type Outcome<T> = std::result::Result<T, LeaseError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid server address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: url::ParseError,
    },

    #[error("Unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("Request timeout must be at least one second")]
    ZeroRequestTimeout,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

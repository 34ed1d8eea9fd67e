use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_SERVER: &str = "http://localhost:3002";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Must stay well below any lease TTL the server hands out.
pub const DEFAULT_RENEW_INTERVAL: Duration = Duration::from_secs(5);

/// Where the coordination service lives and how often we talk to it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: Url,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub renew_interval: Duration,
}

impl ClientConfig {
    pub fn new(server: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            server: parse_server(server)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            renew_interval: DEFAULT_RENEW_INTERVAL,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_renew_interval(mut self, renew_interval: Duration) -> Self {
        self.renew_interval = renew_interval;
        self
    }
}

fn parse_server(address: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(address).map_err(|source| ConfigError::InvalidAddress {
        address: address.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    }

    Ok(url)
}

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::{
    config::ClientConfig,
    error::{ConfigError, LeaseError, Outcome},
};

use super::{LeaseGrant, LeaseName, LeaseToken};

static API_ROOT: [&str; 2] = ["v1", "mutex"];

/// One round trip to the coordination service per call. Implementations never
/// sleep, retry or log; that is left to the callers.
#[async_trait]
pub trait LeaseBroker: Send + Sync {
    /// Non-200 means somebody else holds the lease.
    async fn try_acquire(&self, name: &LeaseName) -> Outcome<LeaseGrant>;

    async fn inspect(&self, name: &LeaseName) -> Outcome<Bytes>;

    /// Non-200 means the token is no longer honored.
    async fn renew(&self, name: &LeaseName, token: &LeaseToken) -> Outcome<LeaseGrant>;

    /// Non-200 means the token is no longer honored.
    async fn release(&self, name: &LeaseName, token: &LeaseToken) -> Outcome<Bytes>;
}

pub struct HttpLeaseBroker {
    client: Client,
    base: Url,
}

impl HttpLeaseBroker {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base: config.server.clone(),
        })
    }

    fn endpoint(&self, name: &LeaseName, tail: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(API_ROOT.iter())
                .push(name.as_str())
                .extend(tail.iter());
        }
        url
    }

    async fn get(&self, url: Url) -> Outcome<(StatusCode, Bytes)> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl LeaseBroker for HttpLeaseBroker {
    async fn try_acquire(&self, name: &LeaseName) -> Outcome<LeaseGrant> {
        match self.get(self.endpoint(name, &["lock"])).await? {
            (StatusCode::OK, body) => Ok(LeaseGrant::new(body)),
            _ => Err(LeaseError::Contended { name: name.clone() }),
        }
    }

    async fn inspect(&self, name: &LeaseName) -> Outcome<Bytes> {
        match self.get(self.endpoint(name, &[])).await? {
            (StatusCode::OK, body) => Ok(body),
            (status, _) => Err(LeaseError::UnexpectedStatus {
                name: name.clone(),
                status: status.as_u16(),
            }),
        }
    }

    async fn renew(&self, name: &LeaseName, token: &LeaseToken) -> Outcome<LeaseGrant> {
        match self
            .get(self.endpoint(name, &["refresh", token.as_str()]))
            .await?
        {
            (StatusCode::OK, body) => Ok(LeaseGrant::new(body)),
            _ => Err(LeaseError::Expired { name: name.clone() }),
        }
    }

    async fn release(&self, name: &LeaseName, token: &LeaseToken) -> Outcome<Bytes> {
        match self
            .get(self.endpoint(name, &["unlock", token.as_str()]))
            .await?
        {
            (StatusCode::OK, body) => Ok(body),
            _ => Err(LeaseError::Expired { name: name.clone() }),
        }
    }
}

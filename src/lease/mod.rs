use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{LeaseError, Outcome};

pub mod broker;
pub mod manager;
pub mod renewer;
pub mod taker;

/// Name of a mutex on the coordination service. Never validated client side.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct LeaseName(String);

impl LeaseName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Possession proof handed out by the server on acquisition.
#[derive(PartialEq, Eq, Clone)]
pub struct LeaseToken(String);

impl LeaseToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LeaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LeaseToken(..)")
    }
}

/// Decoded body of a successful lock or refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaseAnswer {
    #[serde(default, alias = "Token")]
    pub token: String,
    #[serde(default, rename = "expiresAt", alias = "ExpiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A 200 answer to a lock or refresh call. The body is kept verbatim so it can
/// be printed as-is; decoding only happens when somebody needs the token.
#[derive(Debug, Clone)]
pub struct LeaseGrant {
    body: Bytes,
}

impl LeaseGrant {
    pub(crate) fn new(body: Bytes) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn answer(&self) -> Outcome<LeaseAnswer> {
        let answer: LeaseAnswer = serde_json::from_slice(&self.body)?;
        if answer.token.is_empty() {
            return Err(LeaseError::EmptyToken);
        }
        Ok(answer)
    }

    pub fn token(&self) -> Outcome<LeaseToken> {
        self.answer().map(|answer| LeaseToken::new(answer.token))
    }
}

/// What this process believes it holds. The server stays authoritative, so
/// `expires_at` is advisory only.
#[derive(Debug, Clone)]
pub struct LeaseHandle {
    name: LeaseName,
    token: LeaseToken,
    expires_at: Option<DateTime<Utc>>,
}

impl LeaseHandle {
    pub fn new(name: LeaseName, token: LeaseToken) -> Self {
        Self {
            name,
            token,
            expires_at: None,
        }
    }

    pub fn name(&self) -> &LeaseName {
        &self.name
    }

    pub fn token(&self) -> &LeaseToken {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Only the expiry moves on renewal; the token stays the one we were issued.
    pub(crate) fn refresh(&mut self, grant: &LeaseGrant) {
        if let Ok(answer) = grant.answer() {
            self.expires_at = answer.expires_at.or(self.expires_at);
        }
    }
}

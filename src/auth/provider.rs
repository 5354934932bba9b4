//! Credential providers
//!
//! A provider hands out the bearer token for each request.

use crate::config::TOKEN_ENV_VAR;
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use async_trait::async_trait;

/// Source of the bearer token attached to every request
#[async_trait]
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    /// Return the token to use for the next request
    async fn token(&self) -> Result<String>;
}

/// A fixed token supplied up front
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Create a provider for the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable on every request
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Read from `DO_TOKEN`
    pub fn new() -> Self {
        Self::with_var(TOKEN_ENV_VAR)
    }

    /// Read from a custom variable
    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for EnvToken {
    async fn token(&self) -> Result<String> {
        std::env::var(&self.var)
            .ok()
            .none_if_empty()
            .ok_or(Error::AuthenticationMissing)
    }
}

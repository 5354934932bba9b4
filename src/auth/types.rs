//! Credentials applied to outgoing requests

use super::provider::{CredentialProvider, StaticToken};
use crate::config::{ClientConfig, TOKEN_ENV_VAR};
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use reqwest::RequestBuilder;
use std::sync::Arc;

/// Credentials shared by every request a client makes
#[derive(Debug, Clone)]
pub struct Credentials {
    provider: Arc<dyn CredentialProvider>,
}

impl Credentials {
    /// Wrap an arbitrary provider
    pub fn new(provider: impl CredentialProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Credentials for a fixed token
    pub fn token(token: impl Into<String>) -> Self {
        Self::new(StaticToken::new(token))
    }

    /// Pick the configured token, else `DO_TOKEN`
    ///
    /// Fails with [`Error::AuthenticationMissing`] when neither is set, so a
    /// client can never be built without a credential.
    pub fn resolve(config: &ClientConfig) -> Result<Self> {
        if let Some(token) = config.token.clone().none_if_empty() {
            return Ok(Self::token(token));
        }
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .none_if_empty()
            .map(Self::token)
            .ok_or(Error::AuthenticationMissing)
    }

    /// Attach the bearer token to a request
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.provider.token().await?;
        Ok(req.bearer_auth(token))
    }
}

//! Authentication module
//!
//! Every request carries an OAuth2 bearer token. The token comes from a
//! [`CredentialProvider`]; `Credentials` wraps the chosen provider and
//! applies it to outgoing requests.

mod provider;
mod types;

pub use provider::{CredentialProvider, EnvToken, StaticToken};
pub use types::Credentials;

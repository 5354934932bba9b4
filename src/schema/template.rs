//! Endpoint templates
//!
//! Endpoints of nested resources carry positional `{}` placeholders, e.g.
//! `domains/{}/records` or `registry/{}/repositories/{}/tags`. They are
//! filled once when an instance is constructed.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching positional placeholders: {}
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\}").unwrap());

/// Number of positional placeholders in a template
pub fn placeholder_count(template: &str) -> usize {
    PLACEHOLDER.find_iter(template).count()
}

/// Fill placeholders left to right
///
/// The number of arguments must match the number of placeholders exactly.
pub fn resolve_endpoint(template: &str, args: &[&str]) -> Result<String> {
    let expected = placeholder_count(template);
    if expected != args.len() {
        return Err(Error::client_request(format!(
            "Endpoint '{template}' expects {expected} parent value(s), got {}",
            args.len()
        )));
    }

    let mut args = args.iter();
    let resolved = PLACEHOLDER.replace_all(template, |_: &regex::Captures<'_>| {
        args.next().map(|s| s.to_string()).unwrap_or_default()
    });
    Ok(resolved.into_owned())
}

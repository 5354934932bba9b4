//! Collection fetcher and bulk operations by tag
//!
//! One call reads one page. Walking further pages is up to the caller.

use super::instance::Resource;
use super::ops::ensure_action;
use crate::action::Action;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::schema::{resolve_endpoint, ActionKind, ResourceSchema};
use crate::types::{JsonValue, QueryParams};
use tracing::{debug, info};

/// Default page number
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Parameters of one collection GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub per_page: u32,
    /// Response key to read instead of the schema's plural key
    pub key: Option<String>,
    /// Extra query parameters, sent after `page` and `per_page`
    pub extra: QueryParams,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            key: None,
            extra: Vec::new(),
        }
    }
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Query string for the request
    pub fn query(&self) -> QueryParams {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        query.extend(self.extra.iter().cloned());
        query
    }
}

/// GET one page of `path` and return the raw objects under the page key
///
/// A missing or null key yields an empty page.
pub async fn list_raw(
    client: &Client,
    path: &str,
    default_key: &str,
    params: &ListParams,
) -> Result<Vec<JsonValue>> {
    let key = params.key.as_deref().unwrap_or(default_key);
    debug!("Listing {} (page {}, key '{}')", path, params.page, key);

    let mut body = client.get(path, params.query()).await?;
    match body.get_mut(key).map(JsonValue::take) {
        Some(JsonValue::Array(items)) => Ok(items),
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(other) => Err(Error::Other(format!(
            "Expected an array under '{key}' in {path}, got {other}"
        ))),
    }
}

impl Resource {
    /// One page of a top-level collection, materialized in response order
    pub async fn list(
        client: &Client,
        schema: &'static ResourceSchema,
        params: &ListParams,
    ) -> Result<Vec<Resource>> {
        Self::list_at(client, schema, schema.endpoint.to_string(), params).await
    }

    /// One page of a nested collection
    pub async fn list_under(
        client: &Client,
        schema: &'static ResourceSchema,
        parents: &[&str],
        params: &ListParams,
    ) -> Result<Vec<Resource>> {
        let endpoint = resolve_endpoint(schema.endpoint, parents)?;
        Self::list_at(client, schema, endpoint, params).await
    }

    async fn list_at(
        client: &Client,
        schema: &'static ResourceSchema,
        endpoint: String,
        params: &ListParams,
    ) -> Result<Vec<Resource>> {
        list_raw(client, &endpoint, schema.plural_key, params)
            .await?
            .into_iter()
            .map(|raw| Resource::from_json_at(client.clone(), schema, endpoint.clone(), raw))
            .collect()
    }

    /// One page of instances carrying a tag
    pub async fn list_by_tag(
        client: &Client,
        schema: &'static ResourceSchema,
        tag: &str,
        params: &ListParams,
    ) -> Result<Vec<Resource>> {
        let params = params.clone().param("tag_name", tag);
        Self::list(client, schema, &params).await
    }

    /// Delete every instance carrying a tag
    pub async fn delete_by_tag(
        client: &Client,
        schema: &'static ResourceSchema,
        tag: &str,
    ) -> Result<JsonValue> {
        if schema.delete_field.is_empty() {
            return Err(Error::unsupported(schema.kind, "deleting"));
        }
        info!("Deleting every {} tagged '{}'", schema.kind, tag);
        client
            .delete(
                schema.endpoint,
                None,
                vec![("tag_name".to_string(), tag.to_string())],
            )
            .await
    }

    /// Invoke an action on every instance carrying a tag
    ///
    /// One POST; the reply lists one action per matched instance. The call
    /// succeeds or fails as a whole.
    pub async fn action_by_tag(
        client: &Client,
        schema: &'static ResourceSchema,
        tag: &str,
        kind: ActionKind,
    ) -> Result<Vec<Action>> {
        ensure_action(schema, &kind)?;
        let path = format!("{}/actions", schema.endpoint);
        info!(
            "Action '{}' on every {} tagged '{}'",
            kind.type_name(),
            schema.kind,
            tag
        );

        let body = client
            .post_with_query(
                &path,
                kind.body(),
                vec![("tag_name".to_string(), tag.to_string())],
            )
            .await?;
        Action::list_from_body(body)
    }

    /// Load a resource that lives at its collection endpoint (account,
    /// balance, registry)
    pub async fn singleton(client: &Client, schema: &'static ResourceSchema) -> Result<Resource> {
        let mut resource = Resource::new(client.clone(), schema);
        resource.reload().await?;
        Ok(resource)
    }
}

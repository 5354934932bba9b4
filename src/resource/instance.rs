//! Lazy resource instance
//!
//! A `Resource` is one remote object seen through its schema. Reads of
//! declared fields trigger a single GET the first time (and again after an
//! identity field is rewritten); writes to server-controlled fields are
//! dropped.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::materialize::{FieldPlan, FieldValue};
use crate::schema::{resolve_endpoint, FieldCategory, ResourceSchema};
use crate::types::{path_segment, JsonObject, JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

static NULL_FIELD: FieldValue = FieldValue::Null;

/// A lazily loaded API object
#[derive(Clone)]
pub struct Resource {
    pub(crate) client: Client,
    pub(crate) schema: &'static ResourceSchema,
    plan: Arc<FieldPlan>,
    pub(crate) endpoint: String,
    fields: HashMap<String, FieldValue>,
    fetched: bool,
    identity_override: Option<&'static str>,
}

impl Resource {
    /// Create an unfetched instance with every declared field unset
    ///
    /// For schemas whose endpoint carries placeholders use
    /// [`Resource::with_parents`].
    pub fn new(client: Client, schema: &'static ResourceSchema) -> Self {
        Self::at(client, schema, schema.endpoint.to_string())
    }

    /// Create an unfetched instance of a nested resource
    pub fn with_parents(
        client: Client,
        schema: &'static ResourceSchema,
        parents: &[&str],
    ) -> Result<Self> {
        let endpoint = resolve_endpoint(schema.endpoint, parents)?;
        Ok(Self::at(client, schema, endpoint))
    }

    pub(crate) fn at(client: Client, schema: &'static ResourceSchema, endpoint: String) -> Self {
        let fields = schema
            .fields()
            .into_iter()
            .map(|f| (f.to_string(), FieldValue::Null))
            .collect();
        Self {
            client,
            schema,
            plan: FieldPlan::for_schema(schema),
            endpoint,
            fields,
            fetched: false,
            identity_override: None,
        }
    }

    /// Build a fetched instance from a raw object body
    pub fn from_json(client: Client, schema: &'static ResourceSchema, raw: JsonValue) -> Result<Self> {
        Self::from_json_at(client, schema, schema.endpoint.to_string(), raw)
    }

    /// Build a fetched instance from a raw object body at a resolved endpoint
    pub fn from_json_at(
        client: Client,
        schema: &'static ResourceSchema,
        endpoint: String,
        raw: JsonValue,
    ) -> Result<Self> {
        let mut resource = Self::at(client, schema, endpoint);
        resource.apply_object(raw)?;
        resource.fetched = true;
        Ok(resource)
    }

    /// Set a field and return self, for construction chains
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Resolved collection endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether a single-object fetch has populated this instance
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    /// Fetch field whose value drives the next lookup, if one was written
    pub fn identity_override(&self) -> Option<&'static str> {
        self.identity_override
    }

    /// Local value of a field, never fetching
    pub fn peek(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Local value of the id field serialized for the wire
    pub fn id(&self) -> JsonValue {
        self.fields
            .get(self.schema.id_field)
            .map_or(JsonValue::Null, FieldValue::to_json)
    }

    /// Local value of a field rendered as a URL path segment
    pub fn segment(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .map(FieldValue::to_json)
            .and_then(|v| path_segment(&v))
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Read a field, fetching first if the instance is unfetched
    ///
    /// With no identity value available no request is made and the local
    /// (possibly null) value is returned. Undeclared fields are local only
    /// and fail with [`Error::UnknownField`] when never set.
    pub async fn get(&mut self, field: &str) -> Result<&FieldValue> {
        if !self.schema.declares(field) {
            return self
                .fields
                .get(field)
                .ok_or_else(|| Error::unknown_field(self.schema.kind, field));
        }
        if self.schema.is_fetchable() && !self.fetched {
            self.fetch().await?;
        }
        Ok(self.fields.get(field).unwrap_or(&NULL_FIELD))
    }

    /// Write a field
    ///
    /// Static fields are ignored. Writing a fetch field makes it the pending
    /// identity and marks the instance unfetched; a second such write before
    /// the next fetch replaces the first.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        match self.schema.category(field) {
            Some(FieldCategory::Static) => {
                debug!(
                    "Ignoring write to static field '{}.{}'",
                    self.schema.kind, field
                );
                return;
            }
            Some(FieldCategory::Fetch) => {
                let name = self
                    .schema
                    .fetch_fields
                    .iter()
                    .copied()
                    .find(|f| *f == field);
                if let Some(prev) = self.identity_override.filter(|p| *p != field) {
                    debug!(
                        "Pending identity '{}.{}' replaced by '{}'",
                        self.schema.kind, prev, field
                    );
                }
                self.identity_override = name;
                self.fetched = false;
            }
            _ => {}
        }
        self.fields.insert(field.to_string(), value.into());
    }

    /// Identity used for the next lookup
    ///
    /// The pending override when it holds a value, else the first fetch
    /// field that does.
    pub fn identity(&self) -> Option<String> {
        self.identity_override
            .and_then(|f| self.segment(f))
            .or_else(|| {
                self.schema
                    .fetch_fields
                    .iter()
                    .find_map(|f| self.segment(f))
            })
    }

    /// Perform the single-object GET if an identity is available
    ///
    /// Returns whether a request was made.
    pub(crate) async fn fetch(&mut self) -> Result<bool> {
        let Some(identity) = self.identity() else {
            debug!(
                "No identity for '{}', skipping fetch",
                self.schema.kind
            );
            return Ok(false);
        };

        let path = format!("{}/{}", self.endpoint, identity);
        debug!("Fetching {} {}", self.schema.kind, path);
        let body = self.client.get(&path, Vec::new()).await?;
        self.apply_body(body)?;
        self.fetched = true;
        self.identity_override = None;
        Ok(true)
    }

    /// Record that the local fields mirror the server
    pub(crate) fn mark_fetched(&mut self) {
        self.fetched = true;
        self.identity_override = None;
    }

    /// Re-read the instance from the API regardless of state
    pub async fn reload(&mut self) -> Result<()> {
        if !self.schema.is_fetchable() {
            let body = self.client.get(&self.endpoint, Vec::new()).await?;
            self.apply_body(body)?;
            self.fetched = true;
            return Ok(());
        }
        if self.fetch().await? {
            Ok(())
        } else {
            Err(Error::client_request(format!(
                "Cannot load '{}' without a value for any of {:?}",
                self.schema.kind, self.schema.fetch_fields
            )))
        }
    }

    /// Poll until `ready` holds, reloading and sleeping the client's poll
    /// interval in between
    ///
    /// There is no upper bound; the loop ends when the remote object gets
    /// there or a request fails.
    pub async fn wait_until<F>(&mut self, mut ready: F) -> Result<()>
    where
        F: FnMut(&Resource) -> bool,
    {
        loop {
            self.reload().await?;
            if ready(&*self) {
                info!("{} {} is ready", self.schema.kind, self.id());
                return Ok(());
            }
            debug!(
                "{} {} not ready, polling again in {:?}",
                self.schema.kind,
                self.id(),
                self.client.poll_interval()
            );
            tokio::time::sleep(self.client.poll_interval()).await;
        }
    }

    /// Poll until a string field takes one of the given values
    pub async fn wait_for(&mut self, field: &str, values: &[&str]) -> Result<()> {
        self.wait_until(|r| {
            r.peek(field)
                .and_then(FieldValue::as_str)
                .is_some_and(|s| values.contains(&s))
        })
        .await
    }

    /// All declared fields under the single key, fetching first if needed
    pub async fn to_json(&mut self) -> Result<JsonValue> {
        if self.schema.is_fetchable() && !self.fetched {
            self.fetch().await?;
        }
        let inner: JsonObject = self
            .schema
            .fields()
            .into_iter()
            .map(|f| {
                let value = self.fields.get(f).map_or(JsonValue::Null, FieldValue::to_json);
                (f.to_string(), value)
            })
            .collect();
        if self.schema.single_key.is_empty() {
            return Ok(JsonValue::Object(inner));
        }
        let mut outer = JsonObject::new();
        outer.insert(self.schema.single_key.to_string(), JsonValue::Object(inner));
        Ok(JsonValue::Object(outer))
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Apply a response envelope: the single key, else the first element of
    /// the plural key. Schemas without a single key take the body as is.
    pub(crate) fn apply_body(&mut self, body: JsonValue) -> Result<()> {
        let JsonValue::Object(mut map) = body else {
            debug!("Ignoring non-object body for '{}'", self.schema.kind);
            return Ok(());
        };
        if self.schema.single_key.is_empty() {
            return self.apply_object(JsonValue::Object(map));
        }
        if let Some(single) = map.remove(self.schema.single_key) {
            return self.apply_object(single);
        }
        match map.remove(self.schema.plural_key) {
            Some(JsonValue::Array(items)) => match items.into_iter().next() {
                Some(first) => self.apply_object(first),
                None => Ok(()),
            },
            _ => {
                debug!(
                    "Body for '{}' has neither '{}' nor '{}'",
                    self.schema.kind, self.schema.single_key, self.schema.plural_key
                );
                Ok(())
            }
        }
    }

    /// Materialize every declared field present in a raw object
    pub(crate) fn apply_object(&mut self, raw: JsonValue) -> Result<()> {
        let map = match raw {
            JsonValue::Object(map) => map,
            other => {
                return Err(Error::Other(format!(
                    "Expected a JSON object for '{}', got {other}",
                    self.schema.kind
                )))
            }
        };
        let parent_id = map.get(self.schema.id_field).and_then(path_segment);
        for (name, value) in map {
            if !self.schema.declares(&name) {
                continue;
            }
            let value = self
                .plan
                .materialize(&self.client, parent_id.as_deref(), &name, value)?;
            self.fields.insert(name, value);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.schema.kind)
            .field("endpoint", &self.endpoint)
            .field("fetched", &self.fetched)
            .field("identity_override", &self.identity_override)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.endpoint == other.endpoint
            && self.fields == other.fields
    }
}

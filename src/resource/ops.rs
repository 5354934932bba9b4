//! Writes, actions and sub-resource requests on one instance

use super::collection::{list_raw, ListParams};
use super::instance::Resource;
use crate::action::Action;
use crate::error::{Error, Result};
use crate::materialize::{serialize_fields, FieldMap, FieldValue};
use crate::schema::{ActionKind, ResourceSchema};
use crate::types::{JsonValue, QueryParams};
use tracing::{debug, info};

impl Resource {
    /// Value of a URL field, or a local error naming the operation
    pub(crate) fn required_segment(&self, field: &str, operation: &str) -> Result<String> {
        self.segment(field).ok_or_else(|| {
            Error::client_request(format!(
                "Cannot {operation} '{}' without a value for '{field}'",
                self.schema.kind
            ))
        })
    }

    /// Current values of every dynamic field, serialized
    pub fn dynamic_body(&self) -> JsonValue {
        let fields: FieldMap = self
            .schema
            .dynamic_fields
            .iter()
            .map(|f| {
                let value = self.peek(f).cloned().unwrap_or_default();
                ((*f).to_string(), value)
            })
            .collect();
        serialize_fields(&fields)
    }

    /// PUT every dynamic field to `endpoint/{update field}`
    ///
    /// Fails before any request when the schema has no update field. A
    /// response carrying the object is materialized back into the instance.
    pub async fn save(&mut self) -> Result<JsonValue> {
        if self.schema.update_field.is_empty() {
            return Err(Error::unsupported(self.schema.kind, "updating"));
        }
        let target = self.required_segment(self.schema.update_field, "update")?;
        let path = format!("{}/{}", self.endpoint, target);
        info!("Updating {} {}", self.schema.kind, target);

        let response = self.client.put(&path, self.dynamic_body()).await?;
        if response.get(self.schema.single_key).is_some() {
            self.apply_body(response.clone())?;
        }
        Ok(response)
    }

    /// POST a new object to the collection endpoint and become it
    pub async fn create(&mut self, payload: FieldMap) -> Result<JsonValue> {
        let body = serialize_fields(&payload);
        info!("Creating {} at {}", self.schema.kind, self.endpoint);

        let response = self.client.post(&self.endpoint, body).await?;
        self.apply_body(response.clone())?;
        self.mark_fetched();
        Ok(response)
    }

    /// Create from the dynamic fields set locally, skipping unset ones
    pub async fn create_from_fields(&mut self) -> Result<JsonValue> {
        let payload: FieldMap = self
            .schema
            .dynamic_fields
            .iter()
            .filter_map(|f| {
                self.peek(f)
                    .filter(|v| !v.is_null())
                    .map(|v| ((*f).to_string(), v.clone()))
            })
            .collect();
        self.create(payload).await
    }

    /// DELETE `endpoint/{delete field}`; an absent object counts as deleted
    pub async fn delete(&mut self) -> Result<JsonValue> {
        if self.schema.delete_field.is_empty() {
            return Err(Error::unsupported(self.schema.kind, "deleting"));
        }
        let target = self.required_segment(self.schema.delete_field, "delete")?;
        let path = format!("{}/{}", self.endpoint, target);
        info!("Deleting {} {}", self.schema.kind, target);
        self.client.delete(&path, None, Vec::new()).await
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Actions recorded against this instance
    pub async fn list_actions(&mut self, params: &ListParams) -> Result<Vec<Action>> {
        if !self.schema.has_actions() {
            return Err(Error::unsupported(self.schema.kind, "actions"));
        }
        let id = self.required_segment(self.schema.id_field, "list actions of")?;
        let path = format!("{}/{}/actions", self.endpoint, id);
        list_raw(&self.client, &path, "actions", params)
            .await?
            .into_iter()
            .map(Action::from_json)
            .collect()
    }

    /// One action of this instance by id
    pub async fn get_action(&mut self, action_id: u64) -> Result<Action> {
        if !self.schema.has_actions() {
            return Err(Error::unsupported(self.schema.kind, "actions"));
        }
        let first = self.schema.fetch_fields.first().copied().unwrap_or(self.schema.id_field);
        let id = self.required_segment(first, "get actions of")?;
        let path = format!("{}/{}/actions/{}", self.endpoint, id, action_id);
        let body = self.client.get(&path, Vec::new()).await?;
        Action::from_body(body)
    }

    /// Invoke an action on this instance
    ///
    /// The action type must be declared by the schema; the check happens
    /// before any request.
    pub async fn action(&mut self, kind: ActionKind) -> Result<Action> {
        if self.schema.action_field.is_empty() {
            return Err(Error::unsupported(self.schema.kind, "actions"));
        }
        ensure_action(self.schema, &kind)?;
        let target = self.required_segment(self.schema.action_field, "run actions on")?;
        let path = format!("{}/{}/actions", self.endpoint, target);
        debug!("Action '{}' on {} {}", kind.type_name(), self.schema.kind, target);

        let body = self.client.post(&path, kind.body()).await?;
        Action::from_body(body)
    }

    // ========================================================================
    // Sub-resources
    // ========================================================================

    /// `endpoint/{id}/{suffix}`
    pub fn sub_path(&self, suffix: &str) -> Result<String> {
        let id = self.required_segment(self.schema.id_field, "address")?;
        Ok(format!("{}/{}/{}", self.endpoint, id, suffix.trim_start_matches('/')))
    }

    pub async fn get_sub(&self, suffix: &str, query: QueryParams) -> Result<JsonValue> {
        self.client.get(&self.sub_path(suffix)?, query).await
    }

    pub async fn post_sub(&self, suffix: &str, body: JsonValue) -> Result<JsonValue> {
        self.client.post(&self.sub_path(suffix)?, body).await
    }

    pub async fn put_sub(&self, suffix: &str, body: JsonValue) -> Result<JsonValue> {
        self.client.put(&self.sub_path(suffix)?, body).await
    }

    pub async fn delete_sub(&self, suffix: &str, body: Option<JsonValue>) -> Result<JsonValue> {
        self.client.delete(&self.sub_path(suffix)?, body, Vec::new()).await
    }

    /// Page of a sub-collection, read from `key` unless `params` overrides it
    pub async fn list_sub(
        &self,
        suffix: &str,
        key: &str,
        params: &ListParams,
    ) -> Result<Vec<JsonValue>> {
        list_raw(&self.client, &self.sub_path(suffix)?, key, params).await
    }
}

/// Reject action kinds the schema does not declare
pub(crate) fn ensure_action(schema: &ResourceSchema, action: &ActionKind) -> Result<()> {
    if schema.supports_action(action) {
        Ok(())
    } else {
        Err(Error::client_request(format!(
            "Resource '{}' does not support action {:?}",
            schema.kind,
            action.action_type()
        )))
    }
}

impl From<&Resource> for FieldValue {
    fn from(value: &Resource) -> Self {
        FieldValue::Resource(Box::new(value.clone()))
    }
}

//! Per-schema materializer registry
//!
//! A `FieldPlan` maps every declared field of a schema to its
//! [`Materializer`]. It is built once per schema from the explicit
//! registrations plus naming conventions and cached for the life of the
//! process.

use super::rules::{
    ForwardingRule, HealthCheck, InboundRule, OutboundRule, StickySession, TimeWindow,
};
use super::timestamp::{is_timestamp_field, parse_timestamp};
use super::types::{FieldValue, Materializer};
use crate::client::Client;
use crate::error::Result;
use crate::resource::Resource;
use crate::resources;
use crate::schema::{placeholder_count, resolve_endpoint, ResourceSchema};
use crate::types::{path_segment, JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};
use tracing::debug;

static PLANS: LazyLock<RwLock<HashMap<usize, Arc<FieldPlan>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Materializer chosen purely from the field name
pub fn convention(field: &str) -> Materializer {
    match field {
        "region" => Materializer::Reference(&resources::REGION),
        "size" => Materializer::Reference(&resources::SIZE),
        "image" => Materializer::Reference(&resources::IMAGE),
        "droplet" => Materializer::Reference(&resources::DROPLET),
        "inbound_rules" => Materializer::InboundRules,
        "outbound_rules" => Materializer::OutboundRules,
        "next_backup_window" => Materializer::Window,
        "forwarding_rules" => Materializer::ForwardingRules,
        "health_check" => Materializer::HealthCheck,
        "sticky_sessions" => Materializer::StickySession,
        name if is_timestamp_field(name) => Materializer::Timestamp,
        _ => Materializer::Plain,
    }
}

/// Resolved materializers for one schema
#[derive(Debug)]
pub struct FieldPlan {
    kind: &'static str,
    entries: HashMap<&'static str, Materializer>,
}

impl FieldPlan {
    /// Cached plan for a schema
    pub fn for_schema(schema: &'static ResourceSchema) -> Arc<FieldPlan> {
        let key = std::ptr::from_ref(schema) as usize;
        if let Ok(plans) = PLANS.read() {
            if let Some(plan) = plans.get(&key) {
                return Arc::clone(plan);
            }
        }

        let plan = Arc::new(Self::build(schema));
        if let Ok(mut plans) = PLANS.write() {
            plans.entry(key).or_insert_with(|| Arc::clone(&plan));
        }
        plan
    }

    fn build(schema: &'static ResourceSchema) -> Self {
        let entries: HashMap<_, _> = schema
            .fields()
            .into_iter()
            .map(|field| {
                let m = schema
                    .registered(field)
                    .unwrap_or_else(|| convention(field));
                (field, m)
            })
            .collect();
        debug!(
            "Built field plan for '{}' ({} fields)",
            schema.kind,
            entries.len()
        );
        Self {
            kind: schema.kind,
            entries,
        }
    }

    /// Resource kind this plan belongs to
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Materializer for a field; undeclared fields are plain
    pub fn materializer(&self, field: &str) -> Materializer {
        self.entries
            .get(field)
            .copied()
            .unwrap_or(Materializer::Plain)
    }

    /// Materialize one raw field value
    ///
    /// `parent_id` is the identifier of the enclosing resource; it fills
    /// endpoint placeholders of embedded resources that the embedded object
    /// does not carry itself.
    pub fn materialize(
        &self,
        client: &Client,
        parent_id: Option<&str>,
        field: &str,
        raw: JsonValue,
    ) -> Result<FieldValue> {
        materialize_with(self.materializer(field), client, parent_id, field, raw)
    }
}

/// Apply a materializer to a raw value
pub fn materialize_with(
    materializer: Materializer,
    client: &Client,
    parent_id: Option<&str>,
    field: &str,
    raw: JsonValue,
) -> Result<FieldValue> {
    if raw.is_null() {
        return Ok(FieldValue::Null);
    }

    match (materializer, raw) {
        (Materializer::Timestamp, JsonValue::String(s)) => {
            Ok(FieldValue::Timestamp(parse_timestamp(field, &s)?))
        }
        (Materializer::Reference(schema), raw @ JsonValue::Object(_)) => {
            nested(client, schema, parent_id, raw).map(FieldValue::from)
        }
        (Materializer::NestedList(schema), JsonValue::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                JsonValue::Object(_) => nested(client, schema, parent_id, item).map(FieldValue::from),
                other => Ok(FieldValue::from(other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::List),
        (Materializer::InboundRules, JsonValue::Array(items)) => items
            .iter()
            .map(|item| InboundRule::from_json(item).map(FieldValue::from))
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::List),
        (Materializer::OutboundRules, JsonValue::Array(items)) => items
            .iter()
            .map(|item| OutboundRule::from_json(item).map(FieldValue::from))
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::List),
        (Materializer::ForwardingRules, JsonValue::Array(items)) => items
            .iter()
            .map(|item| ForwardingRule::from_json(item).map(FieldValue::from))
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::List),
        (Materializer::Window, raw @ JsonValue::Object(_)) => {
            Ok(match TimeWindow::from_json(field, &raw)? {
                Some(window) => FieldValue::Window(window),
                None => FieldValue::Json(raw),
            })
        }
        (Materializer::HealthCheck, raw @ JsonValue::Object(_)) => {
            HealthCheck::from_json(&raw).map(FieldValue::from)
        }
        (Materializer::StickySession, raw @ JsonValue::Object(_)) => {
            StickySession::from_json(&raw).map(FieldValue::from)
        }
        (_, raw) => Ok(FieldValue::Json(raw)),
    }
}

/// Build an embedded resource, filling endpoint placeholders from the
/// schema's parent fields, falling back to the enclosing resource's id
fn nested(
    client: &Client,
    schema: &'static ResourceSchema,
    parent_id: Option<&str>,
    raw: JsonValue,
) -> Result<Resource> {
    let endpoint = if placeholder_count(schema.endpoint) == 0 {
        schema.endpoint.to_string()
    } else {
        let args: Vec<String> = schema
            .parent_fields
            .iter()
            .filter_map(|name| {
                raw.get(*name)
                    .and_then(path_segment)
                    .or_else(|| parent_id.map(str::to_string))
            })
            .collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        resolve_endpoint(schema.endpoint, &args)?
    };
    Resource::from_json_at(client.clone(), schema, endpoint, raw)
}

//! Object materializer
//!
//! Turns raw response fields into typed values and back.
//!
//! # Features
//!
//! - **Nested Resources**: region, size, image and droplet objects become
//!   resource instances; string slugs pass through
//! - **Timestamps**: `*_at`, `start*`, `end_*` and `not_after` fields are
//!   parsed, fractional seconds truncated
//! - **Rules**: firewall rule arrays and load balancer objects become typed
//!   sub-objects
//! - **Serialization**: resources collapse to their identifiers for writes

mod plan;
mod rules;
mod timestamp;
mod types;

pub use plan::{convention, materialize_with, FieldPlan};
pub use rules::{
    ForwardingRule, HealthCheck, InboundRule, Location, OutboundRule, Protocol, StickySession,
    TimeWindow,
};
pub use timestamp::{
    format_timestamp, is_timestamp_field, parse_timestamp, wire_option, TIMESTAMP_FORMAT,
};
pub use types::{FieldMap, FieldValue, Materializer};

use crate::types::{JsonObject, JsonValue};

/// Serialize a field map into a JSON object body
pub fn serialize_fields<'a, I>(fields: I) -> JsonValue
where
    I: IntoIterator<Item = (&'a String, &'a FieldValue)>,
{
    let body: JsonObject = fields
        .into_iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    JsonValue::Object(body)
}

#[cfg(test)]
mod tests;

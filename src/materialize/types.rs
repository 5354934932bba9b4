//! Field value types

use super::rules::{
    ForwardingRule, HealthCheck, InboundRule, Location, OutboundRule, StickySession, TimeWindow,
};
use super::timestamp::format_timestamp;
use crate::resource::Resource;
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Field name to value map used for create payloads
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A materialized field value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Unset or null on the server
    #[default]
    Null,
    /// Anything without a richer type
    Json(JsonValue),
    Timestamp(NaiveDateTime),
    Window(TimeWindow),
    /// Embedded resource instance
    Resource(Box<Resource>),
    InboundRule(InboundRule),
    OutboundRule(OutboundRule),
    Location(Location),
    ForwardingRule(ForwardingRule),
    HealthCheck(HealthCheck),
    StickySession(StickySession),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Json(JsonValue::Null))
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            FieldValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(JsonValue::as_str)
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_json().and_then(JsonValue::as_u64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(JsonValue::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_json().and_then(JsonValue::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(JsonValue::as_bool)
    }

    pub fn as_timestamp(&self) -> Option<&NaiveDateTime> {
        match self {
            FieldValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_window(&self) -> Option<&TimeWindow> {
        match self {
            FieldValue::Window(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            FieldValue::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_resource_mut(&mut self) -> Option<&mut Resource> {
        match self {
            FieldValue::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Serialize for the wire
    ///
    /// Resources collapse to their identifier, sub-objects to their
    /// canonical JSON form, timestamps to the wire format. Lists are
    /// walked element-wise.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Null => JsonValue::Null,
            FieldValue::Json(v) => v.clone(),
            FieldValue::Timestamp(ts) => JsonValue::String(format_timestamp(ts)),
            FieldValue::Window(w) => w.to_json(),
            FieldValue::Resource(r) => r.id(),
            FieldValue::InboundRule(r) => r.to_json(),
            FieldValue::OutboundRule(r) => r.to_json(),
            FieldValue::Location(l) => l.to_json(),
            FieldValue::ForwardingRule(r) => r.to_json(),
            FieldValue::HealthCheck(h) => h.to_json(),
            FieldValue::StickySession(s) => s.to_json(),
            FieldValue::List(items) => {
                JsonValue::Array(items.iter().map(FieldValue::to_json).collect())
            }
        }
    }
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => FieldValue::Null,
            other => FieldValue::Json(other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Json(JsonValue::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Json(JsonValue::String(value))
    }
}

macro_rules! json_scalar_into_field {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::Json(JsonValue::from(value))
                }
            }
        )*
    };
}

json_scalar_into_field!(i32, i64, u32, u64, f64, bool);

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<TimeWindow> for FieldValue {
    fn from(value: TimeWindow) -> Self {
        FieldValue::Window(value)
    }
}

impl From<Resource> for FieldValue {
    fn from(value: Resource) -> Self {
        FieldValue::Resource(Box::new(value))
    }
}

impl From<InboundRule> for FieldValue {
    fn from(value: InboundRule) -> Self {
        FieldValue::InboundRule(value)
    }
}

impl From<OutboundRule> for FieldValue {
    fn from(value: OutboundRule) -> Self {
        FieldValue::OutboundRule(value)
    }
}

impl From<Location> for FieldValue {
    fn from(value: Location) -> Self {
        FieldValue::Location(value)
    }
}

impl From<ForwardingRule> for FieldValue {
    fn from(value: ForwardingRule) -> Self {
        FieldValue::ForwardingRule(value)
    }
}

impl From<HealthCheck> for FieldValue {
    fn from(value: HealthCheck) -> Self {
        FieldValue::HealthCheck(value)
    }
}

impl From<StickySession> for FieldValue {
    fn from(value: StickySession) -> Self {
        FieldValue::StickySession(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// How a raw field is turned into a [`FieldValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materializer {
    /// Raw value unchanged
    Plain,
    /// Wire timestamp
    Timestamp,
    /// Embedded resource; strings pass through unchanged
    Reference(&'static ResourceSchema),
    /// Array of embedded resources
    NestedList(&'static ResourceSchema),
    InboundRules,
    OutboundRules,
    /// `{"start", "end"}` timestamp pair
    Window,
    ForwardingRules,
    HealthCheck,
    StickySession,
}

//! Typed sub-objects embedded in resource bodies
//!
//! Firewall rules and their locations, load balancer forwarding rules,
//! health checks and sticky sessions, plus the start/end window used by
//! droplet backups. Each knows its canonical JSON form.

use super::timestamp::{format_timestamp, parse_timestamp};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn to_json<T: Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or_default()
}

// ============================================================================
// Firewall rules
// ============================================================================

/// Traffic type a firewall rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl std::str::FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "icmp" => Ok(Protocol::Icmp),
            other => Err(Error::invalid_rule(format!(
                "protocol can only be one of 'tcp', 'udp' and 'icmp', found '{other}'"
            ))),
        }
    }
}

/// Sources or destinations of a firewall rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "null_as_default")]
    pub addresses: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub droplet_ids: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub load_balancer_uids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Location {
    /// A location made of addresses / CIDRs only
    pub fn addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every IPv4 and IPv6 address
    pub fn anywhere() -> Self {
        Self::addresses(["0.0.0.0/0", "::/0"])
    }

    /// Canonical JSON form; all four keys are always present
    pub fn to_json(&self) -> JsonValue {
        to_json(self)
    }

    /// Build from a raw JSON object
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Protocol and ports shared by inbound and outbound rules
///
/// ICMP rules never carry ports.
fn rule_ports(protocol: Protocol, ports: Option<String>) -> Option<String> {
    match protocol {
        Protocol::Icmp => None,
        _ => ports,
    }
}

fn parse_rule(value: &JsonValue, location_key: &str) -> Result<(Protocol, Option<String>, Location)> {
    let protocol: Protocol = value
        .get("protocol")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::invalid_rule("rule has no protocol"))?
        .parse()?;
    let ports = value.get("ports").and_then(|p| match p {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let location = match value.get(location_key) {
        Some(JsonValue::Null) | None => Location::default(),
        Some(raw) => Location::from_json(raw)?,
    };
    Ok((protocol, rule_ports(protocol, ports), location))
}

fn rule_json(protocol: Protocol, ports: Option<&String>, key: &str, location: &Location) -> JsonValue {
    let mut map = serde_json::Map::new();
    map.insert("protocol".to_string(), to_json(&protocol));
    if let Some(ports) = ports {
        map.insert("ports".to_string(), json!(ports));
    }
    map.insert(key.to_string(), location.to_json());
    JsonValue::Object(map)
}

/// Traffic allowed into a firewall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRule {
    pub protocol: Protocol,
    pub ports: Option<String>,
    pub sources: Location,
}

impl InboundRule {
    /// Create a rule; `protocol` must be tcp, udp or icmp
    pub fn new(protocol: &str, ports: impl Into<String>, sources: Location) -> Result<Self> {
        let protocol: Protocol = protocol.parse()?;
        Ok(Self {
            protocol,
            ports: rule_ports(protocol, Some(ports.into())),
            sources,
        })
    }

    pub fn to_json(&self) -> JsonValue {
        rule_json(self.protocol, self.ports.as_ref(), "sources", &self.sources)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let (protocol, ports, sources) = parse_rule(value, "sources")?;
        Ok(Self {
            protocol,
            ports,
            sources,
        })
    }
}

/// Traffic allowed out of a firewall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRule {
    pub protocol: Protocol,
    pub ports: Option<String>,
    pub destinations: Location,
}

impl OutboundRule {
    /// Create a rule; `protocol` must be tcp, udp or icmp
    pub fn new(protocol: &str, ports: impl Into<String>, destinations: Location) -> Result<Self> {
        let protocol: Protocol = protocol.parse()?;
        Ok(Self {
            protocol,
            ports: rule_ports(protocol, Some(ports.into())),
            destinations,
        })
    }

    pub fn to_json(&self) -> JsonValue {
        rule_json(
            self.protocol,
            self.ports.as_ref(),
            "destinations",
            &self.destinations,
        )
    }

    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let (protocol, ports, destinations) = parse_rule(value, "destinations")?;
        Ok(Self {
            protocol,
            ports,
            destinations,
        })
    }
}

// ============================================================================
// Load balancer objects
// ============================================================================

/// How a load balancer routes one entry port to the backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingRule {
    pub entry_protocol: String,
    pub entry_port: u16,
    pub target_protocol: String,
    pub target_port: u16,
    pub certificate_id: String,
    pub tls_passthrough: bool,
}

impl Default for ForwardingRule {
    fn default() -> Self {
        Self {
            entry_protocol: "http".to_string(),
            entry_port: 80,
            target_protocol: "http".to_string(),
            target_port: 80,
            certificate_id: String::new(),
            tls_passthrough: false,
        }
    }
}

impl ForwardingRule {
    pub fn to_json(&self) -> JsonValue {
        to_json(self)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Backend health probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheck {
    pub protocol: String,
    pub port: u16,
    pub path: String,
    pub check_interval_seconds: u32,
    pub response_timeout_seconds: u32,
    pub healthy_threshold: u32,
    pub unhealthy_threshold: u32,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            port: 80,
            path: "/".to_string(),
            check_interval_seconds: 10,
            response_timeout_seconds: 5,
            healthy_threshold: 5,
            unhealthy_threshold: 3,
        }
    }
}

impl HealthCheck {
    pub fn to_json(&self) -> JsonValue {
        to_json(self)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Client affinity setting
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StickySession {
    #[serde(rename = "type")]
    pub kind: String,
    pub cookie_name: String,
    pub cookie_ttl_seconds: u32,
}

impl Default for StickySession {
    fn default() -> Self {
        Self {
            kind: "none".to_string(),
            cookie_name: "do-lb".to_string(),
            cookie_ttl_seconds: 60,
        }
    }
}

impl StickySession {
    /// Cookie-based affinity
    pub fn cookies(cookie_name: impl Into<String>, cookie_ttl_seconds: u32) -> Self {
        Self {
            kind: "cookies".to_string(),
            cookie_name: cookie_name.into(),
            cookie_ttl_seconds,
        }
    }

    /// `{"type": "none"}` when disabled, all three keys otherwise
    pub fn to_json(&self) -> JsonValue {
        if self.kind == "none" {
            return json!({ "type": "none" });
        }
        json!({
            "type": self.kind,
            "cookie_name": self.cookie_name,
            "cookie_ttl_seconds": self.cookie_ttl_seconds,
        })
    }

    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

// ============================================================================
// Windows
// ============================================================================

/// A start/end pair of timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn to_json(&self) -> JsonValue {
        json!({
            "start": format_timestamp(&self.start),
            "end": format_timestamp(&self.end),
        })
    }

    /// Parse `{"start": ..., "end": ...}`; `None` when either bound is missing
    pub fn from_json(field: &str, value: &JsonValue) -> Result<Option<Self>> {
        let (Some(start), Some(end)) = (
            value.get("start").and_then(JsonValue::as_str),
            value.get("end").and_then(JsonValue::as_str),
        ) else {
            return Ok(None);
        };
        Ok(Some(Self {
            start: parse_timestamp(field, start)?,
            end: parse_timestamp(field, end)?,
        }))
    }
}

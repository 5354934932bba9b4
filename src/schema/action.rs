//! Typed server-side actions
//!
//! Each variant carries the parameters its action type needs. The engine
//! checks the variant's [`ActionType`] against the schema's declared actions
//! before any request is made. Droplet and volume resizes share the wire
//! name `resize` but are distinct types with distinct parameters.

use crate::types::{JsonObject, JsonValue};
use serde_json::json;

/// Action type without parameters, as declared by a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    // Droplets
    EnableBackups,
    DisableBackups,
    Reboot,
    PowerCycle,
    Shutdown,
    PowerOff,
    PowerOn,
    Restore,
    PasswordReset,
    Resize,
    Rebuild,
    Rename,
    ChangeKernel,
    EnableIpv6,
    EnablePrivateNetworking,
    Snapshot,

    // Images
    Transfer,
    Convert,

    // Volumes
    Attach,
    Detach,
    ResizeVolume,

    // Floating IPs
    Assign,
    Unassign,
}

impl ActionType {
    /// Wire name sent as `type`
    pub fn name(self) -> &'static str {
        match self {
            ActionType::EnableBackups => "enable_backups",
            ActionType::DisableBackups => "disable_backups",
            ActionType::Reboot => "reboot",
            ActionType::PowerCycle => "power_cycle",
            ActionType::Shutdown => "shutdown",
            ActionType::PowerOff => "power_off",
            ActionType::PowerOn => "power_on",
            ActionType::Restore => "restore",
            ActionType::PasswordReset => "password_reset",
            ActionType::Resize | ActionType::ResizeVolume => "resize",
            ActionType::Rebuild => "rebuild",
            ActionType::Rename => "rename",
            ActionType::ChangeKernel => "change_kernel",
            ActionType::EnableIpv6 => "enable_ipv6",
            ActionType::EnablePrivateNetworking => "enable_private_networking",
            ActionType::Snapshot => "snapshot",
            ActionType::Transfer => "transfer",
            ActionType::Convert => "convert",
            ActionType::Attach => "attach",
            ActionType::Detach => "detach",
            ActionType::Assign => "assign",
            ActionType::Unassign => "unassign",
        }
    }
}

/// A server-side action with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    // Droplets
    EnableBackups,
    DisableBackups,
    Reboot,
    PowerCycle,
    Shutdown,
    PowerOff,
    PowerOn,
    /// Restore from a backup image (id or slug)
    Restore { image: JsonValue },
    PasswordReset,
    /// Resize to a size slug; `disk` also grows the disk (irreversible)
    Resize { size: String, disk: bool },
    /// Rebuild from an image (id or slug)
    Rebuild { image: JsonValue },
    Rename { name: String },
    ChangeKernel { kernel: u64 },
    EnableIpv6,
    EnablePrivateNetworking,
    Snapshot { name: Option<String> },

    // Images
    Transfer { region: String },
    Convert,

    // Volumes
    Attach {
        droplet_id: u64,
        region: Option<String>,
    },
    Detach {
        droplet_id: u64,
        region: Option<String>,
    },
    ResizeVolume {
        size_gigabytes: u64,
        region: Option<String>,
    },

    // Floating IPs
    Assign { droplet_id: u64 },
    Unassign,
}

impl ActionKind {
    /// Parameter-free type of this action
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::EnableBackups => ActionType::EnableBackups,
            ActionKind::DisableBackups => ActionType::DisableBackups,
            ActionKind::Reboot => ActionType::Reboot,
            ActionKind::PowerCycle => ActionType::PowerCycle,
            ActionKind::Shutdown => ActionType::Shutdown,
            ActionKind::PowerOff => ActionType::PowerOff,
            ActionKind::PowerOn => ActionType::PowerOn,
            ActionKind::Restore { .. } => ActionType::Restore,
            ActionKind::PasswordReset => ActionType::PasswordReset,
            ActionKind::Resize { .. } => ActionType::Resize,
            ActionKind::Rebuild { .. } => ActionType::Rebuild,
            ActionKind::Rename { .. } => ActionType::Rename,
            ActionKind::ChangeKernel { .. } => ActionType::ChangeKernel,
            ActionKind::EnableIpv6 => ActionType::EnableIpv6,
            ActionKind::EnablePrivateNetworking => ActionType::EnablePrivateNetworking,
            ActionKind::Snapshot { .. } => ActionType::Snapshot,
            ActionKind::Transfer { .. } => ActionType::Transfer,
            ActionKind::Convert => ActionType::Convert,
            ActionKind::Attach { .. } => ActionType::Attach,
            ActionKind::Detach { .. } => ActionType::Detach,
            ActionKind::ResizeVolume { .. } => ActionType::ResizeVolume,
            ActionKind::Assign { .. } => ActionType::Assign,
            ActionKind::Unassign => ActionType::Unassign,
        }
    }

    /// Wire name sent as `type`
    pub fn type_name(&self) -> &'static str {
        self.action_type().name()
    }

    /// Parameters sent alongside `type`
    pub fn params(&self) -> JsonObject {
        let value = match self {
            ActionKind::Restore { image } | ActionKind::Rebuild { image } => {
                json!({ "image": image })
            }
            ActionKind::Resize { size, disk } => json!({ "size": size, "disk": disk }),
            ActionKind::Rename { name } => json!({ "name": name }),
            ActionKind::ChangeKernel { kernel } => json!({ "kernel": kernel }),
            ActionKind::Snapshot { name: Some(name) } => json!({ "name": name }),
            ActionKind::Transfer { region } => json!({ "region": region }),
            ActionKind::Attach { droplet_id, region } | ActionKind::Detach { droplet_id, region } => {
                with_region(json!({ "droplet_id": droplet_id }), region.as_deref())
            }
            ActionKind::ResizeVolume {
                size_gigabytes,
                region,
            } => with_region(json!({ "size_gigabytes": size_gigabytes }), region.as_deref()),
            ActionKind::Assign { droplet_id } => json!({ "droplet_id": droplet_id }),
            _ => json!({}),
        };
        match value {
            JsonValue::Object(map) => map,
            _ => JsonObject::new(),
        }
    }

    /// Full request body: `{"type": ..., ...params}`
    pub fn body(&self) -> JsonValue {
        let mut body = JsonObject::new();
        body.insert("type".to_string(), json!(self.type_name()));
        body.extend(self.params());
        JsonValue::Object(body)
    }
}

fn with_region(mut value: JsonValue, region: Option<&str>) -> JsonValue {
    if let (Some(region), JsonValue::Object(map)) = (region, &mut value) {
        map.insert("region".to_string(), json!(region));
    }
    value
}

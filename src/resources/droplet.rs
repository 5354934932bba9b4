//! Droplets

use super::catalog::{Snapshot, SNAPSHOT};
use crate::action::Action;
use crate::client::Client;
use crate::error::Result;
use crate::resource::{list_raw, ListParams, Resource};
use crate::schema::{ActionKind, ActionType, ResourceSchema};
use crate::types::JsonValue;
use tracing::debug;

pub static DROPLET: ResourceSchema = ResourceSchema {
    kind: "droplet",
    endpoint: "droplets",
    single_key: "droplet",
    plural_key: "droplets",
    fetch_fields: &["id", "name"],
    static_fields: &[
        "memory",
        "vcpus",
        "disk",
        "locked",
        "created_at",
        "status",
        "backup_ids",
        "snapshot_ids",
        "features",
        "region",
        "image",
        "size",
        "size_slug",
        "networks",
        "kernel",
        "next_backup_window",
        "volume_ids",
    ],
    dynamic_fields: &[
        "name",
        "region",
        "size",
        "image",
        "ssh_keys",
        "backups",
        "ipv6",
        "private_networking",
        "user_data",
        "monitoring",
        "volumes",
        "tags",
        "vpc_uuid",
    ],
    actions: &[
        ActionType::EnableBackups,
        ActionType::DisableBackups,
        ActionType::PowerCycle,
        ActionType::Reboot,
        ActionType::Shutdown,
        ActionType::PowerOff,
        ActionType::PowerOn,
        ActionType::Restore,
        ActionType::PasswordReset,
        ActionType::Resize,
        ActionType::Rebuild,
        ActionType::Rename,
        ActionType::ChangeKernel,
        ActionType::EnableIpv6,
        ActionType::EnablePrivateNetworking,
        ActionType::Snapshot,
    ],
    delete_field: "id",
    action_field: "id",
    ..ResourceSchema::EMPTY
};

/// Statuses after which a droplet stops transitioning
const READY_STATUSES: &[&str] = &["active", "off"];

typed_resource!(
    /// A virtual machine
    Droplet,
    top DROPLET
);

impl Droplet {
    pub async fn list_by_tag(client: &Client, tag: &str, params: &ListParams) -> Result<Vec<Self>> {
        Ok(Resource::list_by_tag(client, &DROPLET, tag, params)
            .await?
            .into_iter()
            .map(Self)
            .collect())
    }

    /// Block until the droplet is `active` or `off`
    pub async fn wait_ready(&mut self) -> Result<()> {
        let status = self.get("status").await?.as_str().map(str::to_string);
        if status.as_deref().is_some_and(|s| READY_STATUSES.contains(&s)) {
            return Ok(());
        }
        debug!("Droplet {} is {:?}, waiting", self.id(), status);
        self.wait_for("status", READY_STATUSES).await
    }

    /// First address of the given family and type in `networks`
    fn address(&self, family: &str, kind: Option<&str>) -> Option<String> {
        self.peek("networks")
            .and_then(|n| n.as_json())
            .and_then(|n| n.get(family))
            .and_then(JsonValue::as_array)?
            .iter()
            .find(|net| kind.is_none_or(|k| net.get("type").and_then(JsonValue::as_str) == Some(k)))
            .and_then(|net| net.get("ip_address"))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    }

    /// Public IPv4 address, once the droplet is ready
    pub async fn public_ipv4(&mut self) -> Result<Option<String>> {
        self.wait_ready().await?;
        Ok(self.address("v4", Some("public")))
    }

    /// Private IPv4 address, if private networking is enabled
    pub async fn private_ipv4(&mut self) -> Result<Option<String>> {
        self.wait_ready().await?;
        Ok(self.address("v4", Some("private")))
    }

    /// First IPv6 address, if IPv6 is enabled
    pub async fn public_ipv6(&mut self) -> Result<Option<String>> {
        self.wait_ready().await?;
        Ok(self.address("v6", None))
    }

    pub async fn list_kernels(&self, params: &ListParams) -> Result<Vec<JsonValue>> {
        self.list_sub("kernels", "kernels", params).await
    }

    pub async fn list_snapshots(&self, params: &ListParams) -> Result<Vec<Snapshot>> {
        self.list_sub("snapshots", "snapshots", params)
            .await?
            .into_iter()
            .map(|raw| {
                Resource::from_json(self.client().clone(), &SNAPSHOT, raw).map(Snapshot::from)
            })
            .collect()
    }

    pub async fn list_backups(&self, params: &ListParams) -> Result<Vec<JsonValue>> {
        self.list_sub("backups", "backups", params).await
    }

    /// Droplets running on the same physical host
    pub async fn list_neighbors(&self, params: &ListParams) -> Result<Vec<Droplet>> {
        self.list_sub("neighbors", "droplets", params)
            .await?
            .into_iter()
            .map(|raw| Resource::from_json(self.client().clone(), &DROPLET, raw).map(Self))
            .collect()
    }

    pub async fn reboot(&mut self) -> Result<Action> {
        self.action(ActionKind::Reboot).await
    }

    pub async fn shutdown(&mut self) -> Result<Action> {
        self.action(ActionKind::Shutdown).await
    }

    pub async fn power_on(&mut self) -> Result<Action> {
        self.action(ActionKind::PowerOn).await
    }

    pub async fn power_off(&mut self) -> Result<Action> {
        self.action(ActionKind::PowerOff).await
    }

    pub async fn snapshot(&mut self, name: Option<String>) -> Result<Action> {
        self.action(ActionKind::Snapshot { name }).await
    }

    pub async fn rename(&mut self, name: impl Into<String>) -> Result<Action> {
        self.action(ActionKind::Rename { name: name.into() }).await
    }

    pub async fn resize(&mut self, size: impl Into<String>, disk: bool) -> Result<Action> {
        self.action(ActionKind::Resize {
            size: size.into(),
            disk,
        })
        .await
    }
}

/// Groups of droplet ids that share a physical host
pub async fn neighbor_ids(client: &Client) -> Result<Vec<JsonValue>> {
    list_raw(
        client,
        "reports/droplet_neighbors_ids",
        "neighbor_ids",
        &ListParams::new(),
    )
    .await
}

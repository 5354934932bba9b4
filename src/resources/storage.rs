//! Block storage volumes

use super::catalog::{Snapshot, SNAPSHOT};
use crate::action::Action;
use crate::client::Client;
use crate::error::Result;
use crate::resource::{ListParams, Resource};
use crate::schema::{ActionKind, ActionType, ResourceSchema};
use crate::types::JsonValue;
use serde_json::json;
use tracing::info;

pub static VOLUME: ResourceSchema = ResourceSchema {
    kind: "volume",
    endpoint: "volumes",
    single_key: "volume",
    plural_key: "volumes",
    fetch_fields: &["id"],
    static_fields: &["droplet_ids", "created_at"],
    dynamic_fields: &[
        "size_gigabytes",
        "name",
        "description",
        "region",
        "snapshot_id",
        "filesystem_label",
        "filesystem_type",
        "tags",
    ],
    actions: &[ActionType::Attach, ActionType::Detach, ActionType::ResizeVolume],
    delete_field: "id",
    update_field: "id",
    action_field: "id",
    ..ResourceSchema::EMPTY
};

typed_resource!(
    /// A block storage volume
    Volume,
    top VOLUME
);

fn by_name_query(name: &str, region: &str) -> Vec<(String, String)> {
    vec![
        ("name".to_string(), name.to_string()),
        ("region".to_string(), region.to_string()),
    ]
}

impl Volume {
    /// Volumes with the given name across regions
    pub async fn list_by_name(
        client: &Client,
        name: &str,
        params: &ListParams,
    ) -> Result<Vec<Self>> {
        let params = params.clone().param("name", name);
        Self::list(client, &params).await
    }

    /// The volume called `name` in `region`, `None` when there is none
    pub async fn get_by_name(client: &Client, name: &str, region: &str) -> Result<Option<Self>> {
        let mut body = client
            .get(VOLUME.endpoint, by_name_query(name, region))
            .await?;
        let first = match body.get_mut(VOLUME.plural_key).map(JsonValue::take) {
            Some(JsonValue::Array(volumes)) => volumes.into_iter().next(),
            _ => None,
        };
        first
            .map(|raw| Resource::from_json(client.clone(), &VOLUME, raw).map(Self))
            .transpose()
    }

    /// Delete the volume called `name` in `region`
    pub async fn delete_by_name(client: &Client, name: &str, region: &str) -> Result<JsonValue> {
        info!("Deleting volume {} in {}", name, region);
        client
            .delete(VOLUME.endpoint, None, by_name_query(name, region))
            .await
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

    /// Take a snapshot of the volume
    pub async fn snapshot(&self, name: &str, tags: &[&str]) -> Result<Snapshot> {
        let mut body = self
            .post_sub("snapshots", json!({ "name": name, "tags": tags }))
            .await?;
        let raw = body.get_mut("snapshot").map(JsonValue::take).unwrap_or_default();
        Resource::from_json(self.client().clone(), &SNAPSHOT, raw).map(Snapshot::from)
    }

    pub async fn attach(&mut self, droplet_id: u64, region: Option<String>) -> Result<Action> {
        self.action(ActionKind::Attach { droplet_id, region }).await
    }

    pub async fn detach(&mut self, droplet_id: u64, region: Option<String>) -> Result<Action> {
        self.action(ActionKind::Detach { droplet_id, region }).await
    }

    pub async fn resize(&mut self, size_gigabytes: u64, region: Option<String>) -> Result<Action> {
        self.action(ActionKind::ResizeVolume {
            size_gigabytes,
            region,
        })
        .await
    }
}

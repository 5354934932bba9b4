//! Read-mostly catalog resources: actions, regions, sizes, images,
//! snapshots, 1-click apps and SSH keys

use crate::client::Client;
use crate::error::Result;
use crate::resource::{ListParams, Resource};
use crate::schema::{ActionKind, ActionType, ResourceSchema};
use crate::action::Action;

pub static ACTION: ResourceSchema = ResourceSchema {
    kind: "action",
    endpoint: "actions",
    single_key: "action",
    plural_key: "actions",
    fetch_fields: &["id"],
    static_fields: &[
        "status",
        "type",
        "started_at",
        "completed_at",
        "resource_id",
        "resource_type",
        "region",
        "region_slug",
    ],
    ..ResourceSchema::EMPTY
};

pub static REGION: ResourceSchema = ResourceSchema {
    kind: "region",
    endpoint: "regions",
    single_key: "region",
    plural_key: "regions",
    static_fields: &["slug", "name", "sizes", "available", "features"],
    id_field: "slug",
    ..ResourceSchema::EMPTY
};

pub static SIZE: ResourceSchema = ResourceSchema {
    kind: "size",
    endpoint: "sizes",
    single_key: "size",
    plural_key: "sizes",
    static_fields: &[
        "slug",
        "available",
        "transfer",
        "price_monthly",
        "price_hourly",
        "regions",
        "memory",
        "vcpus",
        "disk",
    ],
    id_field: "slug",
    ..ResourceSchema::EMPTY
};

pub static IMAGE: ResourceSchema = ResourceSchema {
    kind: "image",
    endpoint: "images",
    single_key: "image",
    plural_key: "images",
    fetch_fields: &["id", "slug"],
    static_fields: &[
        "type",
        "public",
        "regions",
        "created_at",
        "min_disk_size",
        "size_gigabytes",
        "tags",
        "status",
        "error_message",
    ],
    dynamic_fields: &["name", "distribution", "description"],
    actions: &[ActionType::Transfer, ActionType::Convert],
    delete_field: "id",
    update_field: "id",
    action_field: "id",
    ..ResourceSchema::EMPTY
};

pub static SNAPSHOT: ResourceSchema = ResourceSchema {
    kind: "snapshot",
    endpoint: "snapshots",
    single_key: "snapshot",
    plural_key: "snapshots",
    fetch_fields: &["id"],
    static_fields: &[
        "name",
        "created_at",
        "regions",
        "resource_id",
        "resource_type",
        "min_disk_size",
        "size_gigabytes",
        "tags",
    ],
    delete_field: "id",
    ..ResourceSchema::EMPTY
};

pub static ONE_CLICK: ResourceSchema = ResourceSchema {
    kind: "one_click",
    endpoint: "1-clicks",
    single_key: "1_click",
    plural_key: "1_clicks",
    static_fields: &["slug", "type"],
    id_field: "slug",
    ..ResourceSchema::EMPTY
};

pub static SSH_KEY: ResourceSchema = ResourceSchema {
    kind: "ssh_key",
    endpoint: "account/keys",
    single_key: "ssh_key",
    plural_key: "ssh_keys",
    fetch_fields: &["id", "fingerprint"],
    dynamic_fields: &["public_key", "name"],
    delete_field: "id",
    update_field: "id",
    ..ResourceSchema::EMPTY
};

typed_resource!(
    /// A distribution, application or private image
    Image,
    top IMAGE
);

impl Image {
    async fn list_filtered(
        client: &Client,
        params: &ListParams,
        name: &str,
        value: &str,
    ) -> Result<Vec<Self>> {
        Self::list(client, &params.clone().param(name, value)).await
    }

    /// Public base distribution images
    pub async fn list_distributions(client: &Client, params: &ListParams) -> Result<Vec<Self>> {
        Self::list_filtered(client, params, "type", "distribution").await
    }

    /// 1-click application images
    pub async fn list_applications(client: &Client, params: &ListParams) -> Result<Vec<Self>> {
        Self::list_filtered(client, params, "type", "application").await
    }

    /// Private images of the account
    pub async fn list_private(client: &Client, params: &ListParams) -> Result<Vec<Self>> {
        Self::list_filtered(client, params, "private", "true").await
    }

    pub async fn list_by_tag(client: &Client, tag: &str, params: &ListParams) -> Result<Vec<Self>> {
        Ok(Resource::list_by_tag(client, &IMAGE, tag, params)
            .await?
            .into_iter()
            .map(Self)
            .collect())
    }

    /// Copy the image to another region
    pub async fn transfer(&mut self, region: impl Into<String>) -> Result<Action> {
        self.action(ActionKind::Transfer {
            region: region.into(),
        })
        .await
    }

    /// Turn a backup into a snapshot
    pub async fn convert(&mut self) -> Result<Action> {
        self.action(ActionKind::Convert).await
    }
}

typed_resource!(
    /// A droplet or volume snapshot
    Snapshot,
    top SNAPSHOT
);

impl Snapshot {
    pub async fn list_droplet_snapshots(client: &Client, params: &ListParams) -> Result<Vec<Self>> {
        Self::list(client, &params.clone().param("resource_type", "droplet")).await
    }

    pub async fn list_volume_snapshots(client: &Client, params: &ListParams) -> Result<Vec<Self>> {
        Self::list(client, &params.clone().param("resource_type", "volume")).await
    }
}

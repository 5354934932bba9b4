//! Projects and tags

use crate::client::Client;
use crate::error::{Error, Result};
use crate::resource::{ListParams, Resource};
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use serde_json::json;
use tracing::debug;

pub static PROJECT: ResourceSchema = ResourceSchema {
    kind: "project",
    endpoint: "projects",
    single_key: "project",
    plural_key: "projects",
    fetch_fields: &["id"],
    static_fields: &["owner_uuid", "owner_id", "created_at", "updated_at"],
    dynamic_fields: &["name", "description", "purpose", "environment", "is_default"],
    delete_field: "id",
    update_field: "id",
    ..ResourceSchema::EMPTY
};

pub static TAG: ResourceSchema = ResourceSchema {
    kind: "tag",
    endpoint: "tags",
    single_key: "tag",
    plural_key: "tags",
    fetch_fields: &["name"],
    static_fields: &["resources"],
    dynamic_fields: &["name"],
    id_field: "name",
    delete_field: "name",
    ..ResourceSchema::EMPTY
};

/// Purposes the API recognizes; anything else is stored as `Other: ...`
pub const PROJECT_PURPOSES: &[&str] = &[
    "Just trying out DigitalOcean",
    "Class project / Educational purposes",
    "Website or blog",
    "Web Application",
    "Service or API",
    "Mobile Application",
    "Machine learning / AI / Data processing",
    "IoT",
    "Operational / Developer tooling",
];

/// Environments a project may declare
pub const PROJECT_ENVIRONMENTS: &[&str] = &["Development", "Staging", "Production"];

typed_resource!(
    /// A group of resources
    Project,
    top PROJECT
);

impl Project {
    /// Load the account's default project
    pub async fn default_project(client: &Client) -> Result<Self> {
        let mut project = Self::lookup(client, "default");
        project.reload().await?;
        Ok(project)
    }

    /// Resources assigned to the project, as URN entries
    pub async fn resources(&self, params: &ListParams) -> Result<Vec<JsonValue>> {
        self.list_sub("resources", "resources", params).await
    }

    /// Move resources into the project by URN, e.g. `do:droplet:42`
    pub async fn assign(&self, urns: &[&str]) -> Result<JsonValue> {
        self.post_sub("resources", json!({ "resources": urns })).await
    }
}

typed_resource!(
    /// A label applied across resource types
    Tag,
    top TAG
);

/// `{"resources": [{"resource_type", "resource_id"}]}` for tag requests
///
/// A resource known only by another fetch field (an image by slug) is
/// loaded first so its id is known.
async fn tagged_body(resources: &[&Resource]) -> Result<JsonValue> {
    let mut entries = Vec::with_capacity(resources.len());
    for resource in resources {
        let mut id = resource.id();
        if id.is_null() {
            debug!(
                "Loading {} to resolve its id for tagging",
                resource.schema().kind
            );
            let mut loaded = (*resource).clone();
            loaded.reload().await?;
            id = loaded.id();
        }
        let id = match id {
            JsonValue::String(s) => s,
            JsonValue::Null => {
                return Err(Error::client_request(format!(
                    "Cannot tag '{}' without a value for '{}'",
                    resource.schema().kind,
                    resource.schema().id_field
                )))
            }
            other => other.to_string(),
        };
        entries.push(json!({ "resource_type": resource.schema().kind, "resource_id": id }));
    }
    Ok(json!({ "resources": entries }))
}

impl Tag {
    /// Apply the tag to resources
    pub async fn tag(&self, resources: &[&Resource]) -> Result<JsonValue> {
        self.post_sub("resources", tagged_body(resources).await?)
            .await
    }

    /// Remove the tag from resources
    pub async fn untag(&self, resources: &[&Resource]) -> Result<JsonValue> {
        self.delete_sub("resources", Some(tagged_body(resources).await?))
            .await
    }
}

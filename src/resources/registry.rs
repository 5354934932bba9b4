//! Container registry, repositories and repository tags
//!
//! An account has at most one registry, addressed at the bare `registry`
//! endpoint. Repositories and tags live under it by name.

use crate::client::Client;
use crate::error::{Error, Result, ResultExt};
use crate::materialize::Materializer;
use crate::resource::{ListParams, Resource};
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

pub static REGISTRY: ResourceSchema = ResourceSchema {
    kind: "registry",
    endpoint: "registry",
    single_key: "registry",
    plural_key: "registry",
    static_fields: &["created_at"],
    dynamic_fields: &["name"],
    id_field: "name",
    ..ResourceSchema::EMPTY
};

pub static REPOSITORY: ResourceSchema = ResourceSchema {
    kind: "repository",
    endpoint: "registry/{}/repositories",
    single_key: "repository",
    plural_key: "repositories",
    static_fields: &["registry_name", "tag_count", "latest_tag", "name"],
    dynamic_fields: &["name"],
    id_field: "name",
    parent_fields: &["registry_name"],
    materializers: &[("latest_tag", Materializer::Reference(&REPOSITORY_TAG))],
    ..ResourceSchema::EMPTY
};

pub static REPOSITORY_TAG: ResourceSchema = ResourceSchema {
    kind: "repository_tag",
    endpoint: "registry/{}/repositories/{}/tags",
    single_key: "tag",
    plural_key: "tags",
    static_fields: &[
        "registry_name",
        "repository",
        "tag",
        "manifest_digest",
        "compressed_size_bytes",
        "size_bytes",
        "updated_at",
    ],
    id_field: "tag",
    delete_field: "tag",
    parent_fields: &["registry_name", "repository"],
    ..ResourceSchema::EMPTY
};

/// Docker `config.json` auth entries for the registry
#[derive(Debug, Clone, PartialEq)]
pub struct DockerCredentials(pub JsonValue);

impl DockerCredentials {
    /// Merge the `auths` entries into a Docker config file, keeping the
    /// entries for other registries
    pub fn apply(&self, config_path: &Path) -> Result<()> {
        let mut config: JsonValue = if config_path.exists() {
            let text = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            serde_json::from_str(&text)?
        } else {
            json!({})
        };
        let auths = self
            .0
            .get("auths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::Other("Docker credentials carry no 'auths'".to_string()))?;

        let target = config
            .as_object_mut()
            .ok_or_else(|| {
                Error::config(format!("{} is not a JSON object", config_path.display()))
            })?
            .entry("auths")
            .or_insert_with(|| json!({}));
        let Some(target) = target.as_object_mut() else {
            return Err(Error::config(format!(
                "'auths' in {} is not a JSON object",
                config_path.display()
            )));
        };
        for (host, entry) in auths {
            debug!("Writing Docker credentials for {}", host);
            target.insert(host.clone(), entry.clone());
        }
        std::fs::write(config_path, serde_json::to_string_pretty(&config)?)?;
        Ok(())
    }
}

typed_resource!(
    /// The account's container registry
    Registry,
    nested REGISTRY
);

impl Registry {
    /// Load the registry, `None` when the account has none
    pub async fn load(client: &Client) -> Result<Option<Self>> {
        match Resource::singleton(client, &REGISTRY).await {
            Ok(registry) => Ok(Some(Self(registry))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create the account's registry
    pub async fn create_registry(
        client: &Client,
        name: &str,
        subscription_tier: Option<&str>,
    ) -> Result<Self> {
        let mut body = json!({ "name": name });
        if let Some(tier) = subscription_tier {
            body["subscription_tier_slug"] = json!(tier);
        }
        info!("Creating registry {}", name);
        let response = client.post(REGISTRY.endpoint, body).await?;
        let raw = response
            .get(REGISTRY.single_key)
            .cloned()
            .unwrap_or_default();
        Resource::from_json(client.clone(), &REGISTRY, raw).map(Self)
    }

    /// Delete the registry and everything in it
    pub async fn delete_registry(client: &Client) -> Result<JsonValue> {
        info!("Deleting registry");
        client.delete(REGISTRY.endpoint, None, Vec::new()).await
    }

    /// Credentials for `docker login`; `expiry_seconds` of 0 never expires
    pub async fn docker_credentials(
        client: &Client,
        read_write: bool,
        expiry_seconds: u64,
    ) -> Result<DockerCredentials> {
        let mut query = vec![("read_write".to_string(), read_write.to_string())];
        if expiry_seconds > 0 {
            query.push(("expiry_seconds".to_string(), expiry_seconds.to_string()));
        }
        let body = client
            .get(&format!("{}/docker-credentials", REGISTRY.endpoint), query)
            .await?;
        Ok(DockerCredentials(body))
    }

    /// Whether `name` is free to use as a registry name
    pub async fn validate_name(client: &Client, name: &str) -> Result<bool> {
        let path = format!("{}/validate-name", REGISTRY.endpoint);
        match client.post(&path, json!({ "name": name })).await {
            Ok(_) => Ok(true),
            Err(Error::ClientRequest { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Repositories of this registry
    pub async fn repositories(&self, params: &ListParams) -> Result<Vec<Repository>> {
        let name = self.required_segment("name", "list repositories of")?;
        Repository::list(self.client(), &name, params).await
    }
}

typed_resource!(
    /// An image repository in the registry
    Repository,
    nested REPOSITORY
);

impl Repository {
    pub async fn list(client: &Client, registry: &str, params: &ListParams) -> Result<Vec<Self>> {
        Ok(Resource::list_under(client, &REPOSITORY, &[registry], params)
            .await?
            .into_iter()
            .map(Self)
            .collect())
    }

    /// Tags of this repository
    pub async fn list_tags(&self, params: &ListParams) -> Result<Vec<RepositoryTag>> {
        let registry = self.required_segment("registry_name", "list tags of")?;
        let name = self.required_segment("name", "list tags of")?;
        Ok(
            Resource::list_under(self.client(), &REPOSITORY_TAG, &[&registry, &name], params)
                .await?
                .into_iter()
                .map(RepositoryTag)
                .collect(),
        )
    }
}

typed_resource!(
    /// One tagged image of a repository
    RepositoryTag,
    nested REPOSITORY_TAG
);

impl RepositoryTag {
    /// Delete the image by manifest digest, removing every tag that points
    /// at it
    pub async fn delete_by_digest(&self) -> Result<JsonValue> {
        let registry = self.required_segment("registry_name", "delete")?;
        let repository = self.required_segment("repository", "delete")?;
        let digest = self.required_segment("manifest_digest", "delete")?;
        let path = format!("registry/{registry}/repositories/{repository}/digests/{digest}");
        info!("Deleting manifest {}", digest);
        self.client().delete(&path, None, Vec::new()).await
    }
}

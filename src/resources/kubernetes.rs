//! Managed Kubernetes clusters and their node pools

use crate::client::Client;
use crate::error::Result;
use crate::materialize::{FieldMap, FieldValue, Materializer};
use crate::resource::{ListParams, Resource};
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use serde_json::json;

pub static KUBERNETES_CLUSTER: ResourceSchema = ResourceSchema {
    kind: "kubernetes_cluster",
    endpoint: "kubernetes/clusters",
    single_key: "kubernetes_cluster",
    plural_key: "kubernetes_clusters",
    fetch_fields: &["id"],
    static_fields: &[
        "endpoint",
        "ipv4",
        "cluster_subnet",
        "service_subnet",
        "created_at",
        "updated_at",
        "status",
    ],
    dynamic_fields: &[
        "name",
        "region",
        "version",
        "auto_upgrade",
        "surge_upgrade",
        "tags",
        "maintenance_policy",
        "node_pools",
        "vpc_uuid",
    ],
    delete_field: "id",
    update_field: "id",
    materializers: &[("node_pools", Materializer::NestedList(&NODE_POOL))],
    ..ResourceSchema::EMPTY
};

pub static NODE_POOL: ResourceSchema = ResourceSchema {
    kind: "node_pool",
    endpoint: "kubernetes/clusters/{}/node_pools",
    single_key: "node_pool",
    plural_key: "node_pools",
    fetch_fields: &["id"],
    static_fields: &["nodes"],
    dynamic_fields: &[
        "name",
        "size",
        "count",
        "tags",
        "labels",
        "taints",
        "auto_scale",
        "min_nodes",
        "max_nodes",
    ],
    delete_field: "id",
    update_field: "id",
    parent_fields: &["cluster_id"],
    ..ResourceSchema::EMPTY
};

typed_resource!(
    /// A managed Kubernetes cluster
    KubernetesCluster,
    top KUBERNETES_CLUSTER
);

impl KubernetesCluster {
    /// Block until `status.state` is `running`
    pub async fn wait_ready(&mut self) -> Result<()> {
        self.wait_until(|cluster| {
            cluster
                .peek("status")
                .and_then(FieldValue::as_json)
                .and_then(|s| s.get("state"))
                .and_then(JsonValue::as_str)
                == Some("running")
        })
        .await
    }

    /// Versions the cluster can be upgraded to
    pub async fn upgrades(&self) -> Result<Vec<JsonValue>> {
        let mut body = self.get_sub("upgrades", Vec::new()).await?;
        Ok(match body.get_mut("available_upgrade_versions").map(JsonValue::take) {
            Some(JsonValue::Array(versions)) => versions,
            _ => Vec::new(),
        })
    }

    pub async fn upgrade(&self, version: &str) -> Result<JsonValue> {
        self.post_sub("upgrade", json!({ "version": version })).await
    }

    /// Kubeconfig YAML; `expiry_seconds` of 0 uses the server default
    pub async fn kubeconfig(&self, expiry_seconds: u64) -> Result<String> {
        let path = self.sub_path("kubeconfig")?;
        let bytes = self
            .client()
            .get_bytes(&path, expiry_query(expiry_seconds))
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Short-lived API server credentials
    pub async fn credentials(&self, expiry_seconds: u64) -> Result<JsonValue> {
        self.get_sub("credentials", expiry_query(expiry_seconds))
            .await
    }

    /// Node pools, resolved under this cluster
    pub async fn node_pools(&self, params: &ListParams) -> Result<Vec<Resource>> {
        let id = self.required_segment("id", "list node pools of")?;
        Resource::list_under(self.client(), &NODE_POOL, &[&id], params).await
    }

    /// One node pool, loaded
    pub async fn node_pool(&self, pool_id: &str) -> Result<Resource> {
        let mut pool = self.pool_handle()?.with("id", pool_id);
        pool.reload().await?;
        Ok(pool)
    }

    /// Add a node pool; the payload needs at least `name`, `size` and `count`
    pub async fn add_node_pool(&self, payload: FieldMap) -> Result<Resource> {
        let mut pool = self.pool_handle()?;
        pool.create(payload).await?;
        Ok(pool)
    }

    pub async fn delete_node_pool(&self, pool_id: &str) -> Result<JsonValue> {
        self.pool_handle()?.with("id", pool_id).delete().await
    }

    /// Nodes of one pool
    pub async fn nodes(&self, pool_id: &str) -> Result<Vec<JsonValue>> {
        let mut pool = self.node_pool(pool_id).await?;
        Ok(pool
            .get("nodes")
            .await?
            .to_json()
            .as_array()
            .cloned()
            .unwrap_or_default())
    }

    /// Remove one node, optionally replacing it or skipping the drain
    pub async fn delete_node(
        &self,
        pool_id: &str,
        node_id: &str,
        replace: bool,
        skip_drain: bool,
    ) -> Result<JsonValue> {
        let path = self.sub_path(&format!("node_pools/{pool_id}/nodes/{node_id}"))?;
        let query = vec![
            ("replace".to_string(), u8::from(replace).to_string()),
            ("skip_drain".to_string(), u8::from(skip_drain).to_string()),
        ];
        self.client().delete(&path, None, query).await
    }

    /// Start a clusterlint run
    pub async fn run_clusterlint(&self) -> Result<JsonValue> {
        self.post_sub("clusterlint", json!({})).await
    }

    /// Diagnostics of a clusterlint run, the latest when `run_id` is `None`
    pub async fn clusterlint(&self, run_id: Option<&str>) -> Result<JsonValue> {
        let query = run_id
            .map(|id| vec![("run_id".to_string(), id.to_string())])
            .unwrap_or_default();
        self.get_sub("clusterlint", query).await
    }

    /// Versions, regions and sizes available for clusters
    pub async fn options(client: &Client) -> Result<JsonValue> {
        client.get("kubernetes/options", Vec::new()).await
    }

    fn pool_handle(&self) -> Result<Resource> {
        let id = self.required_segment("id", "address node pools of")?;
        Resource::with_parents(self.client().clone(), &NODE_POOL, &[&id])
    }
}

fn expiry_query(expiry_seconds: u64) -> Vec<(String, String)> {
    if expiry_seconds == 0 {
        Vec::new()
    } else {
        vec![("expiry_seconds".to_string(), expiry_seconds.to_string())]
    }
}

//! Load balancers

use super::droplet::Droplet;
use crate::error::Result;
use crate::materialize::{FieldMap, FieldValue, ForwardingRule};
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use serde_json::json;

pub static LOAD_BALANCER: ResourceSchema = ResourceSchema {
    kind: "load_balancer",
    endpoint: "load_balancers",
    single_key: "load_balancer",
    plural_key: "load_balancers",
    fetch_fields: &["id"],
    static_fields: &["ip", "status", "created_at"],
    dynamic_fields: &[
        "name",
        "region",
        "algorithm",
        "forwarding_rules",
        "health_check",
        "sticky_sessions",
        "redirect_http_to_https",
        "enable_proxy_protocol",
        "droplet_ids",
        "tag",
    ],
    delete_field: "id",
    update_field: "id",
    action_field: "id",
    ..ResourceSchema::EMPTY
};

typed_resource!(
    /// A regional load balancer
    LoadBalancer,
    top LOAD_BALANCER
);

fn forwarding_body(rules: &[ForwardingRule]) -> JsonValue {
    json!({
        "forwarding_rules": rules.iter().map(ForwardingRule::to_json).collect::<Vec<_>>()
    })
}

impl LoadBalancer {
    /// Create the load balancer; without forwarding rules it forwards HTTP
    /// port 80 to port 80
    pub async fn create_with_defaults(&mut self, mut payload: FieldMap) -> Result<JsonValue> {
        payload
            .entry("forwarding_rules".to_string())
            .or_insert_with(|| FieldValue::from(vec![ForwardingRule::default()]));
        self.create(payload).await
    }

    pub async fn add_droplets(&self, ids: &[u64]) -> Result<JsonValue> {
        self.post_sub("droplets", json!({ "droplet_ids": ids })).await
    }

    pub async fn remove_droplets(&self, ids: &[u64]) -> Result<JsonValue> {
        self.delete_sub("droplets", Some(json!({ "droplet_ids": ids })))
            .await
    }

    pub async fn add_forwarding_rules(&self, rules: &[ForwardingRule]) -> Result<JsonValue> {
        self.post_sub("forwarding_rules", forwarding_body(rules)).await
    }

    pub async fn remove_forwarding_rules(&self, rules: &[ForwardingRule]) -> Result<JsonValue> {
        self.delete_sub("forwarding_rules", Some(forwarding_body(rules)))
            .await
    }

    /// Typed forwarding rules, loading the balancer if needed
    pub async fn forwarding_rules(&mut self) -> Result<Vec<ForwardingRule>> {
        let rules = self.get("forwarding_rules").await?;
        Ok(rules
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(|v| match v {
                FieldValue::ForwardingRule(rule) => Some(rule.clone()),
                _ => None,
            })
            .collect())
    }

    /// Unfetched droplets behind the balancer
    pub async fn droplets(&mut self) -> Result<Vec<Droplet>> {
        let client = self.client().clone();
        let ids = self
            .get("droplet_ids")
            .await?
            .to_json()
            .as_array()
            .cloned()
            .unwrap_or_default();
        Ok(ids
            .into_iter()
            .map(|id| Droplet::lookup(&client, id))
            .collect())
    }
}

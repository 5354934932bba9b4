//! Cloud firewalls

use super::droplet::Droplet;
use crate::error::Result;
use crate::materialize::{FieldMap, FieldValue, InboundRule, Location, OutboundRule};
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use serde_json::json;

pub static FIREWALL: ResourceSchema = ResourceSchema {
    kind: "firewall",
    endpoint: "firewalls",
    single_key: "firewall",
    plural_key: "firewalls",
    fetch_fields: &["id"],
    static_fields: &["status", "created_at", "pending_changes"],
    dynamic_fields: &["inbound_rules", "outbound_rules", "name", "droplet_ids", "tags"],
    delete_field: "id",
    update_field: "id",
    ..ResourceSchema::EMPTY
};

typed_resource!(
    /// A cloud firewall
    Firewall,
    top FIREWALL
);

/// Outbound rules applied when a firewall is created without any rules:
/// icmp, udp and tcp to every address
pub fn default_outbound_rules() -> Result<Vec<OutboundRule>> {
    let everywhere = Location::anywhere();
    Ok(vec![
        OutboundRule::new("icmp", "", everywhere.clone())?,
        OutboundRule::new("udp", "all", everywhere.clone())?,
        OutboundRule::new("tcp", "all", everywhere)?,
    ])
}

fn rules_body(inbound: &[InboundRule], outbound: &[OutboundRule]) -> JsonValue {
    json!({
        "inbound_rules": inbound.iter().map(InboundRule::to_json).collect::<Vec<_>>(),
        "outbound_rules": outbound.iter().map(OutboundRule::to_json).collect::<Vec<_>>(),
    })
}

impl Firewall {
    /// Create the firewall; with no rules at all it allows all outbound
    /// traffic
    pub async fn create_with_rules(
        &mut self,
        name: impl Into<String>,
        inbound: Vec<InboundRule>,
        outbound: Vec<OutboundRule>,
    ) -> Result<JsonValue> {
        let outbound = if inbound.is_empty() && outbound.is_empty() {
            default_outbound_rules()?
        } else {
            outbound
        };
        let mut payload = FieldMap::new();
        payload.insert("name".to_string(), FieldValue::from(name.into()));
        payload.insert("inbound_rules".to_string(), FieldValue::from(inbound));
        payload.insert("outbound_rules".to_string(), FieldValue::from(outbound));
        self.create(payload).await
    }

    pub async fn add_droplets(&self, ids: &[u64]) -> Result<JsonValue> {
        self.post_sub("droplets", json!({ "droplet_ids": ids })).await
    }

    pub async fn remove_droplets(&self, ids: &[u64]) -> Result<JsonValue> {
        self.delete_sub("droplets", Some(json!({ "droplet_ids": ids })))
            .await
    }

    pub async fn add_tags(&self, tags: &[&str]) -> Result<JsonValue> {
        self.post_sub("tags", json!({ "tags": tags })).await
    }

    pub async fn remove_tags(&self, tags: &[&str]) -> Result<JsonValue> {
        self.delete_sub("tags", Some(json!({ "tags": tags }))).await
    }

    pub async fn add_rules(
        &self,
        inbound: &[InboundRule],
        outbound: &[OutboundRule],
    ) -> Result<JsonValue> {
        self.post_sub("rules", rules_body(inbound, outbound)).await
    }

    pub async fn remove_rules(
        &self,
        inbound: &[InboundRule],
        outbound: &[OutboundRule],
    ) -> Result<JsonValue> {
        self.delete_sub("rules", Some(rules_body(inbound, outbound)))
            .await
    }

    /// Unfetched droplets the firewall applies to
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

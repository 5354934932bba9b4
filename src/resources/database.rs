//! Managed database clusters
//!
//! Engine-specific endpoints check the cluster's engine before any request:
//! redis has no users, databases, backups or replicas; pools are PostgreSQL
//! only; SQL mode and auth plugin resets are MySQL only; eviction policy is
//! redis only.

use crate::error::{Error, Result};
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub static DATABASE: ResourceSchema = ResourceSchema {
    kind: "database",
    endpoint: "databases",
    single_key: "database",
    plural_key: "databases",
    fetch_fields: &["id"],
    static_fields: &[
        "connection",
        "private_connection",
        "users",
        "db_names",
        "status",
        "maintenance_window",
        "created_at",
    ],
    dynamic_fields: &[
        "name",
        "engine",
        "version",
        "size",
        "region",
        "num_nodes",
        "tags",
        "private_network_uuid",
    ],
    delete_field: "id",
    update_field: "id",
    ..ResourceSchema::EMPTY
};

/// Source types a database firewall rule may name
pub const DATABASE_FIREWALL_TYPES: &[&str] = &["ip_addr", "droplet", "k8s", "tag"];

/// MySQL authentication plugins
const AUTH_PLUGINS: &[&str] = &["caching_sha2_password", "mysql_native_password"];

/// One trusted source of a database cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseFirewallRule {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl DatabaseFirewallRule {
    /// Create a rule; `kind` must be one of [`DATABASE_FIREWALL_TYPES`]
    pub fn new(kind: &str, value: impl Into<String>) -> Result<Self> {
        if !DATABASE_FIREWALL_TYPES.contains(&kind) {
            return Err(Error::invalid_rule(
                "Supported types are 'ip_addr', 'droplet', 'k8s', 'tag'",
            ));
        }
        Ok(Self {
            kind: kind.to_string(),
            value: value.into(),
        })
    }
}

/// Connection pool of a PostgreSQL cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPool {
    pub name: String,
    /// `transaction`, `session` or `statement`
    pub mode: String,
    pub size: u32,
    pub db: String,
    pub user: String,
    #[serde(default, skip_serializing)]
    pub connection: Option<JsonValue>,
}

typed_resource!(
    /// A managed database cluster
    Database,
    top DATABASE
);

impl Database {
    /// Engine slug (`pg`, `mysql`, `redis`), loading the cluster if needed
    pub async fn engine(&mut self) -> Result<String> {
        Ok(self
            .get("engine")
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn require_engine(&mut self, allowed: &[&str], what: &str) -> Result<()> {
        let engine = self.engine().await?;
        if allowed.contains(&engine.as_str()) {
            Ok(())
        } else {
            Err(Error::client_request(format!(
                "{what} is not supported for '{engine}' clusters"
            )))
        }
    }

    async fn reject_redis(&mut self, what: &str) -> Result<()> {
        self.require_engine(&["pg", "mysql"], what).await
    }

    /// Block until the cluster is `online`
    pub async fn wait_ready(&mut self) -> Result<()> {
        if self.get("status").await?.as_str() == Some("online") {
            return Ok(());
        }
        self.wait_for("status", &["online"]).await
    }

    pub async fn resize(&self, size: &str, num_nodes: u32) -> Result<JsonValue> {
        self.put_sub("resize", json!({ "size": size, "num_nodes": num_nodes }))
            .await
    }

    pub async fn migrate(&self, region: &str) -> Result<JsonValue> {
        self.put_sub("migrate", json!({ "region": region })).await
    }

    /// Maintenance window, e.g. `("friday", "23:55")`
    pub async fn set_maintenance_window(&self, day: &str, hour: &str) -> Result<JsonValue> {
        self.put_sub("maintenance", json!({ "day": day, "hour": hour }))
            .await
    }

    /// Replace the trusted sources
    pub async fn update_firewall(&self, rules: &[DatabaseFirewallRule]) -> Result<JsonValue> {
        self.put_sub("firewall", json!({ "rules": rules })).await
    }

    pub async fn list_firewall(&self) -> Result<Vec<DatabaseFirewallRule>> {
        let mut body = self.get_sub("firewall", Vec::new()).await?;
        let rules = body.get_mut("rules").map(JsonValue::take).unwrap_or_default();
        if rules.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(rules)?)
    }

    pub async fn list_backups(&mut self) -> Result<Vec<JsonValue>> {
        self.reject_redis("Listing backups").await?;
        items(self.get_sub("backups", Vec::new()).await?, "backups")
    }

    // ========================================================================
    // Replicas
    // ========================================================================

    /// Create a read-only replica; region and size default to the cluster's
    pub async fn create_replica(
        &mut self,
        name: &str,
        size: Option<&str>,
        region: Option<&str>,
        tags: &[&str],
    ) -> Result<JsonValue> {
        self.reject_redis("Replica management").await?;
        let mut body = json!({ "name": name, "tags": tags });
        if let Some(size) = size {
            body["size"] = json!(size);
        }
        if let Some(region) = region {
            body["region"] = json!(region);
        }
        self.post_sub("replicas", body).await
    }

    pub async fn get_replica(&mut self, name: &str) -> Result<JsonValue> {
        self.reject_redis("Replica management").await?;
        let mut body = self.get_sub(&format!("replicas/{name}"), Vec::new()).await?;
        Ok(body.get_mut("replica").map(JsonValue::take).unwrap_or_default())
    }

    pub async fn list_replicas(&mut self) -> Result<Vec<JsonValue>> {
        self.reject_redis("Replica management").await?;
        items(self.get_sub("replicas", Vec::new()).await?, "replicas")
    }

    pub async fn delete_replica(&mut self, name: &str) -> Result<JsonValue> {
        self.reject_redis("Replica management").await?;
        self.delete_sub(&format!("replicas/{name}"), None).await
    }

    // ========================================================================
    // Users and databases
    // ========================================================================

    /// Add a user; `auth_plugin` only applies to MySQL clusters
    pub async fn add_user(&mut self, name: &str, auth_plugin: Option<&str>) -> Result<JsonValue> {
        self.reject_redis("User management").await?;
        let mut body = json!({ "name": name });
        if let Some(plugin) = auth_plugin {
            check_auth_plugin(plugin)?;
            body["mysql_settings"] = json!({ "auth_plugin": plugin });
        }
        self.post_sub("users", body).await
    }

    pub async fn get_user(&mut self, name: &str) -> Result<JsonValue> {
        self.reject_redis("User management").await?;
        let mut body = self.get_sub(&format!("users/{name}"), Vec::new()).await?;
        Ok(body.get_mut("user").map(JsonValue::take).unwrap_or_default())
    }

    pub async fn list_users(&mut self) -> Result<Vec<JsonValue>> {
        self.reject_redis("User management").await?;
        items(self.get_sub("users", Vec::new()).await?, "users")
    }

    pub async fn delete_user(&mut self, name: &str) -> Result<JsonValue> {
        self.reject_redis("User management").await?;
        self.delete_sub(&format!("users/{name}"), None).await
    }

    /// Switch a MySQL user's authentication plugin
    pub async fn reset_auth(&mut self, name: &str, auth_plugin: &str) -> Result<JsonValue> {
        self.require_engine(&["mysql"], "Resetting auth").await?;
        check_auth_plugin(auth_plugin)?;
        self.post_sub(
            &format!("users/{name}/reset_auth"),
            json!({ "mysql_settings": { "auth_plugin": auth_plugin } }),
        )
        .await
    }

    pub async fn add_db(&mut self, name: &str) -> Result<JsonValue> {
        self.reject_redis("Database management").await?;
        self.post_sub("dbs", json!({ "name": name })).await
    }

    pub async fn list_dbs(&mut self) -> Result<Vec<JsonValue>> {
        self.reject_redis("Database management").await?;
        items(self.get_sub("dbs", Vec::new()).await?, "dbs")
    }

    pub async fn delete_db(&mut self, name: &str) -> Result<JsonValue> {
        self.reject_redis("Database management").await?;
        self.delete_sub(&format!("dbs/{name}"), None).await
    }

    // ========================================================================
    // Engine settings
    // ========================================================================

    pub async fn add_pool(&mut self, pool: &ConnectionPool) -> Result<ConnectionPool> {
        self.require_engine(&["pg"], "Connection pooling").await?;
        let mut body = self.post_sub("pools", serde_json::to_value(pool)?).await?;
        let raw = body.get_mut("pool").map(JsonValue::take).unwrap_or_default();
        Ok(serde_json::from_value(raw)?)
    }

    pub async fn list_pools(&mut self) -> Result<Vec<ConnectionPool>> {
        self.require_engine(&["pg"], "Connection pooling").await?;
        items(self.get_sub("pools", Vec::new()).await?, "pools")?
            .into_iter()
            .map(|raw| serde_json::from_value(raw).map_err(Error::from))
            .collect()
    }

    pub async fn delete_pool(&mut self, name: &str) -> Result<JsonValue> {
        self.require_engine(&["pg"], "Connection pooling").await?;
        self.delete_sub(&format!("pools/{name}"), None).await
    }

    pub async fn eviction_policy(&mut self) -> Result<Option<String>> {
        self.require_engine(&["redis"], "Eviction policy").await?;
        let body = self.get_sub("eviction_policy", Vec::new()).await?;
        Ok(string_field(&body, "eviction_policy"))
    }

    pub async fn set_eviction_policy(&mut self, policy: &str) -> Result<JsonValue> {
        self.require_engine(&["redis"], "Eviction policy").await?;
        self.put_sub("eviction_policy", json!({ "eviction_policy": policy }))
            .await
    }

    pub async fn sql_mode(&mut self) -> Result<Option<String>> {
        self.require_engine(&["mysql"], "SQL mode").await?;
        let body = self.get_sub("sql_mode", Vec::new()).await?;
        Ok(string_field(&body, "sql_mode"))
    }

    pub async fn set_sql_mode(&mut self, mode: &str) -> Result<JsonValue> {
        self.require_engine(&["mysql"], "SQL mode").await?;
        self.put_sub("sql_mode", json!({ "sql_mode": mode })).await
    }
}

fn check_auth_plugin(plugin: &str) -> Result<()> {
    if AUTH_PLUGINS.contains(&plugin) {
        Ok(())
    } else {
        Err(Error::client_request(
            "Only 'caching_sha2_password' and 'mysql_native_password' authentication plugins are supported",
        ))
    }
}

fn items(mut body: JsonValue, key: &str) -> Result<Vec<JsonValue>> {
    match body.get_mut(key).map(JsonValue::take) {
        Some(JsonValue::Array(items)) => Ok(items),
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(other) => Err(Error::Other(format!(
            "Expected an array under '{key}', got {other}"
        ))),
    }
}

fn string_field(body: &JsonValue, key: &str) -> Option<String> {
    body.get(key).and_then(JsonValue::as_str).map(str::to_string)
}

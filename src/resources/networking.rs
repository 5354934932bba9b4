//! Networking resources: floating IPs, VPCs, CDN endpoints and
//! certificates

use crate::action::Action;
use crate::error::{Error, Result};
use crate::materialize::{FieldMap, FieldValue};
use crate::resource::ListParams;
use crate::schema::{ActionKind, ActionType, ResourceSchema};
use crate::types::JsonValue;
use serde_json::json;

pub static FLOATING_IP: ResourceSchema = ResourceSchema {
    kind: "floating_ip",
    endpoint: "floating_ips",
    single_key: "floating_ip",
    plural_key: "floating_ips",
    fetch_fields: &["ip"],
    dynamic_fields: &["region", "droplet"],
    actions: &[ActionType::Assign, ActionType::Unassign],
    id_field: "ip",
    delete_field: "ip",
    action_field: "ip",
    ..ResourceSchema::EMPTY
};

pub static VPC: ResourceSchema = ResourceSchema {
    kind: "vpc",
    endpoint: "vpcs",
    single_key: "vpc",
    plural_key: "vpcs",
    fetch_fields: &["id"],
    static_fields: &["urn", "default", "created_at"],
    dynamic_fields: &["name", "region", "ip_range", "description"],
    delete_field: "id",
    update_field: "id",
    action_field: "id",
    ..ResourceSchema::EMPTY
};

pub static CDN_ENDPOINT: ResourceSchema = ResourceSchema {
    kind: "cdn_endpoint",
    endpoint: "cdn/endpoints",
    single_key: "endpoint",
    plural_key: "endpoints",
    fetch_fields: &["id"],
    static_fields: &["endpoint", "created_at"],
    dynamic_fields: &["origin", "ttl", "certificate_id", "custom_domain"],
    delete_field: "id",
    update_field: "id",
    action_field: "id",
    ..ResourceSchema::EMPTY
};

pub static CERTIFICATE: ResourceSchema = ResourceSchema {
    kind: "certificate",
    endpoint: "certificates",
    single_key: "certificate",
    plural_key: "certificates",
    fetch_fields: &["id"],
    static_fields: &["not_after", "created_at", "sha1_fingerprint", "state"],
    dynamic_fields: &["name", "type", "dns_names"],
    delete_field: "id",
    update_field: "id",
    ..ResourceSchema::EMPTY
};

typed_resource!(
    /// A reserved public address that can move between droplets
    FloatingIp,
    top FLOATING_IP
);

impl FloatingIp {
    pub async fn assign(&mut self, droplet_id: u64) -> Result<Action> {
        self.action(ActionKind::Assign { droplet_id }).await
    }

    pub async fn unassign(&mut self) -> Result<Action> {
        self.action(ActionKind::Unassign).await
    }
}

typed_resource!(
    /// A private network
    Vpc,
    top VPC
);

impl Vpc {
    /// Resources attached to the network
    pub async fn members(&self, params: &ListParams) -> Result<Vec<JsonValue>> {
        self.list_sub("members", "members", params).await
    }
}

typed_resource!(
    /// A CDN endpoint in front of a Spaces origin
    CdnEndpoint,
    top CDN_ENDPOINT
);

impl CdnEndpoint {
    /// Purge cached files; `"*"` purges everything
    pub async fn purge_cache(&self, files: &[&str]) -> Result<JsonValue> {
        self.delete_sub("cache", Some(json!({ "files": files }))).await
    }
}

/// How a certificate is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateSource {
    /// Issued by Let's Encrypt for domains managed by the DNS service
    LetsEncrypt { dns_names: Vec<String> },
    /// Uploaded PEM material
    Custom {
        private_key: String,
        leaf_certificate: String,
        certificate_chain: String,
    },
}

typed_resource!(
    /// A TLS certificate
    Certificate,
    top CERTIFICATE
);

impl Certificate {
    /// Create a certificate; Let's Encrypt needs at least one DNS name
    pub async fn create_certificate(
        &mut self,
        name: impl Into<String>,
        source: CertificateSource,
    ) -> Result<JsonValue> {
        let mut payload = FieldMap::new();
        payload.insert("name".to_string(), FieldValue::from(name.into()));
        match source {
            CertificateSource::LetsEncrypt { dns_names } => {
                if dns_names.is_empty() {
                    return Err(Error::client_request(
                        "A Let's Encrypt certificate needs at least one DNS name",
                    ));
                }
                payload.insert("type".to_string(), FieldValue::from("lets_encrypt"));
                payload.insert("dns_names".to_string(), FieldValue::from(dns_names));
            }
            CertificateSource::Custom {
                private_key,
                leaf_certificate,
                certificate_chain,
            } => {
                payload.insert("type".to_string(), FieldValue::from("custom"));
                payload.insert("private_key".to_string(), FieldValue::from(private_key));
                payload.insert(
                    "leaf_certificate".to_string(),
                    FieldValue::from(leaf_certificate),
                );
                payload.insert(
                    "certificate_chain".to_string(),
                    FieldValue::from(certificate_chain),
                );
            }
        }
        self.create(payload).await
    }
}

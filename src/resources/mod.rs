//! Resource table
//!
//! Every resource type the crate talks to, described as a static
//! [`ResourceSchema`], plus typed wrappers for the types that expose more
//! than plain CRUD.
//!
//! Wrappers deref to [`Resource`](crate::resource::Resource), so lazy reads, `save`, `delete` and
//! `action` work on them directly.

use crate::schema::ResourceSchema;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Typed newtype over [`Resource`](crate::resource::Resource) for one schema
///
/// The `top` form adds constructors for schemas with a plain endpoint; the
/// `nested` form leaves construction to the wrapper, since the endpoint
/// needs parent values.
macro_rules! typed_resource {
    ($(#[$meta:meta])* $name:ident, nested $schema:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name($crate::resource::Resource);

        impl $name {
            /// Unwrap into the generic resource
            pub fn into_inner(self) -> $crate::resource::Resource {
                self.0
            }
        }

        impl From<$crate::resource::Resource> for $name {
            fn from(resource: $crate::resource::Resource) -> Self {
                Self(resource)
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::resource::Resource;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<&$name> for $crate::materialize::FieldValue {
            fn from(value: &$name) -> Self {
                $crate::materialize::FieldValue::from(&value.0)
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, top $schema:path) => {
        typed_resource!($(#[$meta])* $name, nested $schema);

        impl $name {
            /// Unfetched instance with every field unset
            pub fn new(client: &$crate::client::Client) -> Self {
                Self($crate::resource::Resource::new(client.clone(), &$schema))
            }

            /// Unfetched instance keyed by the first fetch field; the first
            /// read loads it
            pub fn lookup(
                client: &$crate::client::Client,
                value: impl Into<$crate::materialize::FieldValue>,
            ) -> Self {
                let mut resource = $crate::resource::Resource::new(client.clone(), &$schema);
                if let Some(field) = $schema.fetch_fields.first() {
                    resource.set(field, value);
                }
                Self(resource)
            }

            /// One page of the collection
            pub async fn list(
                client: &$crate::client::Client,
                params: &$crate::resource::ListParams,
            ) -> $crate::error::Result<Vec<Self>> {
                Ok($crate::resource::Resource::list(client, &$schema, params)
                    .await?
                    .into_iter()
                    .map(Self)
                    .collect())
            }
        }
    };
}

mod billing;
mod catalog;
mod database;
mod domain;
mod droplet;
mod firewall;
mod kubernetes;
mod load_balancer;
mod networking;
mod project;
mod registry;
mod storage;

pub use billing::{
    account, balance, Invoice, ACCOUNT, BALANCE, BILLING_HISTORY, INVOICE, INVOICE_ITEM,
    INVOICE_SUMMARY,
};
pub use catalog::{
    Image, Snapshot, ACTION, IMAGE, ONE_CLICK, REGION, SIZE, SNAPSHOT, SSH_KEY,
};
pub use database::{
    ConnectionPool, Database, DatabaseFirewallRule, DATABASE, DATABASE_FIREWALL_TYPES,
};
pub use domain::{Domain, DomainRecord, RecordType, DOMAIN, DOMAIN_RECORD};
pub use droplet::{neighbor_ids, Droplet, DROPLET};
pub use firewall::{default_outbound_rules, Firewall, FIREWALL};
pub use kubernetes::{KubernetesCluster, KUBERNETES_CLUSTER, NODE_POOL};
pub use load_balancer::{LoadBalancer, LOAD_BALANCER};
pub use networking::{
    CdnEndpoint, Certificate, CertificateSource, FloatingIp, Vpc, CDN_ENDPOINT, CERTIFICATE,
    FLOATING_IP, VPC,
};
pub use project::{Project, Tag, PROJECT, PROJECT_ENVIRONMENTS, PROJECT_PURPOSES, TAG};
pub use registry::{
    DockerCredentials, Registry, Repository, RepositoryTag, REGISTRY, REPOSITORY, REPOSITORY_TAG,
};
pub use storage::{Volume, VOLUME};

/// Every known schema, in display order
pub static ALL: &[&ResourceSchema] = &[
    &ACCOUNT,
    &ACTION,
    &BALANCE,
    &BILLING_HISTORY,
    &CDN_ENDPOINT,
    &CERTIFICATE,
    &DATABASE,
    &DOMAIN,
    &DOMAIN_RECORD,
    &DROPLET,
    &FIREWALL,
    &FLOATING_IP,
    &IMAGE,
    &INVOICE,
    &INVOICE_ITEM,
    &INVOICE_SUMMARY,
    &KUBERNETES_CLUSTER,
    &LOAD_BALANCER,
    &NODE_POOL,
    &ONE_CLICK,
    &PROJECT,
    &REGION,
    &REGISTRY,
    &REPOSITORY,
    &REPOSITORY_TAG,
    &SIZE,
    &SNAPSHOT,
    &SSH_KEY,
    &TAG,
    &VOLUME,
    &VPC,
];

/// Schemas by kind, with the plural keys of top-level schemas as aliases
pub static BUILTIN_RESOURCES: LazyLock<HashMap<&'static str, &'static ResourceSchema>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();
        for schema in ALL {
            m.insert(schema.kind, *schema);
        }
        for schema in ALL {
            if !schema.plural_key.is_empty() && !schema.endpoint.contains("{}") {
                m.entry(schema.plural_key).or_insert(*schema);
            }
        }
        m
    });

/// Look up a schema by kind or plural name
pub fn by_kind(name: &str) -> Option<&'static ResourceSchema> {
    BUILTIN_RESOURCES.get(name).copied()
}

/// Kinds of every known schema
pub fn list_kinds() -> Vec<&'static str> {
    ALL.iter().map(|s| s.kind).collect()
}

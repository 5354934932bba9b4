//! DNS domains and records

use crate::client::Client;
use crate::error::{Error, Result};
use crate::materialize::{FieldMap, FieldValue};
use crate::resource::{ListParams, Resource};
use crate::schema::ResourceSchema;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub static DOMAIN: ResourceSchema = ResourceSchema {
    kind: "domain",
    endpoint: "domains",
    single_key: "domain",
    plural_key: "domains",
    fetch_fields: &["name"],
    static_fields: &["zone_file"],
    dynamic_fields: &["ttl"],
    id_field: "name",
    delete_field: "name",
    update_field: "name",
    ..ResourceSchema::EMPTY
};

pub static DOMAIN_RECORD: ResourceSchema = ResourceSchema {
    kind: "domain_record",
    endpoint: "domains/{}/records",
    single_key: "domain_record",
    plural_key: "domain_records",
    fetch_fields: &["id"],
    dynamic_fields: &[
        "type", "name", "data", "priority", "port", "ttl", "weight", "flags", "tag",
    ],
    delete_field: "id",
    update_field: "id",
    ..ResourceSchema::EMPTY
};

/// Supported DNS record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Mx,
    Txt,
    Srv,
    Soa,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Soa => "SOA",
        }
    }

    /// Fields a create request must carry for this type
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            RecordType::A | RecordType::Aaaa | RecordType::Cname | RecordType::Txt => {
                &["name", "data"]
            }
            RecordType::Caa => &["name", "data", "flags", "tag"],
            RecordType::Mx => &["data", "priority"],
            RecordType::Srv => &["name", "data", "priority", "port", "weight"],
            RecordType::Soa => &["ttl"],
        }
    }

    /// Check that every required field is present and non-null
    pub fn validate(self, fields: &FieldMap) -> Result<()> {
        let missing = self
            .required_fields()
            .iter()
            .any(|f| fields.get(*f).is_none_or(FieldValue::is_null));
        if missing {
            return Err(Error::client_request(format!(
                "For {self} records you need {:?}",
                self.required_fields()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CAA" => Ok(RecordType::Caa),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "TXT" => Ok(RecordType::Txt),
            "SRV" => Ok(RecordType::Srv),
            "SOA" => Ok(RecordType::Soa),
            other => Err(Error::client_request(format!(
                "{other} record is not supported"
            ))),
        }
    }
}

typed_resource!(
    /// A domain managed by the DNS service
    Domain,
    top DOMAIN
);

impl Domain {
    /// Register a domain; an IP address also creates an apex A record
    pub async fn create_domain(
        &mut self,
        name: impl Into<String>,
        ip_address: Option<String>,
    ) -> Result<JsonValue> {
        let mut payload = FieldMap::new();
        payload.insert("name".to_string(), FieldValue::from(name.into()));
        if let Some(ip) = ip_address {
            payload.insert("ip_address".to_string(), FieldValue::from(ip));
        }
        self.create(payload).await
    }

    /// One page of the domain's records
    pub async fn records(&self, params: &ListParams) -> Result<Vec<DomainRecord>> {
        let name = self.required_segment("name", "list records of")?;
        DomainRecord::list(self.client(), &name, params).await
    }
}

typed_resource!(
    /// One DNS record of a domain
    DomainRecord,
    nested DOMAIN_RECORD
);

impl DomainRecord {
    /// Unfetched record under a domain
    pub fn new(client: &Client, domain: &str) -> Result<Self> {
        Resource::with_parents(client.clone(), &DOMAIN_RECORD, &[domain]).map(Self)
    }

    /// Unfetched record keyed by id
    pub fn lookup(client: &Client, domain: &str, id: impl Into<FieldValue>) -> Result<Self> {
        Ok(Self::new(client, domain)?.0.with("id", id).into())
    }

    pub async fn list(client: &Client, domain: &str, params: &ListParams) -> Result<Vec<Self>> {
        Ok(Resource::list_under(client, &DOMAIN_RECORD, &[domain], params)
            .await?
            .into_iter()
            .map(Self)
            .collect())
    }

    /// Create a record after checking the fields its type requires
    pub async fn create_record(&mut self, kind: RecordType, mut fields: FieldMap) -> Result<JsonValue> {
        kind.validate(&fields)?;
        fields.insert("type".to_string(), FieldValue::from(kind.as_str()));
        self.create(fields).await
    }
}

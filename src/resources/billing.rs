//! Account and billing resources

use crate::client::Client;
use crate::error::Result;
use crate::resource::{ListParams, Resource};
use crate::schema::ResourceSchema;
use bytes::Bytes;

pub static ACCOUNT: ResourceSchema = ResourceSchema {
    kind: "account",
    endpoint: "account",
    single_key: "account",
    plural_key: "accounts",
    static_fields: &[
        "droplet_limit",
        "floating_ip_limit",
        "email",
        "uuid",
        "email_verified",
        "status",
        "status_message",
    ],
    id_field: "uuid",
    ..ResourceSchema::EMPTY
};

/// Balance fields sit at the top level of the response body
pub static BALANCE: ResourceSchema = ResourceSchema {
    kind: "balance",
    endpoint: "customers/my/balance",
    static_fields: &[
        "month_to_date_balance",
        "account_balance",
        "month_to_date_usage",
        "generated_at",
    ],
    id_field: "month_to_date_balance",
    ..ResourceSchema::EMPTY
};

pub static BILLING_HISTORY: ResourceSchema = ResourceSchema {
    kind: "billing_history",
    endpoint: "customers/my/billing_history",
    single_key: "billing_history",
    plural_key: "billing_history",
    static_fields: &[
        "description",
        "amount",
        "invoice_id",
        "invoice_uuid",
        "date",
        "type",
    ],
    id_field: "invoice_id",
    ..ResourceSchema::EMPTY
};

pub static INVOICE: ResourceSchema = ResourceSchema {
    kind: "invoice",
    endpoint: "customers/my/invoices",
    single_key: "invoice",
    plural_key: "invoices",
    fetch_fields: &["invoice_uuid"],
    static_fields: &["amount", "invoice_period", "updated_at"],
    id_field: "invoice_uuid",
    ..ResourceSchema::EMPTY
};

pub static INVOICE_ITEM: ResourceSchema = ResourceSchema {
    kind: "invoice_item",
    endpoint: "customers/my/invoices/{}",
    single_key: "invoice_item",
    plural_key: "invoice_items",
    static_fields: &[
        "product",
        "resource_uuid",
        "resource_id",
        "group_description",
        "description",
        "amount",
        "duration",
        "duration_unit",
        "start_time",
        "end_time",
        "project_name",
    ],
    id_field: "resource_uuid",
    parent_fields: &["invoice_uuid"],
    ..ResourceSchema::EMPTY
};

/// Summary fields sit at the top level of the response body
pub static INVOICE_SUMMARY: ResourceSchema = ResourceSchema {
    kind: "invoice_summary",
    endpoint: "customers/my/invoices/{}/summary",
    static_fields: &[
        "invoice_uuid",
        "billing_period",
        "amount",
        "user_name",
        "user_billing_address",
        "user_company",
        "user_email",
        "product_charges",
        "overages",
        "taxes",
        "credits_and_adjustments",
    ],
    id_field: "invoice_uuid",
    parent_fields: &["invoice_uuid"],
    ..ResourceSchema::EMPTY
};

typed_resource!(
    /// A monthly invoice
    Invoice,
    top INVOICE
);

impl Invoice {
    fn uuid(&self) -> Result<String> {
        self.required_segment("invoice_uuid", "read items of")
    }

    /// One page of line items
    pub async fn items(&self, params: &ListParams) -> Result<Vec<Resource>> {
        let uuid = self.uuid()?;
        Resource::list_under(self.client(), &INVOICE_ITEM, &[&uuid], params).await
    }

    /// Line items accrued so far this month
    pub async fn preview_items(client: &Client, params: &ListParams) -> Result<Vec<Resource>> {
        Resource::list_under(client, &INVOICE_ITEM, &["preview"], params).await
    }

    /// Totals by product category
    pub async fn summary(&self) -> Result<Resource> {
        let uuid = self.uuid()?;
        let mut summary = Resource::with_parents(self.client().clone(), &INVOICE_SUMMARY, &[&uuid])?;
        summary.reload().await?;
        Ok(summary)
    }

    /// CSV rendering of the invoice
    pub async fn csv(&self) -> Result<String> {
        let uuid = self.uuid()?;
        let bytes = self
            .client()
            .get_bytes(&format!("{}/{uuid}/csv", INVOICE.endpoint), Vec::new())
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// PDF rendering of the invoice
    pub async fn pdf(&self) -> Result<Bytes> {
        let uuid = self.uuid()?;
        self.client()
            .get_bytes(&format!("{}/{uuid}/pdf", INVOICE.endpoint), Vec::new())
            .await
    }
}

/// Load the account the token belongs to
pub async fn account(client: &Client) -> Result<Resource> {
    Resource::singleton(client, &ACCOUNT).await
}

/// Load the current balance
pub async fn balance(client: &Client) -> Result<Resource> {
    Resource::singleton(client, &BALANCE).await
}

//! CLI runner - executes commands

use crate::action::Action;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::resource::{ListParams, Resource};
use crate::resources::{by_kind, ALL};
use crate::schema::{placeholder_count, ResourceSchema};
use crate::types::JsonValue;
use anyhow::{anyhow, bail, Context};
use serde_json::json;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, writing its result to stdout
    pub async fn run(&self) -> anyhow::Result<()> {
        let output = self.execute().await?;
        self.emit(&output)
    }

    /// Run the CLI command and return the document it would print
    pub async fn execute(&self) -> anyhow::Result<JsonValue> {
        match &self.cli.command {
            Commands::Kinds => Ok(kinds()),
            Commands::Get { kind, id, parents } => {
                let client = self.client()?;
                get(&client, kind, id.as_deref(), parents).await
            }
            Commands::List {
                kind,
                page,
                per_page,
                tag,
                parents,
            } => {
                let client = self.client()?;
                let params = ListParams::new().page(*page).per_page(*per_page);
                list(&client, kind, &params, tag.as_deref(), parents).await
            }
            Commands::Delete { kind, id, parents } => {
                let client = self.client()?;
                delete(&client, kind, id, parents).await
            }
            Commands::Action { id, wait } => {
                let client = self.client()?;
                let mut action = Action::fetch(&client, *id).await?;
                if *wait {
                    action.wait(&client).await?;
                }
                Ok(json!({ "action": action }))
            }
        }
    }

    /// Client config: file or environment, then command-line overrides
    pub fn config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::from_env(),
        };
        if let Some(token) = &self.cli.token {
            config.token = Some(token.clone());
        }
        if let Some(url) = &self.cli.base_url {
            config.base_url = url.clone();
        }
        config.validate().context("Invalid client configuration")?;
        Ok(config)
    }

    fn client(&self) -> anyhow::Result<Client> {
        let config = self.config()?;
        debug!("Using API at {}", config.base_url);
        Ok(Client::new(&config)?)
    }

    fn emit(&self, value: &JsonValue) -> anyhow::Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

fn schema_for(kind: &str) -> anyhow::Result<&'static ResourceSchema> {
    by_kind(kind)
        .ok_or_else(|| anyhow!("Unknown resource kind '{kind}', see `do-resource kinds`"))
}

/// Unfetched handle at the kind's endpoint, filling parent placeholders
fn handle(
    client: &Client,
    schema: &'static ResourceSchema,
    parents: &[String],
) -> anyhow::Result<Resource> {
    let wanted = placeholder_count(schema.endpoint);
    if parents.len() != wanted {
        bail!(
            "'{}' lives at '{}' and needs {} --parent value(s), got {}",
            schema.kind,
            schema.endpoint,
            wanted,
            parents.len()
        );
    }
    let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
    Ok(Resource::with_parents(client.clone(), schema, &parents)?)
}

async fn get(
    client: &Client,
    kind: &str,
    id: Option<&str>,
    parents: &[String],
) -> anyhow::Result<JsonValue> {
    let schema = schema_for(kind)?;
    let mut resource = handle(client, schema, parents)?;
    match (schema.fetch_fields.first(), id) {
        (Some(field), Some(id)) => resource.set(field, id),
        (Some(_), None) => bail!("'{}' needs an id", schema.kind),
        (None, Some(_)) => bail!("'{}' cannot be fetched by id, use `list`", schema.kind),
        (None, None) if placeholder_count(schema.endpoint) > 0 => {
            bail!("'{}' cannot be fetched alone, use `list`", schema.kind)
        }
        (None, None) => {}
    }
    resource
        .reload()
        .await
        .with_context(|| format!("Failed to load {kind}"))?;
    Ok(resource.to_json().await?)
}

async fn list(
    client: &Client,
    kind: &str,
    params: &ListParams,
    tag: Option<&str>,
    parents: &[String],
) -> anyhow::Result<JsonValue> {
    let schema = schema_for(kind)?;
    let mut items = match (tag, parents.is_empty()) {
        (Some(tag), true) => Resource::list_by_tag(client, schema, tag, params).await?,
        (Some(_), false) => bail!("--tag cannot be combined with --parent"),
        (None, _) => {
            // Validates the parent count before the request
            handle(client, schema, parents)?;
            let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
            Resource::list_under(client, schema, &parents, params).await?
        }
    };

    let mut objects = Vec::with_capacity(items.len());
    for item in &mut items {
        let mut body = item.to_json().await?;
        if !schema.single_key.is_empty() {
            body = body
                .get_mut(schema.single_key)
                .map(JsonValue::take)
                .unwrap_or_default();
        }
        objects.push(body);
    }
    let key = if schema.plural_key.is_empty() {
        schema.kind
    } else {
        schema.plural_key
    };
    let mut out = serde_json::Map::new();
    out.insert(key.to_string(), JsonValue::Array(objects));
    Ok(JsonValue::Object(out))
}

async fn delete(
    client: &Client,
    kind: &str,
    id: &str,
    parents: &[String],
) -> anyhow::Result<JsonValue> {
    let schema = schema_for(kind)?;
    let mut resource = handle(client, schema, parents)?;
    if !schema.delete_field.is_empty() {
        resource.set(schema.delete_field, id);
    }
    Ok(resource.delete().await?)
}

fn kinds() -> JsonValue {
    let kinds: Vec<JsonValue> = ALL
        .iter()
        .map(|s| {
            json!({
                "kind": s.kind,
                "endpoint": s.endpoint,
                "actions": s.actions.iter().map(|a| a.name()).collect::<Vec<_>>(),
                "updatable": !s.update_field.is_empty(),
                "deletable": !s.delete_field.is_empty(),
            })
        })
        .collect();
    json!({ "kinds": kinds })
}

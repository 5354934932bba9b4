//! Action records
//!
//! An action is the server's record of an asynchronous operation: a droplet
//! reboot, an image transfer, a volume attach. Records are read-only
//! snapshots; [`Action::reload`] and [`Action::wait`] refresh them.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::materialize::wire_option;
use crate::resource::{list_raw, ListParams};
use crate::types::JsonValue;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Collection endpoint for standalone action lookups
pub const ACTIONS_ENDPOINT: &str = "actions";

/// Progress of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    InProgress,
    Completed,
    Errored,
    #[serde(other)]
    Unknown,
}

impl ActionStatus {
    /// Whether the action has stopped running
    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionStatus::InProgress)
    }
}

/// Snapshot of a server-side action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: u64,
    pub status: ActionStatus,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, with = "wire_option")]
    pub started_at: Option<NaiveDateTime>,
    #[serde(default, with = "wire_option")]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub resource_id: Option<u64>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub region: Option<JsonValue>,
    #[serde(default)]
    pub region_slug: Option<String>,
}

impl Action {
    /// Parse a raw action object
    pub fn from_json(raw: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(raw)?)
    }

    /// Parse `{"action": {...}}`
    pub fn from_body(mut body: JsonValue) -> Result<Self> {
        match body.get_mut("action").map(JsonValue::take) {
            Some(raw) => Self::from_json(raw),
            None => Err(Error::Other(format!(
                "Expected an 'action' object in response, got {body}"
            ))),
        }
    }

    /// Parse `{"actions": [...]}`
    pub fn list_from_body(mut body: JsonValue) -> Result<Vec<Self>> {
        match body.get_mut("actions").map(JsonValue::take) {
            Some(JsonValue::Array(items)) => items.into_iter().map(Self::from_json).collect(),
            Some(JsonValue::Null) | None => Ok(Vec::new()),
            Some(other) => Err(Error::Other(format!(
                "Expected an 'actions' array in response, got {other}"
            ))),
        }
    }

    /// Fetch an action by id
    pub async fn fetch(client: &Client, id: u64) -> Result<Self> {
        let body = client
            .get(&format!("{ACTIONS_ENDPOINT}/{id}"), Vec::new())
            .await?;
        Self::from_body(body)
    }

    /// One page of every action on the account
    pub async fn list(client: &Client, params: &ListParams) -> Result<Vec<Self>> {
        list_raw(client, ACTIONS_ENDPOINT, "actions", params)
            .await?
            .into_iter()
            .map(Self::from_json)
            .collect()
    }

    /// Refresh this snapshot
    pub async fn reload(&mut self, client: &Client) -> Result<()> {
        *self = Self::fetch(client, self.id).await?;
        Ok(())
    }

    /// Poll until the action leaves `in-progress`
    pub async fn wait(&mut self, client: &Client) -> Result<ActionStatus> {
        while !self.status.is_terminal() {
            debug!(
                "Action {} ({}) in progress, polling again in {:?}",
                self.id,
                self.kind,
                client.poll_interval()
            );
            tokio::time::sleep(client.poll_interval()).await;
            self.reload(client).await?;
        }
        info!("Action {} ({}) finished: {:?}", self.id, self.kind, self.status);
        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Client {
        let config = ClientConfig::builder()
            .base_url(server.uri())
            .token("t")
            .poll_interval(Duration::from_secs(0))
            .build();
        Client::new(&config).unwrap()
    }

    #[test]
    fn test_action_from_full_json() {
        let action = Action::from_json(json!({
            "id": 36804636,
            "status": "completed",
            "type": "create",
            "started_at": "2020-11-14T16:29:21Z",
            "completed_at": "2020-11-14T16:30:06.123Z",
            "resource_id": 3164444,
            "resource_type": "droplet",
            "region": {"slug": "nyc3"},
            "region_slug": "nyc3"
        }))
        .unwrap();

        assert_eq!(action.id, 36804636);
        assert_eq!(action.status, ActionStatus::Completed);
        assert_eq!(action.kind, "create");
        assert_eq!(
            action.completed_at.unwrap().to_string(),
            "2020-11-14 16:30:06"
        );
        assert_eq!(action.resource_type.as_deref(), Some("droplet"));
    }

    #[test]
    fn test_action_from_minimal_json() {
        let action = Action::from_json(json!({"id": 1, "status": "in-progress"})).unwrap();
        assert_eq!(action.status, ActionStatus::InProgress);
        assert!(!action.status.is_terminal());
        assert_eq!(action.started_at, None);
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let action = Action::from_json(json!({"id": 1, "status": "paused"})).unwrap();
        assert_eq!(action.status, ActionStatus::Unknown);
    }

    #[test]
    fn test_from_body_requires_action_key() {
        assert!(Action::from_body(json!({"id": 1})).is_err());
        assert!(Action::list_from_body(json!({})).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_and_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/actions/5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"action": {"id": 5, "status": "errored"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/actions"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "actions": [{"id": 1, "status": "completed"}, {"id": 2, "status": "completed"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let action = Action::fetch(&client, 5).await.unwrap();
        assert_eq!(action.status, ActionStatus::Errored);

        let actions = Action::list(&client, &ListParams::new().page(2)).await.unwrap();
        assert_eq!(actions.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_wait_polls_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/actions/9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"action": {"id": 9, "status": "in-progress"}})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/actions/9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"action": {"id": 9, "status": "completed"}})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut action = Action::from_json(json!({"id": 9, "status": "in-progress"})).unwrap();
        let status = action.wait(&client).await.unwrap();
        assert_eq!(status, ActionStatus::Completed);
    }
}

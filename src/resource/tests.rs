//! Tests for the lazy resource engine

use super::*;
use crate::action::ActionStatus;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::materialize::FieldValue;
use crate::schema::{ActionKind, ActionType, ResourceSchema};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

static WIDGET: ResourceSchema = ResourceSchema {
    kind: "widget",
    endpoint: "widgets",
    single_key: "widget",
    plural_key: "widgets",
    fetch_fields: &["id", "name"],
    static_fields: &["status", "created_at"],
    dynamic_fields: &["name", "size_hint", "tags"],
    actions: &[ActionType::Reboot, ActionType::PowerOff],
    delete_field: "id",
    update_field: "id",
    action_field: "id",
    ..ResourceSchema::EMPTY
};

static CATALOG: ResourceSchema = ResourceSchema {
    kind: "catalog",
    endpoint: "catalogs",
    single_key: "catalog",
    plural_key: "catalogs",
    static_fields: &["slug", "available"],
    id_field: "slug",
    ..ResourceSchema::EMPTY
};

static PROFILE: ResourceSchema = ResourceSchema {
    kind: "profile",
    endpoint: "profile",
    single_key: "profile",
    plural_key: "profiles",
    static_fields: &["uuid", "status"],
    id_field: "uuid",
    ..ResourceSchema::EMPTY
};

static PART: ResourceSchema = ResourceSchema {
    kind: "part",
    endpoint: "gizmos/{}/parts",
    single_key: "part",
    plural_key: "parts",
    fetch_fields: &["id"],
    dynamic_fields: &["label"],
    delete_field: "id",
    ..ResourceSchema::EMPTY
};

fn client_for(server: &MockServer) -> Client {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .token("t")
        .poll_interval(Duration::from_secs(0))
        .build();
    Client::new(&config).unwrap()
}

async fn no_requests_expected(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

fn widget_body(id: u64, name: &str, status: &str) -> serde_json::Value {
    json!({"widget": {"id": id, "name": name, "status": status, "tags": []}})
}

// ============================================================================
// Lazy loading
// ============================================================================

#[tokio::test]
async fn test_first_read_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_body(7, "alpha", "active")))
        .expect(1)
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    assert!(!widget.is_fetched());

    assert_eq!(widget.get("status").await.unwrap().as_str(), Some("active"));
    assert_eq!(widget.get("name").await.unwrap().as_str(), Some("alpha"));
    assert!(widget.is_fetched());
}

#[tokio::test]
async fn test_static_write_is_ignored() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut widget = Resource::new(client_for(&server), &WIDGET);
    widget.set("status", "hacked");
    assert_eq!(widget.peek("status"), Some(&FieldValue::Null));
}

#[tokio::test]
async fn test_fetch_field_write_refetches_by_new_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_body(7, "alpha", "active")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/beta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_body(8, "beta", "off")))
        .expect(1)
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    assert_eq!(widget.get("status").await.unwrap().as_str(), Some("active"));

    widget.set("name", "beta");
    assert!(!widget.is_fetched());
    assert_eq!(widget.get("status").await.unwrap().as_str(), Some("off"));
    assert_eq!(widget.id(), json!(8));
    assert_eq!(widget.identity_override(), None);
}

#[tokio::test]
async fn test_read_without_identity_makes_no_request() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut widget = Resource::new(client_for(&server), &WIDGET);
    assert!(widget.get("status").await.unwrap().is_null());
    assert!(!widget.is_fetched());
}

#[tokio::test]
async fn test_undeclared_field_is_local_only() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut widget = Resource::new(client_for(&server), &WIDGET);
    let err = widget.get("colour").await.unwrap_err();
    assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "colour"));

    widget.set("colour", "red");
    assert_eq!(widget.get("colour").await.unwrap().as_str(), Some("red"));
}

#[tokio::test]
async fn test_last_identity_write_wins() {
    let server = MockServer::start().await;
    let mut widget = Resource::new(client_for(&server), &WIDGET);

    widget.set("id", 7);
    widget.set("name", "beta");
    assert_eq!(widget.identity_override(), Some("name"));
    assert_eq!(widget.identity().as_deref(), Some("beta"));

    widget.set("id", 9);
    assert_eq!(widget.identity_override(), Some("id"));
    assert_eq!(widget.identity().as_deref(), Some("9"));
}

#[tokio::test]
async fn test_reload_without_identity_fails() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut widget = Resource::new(client_for(&server), &WIDGET);
    let err = widget.reload().await.unwrap_err();
    assert!(matches!(err, Error::ClientRequest { status: None, .. }));
}

#[tokio::test]
async fn test_get_not_found_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "gone"})))
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 404);
    let err = widget.get("status").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_to_json_wraps_in_single_key() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut widget = Resource::from_json(
        client_for(&server),
        &WIDGET,
        json!({"id": 7, "name": "alpha", "tags": ["x"], "ignored": true}),
    )
    .unwrap();

    assert_eq!(
        widget.to_json().await.unwrap(),
        json!({"widget": {
            "id": 7,
            "name": "alpha",
            "status": null,
            "created_at": null,
            "size_hint": null,
            "tags": ["x"]
        }})
    );
    assert_eq!(widget.peek("ignored"), None);
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_save_unsupported_makes_no_request() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut catalog = Resource::new(client_for(&server), &CATALOG);
    let err = catalog.save().await.unwrap_err();
    assert_eq!(err.to_string(), "Client request error: Resource 'catalog' does not support updating");

    let err = catalog.delete().await.unwrap_err();
    assert!(err.to_string().contains("does not support deleting"));
}

#[tokio::test]
async fn test_save_puts_dynamic_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/widgets/7"))
        .and(body_json(json!({"name": "alpha", "size_hint": null, "tags": ["x"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_body(7, "alpha", "active")))
        .expect(1)
        .mount(&server)
        .await;

    let mut widget = Resource::from_json(
        client_for(&server),
        &WIDGET,
        json!({"id": 7, "name": "alpha", "tags": ["x"]}),
    )
    .unwrap();
    widget.save().await.unwrap();
    assert_eq!(widget.peek("status").and_then(FieldValue::as_str), Some("active"));
}

#[tokio::test]
async fn test_create_posts_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/widgets"))
        .and(body_json(json!({"name": "fresh", "tags": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(202).set_body_json(widget_body(11, "fresh", "new")))
        .expect(1)
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET)
        .with("name", "fresh")
        .with("tags", vec!["a", "b"]);
    widget.create_from_fields().await.unwrap();

    assert!(widget.is_fetched());
    assert_eq!(widget.id(), json!(11));
    assert_eq!(widget.identity_override(), None);
}

#[tokio::test]
async fn test_delete_of_absent_object_counts_as_deleted() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/widgets/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    assert_eq!(widget.delete().await.unwrap(), json!({"status": "deleted"}));
}

#[tokio::test]
async fn test_delete_without_target_fails_locally() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut widget = Resource::new(client_for(&server), &WIDGET);
    assert!(matches!(
        widget.delete().await.unwrap_err(),
        Error::ClientRequest { status: None, .. }
    ));
}

// ============================================================================
// Actions
// ============================================================================

#[tokio::test]
async fn test_action_posts_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/widgets/7/actions"))
        .and(body_json(json!({"type": "reboot"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "action": {"id": 99, "status": "in-progress", "type": "reboot"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    let action = widget.action(ActionKind::Reboot).await.unwrap();
    assert_eq!(action.id, 99);
    assert_eq!(action.status, ActionStatus::InProgress);
}

#[tokio::test]
async fn test_undeclared_action_fails_before_request() {
    let server = MockServer::start().await;
    no_requests_expected(&server).await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    let err = widget
        .action(ActionKind::Rename {
            name: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Client request error: Resource 'widget' does not support action Rename"
    );

    let mut catalog = Resource::new(client_for(&server), &CATALOG);
    assert!(catalog.action(ActionKind::Reboot).await.is_err());
}

#[tokio::test]
async fn test_action_by_tag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/widgets/actions"))
        .and(query_param("tag_name", "web"))
        .and(body_json(json!({"type": "power_off"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "actions": [
                {"id": 1, "status": "in-progress", "type": "power_off"},
                {"id": 2, "status": "in-progress", "type": "power_off"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let actions = Resource::action_by_tag(&client, &WIDGET, "web", ActionKind::PowerOff)
        .await
        .unwrap();
    assert_eq!(actions.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn test_list_actions_of_instance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/7/actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "actions": [{"id": 5, "status": "completed", "type": "reboot"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/7/actions/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": {"id": 5, "status": "completed", "type": "reboot"}
        })))
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    let actions = widget.list_actions(&ListParams::new()).await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(widget.get_action(5).await.unwrap().status, ActionStatus::Completed);
}

// ============================================================================
// Collections
// ============================================================================

#[tokio::test]
async fn test_list_preserves_response_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "widgets": [{"id": 3}, {"id": 1}, {"id": 2}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let widgets = Resource::list(&client, &WIDGET, &ListParams::new()).await.unwrap();
    let ids: Vec<_> = widgets.iter().map(Resource::id).collect();
    assert_eq!(ids, vec![json!(3), json!(1), json!(2)]);
    assert!(widgets.iter().all(Resource::is_fetched));
}

#[tokio::test]
async fn test_list_missing_key_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"links": {}})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = Resource::list(&client, &CATALOG, &ListParams::new()).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_list_by_tag_and_custom_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets"))
        .and(query_param("tag_name", "web"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 4, "name": "tagged"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = ListParams::new().per_page(5).key("items");
    let widgets = Resource::list_by_tag(&client, &WIDGET, "web", &params).await.unwrap();
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].peek("name").and_then(FieldValue::as_str), Some("tagged"));
}

#[tokio::test]
async fn test_delete_by_tag() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/widgets"))
        .and(query_param("tag_name", "old"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = Resource::delete_by_tag(&client, &WIDGET, "old").await.unwrap();
    assert_eq!(result, json!({"status": "deleted"}));
}

#[tokio::test]
async fn test_list_under_resolves_parents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gizmos/g1/parts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parts": [{"id": 1, "label": "bolt"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let parts = Resource::list_under(&client, &PART, &["g1"], &ListParams::new())
        .await
        .unwrap();
    assert_eq!(parts[0].endpoint(), "gizmos/g1/parts");

    assert!(Resource::with_parents(client, &PART, &[]).is_err());
}

#[tokio::test]
async fn test_singleton_loads_from_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profile": {"uuid": "u-1", "status": "active"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut profile = Resource::singleton(&client, &PROFILE).await.unwrap();
    assert_eq!(profile.id(), json!("u-1"));
    assert_eq!(profile.get("status").await.unwrap().as_str(), Some("active"));
}

#[tokio::test]
async fn test_sub_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/7/snapshots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "snapshots": [{"id": "s1"}, {"id": "s2"}]
        })))
        .mount(&server)
        .await;

    let widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    let snapshots = widget
        .list_sub("snapshots", "snapshots", &ListParams::new())
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 2);
}

// ============================================================================
// Waiting
// ============================================================================

#[tokio::test]
async fn test_wait_for_polls_until_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_body(7, "alpha", "new")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/widgets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(widget_body(7, "alpha", "active")))
        .mount(&server)
        .await;

    let mut widget = Resource::new(client_for(&server), &WIDGET).with("id", 7);
    widget.wait_for("status", &["active", "off"]).await.unwrap();
    assert_eq!(widget.peek("status").and_then(FieldValue::as_str), Some("active"));
}

//! Materializer tests

use super::*;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::resources;
use crate::schema::ResourceSchema;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn client() -> Client {
    Client::new(&ClientConfig::builder().token("t").build()).unwrap()
}

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

static GADGET: ResourceSchema = ResourceSchema {
    kind: "gadget",
    endpoint: "gadgets",
    single_key: "gadget",
    plural_key: "gadgets",
    fetch_fields: &["id"],
    static_fields: &["created_at", "region", "owner", "parts"],
    dynamic_fields: &["name"],
    materializers: &[
        ("owner", Materializer::Reference(&resources::DROPLET)),
        ("region", Materializer::Plain),
        ("parts", Materializer::NestedList(&resources::NODE_POOL)),
    ],
    ..ResourceSchema::EMPTY
};

// ============================================================================
// Timestamps
// ============================================================================

#[test_case("created_at", true)]
#[test_case("started_at", true)]
#[test_case("start_time", true)]
#[test_case("end_time", true)]
#[test_case("not_after", true)]
#[test_case("endpoint", false ; "endpoint is not a timestamp")]
#[test_case("name", false)]
#[test_case("status", false)]
fn test_timestamp_naming_convention(field: &str, expected: bool) {
    assert_eq!(is_timestamp_field(field), expected);
}

#[test]
fn test_fractional_seconds_are_truncated() {
    let with_fraction = parse_timestamp("created_at", "2021-05-01T10:00:00.123456Z").unwrap();
    let without = parse_timestamp("created_at", "2021-05-01T10:00:00Z").unwrap();
    assert_eq!(with_fraction, without);
    assert_eq!(without, ts(2021, 5, 1, 10, 0, 0));
}

#[test]
fn test_bad_timestamp_is_an_error() {
    let err = parse_timestamp("created_at", "yesterday").unwrap_err();
    assert!(matches!(err, Error::Timestamp { ref field, ref value } if field == "created_at" && value == "yesterday"));
}

#[test]
fn test_timestamp_wire_format() {
    assert_eq!(format_timestamp(&ts(2020, 1, 2, 3, 4, 5)), "2020-01-02T03:04:05Z");
}

// ============================================================================
// Sub-objects
// ============================================================================

#[test]
fn test_rule_rejects_unknown_protocol() {
    let err = InboundRule::new("sctp", "80", Location::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidRule { .. }));
    assert!(err.to_string().contains("found 'sctp'"));
}

#[test]
fn test_icmp_rule_has_no_ports() {
    let rule = OutboundRule::new("icmp", "all", Location::anywhere()).unwrap();
    assert_eq!(rule.ports, None);
    assert_eq!(
        rule.to_json(),
        json!({
            "protocol": "icmp",
            "destinations": {
                "addresses": ["0.0.0.0/0", "::/0"],
                "droplet_ids": [],
                "load_balancer_uids": [],
                "tags": []
            }
        })
    );
}

#[test]
fn test_inbound_rule_from_json() {
    let rule = InboundRule::from_json(&json!({
        "protocol": "tcp",
        "ports": "22",
        "sources": {"addresses": ["10.0.0.0/8"], "droplet_ids": null}
    }))
    .unwrap();

    assert_eq!(rule.protocol, Protocol::Tcp);
    assert_eq!(rule.ports.as_deref(), Some("22"));
    assert_eq!(rule.sources.addresses, vec!["10.0.0.0/8".to_string()]);
    assert!(rule.sources.droplet_ids.is_empty());
    assert_eq!(rule.to_json()["ports"], "22");
}

#[test]
fn test_load_balancer_defaults() {
    assert_eq!(
        ForwardingRule::default().to_json(),
        json!({
            "entry_protocol": "http",
            "entry_port": 80,
            "target_protocol": "http",
            "target_port": 80,
            "certificate_id": "",
            "tls_passthrough": false
        })
    );
    assert_eq!(
        HealthCheck::default().to_json(),
        json!({
            "protocol": "http",
            "port": 80,
            "path": "/",
            "check_interval_seconds": 10,
            "response_timeout_seconds": 5,
            "healthy_threshold": 5,
            "unhealthy_threshold": 3
        })
    );
}

#[test]
fn test_sticky_session_json() {
    assert_eq!(StickySession::default().to_json(), json!({"type": "none"}));
    assert_eq!(
        StickySession::cookies("sess", 300).to_json(),
        json!({"type": "cookies", "cookie_name": "sess", "cookie_ttl_seconds": 300})
    );
}

#[test]
fn test_partial_forwarding_rule_fills_defaults() {
    let rule = ForwardingRule::from_json(&json!({"entry_protocol": "https", "entry_port": 443}))
        .unwrap();
    assert_eq!(rule.entry_port, 443);
    assert_eq!(rule.target_port, 80);
}

// ============================================================================
// Field plans
// ============================================================================

#[test]
fn test_plan_is_cached_per_schema() {
    let a = FieldPlan::for_schema(&GADGET);
    let b = FieldPlan::for_schema(&GADGET);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.kind(), "gadget");
}

#[test]
fn test_plan_registrations_override_conventions() {
    let plan = FieldPlan::for_schema(&GADGET);
    assert_eq!(plan.materializer("region"), Materializer::Plain);
    assert_eq!(
        plan.materializer("owner"),
        Materializer::Reference(&resources::DROPLET)
    );
    assert_eq!(plan.materializer("created_at"), Materializer::Timestamp);
    assert_eq!(plan.materializer("undeclared"), Materializer::Plain);
}

#[test_case("inbound_rules", Materializer::InboundRules)]
#[test_case("outbound_rules", Materializer::OutboundRules)]
#[test_case("next_backup_window", Materializer::Window)]
#[test_case("forwarding_rules", Materializer::ForwardingRules)]
#[test_case("health_check", Materializer::HealthCheck)]
#[test_case("sticky_sessions", Materializer::StickySession)]
#[test_case("region", Materializer::Reference(&resources::REGION))]
#[test_case("tags", Materializer::Plain)]
fn test_conventions(field: &str, expected: Materializer) {
    assert_eq!(convention(field), expected);
}

#[test]
fn test_materialize_timestamp_field() {
    let plan = FieldPlan::for_schema(&GADGET);
    let value = plan
        .materialize(
            &client(),
            None,
            "created_at",
            json!("2021-05-01T10:00:00.123456Z"),
        )
        .unwrap();
    assert_eq!(value, FieldValue::Timestamp(ts(2021, 5, 1, 10, 0, 0)));
}

#[test]
fn test_materialize_null_is_null() {
    let value = materialize_with(
        Materializer::Timestamp,
        &client(),
        None,
        "created_at",
        json!(null),
    )
    .unwrap();
    assert!(value.is_null());
}

#[test]
fn test_reference_string_passes_through() {
    let value = materialize_with(
        Materializer::Reference(&resources::REGION),
        &client(),
        None,
        "region",
        json!("nyc3"),
    )
    .unwrap();
    assert_eq!(value, FieldValue::from("nyc3"));
    assert_eq!(value.to_json(), json!("nyc3"));
}

#[test]
fn test_reference_round_trips_to_identifier() {
    let raw = json!({"id": 7, "name": "web-1", "status": "active"});
    let value = materialize_with(
        Materializer::Reference(&resources::DROPLET),
        &client(),
        None,
        "droplet",
        raw,
    )
    .unwrap();

    let droplet = value.as_resource().unwrap();
    assert!(droplet.is_fetched());
    assert_eq!(droplet.peek("name"), Some(&FieldValue::from("web-1")));
    assert_eq!(value.to_json(), json!(7));
}

#[test]
fn test_nested_list_fills_endpoint_from_parent() {
    let value = materialize_with(
        Materializer::NestedList(&resources::NODE_POOL),
        &client(),
        Some("cluster-1"),
        "node_pools",
        json!([{"id": "pool-a", "name": "a"}, {"id": "pool-b", "name": "b"}]),
    )
    .unwrap();

    let pools = value.as_list().unwrap();
    assert_eq!(pools.len(), 2);
    let first = pools[0].as_resource().unwrap();
    assert_eq!(first.endpoint(), "kubernetes/clusters/cluster-1/node_pools");
    assert_eq!(value.to_json(), json!(["pool-a", "pool-b"]));
}

#[test]
fn test_nested_fills_endpoint_from_body() {
    let value = materialize_with(
        Materializer::Reference(&resources::REPOSITORY_TAG),
        &client(),
        None,
        "latest_tag",
        json!({"registry_name": "reg", "repository": "app", "tag": "v1"}),
    )
    .unwrap();
    let tag = value.as_resource().unwrap();
    assert_eq!(tag.endpoint(), "registry/reg/repositories/app/tags");
}

#[test]
fn test_materialize_rules_and_window() {
    let rules = materialize_with(
        Materializer::InboundRules,
        &client(),
        None,
        "inbound_rules",
        json!([{"protocol": "udp", "ports": "53", "sources": {"tags": ["dns"]}}]),
    )
    .unwrap();
    match rules.as_list().unwrap() {
        [FieldValue::InboundRule(rule)] => assert_eq!(rule.sources.tags, vec!["dns"]),
        other => panic!("unexpected: {other:?}"),
    }

    let window = materialize_with(
        Materializer::Window,
        &client(),
        None,
        "next_backup_window",
        json!({"start": "2019-12-04T00:00:00Z", "end": "2019-12-04T23:00:00Z"}),
    )
    .unwrap();
    let w = window.as_window().unwrap();
    assert_eq!(w.start, ts(2019, 12, 4, 0, 0, 0));
    assert_eq!(w.end, ts(2019, 12, 4, 23, 0, 0));
    assert_eq!(
        window.to_json(),
        json!({"start": "2019-12-04T00:00:00Z", "end": "2019-12-04T23:00:00Z"})
    );
}

#[test]
fn test_bad_rule_in_body_fails() {
    let err = materialize_with(
        Materializer::OutboundRules,
        &client(),
        None,
        "outbound_rules",
        json!([{"protocol": "gre"}]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidRule { .. }));
}

#[test]
fn test_serialize_fields() {
    let mut fields = FieldMap::new();
    fields.insert("name".to_string(), FieldValue::from("fw"));
    fields.insert(
        "outbound_rules".to_string(),
        FieldValue::from(vec![OutboundRule::new("tcp", "all", Location::anywhere()).unwrap()]),
    );
    fields.insert("ignored".to_string(), FieldValue::Null);

    let body = serialize_fields(&fields);
    assert_eq!(body["name"], "fw");
    assert_eq!(body["outbound_rules"][0]["ports"], "all");
    assert_eq!(body["ignored"], json!(null));
}

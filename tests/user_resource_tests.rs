mod common;

use std::sync::Arc;

use common::{Call, FakeUsersApi, map, state_of, team_permissions, user};
use ns1_provider::Ns1Error;
use ns1_provider::core::models::User;
use ns1_provider::resources::user::{
    resource_data_to_user, user_create, user_delete, user_import, user_read, user_schema,
    user_to_resource_data, user_update,
};
use ns1_provider::schema::{InstanceState, ResourceData};
use serde_json::{Value, json};

fn planned(v: Value) -> ResourceData {
    ResourceData::for_create(Arc::new(user_schema()), map(v))
}

fn existing(id: &str, attributes: Value) -> InstanceState {
    InstanceState {
        id: id.to_string(),
        attributes: map(attributes),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State <-> domain translation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_translation_round_trips_identity_fields_and_team_order() {
    let d = planned(json!({
        "name": "Alice",
        "username": "alice",
        "email": "alice@example.com",
        "teams": ["teamB", "teamA", "teamC"],
    }));

    let mut u = User::default();
    resource_data_to_user(&mut u, &d).unwrap();
    assert_eq!(u.team_ids, vec!["teamB", "teamA", "teamC"]);

    let mut out = ResourceData::for_create(Arc::new(user_schema()), map(json!({"username": "alice"})));
    user_to_resource_data(&mut out, &u).unwrap();
    let state = state_of(&out);

    assert_eq!(state.id, "alice");
    assert_eq!(state.attributes["name"], json!("Alice"));
    assert_eq!(state.attributes["username"], json!("alice"));
    assert_eq!(state.attributes["email"], json!("alice@example.com"));
    assert_eq!(state.attributes["teams"], json!(["teamB", "teamA", "teamC"]));
}

#[test]
fn test_notify_round_trip_keeps_only_billing() {
    let mut d = planned(json!({
        "name": "Alice",
        "username": "alice",
        "email": "alice@example.com",
        "notify": {"billing": true, "foo": false},
    }));

    let mut u = User::default();
    resource_data_to_user(&mut u, &d).unwrap();
    assert!(u.notify.billing);

    user_to_resource_data(&mut d, &u).unwrap();
    assert_eq!(state_of(&d).attributes["notify"], json!({"billing": true}));
}

#[test]
fn test_absent_teams_become_empty_list() {
    let d = planned(json!({"name": "Bob", "username": "bob", "email": "bob@example.com"}));

    let mut u = User {
        team_ids: vec!["stale".to_string()],
        ..Default::default()
    };
    resource_data_to_user(&mut u, &d).unwrap();

    assert!(u.team_ids.is_empty());
    assert!(!u.notify.billing);
}

#[test]
fn test_notify_without_billing_key_leaves_flag_off() {
    let d = planned(json!({
        "name": "Bob",
        "username": "bob",
        "email": "bob@example.com",
        "notify": {"other": true},
    }));

    let mut u = User::default();
    resource_data_to_user(&mut u, &d).unwrap();
    assert!(!u.notify.billing);
}

#[test]
fn test_mistyped_state_value_is_a_type_mismatch() {
    let d = planned(json!({
        "name": "Bob",
        "username": "bob",
        "email": "bob@example.com",
        "notify": {"billing": "yes"},
    }));

    let mut u = User::default();
    match resource_data_to_user(&mut u, &d) {
        Err(Ns1Error::TypeMismatch { field, expected, found }) => {
            assert_eq!(field, "notify.billing");
            assert_eq!(expected, "bool");
            assert_eq!(found, "string");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }

    let d = planned(json!({"name": 42, "username": "bob", "email": "bob@example.com"}));
    assert!(matches!(
        resource_data_to_user(&mut u, &d),
        Err(Ns1Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_permission_fields_flow_into_domain_object() {
    let d = planned(json!({
        "name": "Carol",
        "username": "carol",
        "email": "carol@example.com",
        "account_manage_users": true,
        "dns_zones_deny": ["secret.example"],
    }));

    let mut u = User::default();
    resource_data_to_user(&mut u, &d).unwrap();

    assert!(u.permissions.account.manage_users);
    assert_eq!(u.permissions.dns.zones_deny, vec!["secret.example"]);
    assert!(u.permissions.security.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Create
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_without_teams_uses_created_object() {
    let api = FakeUsersApi::new();
    let mut d = planned(json!({"name": "Bob", "username": "bob", "email": "bob@example.com"}));

    user_create(&mut d, &api).await.unwrap();

    assert_eq!(api.calls(), vec![Call::Create("bob".to_string())]);
    let state = state_of(&d);
    assert_eq!(state.id, "bob");
    assert_eq!(state.attributes["teams"], json!([]));
    assert_eq!(state.attributes["notify"], json!({"billing": false}));
}

#[tokio::test]
async fn test_create_with_teams_refetches_user() {
    let api = FakeUsersApi::new();
    let mut d = planned(json!({
        "name": "Alice",
        "username": "alice",
        "email": "alice@example.com",
        "teams": ["teamA"],
    }));

    user_create(&mut d, &api).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            Call::Create("alice".to_string()),
            Call::Get("alice".to_string())
        ]
    );

    // permissions computed server side from team membership are in state
    let state = state_of(&d);
    let expected = team_permissions();
    assert_eq!(state.id, "alice");
    assert_eq!(state.attributes["teams"], json!(["teamA"]));
    assert_eq!(state.attributes["dns_view_zones"], json!(expected.dns.view_zones));
    assert_eq!(
        state.attributes["monitoring_view_jobs"],
        json!(expected.monitoring.view_jobs)
    );
}

#[tokio::test]
async fn test_create_error_is_returned_unmodified() {
    let api = FakeUsersApi::new()
        .failing_create(|| Ns1Error::ApiError("PUT account/users/alice: 409 user already exists".to_string()));
    let mut d = planned(json!({"name": "Alice", "username": "alice", "email": "alice@example.com"}));

    let err = user_create(&mut d, &api).await.unwrap_err();

    assert_eq!(err.to_string(), "PUT account/users/alice: 409 user already exists");
    assert!(d.state().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Read
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_read_populates_state_from_remote() {
    let mut remote = user("dave", &[]);
    remote.notify.billing = true;
    let api = FakeUsersApi::new().with_user(remote);

    let mut d = ResourceData::from_state(
        Arc::new(user_schema()),
        &existing("dave", json!({"username": "dave", "name": "stale"})),
    );
    user_read(&mut d, &api).await.unwrap();

    let state = state_of(&d);
    assert_eq!(state.attributes["name"], json!("dave name"));
    assert_eq!(state.attributes["notify"], json!({"billing": true}));
    assert_eq!(api.calls(), vec![Call::Get("dave".to_string())]);
}

#[tokio::test]
async fn test_read_user_not_found_message_clears_id() {
    let api = FakeUsersApi::new().failing_get(|| Ns1Error::ApiError("User not found".to_string()));
    let mut d = ResourceData::from_state(Arc::new(user_schema()), &existing("ghost", json!({})));

    user_read(&mut d, &api).await.unwrap();

    assert_eq!(d.id(), "");
    assert!(d.state().is_none());
}

#[tokio::test]
async fn test_read_structured_not_found_clears_id() {
    let api = FakeUsersApi::new();
    let mut d = ResourceData::from_state(Arc::new(user_schema()), &existing("ghost", json!({})));

    user_read(&mut d, &api).await.unwrap();

    assert!(d.state().is_none());
}

#[tokio::test]
async fn test_read_other_error_is_returned_and_id_kept() {
    let api = FakeUsersApi::new().failing_get(|| Ns1Error::ApiError("boom".to_string()));
    let mut d = ResourceData::from_state(Arc::new(user_schema()), &existing("erin", json!({})));

    let err = user_read(&mut d, &api).await.unwrap_err();

    assert!(matches!(&err, Ns1Error::ApiError(msg) if msg == "boom"));
    assert_eq!(d.id(), "erin");
}

// ─────────────────────────────────────────────────────────────────────────────
// Update
// ─────────────────────────────────────────────────────────────────────────────

fn update_data(prior: Value, planned: Value) -> ResourceData {
    ResourceData::for_update(
        Arc::new(user_schema()),
        &existing("frank", prior),
        map(planned),
    )
}

#[tokio::test]
async fn test_update_without_team_change_uses_sent_object() {
    let api = FakeUsersApi::new().with_user(user("frank", &["teamA"]));
    let mut d = update_data(
        json!({"name": "Frank", "username": "frank", "email": "f@example.com", "teams": ["teamA"]}),
        json!({"name": "Frank F", "username": "frank", "email": "f@example.com", "teams": ["teamA"]}),
    );

    user_update(&mut d, &api).await.unwrap();

    assert_eq!(api.calls(), vec![Call::Update("frank".to_string())]);
    let state = state_of(&d);
    assert_eq!(state.attributes["name"], json!("Frank F"));
    // no refetch, so server-derived grants are not in state
    assert_eq!(state.attributes["dns_view_zones"], json!(false));
}

#[tokio::test]
async fn test_update_sends_prior_grants_when_config_omits_them() {
    let api = FakeUsersApi::new().with_user(user("frank", &["teamA"]));
    let mut d = update_data(
        json!({
            "name": "Frank",
            "username": "frank",
            "email": "f@example.com",
            "teams": ["teamA"],
            "notify": {"billing": true},
            "dns_view_zones": true,
        }),
        json!({"name": "Frank", "username": "frank", "email": "frank@example.com", "teams": ["teamA"]}),
    );

    user_update(&mut d, &api).await.unwrap();

    assert_eq!(api.calls(), vec![Call::Update("frank".to_string())]);
    let state = state_of(&d);
    assert_eq!(state.attributes["dns_view_zones"], json!(true));
    assert_eq!(state.attributes["notify"], json!({"billing": true}));
    assert!(api.stored("frank").unwrap().notify.billing);
}

#[tokio::test]
async fn test_update_with_team_change_refetches_user() {
    let api = FakeUsersApi::new().with_user(user("frank", &[]));
    let mut d = update_data(
        json!({"name": "Frank", "username": "frank", "email": "f@example.com"}),
        json!({"name": "Frank", "username": "frank", "email": "f@example.com", "teams": ["teamA"]}),
    );

    user_update(&mut d, &api).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            Call::Update("frank".to_string()),
            Call::Get("frank".to_string())
        ]
    );
    let state = state_of(&d);
    assert_eq!(state.attributes["teams"], json!(["teamA"]));
    assert_eq!(state.attributes["dns_view_zones"], json!(true));
}

#[tokio::test]
async fn test_update_sends_username_from_id() {
    let api = FakeUsersApi::new().with_user(user("frank", &[]));
    let mut d = update_data(
        json!({"name": "Frank", "username": "frank", "email": "f@example.com"}),
        json!({"name": "Frank", "username": "frank", "email": "new@example.com"}),
    );

    user_update(&mut d, &api).await.unwrap();

    let stored = api.stored("frank").unwrap();
    assert_eq!(stored.email, "new@example.com");
    assert_eq!(state_of(&d).id, "frank");
}

// ─────────────────────────────────────────────────────────────────────────────
// Delete / import
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_clears_id() {
    let api = FakeUsersApi::new().with_user(user("gina", &[]));
    let mut d = ResourceData::from_state(Arc::new(user_schema()), &existing("gina", json!({})));

    user_delete(&mut d, &api).await.unwrap();

    assert!(d.state().is_none());
    assert!(api.stored("gina").is_none());
}

#[tokio::test]
async fn test_delete_clears_id_even_when_api_fails() {
    let api = FakeUsersApi::new().failing_delete(|| Ns1Error::ApiError("DELETE failed: 500".to_string()));
    let mut d = ResourceData::from_state(Arc::new(user_schema()), &existing("gina", json!({})));

    let err = user_delete(&mut d, &api).await.unwrap_err();

    assert_eq!(err.to_string(), "DELETE failed: 500");
    assert_eq!(d.id(), "");
    assert_eq!(api.calls(), vec![Call::Delete("gina".to_string())]);
}

#[test]
fn test_import_seeds_username_from_id() {
    let mut d = ResourceData::new(Arc::new(user_schema()), "henry", Default::default(), None);
    user_import(&mut d).unwrap();
    assert_eq!(d.get_string("username").unwrap(), "henry");

    let mut empty = ResourceData::new(Arc::new(user_schema()), "", Default::default(), None);
    assert!(matches!(
        user_import(&mut empty),
        Err(Ns1Error::MissingRequired(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_schema_declares_user_fields() {
    let schema = user_schema();

    assert!(schema["name"].required);
    assert!(schema["email"].required);
    assert!(schema["username"].required && schema["username"].force_new);
    assert!(schema["notify"].optional && schema["notify"].computed);
    assert!(schema["dns_view_zones"].computed);
    assert!(schema["teams"].optional);
    assert!(schema.contains_key("account_manage_users"));
    assert!(schema.contains_key("dns_zones_allow"));
}

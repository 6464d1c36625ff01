//! REST store tests against a mock PostgREST server.

use govern_store::{RemoteStore, RestStore, StoreConfig, StoreError};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn store_for(server: &MockServer) -> RestStore {
    let config = StoreConfig::new(server.uri()).with_anon_key("anon-key");
    RestStore::new(config).unwrap()
}

#[tokio::test]
async fn test_list_organizations_decodes_rows() {
    let server = MockServer::start().await;
    let group = Uuid::now_v7();
    let unit = Uuid::now_v7();

    Mock::given(method("GET"))
        .and(path("/rest/v1/organizations"))
        .and(query_param(
            "select",
            "id,parent_id,name,org_type,metadata,created_at",
        ))
        .and(query_param("order", "name.asc"))
        .and(header("apikey", "anon-key"))
        .and(header("Authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": group,
                "parent_id": null,
                "name": "Acme Group",
                "org_type": "enterprise",
                "metadata": {"region": "eu", "employees": 1200},
                "created_at": "2024-03-01T10:00:00Z"
            },
            {
                "id": unit,
                "parent_id": group,
                "name": "Acme Payments",
                "org_type": null,
                "metadata": null,
                "created_at": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let organizations = store_for(&server).await.list_organizations().await.unwrap();

    assert_eq!(organizations.len(), 2);
    assert_eq!(organizations[0].metadata.get_text("region"), Some("eu"));
    assert_eq!(organizations[0].metadata.get_integer("employees"), Some(1200));
    assert_eq!(organizations[1].parent_id, Some(group));
    assert!(organizations[1].metadata.is_empty());
}

#[tokio::test]
async fn test_list_memberships_filters_by_user_with_access_token() {
    let server = MockServer::start().await;
    let user_id = Uuid::now_v7();
    let org_id = Uuid::now_v7();

    Mock::given(method("GET"))
        .and(path("/rest/v1/organization_members"))
        .and(query_param("select", "org_id,user_id,role,created_at"))
        .and(query_param("user_id", format!("eq.{}", user_id)))
        .and(header("apikey", "anon-key"))
        .and(header("Authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"org_id": org_id, "user_id": user_id, "role": "manager", "created_at": null},
            {"org_id": null, "user_id": user_id, "role": "admin"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await.with_access_token("user-token");
    let rows = store.list_memberships_for_user(user_id).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].org_id, Some(org_id));
    assert_eq!(rows[0].role.as_deref(), Some("manager"));
    assert!(rows[1].org_id.is_none());
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/organizations"))
        .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
        .mount(&server)
        .await;

    let result = store_for(&server).await.list_organizations().await;
    assert!(matches!(result, Err(StoreError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_server_error_is_transient_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/organizations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .await
        .list_organizations()
        .await
        .unwrap_err();

    match &err {
        StoreError::ApiError { status, message } => {
            assert_eq!(*status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": Uuid::now_v7(), "name": "Acme", "metadata": [1, 2, 3]}
        ])))
        .mount(&server)
        .await;

    let result = store_for(&server).await.list_organizations().await;
    assert!(matches!(result, Err(StoreError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_unreachable_store_is_unavailable() {
    let store = RestStore::new(StoreConfig::new("http://127.0.0.1:1")).unwrap();
    let result = store.list_organizations().await;

    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

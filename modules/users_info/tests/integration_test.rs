//! Integration-style tests for the users_info module.
//!
//! Key points:
//! - Each test runs on a fresh in-memory store.
//! - REST is exercised through the real ingress stack (`api_ingress`), so the
//!   responses are exactly what a client sees.
//! - The local client is tested against the same service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::Barrier;
use tower::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};
use users_info::{
    config::UsersInfoConfig,
    contract::{
        error::UsersInfoError,
        model::{NewUser, User},
    },
    domain::{
        repo::UsersRepository,
        service::{Service, ServiceConfig},
    },
    infra::storage::InMemoryUsersRepository,
    UsersInfo,
};

fn create_test_router_with(config: UsersInfoConfig) -> (UsersInfo, Router) {
    let module = UsersInfo::new(config);
    let router = ApiIngress::new(ApiIngressConfig::default())
        .build_router(module.router(), Some(module.openapi()))
        .expect("router should build");
    (module, router)
}

fn create_test_router() -> Router {
    create_test_router_with(UsersInfoConfig::default()).1
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post_user(router: &Router, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn users_count(router: &Router) -> u64 {
    let (status, dump) = get(router, "/debug/users").await;
    assert_eq!(status, StatusCode::OK);
    dump["users_count"].as_u64().unwrap()
}

#[tokio::test]
async fn ann_scenario() {
    let router = create_test_router();

    let (status, body) = post_user(&router, json!({"id": 1, "name": "Ann", "email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Ann", "email": "a@x.com"}));

    let (status, body) = post_user(&router, json!({"id": 2, "name": "Ann", "email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User already exists");

    let (status, body) = get(&router, "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 1, "name": "Ann", "email": "a@x.com"}]));
}

#[tokio::test]
async fn unique_creations_grow_the_store_by_one() {
    let router = create_test_router();

    for i in 1..=5 {
        let input = json!({"id": i, "name": format!("User {i}"), "email": format!("u{i}@x.com")});
        let before = users_count(&router).await;
        let (status, body) = post_user(&router, input.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, input);
        assert_eq!(users_count(&router).await, before + 1);
    }
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_insert() {
    let router = create_test_router();
    post_user(&router, json!({"id": 1, "name": "A", "email": "same@x.com"})).await;

    let (status, body) = post_user(&router, json!({"id": 9, "name": "B", "email": "same@x.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User already exists");
    assert_eq!(body["code"], "USERS_ALREADY_EXISTS");
    assert_eq!(body["instance"], "/users");
    assert_eq!(users_count(&router).await, 1);

    // Case-sensitive exact match: a different spelling is a different email
    let (status, _) = post_user(&router, json!({"id": 2, "name": "C", "email": "SAME@x.com"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn blank_name_fails_validation() {
    let router = create_test_router();

    for name in ["", "   ", "\t\n"] {
        let (status, body) = post_user(&router, json!({"id": 1, "name": name, "email": "a@x.com"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "name {name:?}");
        assert_eq!(body["errors"][0]["pointer"], "/name");
        assert_eq!(body["errors"][0]["detail"], "Name is required");
    }

    let (status, body) = post_user(&router, json!({"id": 1, "email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/name");

    assert_eq!(users_count(&router).await, 0);
}

#[tokio::test]
async fn email_without_at_fails_validation() {
    let router = create_test_router();

    let (status, body) = post_user(&router, json!({"id": 1, "name": "Ann", "email": "ax.com"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/email");
    assert_eq!(body["errors"][0]["detail"], "Email must contain @");
    assert_eq!(users_count(&router).await, 0);
}

#[tokio::test]
async fn all_violations_are_reported_together() {
    let router = create_test_router();

    let (status, body) = post_user(&router, json!({"id": 1, "name": " ", "email": "nope"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let pointers: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["pointer"].as_str().unwrap())
        .collect();
    assert_eq!(pointers, vec!["/name", "/email"]);
}

#[tokio::test]
async fn id_must_be_an_integer() {
    let router = create_test_router();

    let (status, body) = post_user(&router, json!({"name": "Ann", "email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/id");

    let (status, body) = post_user(&router, json!({"id": "one", "name": "Ann", "email": "a@x.com"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/id");

    assert_eq!(users_count(&router).await, 0);
}

#[tokio::test]
async fn malformed_json_is_unprocessable() {
    let router = create_test_router();

    let (status, body) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

async fn post_raw(router: &Router, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri("/users");
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    send(router, builder.body(Body::from(body.to_string())).unwrap()).await
}

#[tokio::test]
async fn body_without_content_type_is_read_as_json() {
    let router = create_test_router();

    let (status, body) = post_raw(&router, None, r#"{"id":1,"name":"Ann","email":"a@x.com"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Ann", "email": "a@x.com"}));
    assert_eq!(users_count(&router).await, 1);
}

#[tokio::test]
async fn non_json_content_type_is_unprocessable() {
    let router = create_test_router();

    for ct in ["text/plain", "application/x-www-form-urlencoded"] {
        let (status, body) =
            post_raw(&router, Some(ct), r#"{"id":1,"name":"Ann","email":"a@x.com"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "content-type {ct}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"][0]["pointer"], "/body");
    }
    assert_eq!(users_count(&router).await, 0);
}

#[tokio::test]
async fn get_user_by_id() {
    let router = create_test_router();
    post_user(&router, json!({"id": 42, "name": "Zed", "email": "z@x.com"})).await;

    let (status, body) = get(&router, "/users/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 42, "name": "Zed", "email": "z@x.com"}));

    let (status, body) = get(&router, "/users/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");

    let (status, body) = get(&router, "/users/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/path");
}

#[tokio::test]
async fn duplicate_id_returns_first_record() {
    let router = create_test_router();
    post_user(&router, json!({"id": 1, "name": "First", "email": "1@x.com"})).await;
    let (status, _) = post_user(&router, json!({"id": 1, "name": "Second", "email": "2@x.com"})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&router, "/users/1").await;
    assert_eq!(body["name"], "First");
}

#[tokio::test]
async fn enforce_unique_ids_rejects_taken_id() {
    let (_, router) = create_test_router_with(UsersInfoConfig {
        enforce_unique_ids: true,
        ..Default::default()
    });
    post_user(&router, json!({"id": 1, "name": "First", "email": "1@x.com"})).await;

    let (status, body) = post_user(&router, json!({"id": 1, "name": "Second", "email": "2@x.com"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User already exists");
    assert_eq!(users_count(&router).await, 1);
}

#[tokio::test]
async fn list_slices_with_skip_and_limit() {
    let router = create_test_router();
    for (id, name) in [(1, "A"), (2, "B"), (3, "C")] {
        post_user(&router, json!({"id": id, "name": name, "email": format!("{name}@x.com")})).await;
    }

    let (status, body) = get(&router, "/users?skip=1&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 2, "name": "B", "email": "B@x.com"}]));

    let (_, body) = get(&router, "/users?skip=10").await;
    assert_eq!(body, json!([]));

    let (_, body) = get(&router, "/users?skip=-1").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 3);

    let (_, body) = get(&router, "/users?limit=0").await;
    assert_eq!(body, json!([]));

    let (status, body) = get(&router, "/users?limit=many").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["pointer"], "/query");
}

#[tokio::test]
async fn default_limit_is_one_hundred() {
    let (module, router) = create_test_router_with(UsersInfoConfig::default());
    let client = module.client();
    for i in 0..120 {
        client
            .create_user(NewUser {
                id: i,
                name: format!("n{i}"),
                email: format!("{i}@x.com"),
            })
            .await
            .unwrap();
    }

    let (_, body) = get(&router, "/users").await;
    assert_eq!(body.as_array().unwrap().len(), 100);

    let (_, body) = get(&router, "/users?limit=1000").await;
    assert_eq!(body.as_array().unwrap().len(), 120);
}

#[tokio::test]
async fn max_limit_caps_page_size() {
    let (module, router) = create_test_router_with(UsersInfoConfig {
        max_limit: Some(2),
        ..Default::default()
    });
    let client = module.client();
    for i in 0..5 {
        client
            .create_user(NewUser {
                id: i,
                name: "n".into(),
                email: format!("{i}@x.com"),
            })
            .await
            .unwrap();
    }

    let (_, body) = get(&router, "/users?limit=50").await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn health_is_ok_regardless_of_store() {
    let router = create_test_router();
    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK"}));

    post_user(&router, json!({"id": 1, "name": "Ann", "email": "a@x.com"})).await;
    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK"}));
}

#[tokio::test]
async fn debug_dump_shows_count_and_contents() {
    let router = create_test_router();
    post_user(&router, json!({"id": 1, "name": "Ann", "email": "a@x.com"})).await;
    post_user(&router, json!({"id": 2, "name": "Bob", "email": "b@x.com"})).await;

    let (status, body) = get(&router, "/debug/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "users_count": 2,
            "users": [
                {"id": 1, "name": "Ann", "email": "a@x.com"},
                {"id": 2, "name": "Bob", "email": "b@x.com"}
            ]
        })
    );
}

#[tokio::test]
async fn debug_route_can_be_hidden() {
    let (_, router) = create_test_router_with(UsersInfoConfig {
        expose_debug_routes: false,
        ..Default::default()
    });
    let (status, _) = get(&router, "/debug/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, doc) = get(&router, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc.pointer("/paths/~1debug~1users").is_none());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let router = create_test_router();
    let (status, doc) = get(&router, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc.pointer("/paths/~1users/post").is_some());
    assert!(doc.pointer("/paths/~1users~1{id}/get").is_some());
}

/// Releases `racers` creations with one shared email at the same instant and
/// returns `(accepted, stored)`.
async fn race_same_email(service: Arc<Service>, racers: usize) -> Result<(usize, usize)> {
    let barrier = Arc::new(Barrier::new(racers));
    let mut tasks = Vec::with_capacity(racers);
    for i in 0..racers {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            service
                .create_user(NewUser {
                    id: i as i64,
                    name: "racer".into(),
                    email: "race@x.com".into(),
                })
                .await
        }));
    }

    let mut created = 0;
    for task in tasks {
        if task.await?.is_ok() {
            created += 1;
        }
    }
    Ok((created, service.count_users().await?))
}

/// Store that keeps the default lookup-then-append `insert_unique` and pauses
/// after every email lookup.
#[derive(Default)]
struct CheckThenAppendRepository {
    inner: InMemoryUsersRepository,
}

#[async_trait]
impl UsersRepository for CheckThenAppendRepository {
    async fn append(&self, user: User) -> Result<()> {
        self.inner.append(user).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let found = self.inner.find_by_email(email).await?;
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(found)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.inner.find_by_id(id).await
    }

    async fn slice(&self, skip: i64, limit: i64) -> Result<Vec<User>> {
        self.inner.slice(skip, limit).await
    }

    async fn all(&self) -> Result<Vec<User>> {
        self.inner.all().await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_duplicate_creations_insert_once() -> Result<()> {
    let module = UsersInfo::default();

    let (created, stored) = race_same_email(module.service(), 32).await?;
    assert_eq!(created, 1);
    assert_eq!(stored, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn lookup_then_append_store_lets_duplicates_through() -> Result<()> {
    let service = Arc::new(Service::new(
        Arc::new(CheckThenAppendRepository::default()),
        ServiceConfig::default(),
    ));

    let (created, stored) = race_same_email(service, 32).await?;
    assert!(created > 1, "expected the race to be observable, got {created}");
    assert_eq!(stored, created);
    Ok(())
}

#[tokio::test]
async fn local_client_maps_errors_to_contract() -> Result<()> {
    let module = UsersInfo::default();
    let client = module.client();

    let user = client
        .create_user(NewUser {
            id: 1,
            name: "Ann".into(),
            email: "a@x.com".into(),
        })
        .await?;
    assert_eq!(client.get_user(1).await?, user);
    assert_eq!(client.list_users(None, None).await?, vec![user]);
    assert_eq!(client.count_users().await?, 1);

    let err = client.get_user(2).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<UsersInfoError>(),
        Some(&UsersInfoError::not_found(2))
    );

    let err = client
        .create_user(NewUser {
            id: 2,
            name: "Ann".into(),
            email: "a@x.com".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UsersInfoError>(),
        Some(UsersInfoError::Conflict { .. })
    ));

    let err = client
        .create_user(NewUser {
            id: 3,
            name: "".into(),
            email: "c@x.com".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UsersInfoError>(),
        Some(UsersInfoError::Validation { .. })
    ));
    Ok(())
}

use std::sync::Arc;
use std::time::Duration;

use projectdesk_api::multipart::{Form, Part};
use projectdesk_api::session::{TOKEN_KEY, USER_KEY};
use projectdesk_api::{
    encode, Client, ClientConfig, CredentialStore, Error, MemoryCredentialStore, MemoryNavigator,
    Navigator, SortDescriptor, TableQueryOptions, NETWORK_ERROR_MESSAGE,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

struct Harness {
    client: Client,
    store: Arc<MemoryCredentialStore>,
    nav: Arc<MemoryNavigator>,
}

fn harness(base_url: &str, start_path: &str) -> Harness {
    let store = Arc::new(MemoryCredentialStore::new());
    let nav = Arc::new(MemoryNavigator::new(start_path));
    let client = Client::with_base_url(base_url, store.clone(), nav.clone()).unwrap();
    Harness { client, store, nav }
}

#[tokio::test]
async fn get_list_unwraps_envelope_and_pagination() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "20"))
        .and(query_param("sortBy", "createdAt"))
        .and(query_param("sortOrder", "desc"))
        .and(query_param("filters[status]", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("projects_page.json")))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/projects");
    let params = encode(
        &TableQueryOptions::default()
            .with_page_index(1)
            .with_page_size(20)
            .with_sort(SortDescriptor::desc("createdAt"))
            .with_filter("status", "pending"),
    );
    let resp = h
        .client
        .get_list::<Value>("/projects", &params)
        .await
        .unwrap();

    assert_eq!(resp.data.len(), 2);
    assert_eq!(resp.data[0]["id"], 101);
    assert_eq!(resp.page, 2);
    assert_eq!(resp.page_size, 20);
    assert_eq!(resp.total_count, 45);
    assert_eq!(resp.total_pages, 3);
}

#[tokio::test]
async fn get_list_accepts_legacy_bare_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/proposals"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("proposals_legacy.json")),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/proposals");
    let resp = h
        .client
        .get_list::<Value>("/proposals", &Default::default())
        .await
        .unwrap();
    assert_eq!(resp.total_count, 3);
    assert_eq!(resp.total_pages, 1);
}

#[tokio::test]
async fn get_list_accepts_unwrapped_paged_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/requests"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("requests_nested.json")),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/requests");
    let resp = h
        .client
        .get_list::<Value>("/requests", &Default::default())
        .await
        .unwrap();
    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.total_count, 1);
    assert_eq!(resp.page_size, 10);
}

#[tokio::test]
async fn bearer_token_is_attached_when_stored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"id": 1}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/");
    h.store.set(TOKEN_KEY, "secret-token".to_string());
    let resp = h.client.get::<Value>("/me").await.unwrap();
    assert_eq!(resp.data, json!({"id": 1}));
}

#[tokio::test]
async fn no_authorization_header_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/");
    let resp = h.client.get::<Option<Value>>("/public").await.unwrap();
    assert_eq!(resp.data, None);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn null_data_is_a_result_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/periods/active/evaluation"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": null, "message": "No open period"})),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/");
    let resp = h
        .client
        .get::<Option<Value>>("/periods/active/evaluation")
        .await
        .unwrap();
    assert_eq!(resp.data, None);
    assert_eq!(resp.message.as_deref(), Some("No open period"));
}

#[tokio::test]
async fn multipart_upload_lets_transport_set_boundary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents"))
        .and(header_regex("content-type", "^multipart/form-data; boundary=.+$"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {"id": 9}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/documents");
    let form = Form::new()
        .text("title", "Chapter 1 draft")
        .part("file", Part::bytes(b"%PDF-1.4".to_vec()).file_name("draft.pdf"));
    let resp = h.client.upload::<Value>("/documents", form).await.unwrap();
    assert_eq!(resp.data["id"], 9);
}

#[tokio::test]
async fn json_body_is_sent_as_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/proposals"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {"id": 12}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/proposals/new");
    let resp = h
        .client
        .post::<Value>("/proposals", &json!({"title": "Edge caching study"}))
        .await
        .unwrap();
    assert_eq!(resp.data["id"], 12);
}

#[tokio::test]
async fn download_bypasses_envelope() {
    let mock_server = MockServer::start().await;
    let raw = br#"{"success":true,"data":"not unwrapped"}"#.to_vec();

    Mock::given(method("GET"))
        .and(path("/documents/4/file"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(raw.clone()),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/documents");
    let bytes = h.client.download("/documents/4/file").await.unwrap();
    assert_eq!(bytes, raw);
}

#[tokio::test]
async fn unauthorized_clears_credentials_and_redirects_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"success": false, "message": "Token expired"})),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/projects");
    h.store.set(TOKEN_KEY, "stale".to_string());
    h.store.set(USER_KEY, r#"{"id":3}"#.to_string());

    let err = h.client.get::<Value>("/projects/1").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }));
    assert_eq!(err.message(), "Token expired");
    assert_eq!(err.status(), Some(401));
    assert_eq!(h.store.get(TOKEN_KEY), None);
    assert_eq!(h.store.get(USER_KEY), None);
    assert_eq!(h.nav.redirects(), vec!["/login".to_string()]);

    // Already on the login route: no second navigation.
    let _ = h.client.get::<Value>("/projects/1").await.unwrap_err();
    assert_eq!(h.nav.redirects().len(), 1);
    assert_eq!(h.nav.current_path(), "/login");
}

#[tokio::test]
async fn unauthorized_on_login_route_does_not_navigate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/login");
    let err = h
        .client
        .login(&projectdesk_api::types::Credentials {
            email: "student@uni.edu".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized { .. }));
    assert_eq!(err.message(), "Unauthorized");
    assert!(h.nav.redirects().is_empty());
}

#[tokio::test]
async fn validation_errors_are_surfaced_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(load_fixture("validation_error.json")),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/projects/new");
    let err = h
        .client
        .post::<Value>("/projects", &json!({"title": ""}))
        .await
        .unwrap_err();
    let api = err.to_api_error();
    assert_eq!(api.status, Some(422));
    assert_eq!(api.message, "The given data was invalid.");
    assert_eq!(api.errors["title"], vec!["The title field is required."]);
    assert!(matches!(err, Error::Validation { .. }));
}

#[tokio::test]
async fn server_error_falls_back_to_status_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/documents");
    let err = h
        .client
        .get_list::<Value>("/documents", &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Server { status: 500, .. }));
    assert_eq!(err.message(), "Internal Server Error");
}

#[tokio::test]
async fn unknown_status_falls_back_to_default_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/registrations"))
        .respond_with(ResponseTemplate::new(599))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/");
    let err = h.client.get::<Value>("/registrations").await.unwrap_err();
    assert_eq!(err.message(), projectdesk_api::DEFAULT_ERROR_MESSAGE);
    assert_eq!(err.status(), Some(599));
}

#[tokio::test]
async fn connection_failure_is_network_error() {
    // Nothing listens on port 9 locally.
    let h = harness("http://127.0.0.1:9", "/");
    let err = h.client.get::<Value>("/projects").await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.status(), None);
    assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    assert!(h.nav.redirects().is_empty());
}

#[tokio::test]
async fn timeout_looks_like_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": 1}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let nav = Arc::new(MemoryNavigator::default());
    let config = ClientConfig::default()
        .with_base_url(&mock_server.uri())
        .with_timeout(Duration::from_millis(200));
    let client = Client::new(config, store, nav).unwrap();

    let err = client.get::<Value>("/slow").await.unwrap_err();
    assert_eq!(err, Error::network());
}

#[tokio::test]
async fn login_stores_token_and_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": "fresh", "user": {"id": 5, "role": "advisor"}}
        })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/login");
    let session = h
        .client
        .login(&projectdesk_api::types::Credentials {
            email: "advisor@uni.edu".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();
    assert_eq!(session.token, "fresh");
    assert_eq!(h.store.token().as_deref(), Some("fresh"));
    assert_eq!(h.client.current_user().unwrap()["role"], "advisor");

    h.client.logout();
    assert_eq!(h.store.token(), None);
    assert_eq!(h.client.current_user(), None);
}

#[tokio::test]
async fn non_json_list_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/");
    let err = h
        .client
        .get_list::<Value>("/projects", &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn plain_text_body_passes_through_as_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), "/");
    let resp = h.client.get::<Value>("/health").await.unwrap();
    assert_eq!(resp.data, Value::String("OK".to_string()));
    assert_eq!(resp.message, None);

    // Typed callers still see a decode failure.
    let err = h.client.get::<Vec<i64>>("/health").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

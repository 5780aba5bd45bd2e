use projectdesk_api::types::{ApiResponse, ResponseBody};
use projectdesk_api::{decode, RawList};
use serde::Deserialize;
use serde_json::Value;

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRow {
    id: i64,
    title: String,
    status: String,
    created_at: String,
}

fn normalized(name: &str) -> ApiResponse<Value> {
    let body: ResponseBody = serde_json::from_str(&load_fixture(name)).unwrap();
    body.into()
}

#[test]
fn deserialize_enveloped_project_page() {
    let resp = normalized("projects_page.json");
    assert_eq!(resp.message.as_deref(), Some("Projects retrieved"));
    assert!(resp.pagination.is_some());

    let raw = RawList::<ProjectRow>::from_parts(resp.data, resp.pagination).unwrap();
    let table = decode(&raw);
    assert_eq!(table.data.len(), 2);
    assert_eq!(table.data[0].id, 101);
    assert_eq!(table.data[0].status, "pending");
    assert_eq!(table.data[1].title, "Course scheduling with constraint solvers");
    assert_eq!(table.data[1].created_at, "2024-02-27T08:00:00Z");
    assert_eq!(
        (table.page, table.page_size, table.total_count, table.total_pages),
        (2, 20, 45, 3)
    );
}

#[test]
fn deserialize_legacy_array() {
    let resp = normalized("proposals_legacy.json");
    assert_eq!(resp.pagination, None);
    let raw = RawList::<Value>::from_parts(resp.data, resp.pagination).unwrap();
    assert!(matches!(raw, RawList::Bare(ref rows) if rows.len() == 3));
    assert_eq!(decode(&raw).total_count, 3);
}

#[test]
fn deserialize_unwrapped_paged_object() {
    let body: ResponseBody = serde_json::from_str(&load_fixture("requests_nested.json")).unwrap();
    assert!(matches!(body, ResponseBody::Bare(_)));
    let resp = ApiResponse::from(body);
    let raw = RawList::<Value>::from_parts(resp.data, resp.pagination).unwrap();
    let table = decode(&raw);
    assert_eq!(table.total_pages, 1);
    assert_eq!(table.data[0]["kind"], "advisor_change");
}

#[test]
fn deserialize_error_envelope() {
    let body: ResponseBody = serde_json::from_str(&load_fixture("validation_error.json")).unwrap();
    match body {
        ResponseBody::Enveloped(envelope) => {
            assert!(!envelope.success);
            assert_eq!(envelope.data, Value::Null);
            assert_eq!(envelope.message().as_deref(), Some("The given data was invalid."));
            assert_eq!(envelope.errors().len(), 2);
        }
        ResponseBody::Bare(_) => panic!("expected an envelope"),
    }
}

#[test]
fn table_response_serializes_camel_case() {
    let resp = normalized("projects_page.json");
    let table = decode(&RawList::<Value>::from_parts(resp.data, resp.pagination).unwrap());
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["totalCount"], 45);
    assert_eq!(json["pageSize"], 20);
    assert_eq!(json["totalPages"], 3);
}

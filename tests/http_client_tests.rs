// tests/http_client_tests.rs
//! The reqwest-backed repository against a stub Notion server.

mod common;

use common::{fixture, DATABASE_ID, PAGE_ID};
use notion_mirror::{
    ApiKey, AppError, BlockId, ClientConfig, CursorPolicy, DatabaseId, NotionClientError,
    NotionErrorCode, NotionHttpClient, NotionRepository, PageId,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "secret_abcdefghijklmnopqrstuvwxyz";

fn client_for(server: &MockServer, cursors: CursorPolicy) -> NotionHttpClient {
    let key = ApiKey::new(API_KEY).unwrap();
    let config = ClientConfig {
        cursors,
        ..ClientConfig::default()
    };
    NotionHttpClient::new(Some(&key), &config)
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
}

fn paragraph(id: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "id": id,
        "type": "paragraph",
        "has_children": false,
        "paragraph": {"rich_text": [{"type": "text", "plain_text": text}]}
    })
}

fn listing(results: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": results,
        "next_cursor": next_cursor,
        "has_more": next_cursor.is_some()
    })
}

#[tokio::test]
async fn retrieve_page_sends_auth_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/pages/{}", PAGE_ID)))
        .and(header("Authorization", format!("Bearer {}", API_KEY).as_str()))
        .and(header("Notion-Version", "2022-06-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture::<Value>("page.json")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, CursorPolicy::FirstPage);
    let page = client
        .retrieve_page(&PageId::parse(PAGE_ID).unwrap())
        .await
        .unwrap();

    assert_eq!(page.id, PAGE_ID);
    assert!(page.properties.contains_key("Pages "));
}

#[tokio::test]
async fn error_envelope_becomes_a_notion_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/pages/{}", PAGE_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page",
            "request_id": "req_42"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, CursorPolicy::FirstPage);
    let err = client
        .retrieve_page(&PageId::parse(PAGE_ID).unwrap())
        .await
        .unwrap_err();

    match err {
        AppError::NotionClient(NotionClientError::NotionApi {
            status,
            code,
            request_id,
            ..
        }) => {
            assert_eq!(status, 404);
            assert_eq!(code, NotionErrorCode::ObjectNotFound);
            assert_eq!(request_id.as_deref(), Some("req_42"));
        }
        other => panic!("Expected NotionApi, got {:?}", other),
    }
}

#[tokio::test]
async fn first_page_policy_stops_after_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/blocks/{}/children", PAGE_ID)))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![paragraph("e0000000-0000-4000-8000-000000000001", "One")],
            Some("cursor-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, CursorPolicy::FirstPage);
    let blocks = client
        .list_children(&BlockId::parse(PAGE_ID).unwrap())
        .await
        .unwrap();

    assert_eq!(blocks.len(), 1);
}

#[tokio::test]
async fn follow_all_policy_walks_every_cursor() {
    let server = MockServer::start().await;
    let children = format!("/blocks/{}/children", PAGE_ID);
    Mock::given(method("GET"))
        .and(path(children.as_str()))
        .and(query_param_is_missing("start_cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![paragraph("e0000000-0000-4000-8000-000000000001", "One")],
            Some("cursor-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(children.as_str()))
        .and(query_param("start_cursor", "cursor-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![paragraph("e0000000-0000-4000-8000-000000000002", "Two")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, CursorPolicy::FollowAll);
    let blocks = client
        .list_children(&BlockId::parse(PAGE_ID).unwrap())
        .await
        .unwrap();

    let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "e0000000-0000-4000-8000-000000000001",
            "e0000000-0000-4000-8000-000000000002"
        ]
    );
}

#[tokio::test]
async fn collection_query_posts_the_page_size() {
    let server = MockServer::start().await;
    let rows = fixture::<Value>("collection_query.json");
    Mock::given(method("POST"))
        .and(path(format!("/databases/{}/query", DATABASE_ID)))
        .and(body_json(json!({"page_size": 100})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, CursorPolicy::FirstPage);
    let pages = client
        .query_collection(&DatabaseId::parse(DATABASE_ID).unwrap())
        .await
        .unwrap();

    assert_eq!(pages.len(), 3);
}

#[tokio::test]
async fn archive_patches_the_page() {
    let server = MockServer::start().await;
    let mut archived = fixture::<Value>("page.json");
    archived["archived"] = json!(true);
    Mock::given(method("PATCH"))
        .and(path(format!("/pages/{}", PAGE_ID)))
        .and(body_json(json!({"archived": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(archived))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, CursorPolicy::FirstPage);
    client
        .archive_page(&PageId::parse(PAGE_ID).unwrap())
        .await
        .unwrap();
}

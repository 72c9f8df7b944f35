//! Integration tests for the table service.
//!
//! The router is driven in-process; no socket is bound.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tabula_server::{app, config::Config, AppState};
use tower::ServiceExt;

fn test_app() -> (Router, AppState) {
    let state = AppState::new(Config::default());
    (app(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

fn fail_codes() -> Value {
    let records: Vec<Value> = (1..=25)
        .map(|i| {
            let description = if i % 5 == 0 { "Open circuit" } else { "Short" };
            json!({
                "id": i,
                "code": format!("E{:02}", i),
                "description": description,
                "count": i * 3,
                "active": i <= 15
            })
        })
        .collect();

    json!({
        "name": "fail_codes",
        "fields": [
            {"name": "code", "label": "Fail Code", "type": "string"},
            {"name": "description", "label": "Description", "type": "string"},
            {"name": "count", "label": "Count", "type": "number"},
            {"name": "active", "label": "Active", "type": "boolean"}
        ],
        "records": records
    })
}

#[tokio::test]
async fn health_and_root() {
    let (app, _) = test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tables"], 0);

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Tabula Table Server".into()));
}

#[tokio::test]
async fn create_list_and_delete() {
    let (app, _) = test_app();

    let (status, body) = send(&app, "POST", "/tables", Some(fail_codes())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"name": "fail_codes", "totalRecords": 25}));

    let (status, body) = send(&app, "POST", "/tables", Some(fail_codes())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Table already exists");

    let (_, body) = send(&app, "GET", "/tables", None).await;
    assert_eq!(body, json!([{"name": "fail_codes", "totalRecords": 25}]));

    let (status, _) = send(&app, "DELETE", "/tables/fail_codes", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/tables/fail_codes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], "fail_codes");
}

#[tokio::test]
async fn create_rejects_names_unfit_for_filenames() {
    let (app, _) = test_app();

    for name in ["quote\"name", "line\nbreak"] {
        let mut definition = fail_codes();
        definition["name"] = json!(name);
        let (status, body) = send(&app, "POST", "/tables", Some(definition)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["tables"], 0);
}

#[tokio::test]
async fn view_paginates() {
    let (app, _) = test_app();
    send(&app, "POST", "/tables", Some(fail_codes())).await;

    let (status, view) = send(&app, "GET", "/tables/fail_codes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["rows"].as_array().unwrap().len(), 10);
    assert_eq!(view["totalItems"], 25);
    assert_eq!(view["totalPages"], 3);
    assert_eq!(view["page"], 1);
}

#[tokio::test]
async fn commands_drive_the_view() {
    let (app, _) = test_app();
    send(&app, "POST", "/tables", Some(fail_codes())).await;
    let uri = "/tables/fail_codes/commands";

    let (status, outcome) = send(&app, "POST", uri, Some(json!({"type": "setPage", "page": 99}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["view"]["page"], 3);

    let (_, outcome) = send(
        &app,
        "POST",
        uri,
        Some(json!({"type": "setSort", "field": "count", "direction": "desc"})),
    )
    .await;
    assert_eq!(outcome["view"]["rows"][0]["code"], "E25");

    let (_, outcome) = send(
        &app,
        "POST",
        uri,
        Some(json!({"type": "setSearchTerm", "term": "open"})),
    )
    .await;
    assert_eq!(outcome["view"]["totalItems"], 5);
    assert_eq!(outcome["view"]["page"], 1);

    let (_, outcome) = send(
        &app,
        "POST",
        uri,
        Some(json!({"type": "selectAllVisible", "included": true})),
    )
    .await;
    assert_eq!(outcome["selected"].as_array().unwrap().len(), 5);

    let (_, outcome) = send(&app, "POST", uri, Some(json!({"type": "removeSelected"}))).await;
    assert_eq!(outcome["removed"], 5);
    assert_eq!(outcome["view"]["totalItems"], 0);

    let (_, list) = send(&app, "GET", "/tables", None).await;
    assert_eq!(list[0]["totalRecords"], 20);
}

#[tokio::test]
async fn command_errors() {
    let (app, _) = test_app();
    send(&app, "POST", "/tables", Some(fail_codes())).await;

    let (status, body) = send(
        &app,
        "POST",
        "/tables/fail_codes/commands",
        Some(json!({"type": "add", "record": {"id": 3, "code": "dup"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "record already exists: 3");

    let (status, _) = send(
        &app,
        "POST",
        "/tables/missing/commands",
        Some(json!({"type": "clearSort"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/tables/fail_codes/commands",
        Some(json!({"type": "truncate"})),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn export_ignores_pagination() {
    let (app, _) = test_app();
    send(&app, "POST", "/tables", Some(fail_codes())).await;
    send(
        &app,
        "POST",
        "/tables/fail_codes/commands",
        Some(json!({
            "type": "setCriteria",
            "criteria": [{"field": "active", "operator": "equals", "value": true}]
        })),
    )
    .await;

    let (status, headers, body) =
        send_raw(&app, "GET", "/tables/fail_codes/export?format=csv", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv;charset=utf-8");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"fail_codes.csv\""
    );
    let csv = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 16);
    assert_eq!(lines[0], "Fail Code,Description,Count,Active");

    let (status, headers, body) =
        send_raw(&app, "GET", "/tables/fail_codes/export?format=json&dated=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"fail_codes_"));
    let rows: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 15);

    let (status, _) = send(&app, "GET", "/tables/fail_codes/export?format=xlsx", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn snapshot_roundtrip() {
    let (app, _) = test_app();
    send(&app, "POST", "/tables", Some(fail_codes())).await;
    send(
        &app,
        "POST",
        "/tables/fail_codes/commands",
        Some(json!({"type": "toggleSelection", "id": 4, "included": true})),
    )
    .await;

    let (status, snapshot) = send(&app, "GET", "/tables/fail_codes/snapshot", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["selection"], json!([4]));
    assert_eq!(snapshot["nextId"], 26);

    let mut definition = fail_codes();
    definition["name"] = json!("copy");
    definition["records"] = json!([]);
    send(&app, "POST", "/tables", Some(definition)).await;

    let (status, view) = send(&app, "PUT", "/tables/copy/snapshot", Some(snapshot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["totalItems"], 25);

    let (_, copy) = send(&app, "GET", "/tables/copy/snapshot", None).await;
    assert_eq!(copy["name"], "copy");
    assert_eq!(copy["selection"], json!([4]));

    let mut bad = copy.clone();
    bad["formatVersion"] = json!(99);
    let (status, _) = send(&app, "PUT", "/tables/copy/snapshot", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seed_from_file() {
    let (app, state) = test_app();
    let path = std::env::temp_dir().join(format!("tabula-seed-{}.json", std::process::id()));
    std::fs::write(&path, json!([fail_codes()]).to_string()).unwrap();

    let created = state.registry.seed_from_file(&path).await.unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(created, 1);

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["tables"], 1);
}

#[tokio::test]
async fn concurrent_commands_are_atomic() {
    let (app, _) = test_app();
    let mut definition = fail_codes();
    definition["records"] = json!([]);
    send(&app, "POST", "/tables", Some(definition)).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            send(
                &app,
                "POST",
                "/tables/fail_codes/commands",
                Some(json!({"type": "add", "record": {"code": format!("C{}", i)}})),
            )
            .await
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        let (status, outcome) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        ids.push(outcome["id"].as_i64().unwrap());
    }
    ids.sort();
    assert_eq!(ids, (1..=20).collect::<Vec<i64>>());
}

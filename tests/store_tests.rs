use mockito::{Matcher, Server};
use serde_json::json;

use taskdeck::api::{ApiClient, ApiError};
use taskdeck::models::{Status, TaskDraft};
use taskdeck::store::TaskStore;

fn wire(id: &str, title: &str, status: &str, updated_at: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "description": "",
        "status": status,
        "priority": "medium",
        "due_date": null,
        "created_at": "2024-12-01T00:00:00",
        "updated_at": updated_at,
    })
}

fn store_for(server: &Server) -> TaskStore {
    TaskStore::new(ApiClient::new(format!("{}/api", server.url())))
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.into(),
        ..TaskDraft::default()
    }
}

async fn seed(server: &mut Server, store: &mut TaskStore, records: serde_json::Value) {
    let m = server
        .mock("GET", "/api/tasks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(records.to_string())
        .create_async()
        .await;
    store.fetch_all().await.unwrap();
    m.remove_async().await;
}

#[tokio::test]
async fn fetch_all_replaces_mirror_in_server_order() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/tasks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                wire("a", "First", "pending", "2024-12-18T00:00:00"),
                wire("b", "Second", "completed", "2024-12-17T00:00:00"),
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let mut store = store_for(&server);
    store.fetch_all().await.unwrap();

    let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert!(!store.is_busy());
}

#[tokio::test]
async fn fetch_all_failure_keeps_previous_mirror() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([wire("a", "Keep me", "pending", "2024-12-18T00:00:00")]),
    )
    .await;

    let _failing = server
        .mock("GET", "/api/tasks")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].title, "Keep me");
    assert!(!store.is_busy());
}

#[tokio::test]
async fn create_inserts_server_task_at_front() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([wire("old", "Existing", "pending", "2024-12-15T00:00:00")]),
    )
    .await;

    let _m = server
        .mock("POST", "/api/tasks")
        .match_body(Matcher::PartialJson(json!({
            "title": "New task",
            "status": "pending",
            "priority": "medium",
            "due_date": null,
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(wire("fresh", "New task", "pending", "2024-12-20T00:00:00").to_string())
        .create_async()
        .await;

    let created = store.create(&draft("New task")).await.unwrap();
    assert_eq!(created.id, "fresh");

    let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["fresh", "old"]);
    assert_eq!(
        store.tasks().iter().filter(|t| t.id == "fresh").count(),
        1
    );
}

#[tokio::test]
async fn failed_create_leaves_mirror_unchanged() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([
            wire("a", "One", "pending", "2024-12-18T00:00:00"),
            wire("b", "Two", "in-progress", "2024-12-17T00:00:00"),
        ]),
    )
    .await;

    let _m = server
        .mock("POST", "/api/tasks")
        .with_status(422)
        .with_body("validation failed")
        .create_async()
        .await;

    let before = store.tasks().to_vec();
    let err = store.create(&draft("Doomed")).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 422, .. }));
    assert_eq!(store.tasks(), before.as_slice());
}

#[tokio::test]
async fn update_replaces_single_match_preserving_created_at() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([
            wire("a", "Old title", "pending", "2024-12-10T00:00:00"),
            wire("b", "Other", "pending", "2024-12-11T00:00:00"),
        ]),
    )
    .await;
    let created_at_before = store.tasks()[0].created_at.clone();

    let _m = server
        .mock("PUT", "/api/tasks/a")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(wire("a", "New title", "in-progress", "2024-12-19T12:00:00").to_string())
        .create_async()
        .await;

    let mut d = draft("New title");
    d.status = Status::InProgress;
    let updated = store.update("a", &d).await.unwrap();

    assert_eq!(updated.title, "New title");
    assert_eq!(store.tasks().iter().filter(|t| t.id == "a").count(), 1);
    let local = store.tasks().iter().find(|t| t.id == "a").unwrap();
    assert_eq!(local.title, "New title");
    assert_eq!(local.status, Status::InProgress);
    assert_eq!(local.created_at, created_at_before);
    assert_eq!(local.updated_at, "2024-12-19T12:00:00");
    // The other element is untouched.
    assert_eq!(store.tasks().iter().find(|t| t.id == "b").unwrap().title, "Other");
}

#[tokio::test]
async fn update_of_unmirrored_id_is_not_reflected_locally() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(&mut server, &mut store, json!([])).await;

    let _m = server
        .mock("PUT", "/api/tasks/ghost")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(wire("ghost", "Elsewhere", "pending", "2024-12-19T00:00:00").to_string())
        .create_async()
        .await;

    store.update("ghost", &draft("Elsewhere")).await.unwrap();
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn failed_update_leaves_mirror_unchanged() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([wire("a", "Untouched", "pending", "2024-12-18T00:00:00")]),
    )
    .await;

    let _m = server
        .mock("PUT", "/api/tasks/a")
        .with_status(404)
        .with_body("Task not found")
        .create_async()
        .await;

    let before = store.tasks().to_vec();
    let err = store.update("a", &draft("Nope")).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert_eq!(store.tasks(), before.as_slice());
}

#[tokio::test]
async fn delete_removes_confirmed_element_only() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([
            wire("a", "Doomed", "pending", "2024-12-18T00:00:00"),
            wire("b", "Survivor", "pending", "2024-12-17T00:00:00"),
        ]),
    )
    .await;

    let _m = server
        .mock("DELETE", "/api/tasks/a")
        .with_status(204)
        .create_async()
        .await;

    store.delete("a").await.unwrap();

    let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["b"]);
}

#[tokio::test]
async fn failed_delete_keeps_element() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([wire("a", "Still here", "pending", "2024-12-18T00:00:00")]),
    )
    .await;

    let _m = server
        .mock("DELETE", "/api/tasks/a")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = store.delete("a").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id, "a");
}

#[tokio::test]
async fn delete_of_unmirrored_id_leaves_mirror_alone() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([wire("a", "Unrelated", "pending", "2024-12-18T00:00:00")]),
    )
    .await;

    let _m = server
        .mock("DELETE", "/api/tasks/ghost")
        .with_status(204)
        .create_async()
        .await;

    store.delete("ghost").await.unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id, "a");
}

#[tokio::test]
async fn fetch_one_refreshes_mirror_entry() {
    let mut server = Server::new_async().await;
    let mut store = store_for(&server);
    seed(
        &mut server,
        &mut store,
        json!([wire("a", "Stale title", "pending", "2024-12-10T00:00:00")]),
    )
    .await;

    let _m = server
        .mock("GET", "/api/tasks/a")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(wire("a", "Fresh title", "in-progress", "2024-12-19T00:00:00").to_string())
        .create_async()
        .await;

    let task = store.fetch_one("a").await.unwrap();
    assert_eq!(task.title, "Fresh title");
    assert_eq!(store.tasks()[0].title, "Fresh title");
    assert_eq!(store.tasks()[0].status, Status::InProgress);
}

#[tokio::test]
async fn non_success_status_is_its_own_error_kind() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/tasks")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let mut store = store_for(&server);
    let err = store.fetch_all().await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/tasks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("this is not json")
        .create_async()
        .await;

    let mut store = store_for(&server);
    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Nothing listens on the discard port.
    let mut store = TaskStore::new(ApiClient::new("http://127.0.0.1:9/api"));
    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(!store.is_busy());
}

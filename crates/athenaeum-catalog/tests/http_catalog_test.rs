use std::sync::Arc;
use std::time::Duration;

use athenaeum_api_client::{ApiClient, Auth};
use athenaeum_catalog::{
    CatalogError, DuplicateTitleGuard, HttpResourceCatalog, LifecycleError, ResourceCatalog,
    ResourceLifecycle,
};
use athenaeum_core::models::{
    AcademicLevel, Category, Department, ListQuery, ResourceId, ResourceMetadata, ResourcePatch,
    Visibility,
};
use serde_json::json;

fn resource_json(id: &str, title: &str, is_deleted: bool) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "description": "Course material",
        "category": "past-questions",
        "department": "physics",
        "fileUrls": ["https://cdn.example/a.pdf"],
        "isDeleted": is_deleted
    })
}

fn envelope(data: serde_json::Value) -> String {
    json!({ "status": "success", "data": data }).to_string()
}

fn catalog(server: &mockito::Server) -> Arc<HttpResourceCatalog> {
    let client = ApiClient::new(
        server.url(),
        Auth::Bearer("tok".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    Arc::new(HttpResourceCatalog::new(client))
}

#[tokio::test]
async fn trash_reads_state_then_toggles_once() {
    let mut server = mockito::Server::new_async().await;
    let get = server
        .mock("GET", "/resources/r1")
        .with_status(200)
        .with_body(envelope(json!({ "resource": resource_json("r1", "Waves", false) })))
        .create_async()
        .await;
    let toggle = server
        .mock("PATCH", "/resources/r1/trash")
        .with_status(200)
        .with_body(envelope(resource_json("r1", "Waves", true)))
        .expect(1)
        .create_async()
        .await;

    let lifecycle = ResourceLifecycle::new(catalog(&server), 2);
    let resource = lifecycle.trash(&ResourceId::new("r1")).await.unwrap();

    get.assert_async().await;
    toggle.assert_async().await;
    assert!(resource.is_deleted);
}

#[tokio::test]
async fn restore_of_active_resource_sends_no_toggle() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/resources/r1")
        .with_status(200)
        .with_body(envelope(resource_json("r1", "Waves", false)))
        .create_async()
        .await;
    let toggle = server
        .mock("PATCH", "/resources/r1/trash")
        .expect(0)
        .create_async()
        .await;

    let lifecycle = ResourceLifecycle::new(catalog(&server), 2);
    let resource = lifecycle.restore(&ResourceId::new("r1")).await.unwrap();

    toggle.assert_async().await;
    assert!(!resource.is_deleted);
}

#[tokio::test]
async fn delete_of_active_resource_never_reaches_the_server() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/resources/r1")
        .with_status(200)
        .with_body(envelope(resource_json("r1", "Waves", false)))
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/resources/r1")
        .expect(0)
        .create_async()
        .await;

    let lifecycle = ResourceLifecycle::new(catalog(&server), 2);
    let err = lifecycle
        .permanently_delete(&ResourceId::new("r1"))
        .await
        .unwrap_err();

    delete.assert_async().await;
    assert!(matches!(err, LifecycleError::NotTrashed(_)));
}

#[tokio::test]
async fn missing_resource_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/resources/gone")
        .with_status(404)
        .with_body(json!({ "status": "error", "message": "Resource not found" }).to_string())
        .create_async()
        .await;

    let err = catalog(&server)
        .get(&ResourceId::new("gone"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(id) if id.as_str() == "gone"));
}

#[tokio::test]
async fn create_without_files_is_rejected_locally() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/resources")
        .expect(0)
        .create_async()
        .await;

    let metadata = ResourceMetadata {
        title: "Waves".to_string(),
        description: "Notes".to_string(),
        category: Category::LectureNotes,
        department: Department::Physics,
        visibility: Visibility::All,
        academic_level: AcademicLevel::All,
    };
    let err = catalog(&server).create(&metadata, &[]).await.unwrap_err();

    create.assert_async().await;
    assert!(matches!(err, CatalogError::InvalidInput(_)));
}

#[tokio::test]
async fn empty_patch_is_rejected_locally() {
    let server = mockito::Server::new_async().await;
    let err = catalog(&server)
        .update(&ResourceId::new("r1"), &ResourcePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidInput(_)));
}

#[tokio::test]
async fn duplicate_guard_fails_open_on_server_error() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/resources")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let guard = DuplicateTitleGuard::new(catalog(&server), 10);
    assert!(!guard.check_duplicate("Waves").await);
    search.assert_async().await;
}

#[tokio::test]
async fn duplicate_guard_finds_existing_title() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/resources")
        .match_query(mockito::Matcher::UrlEncoded(
            "search".into(),
            "waves".into(),
        ))
        .with_status(200)
        .with_body(envelope(json!({
            "resources": [
                resource_json("r1", "Waves and Optics", false),
                resource_json("r2", "WAVES", false)
            ]
        })))
        .create_async()
        .await;

    let guard = DuplicateTitleGuard::new(catalog(&server), 10);
    assert!(guard.check_duplicate(" waves ").await);
}

#[tokio::test]
async fn duplicate_guard_reads_records_carrying_both_ids() {
    let mut server = mockito::Server::new_async().await;
    let mut record = resource_json("65f0", "Quantum Mechanics", false);
    record["id"] = json!("65f0");
    server
        .mock("GET", "/resources")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(envelope(json!({ "resources": [record] })))
        .create_async()
        .await;

    let guard = DuplicateTitleGuard::new(catalog(&server), 10);
    assert!(guard.check_duplicate("quantum mechanics").await);
}

#[tokio::test]
async fn trashed_listing_sends_include_deleted() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/resources")
        .match_query(mockito::Matcher::UrlEncoded(
            "includeDeleted".into(),
            "true".into(),
        ))
        .with_status(200)
        .with_body(envelope(json!({
            "resources": [resource_json("r9", "Old Syllabus", true)]
        })))
        .create_async()
        .await;

    let page = catalog(&server)
        .list(&ListQuery {
            include_deleted: true,
            ..ListQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(page.resources.len(), 1);
    assert!(page.resources[0].is_deleted);
    search.assert_async().await;
}

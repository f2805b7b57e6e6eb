use std::time::Duration;

use athenaeum_api_client::{status_of, ApiClient, Auth, TrackKind};
use athenaeum_core::models::{
    Category, CreateResourceRequest, Department, ListQuery, ResourceDraft, ResourceId,
    ResourcePatch,
};
use bytes::Bytes;
use mockito::Matcher;
use serde_json::json;

fn resource_json(id: &str, title: &str, is_deleted: bool) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "description": "Course material",
        "category": "lecture-notes",
        "department": "computer-science",
        "visibility": "all",
        "academicLevel": "undergraduate",
        "fileUrls": ["https://cdn.example/a.pdf"],
        "downloads": 0,
        "viewCount": 0,
        "isDeleted": is_deleted
    })
}

fn client(server: &mockito::Server) -> ApiClient {
    ApiClient::new(
        server.url(),
        Auth::Bearer("tok".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn search_sends_filters_and_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/resources")
        .match_header("authorization", "Bearer tok")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("search".into(), "Intro to Networks".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "success",
                "data": { "resources": [resource_json("r1", "Intro to Networks", false)] },
                "pagination": { "page": 1, "limit": 10, "total": 1, "totalPages": 1 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = client(&server)
        .search_resources(&ListQuery::title_probe("Intro to Networks", 10))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.resources.len(), 1);
    assert_eq!(page.page_info.total, 1);
    assert_eq!(page.resources[0].resource_id, ResourceId::new("r1"));
}

#[tokio::test]
async fn upload_file_posts_multipart_with_folder() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="folder""#.into()),
            Matcher::Regex("resources".into()),
            Matcher::Regex(r#"filename="notes.pdf""#.into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "status": "success",
                "data": { "fileUrl": "https://cdn.example/resources/notes.pdf", "fileName": "notes.pdf" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let stored = client(&server)
        .upload_file(
            "resources",
            "notes.pdf",
            "application/pdf",
            Bytes::from_static(b"%PDF-1.4"),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(stored.file_url, "https://cdn.example/resources/notes.pdf");
}

#[tokio::test]
async fn upload_file_without_url_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/upload")
        .with_status(200)
        .with_body(json!({ "status": "success", "data": { "fileUrl": "" } }).to_string())
        .create_async()
        .await;

    let err = client(&server)
        .upload_file("resources", "a.txt", "text/plain", Bytes::from_static(b"a"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no file URL"));
}

#[tokio::test]
async fn non_success_status_is_downcastable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/resources/missing")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let err = client(&server)
        .get_resource(&ResourceId::new("missing"))
        .await
        .unwrap_err();
    assert_eq!(status_of(&err), Some(404));
}

#[tokio::test]
async fn create_resource_sends_camel_case_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/resources")
        .match_body(Matcher::PartialJson(json!({
            "title": "Lab Notes",
            "category": "lab-manual",
            "department": "physics",
            "academicLevel": "all",
            "fileUrls": ["https://cdn.example/a", "https://cdn.example/b"]
        })))
        .with_status(201)
        .with_body(
            json!({ "status": "success", "data": { "resource": resource_json("new", "Lab Notes", false) } })
                .to_string(),
        )
        .create_async()
        .await;

    let metadata = ResourceDraft::new("Lab Notes", "Weekly lab write-ups")
        .with_category(Category::LabManual)
        .with_department(Department::Physics)
        .validate_into_metadata()
        .unwrap();
    let urls = vec![
        "https://cdn.example/a".to_string(),
        "https://cdn.example/b".to_string(),
    ];

    let resource = client(&server)
        .create_resource(&CreateResourceRequest {
            metadata: &metadata,
            file_urls: &urls,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resource.resource_id, ResourceId::new("new"));
}

#[tokio::test]
async fn update_toggle_and_delete_hit_resource_paths() {
    let mut server = mockito::Server::new_async().await;
    let update = server
        .mock("PATCH", "/resources/r1")
        .match_body(Matcher::Json(json!({ "title": "Renamed" })))
        .with_status(200)
        .with_body(json!({ "status": "success", "data": resource_json("r1", "Renamed", false) }).to_string())
        .create_async()
        .await;
    let toggle = server
        .mock("PATCH", "/resources/r1/trash")
        .with_status(200)
        .with_body(
            json!({ "status": "success", "data": { "resource": resource_json("r1", "Renamed", true) } })
                .to_string(),
        )
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/resources/r1")
        .with_status(204)
        .create_async()
        .await;

    let api = client(&server);
    let id = ResourceId::new("r1");
    let patch = ResourcePatch {
        title: Some("Renamed".to_string()),
        ..ResourcePatch::default()
    };

    let updated = api.update_resource(&id, &patch).await.unwrap();
    assert_eq!(updated.title, "Renamed");
    let trashed = api.toggle_resource_trash(&id).await.unwrap();
    assert!(trashed.is_deleted);
    api.delete_resource(&id).await.unwrap();

    update.assert_async().await;
    toggle.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn track_ignores_response_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/resources/r1/download")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body("OK")
        .create_async()
        .await;

    client(&server)
        .track(TrackKind::Download, &ResourceId::new("r1"))
        .await
        .unwrap();
    mock.assert_async().await;
}

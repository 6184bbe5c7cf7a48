use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use filedrop::server::{AppState, admin_router, general_router};
use filedrop::storage::FileStore;

const BOUNDARY: &str = "filedrop-test-boundary";

async fn setup() -> (TempDir, Arc<AppState>) {
    let dir = TempDir::new().expect("create temp dir");
    let store = FileStore::new(dir.path());
    store.ensure_roots().await.expect("ensure roots");
    (dir, Arc::new(AppState::new(store)))
}

fn general(state: &Arc<AppState>) -> Router {
    general_router(state.clone())
}

fn admin(state: &Arc<AppState>) -> Router {
    admin_router(state.clone())
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("collect body")
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("parse json body")
}

fn multipart_upload(namespace: &str, files: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"uploadType\"\r\n\r\n{namespace}\r\n"
        )
        .as_bytes(),
    );
    for (name, content) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build upload request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn upload_list_view_delete_lifecycle() {
    let (_dir, state) = setup().await;

    let response = general(&state)
        .oneshot(multipart_upload("client", &[("notes.txt", b"hello")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = body_json(response).await;
    assert_eq!(uploaded["files"][0]["fileName"], "notes.txt");
    assert_eq!(uploaded["files"][0]["size"], 5);

    let response = general(&state).oneshot(get("/api/files/client")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "notes.txt");
    assert_eq!(entries[0]["size"], 5);
    assert_eq!(entries[0]["isDirectory"], false);

    let response = general(&state)
        .oneshot(get("/api/view/client/notes.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["content"], "hello");
    assert_eq!(view["fileName"], "notes.txt");
    assert_eq!(view["fileType"], "txt");

    let response = general(&state)
        .oneshot(delete("/api/files/client/notes.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = general(&state).oneshot(get("/api/files/client")).await.unwrap();
    let listing = body_json(response).await;
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_server_files_is_forbidden_on_the_general_service() {
    let (_dir, state) = setup().await;

    // Forbidden even though the file does not exist.
    let response = general(&state)
        .oneshot(delete("/api/files/server/anything.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // And still forbidden when it does.
    let response = general(&state)
        .oneshot(multipart_upload("server", &[("keep.txt", b"server data")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = general(&state)
        .oneshot(delete("/api/files/server/keep.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert!(body["error"].is_string());

    // The admin service can delete it.
    let response = admin(&state)
        .oneshot(delete("/api/files/server/keep.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn same_name_upload_overwrites() {
    let (_dir, state) = setup().await;

    general(&state)
        .oneshot(multipart_upload("client", &[("notes.txt", b"old content")]))
        .await
        .unwrap();
    general(&state)
        .oneshot(multipart_upload("client", &[("notes.txt", b"new")]))
        .await
        .unwrap();

    let response = general(&state).oneshot(get("/api/files/client")).await.unwrap();
    let listing = body_json(response).await;
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["size"], 3);

    let response = general(&state)
        .oneshot(get("/api/view/client/notes.txt"))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["content"], "new");
}

#[tokio::test]
async fn preview_rejects_extensions_outside_the_allow_list() {
    let (_dir, state) = setup().await;

    general(&state)
        .oneshot(multipart_upload("client", &[("bundle.zip", b"PK\x03\x04data")]))
        .await
        .unwrap();

    // Exists and is readable, but the extension is not allow-listed.
    let response = general(&state)
        .oneshot(get("/api/preview/client/bundle.zip"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    // The plain download path still serves it.
    let response = general(&state)
        .oneshot(get("/api/download/client/bundle.zip"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
}

#[tokio::test]
async fn preview_streams_allowed_files_as_text() {
    let (_dir, state) = setup().await;

    general(&state)
        .oneshot(multipart_upload("client", &[("script.py", b"print('hi')")]))
        .await
        .unwrap();

    let response = general(&state)
        .oneshot(get("/api/preview/client/script.py"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("inline"));
    assert_eq!(body_bytes(response).await, b"print('hi')");
}

#[tokio::test]
async fn download_forces_attachment_with_classified_type() {
    let (_dir, state) = setup().await;

    general(&state)
        .oneshot(multipart_upload("client", &[("notes.txt", b"hello")]))
        .await
        .unwrap();

    let response = general(&state)
        .oneshot(get("/api/download/client/notes.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"notes.txt\""
    );
    assert_eq!(body_bytes(response).await, b"hello");
}

#[tokio::test]
async fn download_missing_file_is_404() {
    let (_dir, state) = setup().await;

    let response = general(&state)
        .oneshot(get("/api/download/client/ghost.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_namespace_is_404() {
    let (_dir, state) = setup().await;

    let response = general(&state).oneshot(get("/api/files/tmp")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_names_are_rejected_before_any_io() {
    let (_dir, state) = setup().await;

    // %2F decodes to a slash inside the name segment.
    let response = general(&state)
        .oneshot(delete("/api/files/client/..%2Fsecret.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = general(&state)
        .oneshot(get("/api/download/client/..%2F..%2Fetc%2Fpasswd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn download_all_produces_a_decodable_archive() {
    use async_compression::tokio::bufread::GzipDecoder;
    use tokio_tar::Archive;

    let (_dir, state) = setup().await;

    general(&state)
        .oneshot(multipart_upload(
            "client",
            &[("a.txt", b"alpha"), ("b.log", b"beta bytes")],
        ))
        .await
        .unwrap();

    let response = general(&state)
        .oneshot(get("/api/download-all/client"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/gzip");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"client-files.tar.gz\""
    );

    let compressed = body_bytes(response).await;
    let unpack_dir = TempDir::new().unwrap();
    Archive::new(GzipDecoder::new(&compressed[..]))
        .unpack(unpack_dir.path())
        .await
        .unwrap();

    let a = std::fs::read(unpack_dir.path().join("a.txt")).unwrap();
    let b = std::fs::read(unpack_dir.path().join("b.log")).unwrap();
    assert_eq!(a, b"alpha");
    assert_eq!(b, b"beta bytes");
    assert_eq!(std::fs::read_dir(unpack_dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn admin_can_edit_and_delete_server_files() {
    let (_dir, state) = setup().await;

    let response = admin(&state).oneshot(get("/api/files/server")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let request = Request::builder()
        .method("PUT")
        .uri("/api/files/server/config.txt")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"content": "retries = 3"}).to_string()))
        .unwrap();
    let response = admin(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The general service sees the admin's edit.
    let response = general(&state)
        .oneshot(get("/api/view/server/config.txt"))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["content"], "retries = 3");

    let response = admin(&state)
        .oneshot(get("/api/download/server/config.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"config.txt\""
    );
    assert_eq!(body_bytes(response).await, b"retries = 3");

    let response = admin(&state)
        .oneshot(delete("/api/files/server/config.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = admin(&state)
        .oneshot(delete("/api/files/server/config.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_service_exposes_no_client_namespace_routes() {
    let (_dir, state) = setup().await;

    let response = admin(&state).oneshot(get("/api/files/client")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = admin(&state)
        .oneshot(get("/api/download/client/a.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_reports_failures_per_file() {
    let (_dir, state) = setup().await;

    // A good file and an unsafe name in the same batch: the good one lands,
    // the bad one is reported, nothing rolls back.
    let response = general(&state)
        .oneshot(multipart_upload(
            "client",
            &[("good.txt", b"fine"), ("..", b"nope")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["files"].as_array().unwrap().len(), 1);
    assert_eq!(body["files"][0]["fileName"], "good.txt");
    assert_eq!(body["failures"].as_array().unwrap().len(), 1);

    let response = general(&state).oneshot(get("/api/files/client")).await.unwrap();
    let listing = body_json(response).await;
    assert_eq!(listing.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_without_files_is_bad_request() {
    let (_dir, state) = setup().await;

    let response = general(&state)
        .oneshot(multipart_upload("client", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/*!
 * Integration Tests for the Media Routes
 *
 * These tests drive the full axum router with the local JSON backend in a
 * temporary directory: upload, list, stream, like/unlike and delete.
 */

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;

use media_catalog::test_helpers::{multipart_body, upload_request, TestContext, TEST_BOUNDARY};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "localhost:4000")
        .body(Body::empty())
        .unwrap()
}

async fn upload(ctx: &TestContext, filename: &str, content_type: &str, data: &[u8]) -> Value {
    let (status, body) = send_json(&ctx.app, upload_request(filename, content_type, data)).await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {}", body);
    body
}

async fn list(ctx: &TestContext) -> Value {
    let (status, body) = send_json(&ctx.app, request("GET", "/api/media")).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_upload_image_then_list() {
    let ctx = TestContext::new().await;

    let record = upload(&ctx, "sunset.png", "image/png", b"\x89PNG fake image").await;
    assert_eq!(record["filename"], "sunset.png");
    assert_eq!(record["type"], "image");
    assert_eq!(record["likes"], 0);
    assert!(record["filepath"].as_str().unwrap().starts_with("/uploads/"));
    assert!(record["filepath"].as_str().unwrap().ends_with("-sunset.png"));

    let listing = list(&ctx).await;
    assert_eq!(listing["total"], 1);
    let item = &listing["media"][0];
    assert_eq!(item["_id"], record["_id"]);
    assert_eq!(item["likes"], 0);
    assert_eq!(item["fileExists"], true);
    assert_eq!(item["isImage"], true);
    assert_eq!(item["isVideo"], false);
    assert_eq!(
        item["viewUrl"],
        format!("http://localhost:4000/api/media/{}", record["_id"].as_str().unwrap())
    );
    assert_eq!(
        item["url"],
        format!("http://localhost:4000{}", record["filepath"].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_upload_video_is_classified_as_video() {
    let ctx = TestContext::new().await;

    let record = upload(&ctx, "clip.mp4", "video/mp4", b"fake video bytes").await;
    assert_eq!(record["type"], "video");

    let listing = list(&ctx).await;
    assert_eq!(listing["media"][0]["isVideo"], true);
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let ctx = TestContext::new().await;

    let (status, body) = send_json(&ctx.app, upload_request_with_field("not_file", "a.png")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
    assert_eq!(list(&ctx).await["total"], 0);
}

fn upload_request_with_field(field: &str, filename: &str) -> Request<Body> {
    let body = multipart_body(field, filename, "image/png", b"data");
    Request::builder()
        .method("POST")
        .uri("/api/media/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", TEST_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_oversized_upload_leaves_nothing_behind() {
    let ctx = TestContext::new().await;
    let data = vec![0u8; 10 * 1024 * 1024 + 1];

    let (status, body) = send_json(&ctx.app, upload_request("huge.jpg", "image/jpeg", &data)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("too large"));
    assert_eq!(list(&ctx).await["total"], 0);
    assert_eq!(ctx.uploaded_file_count(), 0);
}

#[tokio::test]
async fn test_upload_at_size_limit_is_accepted() {
    let ctx = TestContext::new().await;
    let data = vec![7u8; 10 * 1024 * 1024];

    let record = upload(&ctx, "exact.jpg", "image/jpeg", &data).await;
    assert_eq!(record["type"], "image");
    assert_eq!(ctx.uploaded_file_count(), 1);
}

#[tokio::test]
async fn test_unsupported_content_type_is_rejected() {
    let ctx = TestContext::new().await;

    let (status, body) = send_json(
        &ctx.app,
        upload_request("notes.pdf", "application/pdf", b"%PDF-1.4"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only image and video files are allowed");
    assert_eq!(ctx.uploaded_file_count(), 0);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let ctx = TestContext::new().await;

    let first = upload(&ctx, "first.png", "image/png", b"1").await;
    let second = upload(&ctx, "second.png", "image/png", b"2").await;
    let third = upload(&ctx, "third.mp4", "video/mp4", b"3").await;

    let listing = list(&ctx).await;
    assert_eq!(listing["total"], 3);
    let ids: Vec<&Value> = listing["media"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| &item["_id"])
        .collect();
    assert_eq!(ids, vec![&third["_id"], &second["_id"], &first["_id"]]);
}

#[tokio::test]
async fn test_like_twice_then_list() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "cat.png", "image/png", b"meow").await;
    let id = record["_id"].as_str().unwrap();

    for expected in 1..=2 {
        let (status, body) = send_json(&ctx.app, request("POST", &format!("/api/media/{}/like", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["likes"], expected);
    }

    let listing = list(&ctx).await;
    assert_eq!(listing["media"][0]["likes"], 2);
}

#[tokio::test]
async fn test_unlike_never_goes_negative() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "dog.png", "image/png", b"woof").await;
    let id = record["_id"].as_str().unwrap();

    for _ in 0..2 {
        let (status, body) = send_json(&ctx.app, request("POST", &format!("/api/media/{}/unlike", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["likes"], 0);
    }

    assert_eq!(list(&ctx).await["media"][0]["likes"], 0);
}

#[tokio::test]
async fn test_like_then_unlike_restores_count() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "bird.png", "image/png", b"tweet").await;
    let id = record["_id"].as_str().unwrap();

    send_json(&ctx.app, request("POST", &format!("/api/media/{}/like", id))).await;
    send_json(&ctx.app, request("POST", &format!("/api/media/{}/like", id))).await;
    let (_, before) = send_json(&ctx.app, request("POST", &format!("/api/media/{}/like", id))).await;
    let (_, after) = send_json(&ctx.app, request("POST", &format!("/api/media/{}/unlike", id))).await;

    assert_eq!(before["likes"], 3);
    assert_eq!(after["likes"], 2);
}

#[tokio::test]
async fn test_like_unknown_id_is_not_found() {
    let ctx = TestContext::new().await;

    let (status, body) = send_json(&ctx.app, request("POST", "/api/media/1700000000000abcdefghi/like")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Media not found");
}

#[tokio::test]
async fn test_malformed_id_is_client_error() {
    let ctx = TestContext::new().await;

    for (method, uri) in [
        ("POST", "/api/media/NOT-AN-ID/like"),
        ("POST", "/api/media/NOT-AN-ID/unlike"),
        ("GET", "/api/media/NOT-AN-ID"),
        ("DELETE", "/api/media/NOT-AN-ID"),
    ] {
        let (status, body) = send_json(&ctx.app, request(method, uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["message"], "Invalid media ID format");
    }
}

#[tokio::test]
async fn test_get_streams_file_inline_or_as_attachment() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "pic.png", "image/png", b"pixel data").await;
    let id = record["_id"].as_str().unwrap();

    let response = ctx.app.clone().oneshot(request("GET", &format!("/api/media/{}", id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "inline");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"pixel data");

    let response = ctx
        .app
        .clone()
        .oneshot(request("GET", &format!("/api/media/{}?download=true", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "attachment");
}

#[tokio::test]
async fn test_get_video_uses_mp4_content_type() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "movie.webm", "video/webm", b"frames").await;
    let id = record["_id"].as_str().unwrap();

    let response = ctx.app.clone().oneshot(request("GET", &format!("/api/media/{}", id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
}

#[tokio::test]
async fn test_get_with_missing_file_is_not_found() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "gone.png", "image/png", b"soon gone").await;
    let id = record["_id"].as_str().unwrap();

    let path = ctx
        .state
        .media_service
        .storage()
        .resolve_file_path(record["filepath"].as_str().unwrap());
    std::fs::remove_file(path).unwrap();

    let (status, body) = send_json(&ctx.app, request("GET", &format!("/api/media/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Media file not found on disk");

    assert_eq!(list(&ctx).await["media"][0]["fileExists"], false);
}

#[tokio::test]
async fn test_delete_removes_record_and_file() {
    let ctx = TestContext::new().await;
    let keep = upload(&ctx, "keep.png", "image/png", b"keep").await;
    let record = upload(&ctx, "bye.png", "image/png", b"bye").await;
    let id = record["_id"].as_str().unwrap();
    assert_eq!(ctx.uploaded_file_count(), 2);

    let (status, body) = send_json(&ctx.app, request("DELETE", &format!("/api/media/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted successfully");

    let listing = list(&ctx).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["media"][0]["_id"], keep["_id"]);
    assert_eq!(ctx.uploaded_file_count(), 1);

    let (status, _) = send_json(&ctx.app, request("DELETE", &format!("/api/media/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Repeated lookups of a deleted id keep returning not-found
    for _ in 0..2 {
        let (status, body) = send_json(&ctx.app, request("GET", &format!("/api/media/{}", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Media not found");
    }
}

#[tokio::test]
async fn test_delete_succeeds_when_file_already_missing() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "orphan.png", "image/png", b"x").await;
    let id = record["_id"].as_str().unwrap();

    let path = ctx
        .state
        .media_service
        .storage()
        .resolve_file_path(record["filepath"].as_str().unwrap());
    std::fs::remove_file(path).unwrap();

    let (status, body) = send_json(&ctx.app, request("DELETE", &format!("/api/media/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted successfully");
    assert_eq!(list(&ctx).await["total"], 0);
}

#[tokio::test]
async fn test_same_name_uploads_are_independent() {
    let ctx = TestContext::new().await;
    let first = upload(&ctx, "cat.png", "image/png", b"first cat").await;
    let second = upload(&ctx, "cat.png", "image/png", b"second cat").await;
    assert_ne!(first["filepath"], second["filepath"]);
    assert_eq!(ctx.uploaded_file_count(), 2);

    let first_id = first["_id"].as_str().unwrap();
    let (status, _) = send_json(&ctx.app, request("DELETE", &format!("/api/media/{}", first_id))).await;
    assert_eq!(status, StatusCode::OK);

    let second_id = second["_id"].as_str().unwrap();
    let (status, body) = send(&ctx.app, request("GET", &format!("/api/media/{}", second_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"second cat");
    assert_eq!(list(&ctx).await["media"][0]["fileExists"], true);
}

#[tokio::test]
async fn test_uploaded_file_served_statically() {
    let ctx = TestContext::new().await;
    let record = upload(&ctx, "static.png", "image/png", b"static bytes").await;

    let (status, body) = send(&ctx.app, request("GET", record["filepath"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"static bytes");
}

#[tokio::test]
async fn test_listed_url_resolves_for_names_with_spaces() {
    let ctx = TestContext::new().await;
    upload(&ctx, "holiday photo.jpg", "image/jpeg", b"beach").await;

    let listing = list(&ctx).await;
    let url = listing["media"][0]["url"].as_str().unwrap();
    assert!(url.ends_with("-holiday%20photo.jpg"), "unexpected url {}", url);

    let path = url.strip_prefix("http://localhost:4000").unwrap();
    let (status, body) = send(&ctx.app, request("GET", path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"beach");
}

#[tokio::test]
async fn test_status_reports_local_backend() {
    let ctx = TestContext::new().await;

    let (status, body) = send_json(&ctx.app, request("GET", "/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "running");
    assert_eq!(body["database"]["type"], "local");
    assert_eq!(body["database"]["status"], "connected");
    assert_eq!(
        body["database"]["description"],
        "Using local JSON file database (MongoDB fallback)"
    );
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    let (status, body) = send_json(&ctx.app, request("GET", "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Media API Server is running!");
    assert_eq!(body["database"]["type"], "local");
    assert!(body["database"].get("description").is_none());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let ctx = TestContext::new().await;

    let (status, body) = send_json(&ctx.app, request("GET", "/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/media/upload"].is_object());
}

//! HTTP contract tests against a mock backend.
//!
//! Run with: `cargo test -p imgsuite-api-client --test client_test`

mod helpers;

use imgsuite_api_client::{
    ApiClient, ApiError, EditOperation, Failure, ImageStatus, ImageUpload, OutputFormat, Variant,
};
use mockito::Matcher;
use serde_json::json;

fn meta_body(id: &str, filename: &str, status: &str) -> String {
    json!({ "id": id, "filename": filename, "status": status }).to_string()
}

#[tokio::test]
async fn test_list_images_sends_pagination() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/images")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("page_size".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [
                    { "id": "a", "filename": "a.png", "status": "completed" },
                    { "id": "b", "filename": "b.png", "status": "uploaded" }
                ],
                "total": 12,
                "page": 2,
                "page_size": 10
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let page = client.list_images(2, 10).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 12);
    assert_eq!(page.items[0].status, ImageStatus::Completed);
    assert!(page.is_consistent(10));
}

#[tokio::test]
async fn test_list_images_failure_is_list_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/images")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let err = client.list_images(1, 20).await.unwrap_err();

    assert!(matches!(err, ApiError::List(Failure::Http { .. })));
    assert_eq!(err.to_string(), "Failed to list images (503): maintenance");
}

#[tokio::test]
async fn test_list_images_rejects_zero_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/images")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let err = client.list_images(0, 20).await.unwrap_err();
    assert!(matches!(err, ApiError::List(Failure::InvalidInput(_))));
    assert!(client.list_images(1, 0).await.is_err());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_images_bad_json_is_decode_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/images")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let err = client.list_images(1, 20).await.unwrap_err();
    assert!(matches!(err, ApiError::List(Failure::Decode(_))));
}

#[tokio::test]
async fn test_upload_image_sends_multipart_file_field() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/images")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file""#.into()),
            Matcher::Regex(r#"filename="cat.png""#.into()),
            Matcher::Regex("fake-png-content".into()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(meta_body("abc123", "cat.png", "uploaded"))
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let upload = ImageUpload::new("cat.png", b"fake-png-content".to_vec());
    let meta = client.upload_image(upload).await.unwrap();

    mock.assert_async().await;
    assert_eq!(meta.id, "abc123");
    assert_eq!(meta.filename, "cat.png");
    assert_eq!(meta.status, ImageStatus::Uploaded);
}

#[tokio::test]
async fn test_upload_error_carries_backend_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/images")
        .with_status(400)
        .with_body("Unsupported image format")
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let err = client
        .upload_image(ImageUpload::new("cat.png", b"x".to_vec()))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Upload failed (400): Unsupported image format"
    );
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn test_upload_rejects_non_image_locally() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/images")
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let err = client
        .upload_image(ImageUpload::new("notes.txt", b"hello".to_vec()))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Upload(Failure::InvalidInput(_))));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_image_path_reads_file() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/images")
        .match_body(Matcher::Regex(r#"filename="dog.png""#.into()))
        .with_status(201)
        .with_body(meta_body("d1", "dog.png", "uploaded"))
        .create_async()
        .await;

    let (_dir, paths) = helpers::fixtures::png_files(&["dog.png"]);
    let client = ApiClient::new(&server.url()).unwrap();
    let meta = client.upload_image_path(&paths[0]).await.unwrap();
    assert_eq!(meta.id, "d1");

    let missing = client
        .upload_image_path(std::path::Path::new("/no/such/file.png"))
        .await
        .unwrap_err();
    assert!(matches!(missing, ApiError::Upload(Failure::Io(_))));
}

#[tokio::test]
async fn test_trigger_process_posts_operation_and_params() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/images/abc123/process")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "operation": "grayscale", "params": {} })))
        .with_status(202)
        .with_body(meta_body("abc123", "cat.png", "processing"))
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let meta = client
        .trigger_process("abc123", "grayscale", &json!({}))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(meta.status, ImageStatus::Processing);
}

#[tokio::test]
async fn test_trigger_process_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/images/abc123/process")
        .with_status(409)
        .with_body("already processing")
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let err = client
        .trigger_process("abc123", "grayscale", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Process(_)));
    assert_eq!(
        err.to_string(),
        "Process trigger failed (409): already processing"
    );
}

#[tokio::test]
async fn test_get_status() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("GET", "/api/images/abc123/status")
        .with_status(200)
        .with_body(meta_body("abc123", "cat.png", "completed"))
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/api/images/gone/status")
        .with_status(404)
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let meta = client.get_status("abc123").await.unwrap();
    assert_eq!(meta.status, ImageStatus::Completed);

    let err = client.get_status("gone").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Status fetch failed (404)");
}

#[tokio::test]
async fn test_status_and_process_accept_partial_records() {
    let mut server = mockito::Server::new_async().await;
    let _process = server
        .mock("POST", "/api/images/abc123/process")
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": "abc123", "status": "processing" }).to_string())
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/api/images/abc123/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": "abc123", "status": "completed" }).to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let processing = client
        .trigger_process("abc123", "grayscale", &json!({}))
        .await
        .unwrap();
    assert_eq!(processing.id, "abc123");
    assert_eq!(processing.status, ImageStatus::Processing);
    assert!(processing.filename.is_empty());

    let completed = client.get_status("abc123").await.unwrap();
    assert_eq!(completed.status, ImageStatus::Completed);
}

#[tokio::test]
async fn test_upload_response_without_filename_uses_local_name() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/images")
        .with_status(201)
        .with_body(json!({ "id": "abc123", "status": "uploaded" }).to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let meta = client
        .upload_image(ImageUpload::new("cat.png", b"x".to_vec()))
        .await
        .unwrap();
    assert_eq!(meta.filename, "cat.png");
}

#[tokio::test]
async fn test_list_tolerates_null_total() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/images")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "items": [], "total": null }).to_string())
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let page = client.list_images(1, 20).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_edit_image_body_and_output_format() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/images/abc123/edit")
        .match_body(Matcher::Json(json!({
            "operation": "rotate",
            "params": { "angle": 90.0, "expand": true },
            "output_format": "webp"
        })))
        .with_status(200)
        .with_body(
            json!({
                "id": "abc123",
                "filename": "cat.png",
                "status": "completed",
                "edited": true
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let meta = client
        .edit_image(
            "abc123",
            &EditOperation::quarter_turn(),
            Some(OutputFormat::Webp),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(meta.extra.get("edited"), Some(&json!(true)));
}

#[tokio::test]
async fn test_edit_image_omits_absent_params() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/images/abc123/edit")
        .match_body(Matcher::Json(json!({
            "operation": "resize",
            "params": { "height": 300, "keep_aspect": true }
        })))
        .with_status(200)
        .with_body(meta_body("abc123", "cat.png", "completed"))
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let op = EditOperation::Resize {
        width: None,
        height: Some(300),
        keep_aspect: true,
    };
    client.edit_image("abc123", &op, None).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_edit_error_carries_backend_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/images/abc123/edit")
        .with_status(422)
        .with_body("radius must be positive")
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let err = client
        .edit_image("abc123", &EditOperation::Blur { radius: -1.0 }, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Edit(_)));
    assert_eq!(err.to_string(), "Edit failed (422): radius must be positive");
}

#[tokio::test]
async fn test_delete_requires_no_content() {
    let mut server = mockito::Server::new_async().await;
    let _deleted = server
        .mock("DELETE", "/api/images/abc123")
        .with_status(204)
        .create_async()
        .await;
    let _ok_but_not_204 = server
        .mock("DELETE", "/api/images/other")
        .with_status(200)
        .with_body("deleted")
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    assert!(client.delete_image("abc123").await.unwrap());

    let err = client.delete_image("other").await.unwrap_err();
    assert!(matches!(err, ApiError::Delete(_)));
    assert_eq!(err.to_string(), "Delete failed (200): deleted");
}

#[tokio::test]
async fn test_fetch_variant_returns_raw_bytes() {
    let mut server = mockito::Server::new_async().await;
    let png = helpers::fixtures::minimal_png();
    let _mock = server
        .mock("GET", "/api/images/abc123/edited")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png.clone())
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    let bytes = client
        .fetch_variant("abc123", Variant::Edited)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_each_call_is_a_single_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/images/abc123/status")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let client = ApiClient::new(&server.url()).unwrap();
    assert!(client.get_status("abc123").await.is_err());
    // No retry after a failure.
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_failure() {
    // Nothing listens on port 1.
    let client = ApiClient::new("http://127.0.0.1:1").unwrap();
    let err = client.get_status("abc123").await.unwrap_err();
    assert!(matches!(err, ApiError::Status(Failure::Transport(_))));
    assert!(err.is_transport());
    assert!(err.status().is_none());
}

#[test]
fn test_variant_urls_use_base() {
    let client = ApiClient::new("http://localhost:3001/").unwrap();
    assert_eq!(
        client.original_url("abc123"),
        "http://localhost:3001/api/images/abc123/original"
    );
    assert_eq!(
        client.processed_url("abc123"),
        "http://localhost:3001/api/images/abc123/processed"
    );
    assert_eq!(
        client.edited_url("abc123"),
        "http://localhost:3001/api/images/abc123/edited"
    );
    assert_ne!(client.original_url("abc123"), client.original_url("abc124"));
}

#[test]
fn test_relative_base_is_rejected_for_requests() {
    assert!(ApiClient::new("").is_err());
    assert!(ApiClient::new("   ").is_err());
}

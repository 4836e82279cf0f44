//! API integration tests for upload, attribute queries and PNG rendering.
//!
//! Tests verify:
//! - Upload validation and storage
//! - Attribute lookup by tag, including error cases
//! - First-frame PNG rendering
//! - HTTP response codes and headers

use axum::http::StatusCode;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::test_utils::{
    count_files, create_dicom_file, create_dicom_without_pixels, get_request, is_valid_png,
    test_router, upload_request, DicomSpec, INSTITUTION,
};

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Upload `data` and return the generated file name.
async fn upload(router: &Router, data: &[u8]) -> String {
    let response = router
        .clone()
        .oneshot(upload_request("file", "scan.dcm", data))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    json["file_name"].as_str().unwrap().to_string()
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_success() {
    let (router, dir) = test_router();
    let data = create_dicom_file(&DicomSpec::single_frame());

    let response = router
        .oneshot(upload_request("file", "scan.dcm", &data))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let file_name = json["file_name"].as_str().unwrap();
    assert!(file_name.ends_with("-scan.dcm"));
    assert_eq!(
        json["message"].as_str().unwrap(),
        format!("File saved as: {}", file_name)
    );

    let stored = std::fs::read(dir.path().join("files").join(file_name)).unwrap();
    assert_eq!(stored, data);
}

#[tokio::test]
async fn test_upload_appends_extension() {
    let (router, _dir) = test_router();
    let data = create_dicom_file(&DicomSpec::single_frame());

    let response = router
        .oneshot(upload_request("file", "scan", &data))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["file_name"].as_str().unwrap().ends_with("-scan.dcm"));
}

#[tokio::test]
async fn test_upload_same_name_twice_gives_distinct_files() {
    let (router, dir) = test_router();
    let data = create_dicom_file(&DicomSpec::single_frame());

    let first = upload(&router, &data).await;
    let second = upload(&router, &data).await;

    assert_ne!(first, second);
    assert_eq!(count_files(&dir.path().join("files")), 2);
}

#[tokio::test]
async fn test_upload_rejects_invalid_dicom() {
    let (router, dir) = test_router();

    let response = router
        .oneshot(upload_request("file", "notes.txt", b"definitely not dicom"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_dicom");
    assert_eq!(count_files(&dir.path().join("files")), 0);
}

#[tokio::test]
async fn test_upload_missing_file_field() {
    let (router, _dir) = test_router();
    let data = create_dicom_file(&DicomSpec::single_frame());

    let response = router
        .oneshot(upload_request("attachment", "scan.dcm", &data))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_upload");
}

// =============================================================================
// Attribute Queries
// =============================================================================

#[tokio::test]
async fn test_tag_query_returns_attribute() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::single_frame())).await;

    let response = router
        .oneshot(get_request(&format!("/dicom/{}?tag=(0008,0080)", file_name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["tag-values"], "(0008,0080)");
    assert_eq!(json["data"]["header-attribute-name"], "InstitutionName");
    assert_eq!(json["data"]["header-attribute-value"], INSTITUTION);
}

#[tokio::test]
async fn test_tag_query_without_parentheses() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::single_frame())).await;

    let response = router
        .oneshot(get_request(&format!("/dicom/{}?tag=0008,0080", file_name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["tag-values"], "0008,0080");
    assert_eq!(json["data"]["header-attribute-name"], "InstitutionName");
}

#[tokio::test]
async fn test_tag_takes_precedence_over_png() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::single_frame())).await;

    let response = router
        .oneshot(get_request(&format!(
            "/dicom/{}?png&tag=(0008,0080)",
            file_name
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_malformed_tag_is_bad_request() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::single_frame())).await;

    let cases = [
        ("(0008)", "malformed_tag"),
        ("(0008,0080,0001)", "malformed_tag"),
        ("(XXXX,0080)", "invalid_tag_component"),
        ("(0008,ZZZZ)", "invalid_tag_component"),
        ("(FFFF,FFFF)", "unknown_tag"),
    ];

    for (tag, kind) in cases {
        let response = router
            .clone()
            .oneshot(get_request(&format!("/dicom/{}?tag={}", file_name, tag)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "tag {tag}");

        let json = body_json(response).await;
        assert_eq!(json["error"], kind, "tag {tag}");
    }
}

#[tokio::test]
async fn test_absent_element_is_not_found() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::single_frame())).await;

    // Referring Physician's Name is a known tag that the file does not carry.
    let response = router
        .oneshot(get_request(&format!("/dicom/{}?tag=(0008,0090)", file_name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "element_not_found");
}

// =============================================================================
// PNG Rendering
// =============================================================================

#[tokio::test]
async fn test_png_query_returns_first_frame() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::single_frame())).await;

    let response = router
        .oneshot(get_request(&format!("/dicom/{}?png", file_name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(is_valid_png(&body), "Response should be a valid PNG");

    let image = image::load_from_memory(&body).unwrap();
    assert_eq!((image.width(), image.height()), (2, 2));
}

#[tokio::test]
async fn test_png_query_multi_frame_uses_first_frame() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::multi_frame())).await;

    let response = router
        .oneshot(get_request(&format!("/dicom/{}?png=true", file_name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let image = image::load_from_memory(&body).unwrap();
    assert_eq!((image.width(), image.height()), (3, 2));
}

#[tokio::test]
async fn test_png_query_without_pixel_data() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_without_pixels()).await;

    let response = router
        .oneshot(get_request(&format!("/dicom/{}?png", file_name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "no_pixel_data");
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_missing_query_params() {
    let (router, _dir) = test_router();
    let file_name = upload(&router, &create_dicom_file(&DicomSpec::single_frame())).await;

    let response = router
        .oneshot(get_request(&format!("/dicom/{}", file_name)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "missing_query");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let (router, _dir) = test_router();

    let response = router
        .oneshot(get_request("/dicom/missing.dcm?tag=(0008,0080)"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _dir) = test_router();

    let response = router.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

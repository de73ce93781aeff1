//! End-to-end tests for the HTTP routes, driven through `tower::ServiceExt`.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::Router;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::ArrayView4;
use serde_json::Value;
use tower::ServiceExt;

use whisker::model::{Inference, ModelError};
use whisker::server::{AppState, build_router};

fn cat_stub() -> Arc<dyn Inference> {
    Arc::new(|_: ArrayView4<'_, f32>| -> Result<Vec<f32>, ModelError> { Ok(vec![0.0, -10.0]) })
}

fn app(prefix: &str) -> Router {
    build_router(AppState::new("test", "stub", cat_stub()), prefix, 1024 * 1024)
}

fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(8, 5, |x, y| Rgb([x as u8 * 30, y as u8 * 50, 90])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn file_upload_classifies_cat() {
    let resp = app("/api")
        .oneshot(post("/api/predict/file", "application/octet-stream", png_bytes()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["label"], "cat");
    assert!((body["confidence"].as_f64().unwrap() - 1.0).abs() < 1e-3);
}

#[tokio::test]
async fn file_upload_rejects_garbage() {
    let resp = app("/api")
        .oneshot(post("/api/predict/file", "application/octet-stream", &b"\x00\x01not an image"[..]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "invalid_image");
    assert_eq!(body["message"], "Error loading input image");
}

#[tokio::test]
async fn refused_dimensions_are_explained() {
    let strip = DynamicImage::ImageRgb8(RgbImage::new(1, 17));
    let mut bytes = Vec::new();
    strip.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();

    let resp = app("/api")
        .oneshot(post("/api/predict/file", "image/png", bytes))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let message = json_body(resp).await["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Error loading input image: "));
    assert!(message.contains("1x17"));
}

#[tokio::test]
async fn multipart_upload_uses_image_field() {
    let boundary = "XBOUNDARYX";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cat.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&png_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let resp = app("/api")
        .oneshot(post(
            "/api/predict/file",
            &format!("multipart/form-data; boundary={boundary}"),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["label"], "cat");
}

#[tokio::test]
async fn base64_payload_classifies_cat() {
    let payload = serde_json::json!({ "image": STANDARD.encode(png_bytes()) }).to_string();
    let resp = app("/api")
        .oneshot(post("/api/predict/base64", "application/json", payload))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["label"], "cat");
}

#[tokio::test]
async fn base64_payload_rejects_bad_text() {
    let payload = serde_json::json!({ "image": "!!! not base64 !!!" }).to_string();
    let resp = app("/api")
        .oneshot(post("/api/predict/base64", "application/json", payload))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "Error decoding input image");
}

#[tokio::test]
async fn model_failure_is_server_error() {
    let failing: Arc<dyn Inference> = Arc::new(|_: ArrayView4<'_, f32>| -> Result<Vec<f32>, ModelError> {
        Err(ModelError::Inference("boom".into()))
    });
    let router = build_router(AppState::new("test", "stub", failing), "/api", 1024 * 1024);
    let resp = router
        .oneshot(post("/api/predict/file", "application/octet-stream", png_bytes()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(resp).await["error"], "inference");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let router = build_router(AppState::new("test", "stub", cat_stub()), "/api", 16);
    let resp = router
        .oneshot(post("/api/predict/file", "application/octet-stream", png_bytes()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_project_and_backend() {
    let resp = app("/v1/")
        .oneshot(Request::get("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["project"], "test");
    assert_eq!(body["backend"], "stub");
}

#[tokio::test]
async fn root_prefix_mounts_at_top_level() {
    let resp = app("/")
        .oneshot(post("/predict/file", "application/octet-stream", png_bytes()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn routes_outside_prefix_are_not_found() {
    let resp = app("/api")
        .oneshot(post("/predict/file", "application/octet-stream", png_bytes()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

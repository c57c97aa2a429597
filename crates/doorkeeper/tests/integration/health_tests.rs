use axum::http::StatusCode;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::support::{get, spawn_app, GatewayBehavior};

#[tokio::test]
async fn health_check_returns_ok() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let response = test.app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

use axum::http::StatusCode;
use tower::ServiceExt;

use crate::support::{body_json, get, seed_link, seed_server, spawn_app, GatewayBehavior};

#[tokio::test]
async fn returns_the_link_for_a_known_name() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;
    seed_link(&test, "100", "Steve").await;

    let response = test
        .app
        .clone()
        .oneshot(get(&format!("/{}/by-minecraft-name/Steve", server.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Player 100");
    assert_eq!(body["user-id"], "100");
    assert_eq!(body["server-id"], "srv-1");
    assert_eq!(body["minecraft-name"], "Steve");
}

#[tokio::test]
async fn unknown_name_is_404() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;
    seed_link(&test, "100", "Steve").await;

    let response = test
        .app
        .oneshot(get(&format!("/{}/by-minecraft-name/Alex", server.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_server_is_400() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let response = test
        .app
        .oneshot(get("/no-such-server/by-minecraft-name/Steve"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

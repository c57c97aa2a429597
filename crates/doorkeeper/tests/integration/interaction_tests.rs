//! Discord-side flows through /interactions: setup, announce, and the
//! register/update button-and-modal sequences.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use doorkeeper::repositories::{links, servers};

use crate::support::{
    body_json, command, component, modal_submit, ping, post_json, reply_content, seed_link,
    seed_server, spawn_app, GatewayBehavior,
};

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let response = test
        .app
        .oneshot(post_json("/interactions", &ping()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["type"], 1);
}

#[tokio::test]
async fn setup_provisions_a_server_and_replies_with_credentials() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let response = test
        .app
        .clone()
        .oneshot(post_json(
            "/interactions",
            &command("setup", "guild-1", "mc.example.com", "42"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content = reply_content(response).await;
    assert!(content.contains("Server has been set up."));

    let server = servers::get_by_address(&test.state.pool, "guild-1", "mc.example.com")
        .await
        .unwrap()
        .expect("setup should have stored the server");
    assert!(content.contains(&server.id));
    assert!(content.contains(&server.token));
}

#[tokio::test]
async fn second_setup_for_the_same_address_is_rejected() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    seed_server(&test).await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &command("setup", "guild-1", "mc.example.com", "42"),
        ))
        .await
        .unwrap();

    assert_eq!(
        reply_content(response).await,
        "A server is already set up for this address in this guild"
    );
}

#[tokio::test]
async fn announce_replies_with_register_and_update_buttons() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &command("announce", "guild-1", "mc.example.com", "42"),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    let content = body["data"]["content"].as_str().unwrap();
    assert!(content.contains(&server.address));

    let row = &body["data"]["components"][0]["components"];
    assert_eq!(row[0]["custom_id"], format!("register/{}", server.id));
    assert_eq!(row[1]["custom_id"], format!("update/{}", server.id));
}

#[tokio::test]
async fn announce_for_an_unknown_address_reports_it() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &command("announce", "guild-1", "nowhere.example.com", "42"),
        ))
        .await
        .unwrap();

    assert_eq!(
        reply_content(response).await,
        "No server found under the specified address in this guild."
    );
}

#[tokio::test]
async fn commands_outside_a_guild_are_refused() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let dm_command = json!({
        "type": 2,
        "user": { "id": "42", "username": "user-42" },
        "data": {
            "name": "setup",
            "options": [{ "name": "address", "value": "mc.example.com" }],
        },
    });
    let response = test
        .app
        .oneshot(post_json("/interactions", &dm_command))
        .await
        .unwrap();

    assert_eq!(
        reply_content(response).await,
        "This command can only be used inside a guild."
    );
}

#[tokio::test]
async fn unknown_commands_get_a_polite_reply() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &command("frobnicate", "guild-1", "mc.example.com", "42"),
        ))
        .await
        .unwrap();

    assert_eq!(reply_content(response).await, "Unknown command.");
}

#[tokio::test]
async fn register_button_then_modal_creates_the_link() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;

    // Button press opens the registration modal.
    let pressed = test
        .app
        .clone()
        .oneshot(post_json(
            "/interactions",
            &component(&format!("register/{}", server.id), "100"),
        ))
        .await
        .unwrap();
    let modal = body_json(pressed).await;
    assert_eq!(modal["type"], 9);
    assert_eq!(
        modal["data"]["custom_id"],
        format!("registration/{}", server.id)
    );

    // Submitting the modal stores the link.
    let submitted = test
        .app
        .clone()
        .oneshot(post_json(
            "/interactions",
            &modal_submit(&format!("registration/{}", server.id), "100", "SteveIRL", "Steve"),
        ))
        .await
        .unwrap();
    assert_eq!(
        reply_content(submitted).await,
        "Registered! Now try to connect to the server."
    );

    let link = links::get(&test.state.pool, &server.id, "100")
        .await
        .unwrap()
        .expect("registration should have stored the link");
    assert_eq!(link.name, "SteveIRL");
    assert_eq!(link.minecraft_name, "Steve");
}

#[tokio::test]
async fn register_button_for_an_existing_member_short_circuits() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;
    seed_link(&test, "100", "Steve").await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &component(&format!("register/{}", server.id), "100"),
        ))
        .await
        .unwrap();

    assert_eq!(reply_content(response).await, "You're already registered.");
}

#[tokio::test]
async fn registering_a_taken_nickname_is_refused() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;
    seed_link(&test, "100", "Steve").await;

    let response = test
        .app
        .clone()
        .oneshot(post_json(
            "/interactions",
            &modal_submit(&format!("registration/{}", server.id), "200", "Other", "Steve"),
        ))
        .await
        .unwrap();
    assert_eq!(
        reply_content(response).await,
        "This nickname is already taken."
    );

    // The user who held the name keeps it.
    let link = links::get_by_minecraft_name(&test.state.pool, &server.id, "Steve")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.user_id, "100");
}

#[tokio::test]
async fn registering_twice_reports_the_existing_membership() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;
    seed_link(&test, "100", "Steve").await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &modal_submit(&format!("registration/{}", server.id), "100", "Steve", "Steve2"),
        ))
        .await
        .unwrap();

    assert_eq!(reply_content(response).await, "You're already registered.");
}

#[tokio::test]
async fn update_button_then_modal_renames_the_link() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;
    seed_link(&test, "100", "Steve").await;

    let pressed = test
        .app
        .clone()
        .oneshot(post_json(
            "/interactions",
            &component(&format!("update/{}", server.id), "100"),
        ))
        .await
        .unwrap();
    let modal = body_json(pressed).await;
    assert_eq!(modal["type"], 9);
    assert_eq!(
        modal["data"]["custom_id"],
        format!("updation/{}", server.id)
    );

    let submitted = test
        .app
        .clone()
        .oneshot(post_json(
            "/interactions",
            &modal_submit(&format!("updation/{}", server.id), "100", "Steve", "Stevie"),
        ))
        .await
        .unwrap();
    assert_eq!(
        reply_content(submitted).await,
        "Updated! Now try to connect to the server with the new nickname."
    );

    let link = links::get(&test.state.pool, &server.id, "100")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(link.minecraft_name, "Stevie");
}

#[tokio::test]
async fn update_button_without_a_membership_is_refused() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &component(&format!("update/{}", server.id), "100"),
        ))
        .await
        .unwrap();

    assert_eq!(reply_content(response).await, "You're not registered.");
}

#[tokio::test]
async fn updating_to_a_taken_nickname_is_refused() {
    let test = spawn_app(GatewayBehavior::Normal).await;
    let server = seed_server(&test).await;
    seed_link(&test, "100", "Steve").await;
    seed_link(&test, "200", "Alex").await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &modal_submit(&format!("updation/{}", server.id), "200", "Alex", "Steve"),
        ))
        .await
        .unwrap();

    assert_eq!(
        reply_content(response).await,
        "This nickname is already taken."
    );
}

#[tokio::test]
async fn buttons_pointing_at_a_deleted_server_are_inert() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &component("register/ghost", "100"),
        ))
        .await
        .unwrap();

    assert_eq!(
        reply_content(response).await,
        "This link is no longer valid."
    );
}

#[tokio::test]
async fn malformed_custom_ids_never_error_the_endpoint() {
    let test = spawn_app(GatewayBehavior::Normal).await;

    for custom_id in ["bogus", "authorization/not-a-uuid/allow", "register"] {
        let response = test
            .app
            .clone()
            .oneshot(post_json("/interactions", &component(custom_id, "100")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            reply_content(response).await,
            "This control is no longer valid."
        );
    }

    let response = test
        .app
        .oneshot(post_json(
            "/interactions",
            &modal_submit("not-a-modal", "100", "Steve", "Steve"),
        ))
        .await
        .unwrap();
    assert_eq!(
        reply_content(response).await,
        "This form is no longer valid."
    );
}

mod common;

use axum::http::StatusCode;
use colonia_core::ids::ProfileId;
use common::{PASSWORD, app, data, error_message, token_for};
use serde_json::{Value, json};

#[tokio::test]
async fn protected_routes_need_a_bearer_token() {
    let server = app().server;

    for path in ["/usuarios/me", "/colonias/", "/residencias/mine", "/anuncios/"] {
        let response = server.get(path).await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(
            json!({"success": false, "error": "a bearer token is required", "status": 401}),
            body,
            "GET {path} without a token"
        );
    }
}

#[tokio::test]
async fn tampered_tokens_are_rejected() {
    let app = app();
    let caller = app.resident("ursula@example.com").await;
    let tampered = format!("{}x", caller.token);

    let response = app
        .server
        .get("/usuarios/me")
        .authorization_bearer(&tampered)
        .await;

    response.assert_status_unauthorized();
    assert_eq!(
        "the access token is invalid or expired",
        error_message(&response.json())
    );
}

#[tokio::test]
async fn sign_up_creates_a_resident_profile() {
    let app = app();

    let response = app
        .server
        .post("/auth/sign-up")
        .json(&json!({
            "email": "ursula@example.com",
            "password": PASSWORD,
            "first_name": "Ursula",
            "last_name": "Diaz",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let sign_up = data(&body);
    assert_eq!(false, sign_up["confirmation_required"]);
    let token = sign_up["session"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();

    let response = app
        .server
        .get("/usuarios/me")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let profile = data(&body);
    assert_eq!("Ursula", profile["first_name"]);
    assert_eq!("Resident", profile["role"]);
    assert_eq!(Value::Null, profile["community_id"]);
}

#[tokio::test]
async fn duplicate_sign_ups_are_bad_requests() {
    let app = app();
    app.provider.register("ursula@example.com").await;

    let response = app
        .server
        .post("/auth/sign-up")
        .json(&json!({ "email": "ursula@example.com", "password": PASSWORD }))
        .await;

    response.assert_status_bad_request();
    assert_eq!("User already registered", error_message(&response.json()));
}

#[tokio::test]
async fn sign_in_repairs_a_missing_profile() {
    let app = app();
    let id = app.provider.register("vicente@example.com").await;

    let response = app
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": "vicente@example.com", "password": PASSWORD }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let session = data(&body);
    assert_eq!(json!(id), session["user"]["id"]);

    let body: Value = app
        .server
        .get("/usuarios/me")
        .authorization_bearer(session["access_token"].as_str().expect("access token"))
        .await
        .json();
    assert_eq!("vicente", data(&body)["first_name"]);
}

#[tokio::test]
async fn wrong_passwords_are_unauthorized() {
    let app = app();
    app.provider.register("vicente@example.com").await;

    let response = app
        .server
        .post("/auth/sign-in")
        .json(&json!({ "email": "vicente@example.com", "password": "hunter2" }))
        .await;

    response.assert_status_unauthorized();
    assert_eq!("Invalid login credentials", error_message(&response.json()));
}

#[tokio::test]
async fn refresh_trades_a_refresh_token_for_a_session() {
    let app = app();
    app.provider.register("vicente@example.com").await;

    app.server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": "refresh-vicente@example.com" }))
        .await
        .assert_status_ok();

    app.server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": "refresh-nobody@example.com" }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn signed_out_tokens_stop_working() {
    let app = app();
    let caller = app.resident("ursula@example.com").await;

    let response = app
        .server
        .post("/auth/sign-out")
        .authorization_bearer(&caller.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(true, data(&body)["provider_confirmed"]);

    let response = app
        .server
        .get("/usuarios/me")
        .authorization_bearer(&caller.token)
        .await;
    response.assert_status_unauthorized();
    assert_eq!("the session has been signed out", error_message(&response.json()));

    // a new session for the same profile is unaffected
    app.server
        .get("/usuarios/me")
        .authorization_bearer(&token_for(caller.id, "ursula@example.com"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn callers_without_a_profile_get_not_found() {
    let app = app();

    let response = app
        .server
        .get("/usuarios/me")
        .authorization_bearer(&token_for(ProfileId::new(), "ghost@example.com"))
        .await;

    response.assert_status_not_found();
    assert_eq!(
        json!({"success": false, "error": "profile not found", "status": 404}),
        response.json::<Value>()
    );
}

#[tokio::test]
async fn metrics_are_unavailable_when_disabled() {
    app()
        .server
        .get("/metrics")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

mod common;

use axum::http::StatusCode;
use common::{app, error_message};
use rstest::rstest;
use serde_json::{Value, json};

fn assert_error_envelope(body: &Value, status: StatusCode) {
    assert!(!error_message(body).is_empty());
    assert_eq!(Some(u64::from(status.as_u16())), body["status"].as_u64());
    assert!(body.get("data").is_none());
}

#[rstest]
#[case::residence("/residencias/not-a-uuid")]
#[case::residence_associations("/residencias/not-a-uuid/associations")]
#[case::residence_visits("/residencias/not-a-uuid/visitas")]
#[case::community("/colonias/123")]
#[case::visit("/visitas/otra-cosa")]
#[case::announcement("/anuncios/abc")]
#[tokio::test]
async fn unparsable_ids_answer_with_the_error_envelope(#[case] path: &str) {
    let app = app();
    let caller = app.resident("ursula@example.com").await;

    let response = app.server.get(path).authorization_bearer(&caller.token).await;

    response.assert_status_bad_request();
    assert_error_envelope(&response.json(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unparsable_ids_in_two_segment_paths_answer_with_the_error_envelope() {
    let app = app();
    let caller = app.resident("ursula@example.com").await;

    let response = app
        .server
        .patch("/residencias/not-a-uuid/associations/also-not/verify")
        .authorization_bearer(&caller.token)
        .await;

    response.assert_status_bad_request();
    assert_error_envelope(&response.json(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn broken_json_answers_with_the_error_envelope() {
    let app = app();
    let caller = app.resident("ursula@example.com").await;

    let response = app
        .server
        .post("/colonias/")
        .authorization_bearer(&caller.token)
        .text("{\"name\": \"Los Olmos\",")
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    assert_error_envelope(&response.json(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::missing_field("/colonias/", json!({"name": "Los Olmos"}))]
#[case::wrong_type("/residencias/bulk", json!({"street": "Roble", "start": "uno", "end": 3, "community_id": "x"}))]
#[case::wrong_sign_in_shape("/auth/sign-in", json!({"email": 7}))]
#[tokio::test]
async fn mismatched_json_answers_with_the_error_envelope(#[case] path: &str, #[case] request: Value) {
    let app = app();
    let caller = app.resident("ursula@example.com").await;

    let response = app
        .server
        .post(path)
        .authorization_bearer(&caller.token)
        .json(&request)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_envelope(&response.json(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn bodies_without_a_json_content_type_answer_with_the_error_envelope() {
    let app = app();
    let caller = app.resident("ursula@example.com").await;

    let response = app
        .server
        .post("/colonias/")
        .authorization_bearer(&caller.token)
        .text("name=Los Olmos")
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_error_envelope(&response.json(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

mod common;

use axum::http::StatusCode;
use colonia_core::ids::AnnouncementId;
use common::{Caller, TestApp, app, data, error_message};
use serde_json::{Value, json};

async fn published(app: &TestApp, admin: &Caller, title: &str) -> String {
    let response = app
        .server
        .post("/anuncios/")
        .authorization_bearer(&admin.token)
        .json(&json!({
            "title": title,
            "body": "Detalles en la caseta de vigilancia",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    data(&response.json())["id"]
        .as_str()
        .expect("announcement id")
        .to_string()
}

#[tokio::test]
async fn members_of_the_community_read_an_announcement() {
    let app = app();
    let (admin, community_id) = app.administrator("ana@example.com", "Los Olmos").await;
    let resident = app.resident("ursula@example.com").await;
    app.join(&resident, community_id).await;
    let id = published(&app, &admin, "junta").await;

    let response = app
        .server
        .get(&format!("/anuncios/{id}"))
        .authorization_bearer(&resident.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!("junta", data(&body)["title"]);
    assert_eq!(json!(community_id), data(&body)["community_id"]);
}

#[tokio::test]
async fn other_communities_cannot_read_an_announcement() {
    let app = app();
    let (admin, _) = app.administrator("ana@example.com", "Los Olmos").await;
    let (neighbour, _) = app.administrator("beto@example.com", "El Roble").await;
    let id = published(&app, &admin, "junta").await;

    let response = app
        .server
        .get(&format!("/anuncios/{id}"))
        .authorization_bearer(&neighbour.token)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        "the announcement belongs to another community",
        error_message(&response.json())
    );
}

#[tokio::test]
async fn administrators_change_only_the_given_fields() {
    let app = app();
    let (admin, _) = app.administrator("ana@example.com", "Los Olmos").await;
    let id = published(&app, &admin, "junta").await;

    let response = app
        .server
        .put(&format!("/anuncios/{id}"))
        .authorization_bearer(&admin.token)
        .json(&json!({ "title": " junta vecinal ", "important": true }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let announcement = data(&body);
    assert_eq!("junta vecinal", announcement["title"]);
    assert_eq!("Detalles en la caseta de vigilancia", announcement["body"]);
    assert_eq!(true, announcement["important"]);
    assert!(announcement["updated"].is_string());
}

#[tokio::test]
async fn blank_changes_are_rejected() {
    let app = app();
    let (admin, _) = app.administrator("ana@example.com", "Los Olmos").await;
    let id = published(&app, &admin, "junta").await;

    let response = app
        .server
        .put(&format!("/anuncios/{id}"))
        .authorization_bearer(&admin.token)
        .json(&json!({ "body": "   " }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!("body is required", error_message(&response.json()));
}

#[tokio::test]
async fn residents_cannot_change_or_remove_announcements() {
    let app = app();
    let (admin, community_id) = app.administrator("ana@example.com", "Los Olmos").await;
    let resident = app.resident("ursula@example.com").await;
    app.join(&resident, community_id).await;
    let id = published(&app, &admin, "junta").await;

    for response in [
        app.server
            .put(&format!("/anuncios/{id}"))
            .authorization_bearer(&resident.token)
            .json(&json!({ "title": "fiesta" }))
            .await,
        app.server
            .delete(&format!("/anuncios/{id}"))
            .authorization_bearer(&resident.token)
            .await,
    ] {
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(
            "only an administrator of the community can change announcements",
            error_message(&response.json())
        );
    }

    let body: Value = app
        .server
        .get(&format!("/anuncios/{id}"))
        .authorization_bearer(&resident.token)
        .await
        .json();
    assert_eq!("junta", data(&body)["title"]);
}

#[tokio::test]
async fn administrators_of_another_community_cannot_remove_announcements() {
    let app = app();
    let (admin, _) = app.administrator("ana@example.com", "Los Olmos").await;
    let (neighbour, _) = app.administrator("beto@example.com", "El Roble").await;
    let id = published(&app, &admin, "junta").await;

    app.server
        .delete(&format!("/anuncios/{id}"))
        .authorization_bearer(&neighbour.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn removed_announcements_are_gone() {
    let app = app();
    let (admin, _) = app.administrator("ana@example.com", "Los Olmos").await;
    let id = published(&app, &admin, "junta").await;
    let kept = published(&app, &admin, "poda").await;

    let response = app
        .server
        .delete(&format!("/anuncios/{id}"))
        .authorization_bearer(&admin.token)
        .await;
    response.assert_status_ok();
    assert_eq!(json!(id), data(&response.json())["id"]);

    let response = app
        .server
        .get(&format!("/anuncios/{id}"))
        .authorization_bearer(&admin.token)
        .await;
    response.assert_status_not_found();
    assert_eq!("announcement not found", error_message(&response.json()));

    let body: Value = app
        .server
        .get("/anuncios/")
        .authorization_bearer(&admin.token)
        .await
        .json();
    let ids: Vec<_> = data(&body)
        .as_array()
        .expect("announcements")
        .iter()
        .map(|a| a["id"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(vec![kept.as_str()], ids);
}

#[tokio::test]
async fn unknown_announcements_are_not_found() {
    let app = app();
    let (admin, _) = app.administrator("ana@example.com", "Los Olmos").await;
    let missing = AnnouncementId::new();

    for response in [
        app.server
            .get(&format!("/anuncios/{missing}"))
            .authorization_bearer(&admin.token)
            .await,
        app.server
            .put(&format!("/anuncios/{missing}"))
            .authorization_bearer(&admin.token)
            .json(&json!({ "important": true }))
            .await,
        app.server
            .delete(&format!("/anuncios/{missing}"))
            .authorization_bearer(&admin.token)
            .await,
    ] {
        response.assert_status_not_found();
        assert_eq!("announcement not found", error_message(&response.json()));
    }
}

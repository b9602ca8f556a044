mod common;

use axum::http::StatusCode;
use common::{app, data, error_message};
use rstest::rstest;
use serde_json::{Value, json};

#[tokio::test]
async fn first_claim_on_an_unclaimed_residence_is_a_pending_owner() {
    let app = app();
    let (_, community_id) = app.administrator("admin@example.com", "Los Olmos").await;
    let residence_id = app.unclaimed_residence(community_id, "12").await;
    let resident = app.resident("ursula@example.com").await;
    app.join(&resident, community_id).await;

    let response = app
        .server
        .post(&format!("/residencias/{residence_id}/claim"))
        .authorization_bearer(&resident.token)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let claim = data(&body);
    assert_eq!("owner", claim["association"]["role"]);
    assert_eq!(false, claim["association"]["verified"]);
    assert_eq!(false, claim["association"]["principal"]);
    assert_eq!(
        "Request sent, pending verification by an administrator",
        claim["message"]
    );
}

#[tokio::test]
async fn claim_on_a_residence_with_associations_is_a_pending_family_member() {
    let app = app();
    let (admin, community_id) = app.administrator("admin@example.com", "Los Olmos").await;
    // the creating administrator is associated with it already
    let residence_id = app.residence(&admin, community_id, "7").await;
    let resident = app.resident("vicente@example.com").await;
    app.join(&resident, community_id).await;

    let response = app
        .server
        .post(&format!("/residencias/{residence_id}/claim"))
        .authorization_bearer(&resident.token)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let claim = data(&body);
    assert_eq!("family_member", claim["association"]["role"]);
    assert_eq!(false, claim["association"]["verified"]);
    assert_eq!(false, claim["association"]["principal"]);
    assert_eq!(
        "Request sent, pending review by an administrator as a family member",
        claim["message"]
    );
}

#[tokio::test]
async fn administrator_claims_are_verified_and_principal() {
    let app = app();
    let (admin, community_id) = app.administrator("admin@example.com", "Los Olmos").await;
    let residence_id = app.unclaimed_residence(community_id, "3").await;
    let resident = app.resident("ursula@example.com").await;
    app.join(&resident, community_id).await;

    app.server
        .post(&format!("/residencias/{residence_id}/claim"))
        .authorization_bearer(&resident.token)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post(&format!("/residencias/{residence_id}/claim"))
        .authorization_bearer(&admin.token)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let claim = data(&body);
    assert_eq!("owner", claim["association"]["role"]);
    assert_eq!(true, claim["association"]["verified"]);
    assert_eq!(true, claim["association"]["principal"]);
    assert_eq!(
        "Residence registered and verified automatically",
        claim["message"]
    );
}

#[tokio::test]
async fn claims_across_communities_write_nothing() {
    let app = app();
    let (_, ours) = app.administrator("admin@example.com", "Los Olmos").await;
    let (_, theirs) = app.administrator("other@example.com", "Las Palmas").await;
    let residence_id = app.unclaimed_residence(theirs, "1").await;
    let resident = app.resident("ursula@example.com").await;
    app.join(&resident, ours).await;

    let response = app
        .server
        .post(&format!("/residencias/{residence_id}/claim"))
        .authorization_bearer(&resident.token)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        "the residence belongs to another community",
        error_message(&response.json())
    );

    let associations: Value = app
        .server
        .get(&format!("/residencias/{residence_id}/associations"))
        .authorization_bearer(&resident.token)
        .await
        .json();
    assert_eq!(Some(0), data(&associations).as_array().map(Vec::len));
}

#[tokio::test]
async fn duplicate_claims_are_rejected() {
    let app = app();
    let (_, community_id) = app.administrator("admin@example.com", "Los Olmos").await;
    let residence_id = app.unclaimed_residence(community_id, "12").await;
    let resident = app.resident("ursula@example.com").await;
    app.join(&resident, community_id).await;
    let path = format!("/residencias/{residence_id}/claim");

    app.server
        .post(&path)
        .authorization_bearer(&resident.token)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post(&path)
        .authorization_bearer(&resident.token)
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        "already associated with this residence",
        error_message(&response.json())
    );

    let associations: Value = app
        .server
        .get(&format!("/residencias/{residence_id}/associations"))
        .authorization_bearer(&resident.token)
        .await
        .json();
    assert_eq!(Some(1), data(&associations).as_array().map(Vec::len));
}

#[tokio::test]
async fn claiming_requires_a_community() {
    let app = app();
    let (_, community_id) = app.administrator("admin@example.com", "Los Olmos").await;
    let residence_id = app.unclaimed_residence(community_id, "12").await;
    let drifter = app.resident("nadie@example.com").await;

    let response = app
        .server
        .post(&format!("/residencias/{residence_id}/claim"))
        .authorization_bearer(&drifter.token)
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        "join a community before claiming a residence",
        error_message(&response.json())
    );
}

#[tokio::test]
async fn claiming_an_unknown_residence_is_not_found() {
    let app = app();
    let (admin, _) = app.administrator("admin@example.com", "Los Olmos").await;

    let response = app
        .server
        .post(&format!(
            "/residencias/{}/claim",
            colonia_core::ids::ResidenceId::new()
        ))
        .authorization_bearer(&admin.token)
        .await;

    response.assert_status_not_found();
    assert_eq!("residence not found", error_message(&response.json()));
}

#[tokio::test]
async fn owner_then_family_member_then_verification() {
    let app = app();
    let (admin, community_id) = app.administrator("ana@example.com", "Los Olmos").await;
    let residence_id = app.unclaimed_residence(community_id, "21").await;
    let ursula = app.resident("ursula@example.com").await;
    let vicente = app.resident("vicente@example.com").await;
    app.join(&ursula, community_id).await;
    app.join(&vicente, community_id).await;
    let claim_path = format!("/residencias/{residence_id}/claim");

    let response = app
        .server
        .post(&claim_path)
        .authorization_bearer(&ursula.token)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!("owner", data(&body)["association"]["role"]);
    assert_eq!(false, data(&body)["association"]["verified"]);

    let response = app
        .server
        .post(&claim_path)
        .authorization_bearer(&vicente.token)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!("family_member", data(&body)["association"]["role"]);
    assert_eq!(false, data(&body)["association"]["verified"]);

    let response = app
        .server
        .patch(&format!(
            "/residencias/{residence_id}/associations/{}/verify",
            ursula.id
        ))
        .authorization_bearer(&admin.token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(true, data(&body)["verified"]);

    let body: Value = app
        .server
        .get(&format!("/residencias/{residence_id}/associations"))
        .authorization_bearer(&admin.token)
        .await
        .json();
    let associations = data(&body).as_array().expect("list of associations");
    assert_eq!(2, associations.len());
    let verified: Vec<_> = associations
        .iter()
        .filter(|a| a["verified"] == true)
        .collect();
    assert_eq!(1, verified.len());
    assert_eq!(json!(ursula.id), verified[0]["profile_id"]);
}

#[tokio::test]
async fn only_administrators_verify_and_verifying_twice_changes_nothing() {
    let app = app();
    let (admin, community_id) = app.administrator("ana@example.com", "Los Olmos").await;
    let residence_id = app.unclaimed_residence(community_id, "21").await;
    let ursula = app.resident("ursula@example.com").await;
    app.join(&ursula, community_id).await;
    app.server
        .post(&format!("/residencias/{residence_id}/claim"))
        .authorization_bearer(&ursula.token)
        .await
        .assert_status(StatusCode::CREATED);
    let verify_path = format!(
        "/residencias/{residence_id}/associations/{}/verify",
        ursula.id
    );

    app.server
        .patch(&verify_path)
        .authorization_bearer(&ursula.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let first: Value = app
        .server
        .patch(&verify_path)
        .authorization_bearer(&admin.token)
        .await
        .json();
    let second: Value = app
        .server
        .patch(&verify_path)
        .authorization_bearer(&admin.token)
        .await
        .json();
    assert_eq!(data(&first), data(&second));
}

#[tokio::test]
async fn bulk_creation_numbers_every_residence_in_the_range() {
    let app = app();
    let (admin, community_id) = app.administrator("ana@example.com", "Los Olmos").await;

    let response = app
        .server
        .post("/residencias/bulk")
        .authorization_bearer(&admin.token)
        .json(&json!({
            "street": "Calle Roble",
            "start": 4,
            "end": 9,
            "community_id": community_id,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let created = data(&body);
    assert_eq!(6, created["created"]);
    assert!(created.get("warning").is_none());
    let residences = created["residences"].as_array().expect("residences");
    let numbers: Vec<_> = residences
        .iter()
        .map(|r| r["number"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(vec!["4", "5", "6", "7", "8", "9"], numbers);
    assert!(residences.iter().all(|r| r["street"] == "Calle Roble"));

    let body: Value = app
        .server
        .get("/residencias/mine")
        .authorization_bearer(&admin.token)
        .await
        .json();
    assert_eq!(Some(6), data(&body).as_array().map(Vec::len));
}

#[rstest]
#[case::past_the_threshold(150)]
#[case::past_a_thousand(1500)]
#[tokio::test]
async fn wide_ranges_are_created_with_a_warning(#[case] end: u32) {
    let app = app();
    let (admin, community_id) = app.administrator("ana@example.com", "Los Olmos").await;

    let response = app
        .server
        .post("/residencias/bulk")
        .authorization_bearer(&admin.token)
        .json(&json!({
            "street": "Calle Roble",
            "start": 1,
            "end": end,
            "community_id": community_id,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(end, data(&body)["created"]);
    assert!(data(&body)["warning"].is_string());
}

#[rstest]
#[case::start_after_end(json!({"street": "Calle Roble", "start": 9, "end": 3}))]
#[case::blank_street(json!({"street": "  ", "start": 1, "end": 3}))]
#[tokio::test]
async fn unusable_ranges_are_bad_requests(#[case] mut request: Value) {
    let app = app();
    let (admin, community_id) = app.administrator("ana@example.com", "Los Olmos").await;
    request["community_id"] = json!(community_id);

    let response = app
        .server
        .post("/residencias/bulk")
        .authorization_bearer(&admin.token)
        .json(&request)
        .await;

    response.assert_status_bad_request();
    error_message(&response.json());
}

#[tokio::test]
async fn residents_cannot_create_residences() {
    let app = app();
    let (_, community_id) = app.administrator("ana@example.com", "Los Olmos").await;
    let resident = app.resident("ursula@example.com").await;
    app.join(&resident, community_id).await;

    let response = app
        .server
        .post("/residencias/")
        .authorization_bearer(&resident.token)
        .json(&json!({
            "number": "4",
            "street": "Calle Roble",
            "community_id": community_id,
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

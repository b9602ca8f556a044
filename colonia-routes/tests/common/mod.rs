#![allow(dead_code)]

use axum_test::TestServer;
use chrono::Utc;
use colonia_core::ArwLock;
use colonia_core::ColoniaEngine;
use colonia_core::ids::{CommunityId, ProfileId, ResidenceId};
use colonia_core::model::{NewProfile, NewResidence};
use colonia_core::repository::ProfileRepository;
use colonia_routes::routes;
use colonia_routes::session::{
    AuthProvider, AuthProviderError, Identity, ProviderResult, Session, SessionStore, SignUp,
    SignUpMetadata,
};
use colonia_routes::state::AppState;
use error_stack::Report;
use jsonwebtoken::{EncodingKey, Header};
use repositories::memory::MemoryEngine;
use serde_json::{Value, json};
use std::collections::HashMap;

pub const SECRET: &str = "integration-test-secret";
pub const AUDIENCE: &str = "authenticated";
pub const PASSWORD: &str = "correct horse battery staple";

pub fn token_for(profile_id: ProfileId, email: &str) -> String {
    let claims = json!({
        "sub": profile_id,
        "email": email,
        "session_id": format!("session-{}", ProfileId::new()),
        "aud": AUDIENCE,
        "exp": Utc::now().timestamp() + 3600,
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("token is encodable")
}

fn session_for(id: ProfileId, email: &str) -> Session {
    Session {
        access_token: token_for(id, email),
        refresh_token: format!("refresh-{email}"),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        user: Identity {
            id,
            email: Some(email.to_string()),
        },
    }
}

/// Accounts kept in memory, standing in for the hosted auth service
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    accounts: ArwLock<HashMap<String, (ProfileId, String)>>,
}

impl FakeProvider {
    pub async fn register(&self, email: &str) -> ProfileId {
        let id = ProfileId::new();
        self.accounts
            .write()
            .await
            .insert(email.to_string(), (id, PASSWORD.to_string()));
        id
    }
}

impl AuthProvider for FakeProvider {
    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<Session> {
        match self.accounts.read().await.get(email) {
            Some((id, known)) if known == password => Ok(session_for(*id, email)),
            _ => Err(Report::new(AuthProviderError::Rejected(
                "Invalid login credentials".to_string(),
            ))),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _metadata: SignUpMetadata,
    ) -> ProviderResult<SignUp> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(Report::new(AuthProviderError::Rejected(
                "User already registered".to_string(),
            )));
        }

        let id = ProfileId::new();
        accounts.insert(email.to_string(), (id, password.to_string()));
        let session = session_for(id, email);
        Ok(SignUp {
            identity: session.user.clone(),
            session: Some(session),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> ProviderResult<Session> {
        let email = refresh_token.strip_prefix("refresh-").unwrap_or_default();
        match self.accounts.read().await.get(email) {
            Some((id, _)) => Ok(session_for(*id, email)),
            None => Err(Report::new(AuthProviderError::Rejected(
                "Invalid Refresh Token".to_string(),
            ))),
        }
    }

    async fn sign_out(&self, _access_token: &str) -> ProviderResult<()> {
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub engine: MemoryEngine,
    pub provider: FakeProvider,
}

/// Someone with a profile and a valid access token
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: ProfileId,
    pub token: String,
}

pub fn app() -> TestApp {
    app_with(MemoryEngine::new())
}

pub fn app_with(engine: MemoryEngine) -> TestApp {
    let provider = FakeProvider::default();
    let sessions = SessionStore::new(provider.clone(), SECRET, AUDIENCE);
    let app_state = AppState::new_without_metrics(engine.clone(), sessions);

    let server = TestServer::new(routes::build(app_state)).expect("creation of test server");

    TestApp {
        server,
        engine,
        provider,
    }
}

impl TestApp {
    pub async fn resident(&self, email: &str) -> Caller {
        let id = ProfileId::new();
        self.engine
            .profiles()
            .create(NewProfile::resident(
                id,
                email.to_string(),
                "Vecino".to_string(),
                "Prueba".to_string(),
            ))
            .await
            .expect("profile is created");

        Caller {
            id,
            token: token_for(id, email),
        }
    }

    /// A resident that created a community through the api and so administers it
    pub async fn administrator(&self, email: &str, community: &str) -> (Caller, CommunityId) {
        let admin = self.resident(email).await;
        let response = self
            .server
            .post("/colonias/")
            .authorization_bearer(&admin.token)
            .json(&json!({
                "name": community,
                "address": "Av. Siempre Viva 742",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let id = data(&response.json())["id"]
            .as_str()
            .expect("community id")
            .parse()
            .expect("community id is a uuid");
        (admin, id)
    }

    pub async fn join(&self, caller: &Caller, community_id: CommunityId) {
        self.server
            .post(&format!("/colonias/{community_id}/join"))
            .authorization_bearer(&caller.token)
            .await
            .assert_status_ok();
    }

    pub async fn residence(
        &self,
        admin: &Caller,
        community_id: CommunityId,
        number: &str,
    ) -> ResidenceId {
        let response = self
            .server
            .post("/residencias/")
            .authorization_bearer(&admin.token)
            .json(&json!({
                "number": number,
                "street": "Calle Olmo",
                "community_id": community_id,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        data(&response.json())["id"]
            .as_str()
            .expect("residence id")
            .parse()
            .expect("residence id is a uuid")
    }

    /// A residence nobody is associated with yet
    pub async fn unclaimed_residence(
        &self,
        community_id: CommunityId,
        number: &str,
    ) -> ResidenceId {
        self.engine
            .seed_residence(NewResidence::new(
                number.to_string(),
                "Calle Olmo".to_string(),
                None,
                community_id,
            ))
            .await
            .id
    }
}

pub fn data(body: &Value) -> &Value {
    assert_eq!(Some(true), body["success"].as_bool(), "expected a success envelope: {body}");
    &body["data"]
}

pub fn error_message(body: &Value) -> &str {
    assert_eq!(Some(false), body["success"].as_bool(), "expected an error envelope: {body}");
    body["error"].as_str().expect("error message")
}

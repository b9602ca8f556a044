use super::*;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;

const SECRET: &str = "session-test-secret";
const AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone)]
struct RefusingProvider;

impl AuthProvider for RefusingProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> ProviderResult<Session> {
        Err(Report::new(AuthProviderError::Rejected(
            "Invalid login credentials".to_string(),
        )))
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: SignUpMetadata,
    ) -> ProviderResult<SignUp> {
        Err(Report::new(AuthProviderError::Unavailable))
    }

    async fn refresh(&self, _refresh_token: &str) -> ProviderResult<Session> {
        Err(Report::new(AuthProviderError::Unavailable))
    }

    async fn sign_out(&self, _access_token: &str) -> ProviderResult<()> {
        Err(Report::new(AuthProviderError::Rejected(
            "session not found".to_string(),
        )))
    }
}

/// Lets everyone in but is down whenever someone signs out
#[derive(Debug, Clone)]
struct WelcomingProvider {
    id: ProfileId,
}

impl WelcomingProvider {
    fn session(&self) -> Session {
        Session {
            access_token: token(self.id, AUDIENCE, 3600, SECRET),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            user: Identity {
                id: self.id,
                email: Some("vecino@example.com".to_string()),
            },
        }
    }
}

impl AuthProvider for WelcomingProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> ProviderResult<Session> {
        Ok(self.session())
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: SignUpMetadata,
    ) -> ProviderResult<SignUp> {
        Ok(SignUp {
            identity: self.session().user,
            session: None,
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> ProviderResult<Session> {
        Ok(self.session())
    }

    async fn sign_out(&self, _access_token: &str) -> ProviderResult<()> {
        Err(Report::new(AuthProviderError::Unavailable))
    }
}

fn store() -> SessionStore<RefusingProvider> {
    SessionStore::new(RefusingProvider, SECRET, AUDIENCE)
}

fn token(profile_id: ProfileId, audience: &str, exp_offset: i64, secret: &str) -> String {
    let claims = json!({
        "sub": profile_id,
        "email": "vecino@example.com",
        "session_id": "session-1",
        "aud": audience,
        "exp": Utc::now().timestamp() + exp_offset,
    });
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn resolve_accepts_a_valid_token() {
    let profile_id = ProfileId::new();

    let context = store()
        .resolve(&token(profile_id, AUDIENCE, 3600, SECRET))
        .await
        .unwrap();

    assert_eq!(profile_id, context.profile_id);
    assert_eq!(Some("vecino@example.com"), context.email.as_deref());
    assert_eq!(Some("session-1"), context.session_id.as_deref());
}

#[tokio::test]
async fn resolve_rejects_bad_tokens() {
    let store = store();
    let profile_id = ProfileId::new();

    for bad in [
        token(profile_id, AUDIENCE, -3600, SECRET),
        token(profile_id, "someone-else", 3600, SECRET),
        token(profile_id, AUDIENCE, 3600, "another-secret"),
        "not-a-jwt".to_string(),
    ] {
        assert_eq!(
            ResolveError::InvalidToken,
            store.resolve(&bad).await.unwrap_err()
        );
    }
}

#[tokio::test]
async fn sign_out_revokes_even_when_the_provider_refuses() {
    let store = store();
    let access_token = token(ProfileId::new(), AUDIENCE, 3600, SECRET);
    let context = store.resolve(&access_token).await.unwrap();
    let mut events = store.subscribe();

    let outcome = store.sign_out(&context).await;

    assert!(matches!(outcome, ProviderOutcome::Rejected(_)));
    assert_eq!(
        ResolveError::Revoked,
        store.resolve(&access_token).await.unwrap_err()
    );
    assert_eq!(
        SessionEvent::SignedOut(context.profile_id),
        events.recv().await.unwrap()
    );
}

#[tokio::test]
async fn rejections_are_outcomes_and_outages_are_errors() {
    let store = store();

    let sign_in = store.sign_in("vecino@example.com", "wrong").await.unwrap();
    let refresh = store.refresh("stale").await;

    assert!(
        matches!(sign_in, ProviderOutcome::Rejected(message) if message == "Invalid login credentials")
    );
    assert!(refresh.is_err());
}

#[tokio::test]
async fn subscribers_hear_about_every_successful_provider_call() {
    let profile_id = ProfileId::new();
    let store = SessionStore::new(WelcomingProvider { id: profile_id }, SECRET, AUDIENCE);
    let mut events = store.subscribe();

    let metadata = SignUpMetadata {
        first_name: "Vecino".to_string(),
        last_name: "Prueba".to_string(),
    };

    store.sign_up("vecino@example.com", "secreto", metadata).await.unwrap();
    store.sign_in("vecino@example.com", "secreto").await.unwrap();
    store.refresh("refresh").await.unwrap();

    assert_eq!(SessionEvent::SignedUp(profile_id), events.recv().await.unwrap());
    assert_eq!(SessionEvent::SignedIn(profile_id), events.recv().await.unwrap());
    assert_eq!(SessionEvent::TokenRefreshed(profile_id), events.recv().await.unwrap());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn refused_calls_are_not_announced() {
    let store = store();
    let mut events = store.subscribe();

    store.sign_in("vecino@example.com", "wrong").await.unwrap();
    let _ = store.refresh("stale").await;

    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn sign_out_survives_an_unreachable_provider() {
    let profile_id = ProfileId::new();
    let store = SessionStore::new(WelcomingProvider { id: profile_id }, SECRET, AUDIENCE);
    let access_token = token(profile_id, AUDIENCE, 3600, SECRET);
    let context = store.resolve(&access_token).await.unwrap();
    let mut events = store.subscribe();

    let outcome = store.sign_out(&context).await;

    assert!(
        matches!(outcome, ProviderOutcome::Rejected(message) if message == "auth provider could not be reached")
    );
    assert_eq!(
        ResolveError::Revoked,
        store.resolve(&access_token).await.unwrap_err()
    );
    assert_eq!(SessionEvent::SignedOut(profile_id), events.recv().await.unwrap());
}

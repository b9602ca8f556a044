use crate::ServiceResult;
use crate::error::ServiceError;
use chrono::Utc;
use colonia_core::ArwLock;
use colonia_core::ids::ProfileId;
use error_stack::{Report, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

mod gotrue;

pub use gotrue::GoTrueClient;

pub type AuthConfigResult<T> = Result<T, Report<MissingAuthProperty>>;
pub type ProviderResult<T> = Result<T, Report<AuthProviderError>>;

#[derive(Debug, thiserror::Error)]
#[error("{0} auth property not specified")]
pub struct MissingAuthProperty(&'static str);

const SUPABASE_URL: &str = "SUPABASE_URL";
const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const SUPABASE_JWT_SECRET: &str = "SUPABASE_JWT_SECRET";
const SUPABASE_JWT_AUDIENCE: &str = "SUPABASE_JWT_AUDIENCE";
const DEFAULT_AUDIENCE: &str = "authenticated";

#[derive(Clone)]
pub struct AuthConfig {
    /// Base url of the Supabase project, e.g. `https://<project>.supabase.co`
    pub url: String,
    /// Public api key sent with every auth request
    pub anon_key: String,
    /// Shared secret the access tokens are signed with (HS256)
    pub jwt_secret: String,
    pub audience: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("url", &self.url)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    pub fn from_env() -> AuthConfigResult<Self> {
        Ok(Self {
            url: std::env::var(SUPABASE_URL).change_context(MissingAuthProperty(SUPABASE_URL))?,
            anon_key: std::env::var(SUPABASE_ANON_KEY)
                .change_context(MissingAuthProperty(SUPABASE_ANON_KEY))?,
            jwt_secret: std::env::var(SUPABASE_JWT_SECRET)
                .change_context(MissingAuthProperty(SUPABASE_JWT_SECRET))?,
            audience: std::env::var(SUPABASE_JWT_AUDIENCE).unwrap_or_else(|_| {
                info!("{SUPABASE_JWT_AUDIENCE} not specified, going with '{DEFAULT_AUDIENCE}'");
                DEFAULT_AUDIENCE.to_string()
            }),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthProviderError {
    /// The provider answered and refused the request, with its message
    #[error("{0}")]
    Rejected(String),
    #[error("auth provider could not be reached")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: ProfileId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: Identity,
}

#[derive(Debug, Clone)]
pub struct SignUp {
    pub identity: Identity,
    /// `None` when the provider requires the email to be confirmed first
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpMetadata {
    pub first_name: String,
    pub last_name: String,
}

/// The external identity service that owns credentials
pub trait AuthProvider: Clone + Send + Sync + 'static {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ProviderResult<Session>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> impl Future<Output = ProviderResult<SignUp>> + Send;

    fn refresh(&self, refresh_token: &str) -> impl Future<Output = ProviderResult<Session>> + Send;

    fn sign_out(&self, access_token: &str) -> impl Future<Output = ProviderResult<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(ProfileId),
    SignedUp(ProfileId),
    SignedOut(ProfileId),
    TokenRefreshed(ProfileId),
}

/// Who is making a request. Built from a verified access token for every request and
/// passed to each operation that acts on behalf of the caller.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub profile_id: ProfileId,
    pub email: Option<String>,
    pub session_id: Option<String>,
    access_token: Arc<str>,
    expires_at: u64,
}

impl SessionContext {
    fn revocation_key(&self) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| self.access_token.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: ProfileId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    exp: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("the access token is invalid or expired")]
    InvalidToken,
    #[error("the session has been signed out")]
    Revoked,
}

/// What the provider said about a request that reached it
#[derive(Debug)]
pub enum ProviderOutcome<T> {
    Success(T),
    Rejected(String),
}

struct TokenKeys {
    decoding_key: DecodingKey,
    validation: Validation,
}

/// Single owner of the session lifecycle: talks to the auth provider, verifies access
/// tokens, remembers signed-out sessions and tells subscribers what happened.
#[derive(Clone)]
pub struct SessionStore<A> {
    provider: A,
    keys: Arc<TokenKeys>,
    // revocation key -> expiry of the token, entries are dropped once the token would have expired anyway
    revoked: ArwLock<HashMap<String, u64>>,
    events: broadcast::Sender<SessionEvent>,
}

const EVENT_CAPACITY: usize = 64;

impl<A: AuthProvider> SessionStore<A> {
    pub fn new(provider: A, jwt_secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            provider,
            keys: Arc::new(TokenKeys {
                decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
                validation,
            }),
            revoked: ArwLock::default(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("no session event subscribers for {event:?}");
        }
    }

    #[instrument(skip_all, name = "session#sign_in")]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> ServiceResult<ProviderOutcome<Session>> {
        let outcome = surface(self.provider.sign_in(email, password).await)?;
        if let ProviderOutcome::Success(session) = &outcome {
            self.publish(SessionEvent::SignedIn(session.user.id));
        }
        Ok(outcome)
    }

    #[instrument(skip_all, name = "session#sign_up")]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> ServiceResult<ProviderOutcome<SignUp>> {
        let outcome = surface(self.provider.sign_up(email, password, metadata).await)?;
        if let ProviderOutcome::Success(sign_up) = &outcome {
            self.publish(SessionEvent::SignedUp(sign_up.identity.id));
        }
        Ok(outcome)
    }

    #[instrument(skip_all, name = "session#refresh")]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<ProviderOutcome<Session>> {
        let outcome = surface(self.provider.refresh(refresh_token).await)?;
        if let ProviderOutcome::Success(session) = &outcome {
            self.publish(SessionEvent::TokenRefreshed(session.user.id));
        }
        Ok(outcome)
    }

    /// The session is revoked locally even when the provider refuses to end it or cannot be reached
    #[instrument(skip_all, name = "session#sign_out", fields(profile_id = %context.profile_id))]
    pub async fn sign_out(&self, context: &SessionContext) -> ProviderOutcome<()> {
        {
            let now = Utc::now().timestamp().max(0) as u64;
            let mut revoked = self.revoked.write().await;
            revoked.retain(|_, expires_at| *expires_at > now);
            revoked.insert(context.revocation_key(), context.expires_at);
        }

        let outcome = match self.provider.sign_out(&context.access_token).await {
            Ok(()) => ProviderOutcome::Success(()),
            Err(report) => {
                warn!("auth provider did not end the session: {report:?}");
                ProviderOutcome::Rejected(report.current_context().to_string())
            }
        };
        self.publish(SessionEvent::SignedOut(context.profile_id));
        outcome
    }

    /// Verifies a bearer token and builds the context for the request carrying it
    pub async fn resolve(&self, access_token: &str) -> Result<SessionContext, ResolveError> {
        let token_data = jsonwebtoken::decode::<Claims>(
            access_token,
            &self.keys.decoding_key,
            &self.keys.validation,
        )
        .map_err(|e| {
            debug!("token validation failed: {e}");
            ResolveError::InvalidToken
        })?;

        let claims = token_data.claims;
        let context = SessionContext {
            profile_id: claims.sub,
            email: claims.email,
            session_id: claims.session_id,
            access_token: access_token.into(),
            expires_at: claims.exp,
        };

        if self
            .revoked
            .read()
            .await
            .contains_key(&context.revocation_key())
        {
            return Err(ResolveError::Revoked);
        }

        Ok(context)
    }
}

fn surface<T>(result: ProviderResult<T>) -> ServiceResult<ProviderOutcome<T>> {
    match result {
        Ok(value) => Ok(ProviderOutcome::Success(value)),
        Err(report) => match report.current_context() {
            AuthProviderError::Rejected(message) => {
                Ok(ProviderOutcome::Rejected(message.clone()))
            }
            AuthProviderError::Unavailable => Err(report.change_context(ServiceError)),
        },
    }
}

#[cfg(test)]
mod tests;

use crate::session::{
    AuthConfig, AuthProvider, AuthProviderError, Identity, ProviderResult, Session, SignUp,
    SignUpMetadata,
};
use error_stack::{Report, ResultExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const APIKEY_HEADER: &str = "apikey";

/// [`AuthProvider`] backed by the Supabase auth api (GoTrue)
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    client: Client,
    base_url: Arc<str>,
    anon_key: Arc<str>,
}

impl GoTrueClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').into(),
            anon_key: config.anon_key.as_str().into(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/auth/v1/{path}", self.base_url))
            .header(APIKEY_HEADER, &*self.anon_key)
    }

    async fn send(request: RequestBuilder) -> ProviderResult<Response> {
        let response = request
            .send()
            .await
            .change_context(AuthProviderError::Unavailable)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.is_server_error() {
            return Err(Report::new(AuthProviderError::Unavailable)
                .attach(format!("auth provider answered with {status}")));
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let message = body.message().unwrap_or_else(|| status.to_string());
        debug!("auth provider rejected request with {status}: {message}");
        Err(Report::new(AuthProviderError::Rejected(message)))
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
        response
            .json::<T>()
            .await
            .change_context(AuthProviderError::Unavailable)
            .attach("unexpected auth provider response body")
    }
}

/// GoTrue reports failures under different keys depending on the endpoint and version
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Sign up answers with a full session when email confirmation is off, otherwise only with the user
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(Session),
    User(Identity),
}

impl AuthProvider for GoTrueClient {
    #[instrument(skip_all, name = "gotrue#sign_in")]
    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<Session> {
        let request = self
            .post("token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        Self::parse(Self::send(request).await?).await
    }

    #[instrument(skip_all, name = "gotrue#sign_up")]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> ProviderResult<SignUp> {
        let request = self.post("signup").json(&json!({
            "email": email,
            "password": password,
            "data": metadata,
        }));

        let sign_up = match Self::parse::<SignUpBody>(Self::send(request).await?).await? {
            SignUpBody::Session(session) => SignUp {
                identity: session.user.clone(),
                session: Some(session),
            },
            SignUpBody::User(identity) => {
                debug!("sign up for {} is waiting on email confirmation", identity.id);
                SignUp {
                    identity,
                    session: None,
                }
            }
        };
        Ok(sign_up)
    }

    #[instrument(skip_all, name = "gotrue#refresh")]
    async fn refresh(&self, refresh_token: &str) -> ProviderResult<Session> {
        let request = self
            .post("token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        Self::parse(Self::send(request).await?).await
    }

    #[instrument(skip_all, name = "gotrue#sign_out")]
    async fn sign_out(&self, access_token: &str) -> ProviderResult<()> {
        let request = self.post("logout").bearer_auth(access_token);

        match Self::send(request).await {
            Ok(_) => Ok(()),
            Err(report) => {
                warn!("auth provider sign out failed: {report:?}");
                Err(report)
            }
        }
    }
}

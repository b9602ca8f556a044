use crate::error::ServiceError;
use crate::session::{
    AuthProvider, ProviderOutcome, Session, SessionContext, SessionStore, SignUp, SignUpMetadata,
};
use crate::{OptServiceResult, ServiceResult, metrics};
use colonia_core::ColoniaEngine;
use colonia_core::model::{NewProfile, Profile};
use colonia_core::repository::ProfileRepository;
use error_stack::ResultExt;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

/// A profile together with the label of its role
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub role: &'static str,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        let role = profile.role().label();
        Self { profile, role }
    }
}

#[derive(Clone)]
pub struct IdentityService<E, A> {
    engine: E,
    sessions: SessionStore<A>,
}

impl<E: ColoniaEngine, A: AuthProvider> IdentityService<E, A> {
    pub fn new(engine: E, sessions: SessionStore<A>) -> Self {
        Self { engine, sessions }
    }

    pub fn sessions(&self) -> &SessionStore<A> {
        &self.sessions
    }

    #[instrument(skip_all, name = "service#sign_in")]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> ServiceResult<ProviderOutcome<Session>> {
        let outcome = self.sessions.sign_in(email, password).await?;

        if let ProviderOutcome::Success(session) = &outcome {
            metrics::increment_sessions_started();
            self.ensure_profile(session, email).await?;
        }

        Ok(outcome)
    }

    /// Signing in with an identity whose profile was never written gets one created
    async fn ensure_profile(&self, session: &Session, email: &str) -> ServiceResult<()> {
        let profiles = self.engine.profiles();
        let id = session.user.id;

        if profiles.get(id).await.change_context(ServiceError)?.is_some() {
            return Ok(());
        }

        info!("no profile for identity {id}, creating one");
        let email = session.user.email.clone().unwrap_or_else(|| email.to_string());
        if let Err(e) = profiles.create(NewProfile::from_email(id, email)).await {
            warn!("could not create missing profile for {id}: {e:?}");
        }
        Ok(())
    }

    #[instrument(skip_all, name = "service#sign_up")]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: String,
        last_name: String,
    ) -> ServiceResult<ProviderOutcome<SignUp>> {
        let metadata = SignUpMetadata {
            first_name: first_name.clone(),
            last_name: last_name.clone(),
        };
        let outcome = self.sessions.sign_up(email, password, metadata).await?;

        if let ProviderOutcome::Success(sign_up) = &outcome {
            if sign_up.session.is_some() {
                metrics::increment_sessions_started();
            }

            let id = sign_up.identity.id;
            let new_profile = NewProfile::resident(id, email.to_string(), first_name, last_name);
            // the identity exists regardless, sign in creates the profile later if this fails
            match self.engine.profiles().create(new_profile).await {
                Ok(_) => debug!("profile created for {id}"),
                Err(e) => warn!("profile write after sign up failed for {id}: {e:?}"),
            }
        }

        Ok(outcome)
    }

    #[instrument(skip_all, name = "service#refresh")]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<ProviderOutcome<Session>> {
        self.sessions.refresh(refresh_token).await
    }

    #[instrument(skip_all, name = "service#sign_out")]
    pub async fn sign_out(&self, context: &SessionContext) -> ProviderOutcome<()> {
        self.sessions.sign_out(context).await
    }

    #[instrument(skip_all, name = "service#profile", fields(profile_id = %context.profile_id))]
    pub async fn profile(&self, context: &SessionContext) -> OptServiceResult<ProfileView> {
        let profile = self
            .engine
            .profiles()
            .get(context.profile_id)
            .await
            .change_context(ServiceError)?;

        Ok(profile.map(ProfileView::from))
    }
}

use crate::application::ports::{
    AuthGateway, AuthUser, IdentityProvider, TokenProvider, UserProfileStore,
};
use crate::domain::entities::{CurrentUser, UserProfile};
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct Session {
    user: CurrentUser,
    profile: UserProfile,
    id_token: String,
}

/// Shared signed-in session. Built separately from `AuthService` so the
/// remote adapters can take their token source before the service that
/// writes into it exists.
#[derive(Default)]
pub struct SessionState {
    inner: RwLock<Option<Session>>,
}

impl SessionState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl IdentityProvider for SessionState {
    async fn current_user(&self) -> Option<CurrentUser> {
        self.inner.read().await.as_ref().map(|s| s.user.clone())
    }
}

#[async_trait]
impl TokenProvider for SessionState {
    async fn id_token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.id_token.clone())
    }
}

/// Sign-in / sign-up flows over the identity provider and the remote user
/// profile documents.
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    profiles: Arc<dyn UserProfileStore>,
    session: Arc<SessionState>,
}

impl AuthService {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        profiles: Arc<dyn UserProfileStore>,
        session: Arc<SessionState>,
    ) -> Self {
        Self {
            gateway,
            profiles,
            session,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile> {
        let auth = self.gateway.sign_in(email, password).await?;
        let profile = self
            .profiles
            .get(&auth.uid)
            .await?
            .ok_or_else(|| AppError::Auth("User data not found".to_string()))?;

        self.store_session(&auth, &profile).await;
        self.touch_last_login(&auth.uid).await;
        info!(uid = %auth.uid, "signed in");
        Ok(profile)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserProfile> {
        let display_name = format!("{} {}", first_name, last_name).trim().to_string();
        let auth = self.gateway.sign_up(email, password, &display_name).await?;

        let profile = UserProfile::new_registered(&auth.uid, &auth.email, first_name, last_name);
        self.profiles.put(&profile).await?;

        self.store_session(&auth, &profile).await;
        info!(uid = %auth.uid, "account created");
        Ok(profile)
    }

    pub async fn sign_in_with_google(&self, google_id_token: &str) -> Result<UserProfile> {
        let auth = self.gateway.sign_in_with_google(google_id_token).await?;

        let profile = match self.profiles.get(&auth.uid).await? {
            Some(profile) => profile,
            None => {
                // First sign-in through Google: materialize the profile
                // document. Read-then-create without a transaction; a
                // concurrent duplicate sign-in writes the same initial
                // document.
                let display_name = auth.display_name.clone().unwrap_or_default();
                let profile = UserProfile::from_provider(&auth.uid, &auth.email, &display_name);
                self.profiles.put(&profile).await?;
                profile
            }
        };

        self.store_session(&auth, &profile).await;
        self.touch_last_login(&auth.uid).await;
        info!(uid = %auth.uid, "signed in with google");
        Ok(profile)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.gateway.request_password_reset(email).await
    }

    pub async fn sign_out(&self) {
        *self.session.inner.write().await = None;
        info!("signed out");
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.inner.read().await.is_some()
    }

    pub async fn current_profile(&self) -> Option<UserProfile> {
        self.session
            .inner
            .read()
            .await
            .as_ref()
            .map(|s| s.profile.clone())
    }

    async fn store_session(&self, auth: &AuthUser, profile: &UserProfile) {
        *self.session.inner.write().await = Some(Session {
            user: profile.as_current_user(),
            profile: profile.clone(),
            id_token: auth.id_token.clone(),
        });
    }

    // Best-effort: a failed timestamp update never fails the sign-in.
    async fn touch_last_login(&self, uid: &str) {
        if let Err(err) = self.profiles.touch_last_login(uid, Utc::now()).await {
            warn!(error = %err, uid, "failed to update last login");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    struct TestAuthGateway {
        sign_in_result: Mutex<Option<Result<AuthUser>>>,
        google_result: Mutex<Option<Result<AuthUser>>>,
    }

    impl TestAuthGateway {
        fn returning(user: AuthUser) -> Arc<Self> {
            Arc::new(Self {
                sign_in_result: Mutex::new(Some(Ok(user.clone()))),
                google_result: Mutex::new(Some(Ok(user))),
            })
        }
    }

    #[async_trait]
    impl AuthGateway for TestAuthGateway {
        async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthUser> {
            self.sign_in_result
                .lock()
                .await
                .take()
                .unwrap_or_else(|| Err(AppError::Auth("unexpected sign_in".into())))
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            display_name: &str,
        ) -> Result<AuthUser> {
            Ok(AuthUser {
                uid: "new-uid".into(),
                email: email.to_string(),
                display_name: Some(display_name.to_string()),
                id_token: "token-new".into(),
            })
        }

        async fn sign_in_with_google(&self, _google_id_token: &str) -> Result<AuthUser> {
            self.google_result
                .lock()
                .await
                .take()
                .unwrap_or_else(|| Err(AppError::Auth("unexpected google sign_in".into())))
        }

        async fn request_password_reset(&self, _email: &str) -> Result<()> {
            Ok(())
        }
    }

    struct MapProfileStore {
        profiles: Mutex<HashMap<String, UserProfile>>,
        touch_result: Mutex<Option<Result<()>>>,
        touched: Mutex<Vec<String>>,
    }

    impl MapProfileStore {
        fn empty() -> Arc<Self> {
            Arc::new(Self {
                profiles: Mutex::new(HashMap::new()),
                touch_result: Mutex::new(None),
                touched: Mutex::new(Vec::new()),
            })
        }

        async fn seed(&self, profile: UserProfile) {
            self.profiles
                .lock()
                .await
                .insert(profile.id.clone(), profile);
        }
    }

    #[async_trait]
    impl UserProfileStore for MapProfileStore {
        async fn get(&self, uid: &str) -> Result<Option<UserProfile>> {
            Ok(self.profiles.lock().await.get(uid).cloned())
        }

        async fn put(&self, profile: &UserProfile) -> Result<()> {
            self.profiles
                .lock()
                .await
                .insert(profile.id.clone(), profile.clone());
            Ok(())
        }

        async fn touch_last_login(
            &self,
            uid: &str,
            _at: chrono::DateTime<Utc>,
        ) -> Result<()> {
            self.touched.lock().await.push(uid.to_string());
            self.touch_result.lock().await.take().unwrap_or(Ok(()))
        }
    }

    fn auth_user(uid: &str) -> AuthUser {
        AuthUser {
            uid: uid.into(),
            email: "anna@example.com".into(),
            display_name: Some("Anna Rossi".into()),
            id_token: format!("token-{uid}"),
        }
    }

    fn service(
        gateway: Arc<TestAuthGateway>,
        profiles: Arc<MapProfileStore>,
    ) -> (AuthService, Arc<SessionState>) {
        let session = SessionState::new();
        let service = AuthService::new(gateway, profiles, Arc::clone(&session));
        (service, session)
    }

    #[tokio::test]
    async fn sign_in_loads_the_profile_and_opens_a_session() {
        let gateway = TestAuthGateway::returning(auth_user("u1"));
        let profiles = MapProfileStore::empty();
        profiles
            .seed(UserProfile::new_registered(
                "u1",
                "anna@example.com",
                "Anna",
                "Rossi",
            ))
            .await;
        let (service, session) = service(gateway, Arc::clone(&profiles));

        let profile = service
            .sign_in("anna@example.com", "hunter22")
            .await
            .expect("sign in");
        assert_eq!(profile.id, "u1");

        let user = session.current_user().await.expect("session open");
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name, "Anna Rossi");
        assert_eq!(session.id_token().await.as_deref(), Some("token-u1"));
        assert_eq!(*profiles.touched.lock().await, vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn sign_in_without_a_profile_document_fails() {
        let gateway = TestAuthGateway::returning(auth_user("u1"));
        let (service, session) = service(gateway, MapProfileStore::empty());

        let err = service
            .sign_in("anna@example.com", "hunter22")
            .await
            .expect_err("no profile");
        assert!(matches!(err, AppError::Auth(_)));
        assert!(session.current_user().await.is_none());
    }

    #[tokio::test]
    async fn last_login_failure_is_swallowed() {
        let gateway = TestAuthGateway::returning(auth_user("u1"));
        let profiles = MapProfileStore::empty();
        profiles
            .seed(UserProfile::new_registered(
                "u1",
                "anna@example.com",
                "Anna",
                "Rossi",
            ))
            .await;
        *profiles.touch_result.lock().await = Some(Err(AppError::Network("offline".into())));
        let (service, _) = service(gateway, profiles);

        service
            .sign_in("anna@example.com", "hunter22")
            .await
            .expect("sign in still succeeds");
    }

    #[tokio::test]
    async fn google_first_sign_in_materializes_the_profile() {
        let gateway = TestAuthGateway::returning(auth_user("g1"));
        let profiles = MapProfileStore::empty();
        let (service, _) = service(gateway, Arc::clone(&profiles));

        let profile = service
            .sign_in_with_google("google-id-token")
            .await
            .expect("google sign in");

        assert_eq!(profile.first_name, "Anna");
        assert_eq!(profile.last_name, "Rossi");
        assert!(profiles.profiles.lock().await.contains_key("g1"));
    }

    #[tokio::test]
    async fn google_repeat_sign_in_reuses_the_existing_profile() {
        let gateway = TestAuthGateway::returning(auth_user("g1"));
        let profiles = MapProfileStore::empty();
        let mut existing = UserProfile::new_registered("g1", "anna@example.com", "Anna", "Rossi");
        existing.bio = "pasta person".into();
        profiles.seed(existing).await;
        let (service, _) = service(gateway, Arc::clone(&profiles));

        let profile = service
            .sign_in_with_google("google-id-token")
            .await
            .expect("google sign in");

        assert_eq!(profile.bio, "pasta person", "existing document untouched");
    }

    #[tokio::test]
    async fn sign_up_creates_the_profile_document() {
        let gateway = TestAuthGateway::returning(auth_user("unused"));
        let profiles = MapProfileStore::empty();
        let (service, session) = service(gateway, Arc::clone(&profiles));

        let profile = service
            .sign_up("marco@example.com", "secret99", "Marco", "Bianchi")
            .await
            .expect("sign up");

        assert_eq!(profile.display_name, "Marco Bianchi");
        assert!(profiles.profiles.lock().await.contains_key("new-uid"));
        assert!(session.current_user().await.is_some());
    }

    #[tokio::test]
    async fn sign_out_clears_the_session() {
        let gateway = TestAuthGateway::returning(auth_user("u1"));
        let profiles = MapProfileStore::empty();
        profiles
            .seed(UserProfile::new_registered(
                "u1",
                "anna@example.com",
                "Anna",
                "Rossi",
            ))
            .await;
        let (service, session) = service(gateway, profiles);

        service
            .sign_in("anna@example.com", "hunter22")
            .await
            .expect("sign in");
        assert!(service.is_signed_in().await);

        service.sign_out().await;
        assert!(!service.is_signed_in().await);
        assert!(session.current_user().await.is_none());
        assert!(session.id_token().await.is_none());
    }
}

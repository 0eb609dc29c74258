use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::storage::{FileStore, KeyValueStore};
use crate::app::SessionConfig;
use crate::constants::{STORAGE_AUTH_FLAG_KEY, STORAGE_USER_KEY};
use crate::models::{Role, User};
use crate::utils::Result;

/// Accounts accepted by the sign-in check: (email, credential, id, name, role).
/// Stand-in for a real authentication service.
const KNOWN_ACCOUNTS: &[(&str, &str, u32, &str, Role)] = &[
    ("admin@electrysure.com", "admin123", 1, "Admin", Role::Admin),
    ("employee@electrysure.com", "employee123", 2, "Employee", Role::Employee),
];

fn account_profile(entry: &(&str, &str, u32, &str, Role)) -> User {
    let (email, _, id, name, role) = *entry;
    User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        role,
        active: true,
    }
}

fn find_account(email: &str, credential: &str) -> Option<User> {
    KNOWN_ACCOUNTS
        .iter()
        .find(|(known_email, known_credential, ..)| *known_email == email && *known_credential == credential)
        .map(account_profile)
}

fn is_known_profile(user: &User) -> bool {
    KNOWN_ACCOUNTS
        .iter()
        .any(|entry| account_profile(entry) == *user)
}

/// How a user found in storage at startup is treated.
///
/// Storage is outside our control, so `Trust` accepts whatever was written
/// there, including stale or edited entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePolicy {
    /// Restore any well-formed saved user without re-validation
    #[default]
    Trust,
    /// Restore only users that exactly match a known account
    VerifyKnownAccount,
}

/// Point-in-time view of the session used for navigation decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub is_admin: bool,
}

/// The signed-in user, persisted to a key-value store on every change.
///
/// Authentication is derived from the presence of a user, so the two can
/// never disagree.
pub struct SessionState {
    user: Option<User>,
    store: Arc<dyn KeyValueStore>,
    login_latency: Duration,
}

impl SessionState {
    /// Create an empty session without reading storage
    pub fn new(store: Arc<dyn KeyValueStore>, login_latency: Duration) -> Self {
        Self {
            user: None,
            store,
            login_latency,
        }
    }

    /// Create a session from whatever was saved in `store`
    pub fn restore(
        store: Arc<dyn KeyValueStore>,
        login_latency: Duration,
        policy: RestorePolicy,
    ) -> Self {
        let mut session = Self::new(store, login_latency);
        session.user = session.load_saved_user(policy);
        session
    }

    /// Open the configured session file and restore from it
    pub fn from_config(config: &SessionConfig) -> anyhow::Result<Self> {
        let path = config.storage_file()?;
        debug!("Session storage at {}", path.display());
        Ok(Self::restore(
            Arc::new(FileStore::new(path)),
            Duration::from_millis(config.login_latency_ms),
            config.restore_policy,
        ))
    }

    fn load_saved_user(&self, policy: RestorePolicy) -> Option<User> {
        let raw = match self.store.get(STORAGE_USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read saved session: {}", e);
                return None;
            }
        };

        let user = match serde_json::from_str::<User>(&raw) {
            Ok(user) => user,
            Err(e) => {
                warn!("Discarding malformed saved user: {}", e);
                self.clear_saved();
                return None;
            }
        };

        if policy == RestorePolicy::VerifyKnownAccount && !is_known_profile(&user) {
            warn!("Saved user {} does not match a known account, discarding", user.email);
            self.clear_saved();
            return None;
        }

        info!("Restored session for {} ({})", user.email, user.role);
        Some(user)
    }

    fn clear_saved(&self) {
        let cleared = self
            .store
            .remove(STORAGE_USER_KEY)
            .and_then(|_| self.store.set(STORAGE_AUTH_FLAG_KEY, "false"));
        if let Err(e) = cleared {
            warn!("Could not clear saved session: {}", e);
        }
    }

    fn persist(&self, user: Option<&User>) -> Result<()> {
        match user {
            Some(user) => {
                let json = serde_json::to_string(user)?;
                self.store.set(STORAGE_USER_KEY, &json)?;
                self.store.set(STORAGE_AUTH_FLAG_KEY, "true")
            }
            None => {
                self.store.remove(STORAGE_USER_KEY)?;
                self.store.set(STORAGE_AUTH_FLAG_KEY, "false")
            }
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_authenticated: self.is_authenticated(),
            is_admin: self.is_admin(),
        }
    }

    /// Check the credentials and sign in.
    ///
    /// Returns `Ok(false)` for unknown credentials, leaving the session as it
    /// was. Errors only come from persisting the new session, in which case
    /// the session is also left as it was.
    pub async fn login(&mut self, email: &str, credential: &str) -> Result<bool> {
        if !self.login_latency.is_zero() {
            tokio::time::sleep(self.login_latency).await;
        }

        let Some(user) = find_account(email.trim(), credential) else {
            info!("Rejected sign-in for {}", email);
            return Ok(false);
        };

        if let Err(e) = self.persist(Some(&user)) {
            self.revert_saved();
            return Err(e);
        }
        info!("Signed in as {} ({})", user.email, user.role);
        self.user = Some(user);
        Ok(true)
    }

    /// Sign out.
    ///
    /// The session only changes once storage agrees; if the store cannot be
    /// written the current user stays signed in and the error is returned.
    pub fn logout(&mut self) -> Result<()> {
        if let Err(e) = self.persist(None) {
            self.revert_saved();
            return Err(e);
        }
        if let Some(user) = self.user.take() {
            info!("Signed out {}", user.email);
        }
        Ok(())
    }

    /// Best effort to put storage back in line with the in-memory session
    /// after a partial write
    fn revert_saved(&self) {
        if let Err(e) = self.persist(self.user.as_ref()) {
            warn!("Saved session may not match the current one: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStore;
    use crate::utils::AdminError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn fresh() -> (Arc<MemoryStore>, SessionState) {
        let store = Arc::new(MemoryStore::new());
        let session = SessionState::new(store.clone(), Duration::ZERO);
        (store, session)
    }

    #[tokio::test]
    async fn test_admin_login() {
        let (store, mut session) = fresh();

        assert!(session.login("admin@electrysure.com", "admin123").await.unwrap());
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.user().unwrap().role, Role::Admin);
        assert_eq!(session.user().unwrap().id, 1);
        assert_eq!(
            store.get(STORAGE_AUTH_FLAG_KEY).unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_employee_login() {
        let (_, mut session) = fresh();

        assert!(session.login("employee@electrysure.com", "employee123").await.unwrap());
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
        assert_eq!(session.user().unwrap().role, Role::Employee);
    }

    #[tokio::test]
    async fn test_bad_credentials_leave_session_unauthenticated() {
        let (store, mut session) = fresh();

        assert!(!session.login("x@x.com", "bad").await.unwrap());
        assert!(!session.login("admin@electrysure.com", "employee123").await.unwrap());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert_eq!(store.get(STORAGE_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (_, mut session) = fresh();
        session.login("admin@electrysure.com", "admin123").await.unwrap();

        assert!(!session.login("employee@electrysure.com", "nope").await.unwrap());
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let (store, mut session) = fresh();
        session.login("admin@electrysure.com", "admin123").await.unwrap();

        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
        assert!(session.user().is_none());
        assert_eq!(store.get(STORAGE_USER_KEY).unwrap(), None);
        assert_eq!(
            store.get(STORAGE_AUTH_FLAG_KEY).unwrap().as_deref(),
            Some("false")
        );

        // Logging out without a session is fine too
        session.logout().unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_yields_identical_user() {
        let (store, mut session) = fresh();
        session.login("employee@electrysure.com", "employee123").await.unwrap();
        let before = session.user().cloned();

        let restored = SessionState::restore(store, Duration::ZERO, RestorePolicy::Trust);

        assert_eq!(restored.user().cloned(), before);
        assert!(restored.is_authenticated());
    }

    #[test]
    fn test_restore_trusts_saved_user() {
        let store = Arc::new(MemoryStore::new());
        // Not an allow-listed profile, accepted anyway under Trust
        store
            .set(
                STORAGE_USER_KEY,
                r#"{"id":9,"email":"someone@electrysure.com","name":"S","role":"admin","active":true}"#,
            )
            .unwrap();

        let session = SessionState::restore(store, Duration::ZERO, RestorePolicy::Trust);
        assert!(session.is_authenticated());
        assert!(session.is_admin());
    }

    #[test]
    fn test_verify_policy_discards_unknown_profile() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                STORAGE_USER_KEY,
                r#"{"id":2,"email":"employee@electrysure.com","name":"Employee","role":"admin","active":true}"#,
            )
            .unwrap();

        let session = SessionState::restore(
            store.clone(),
            Duration::ZERO,
            RestorePolicy::VerifyKnownAccount,
        );
        assert!(!session.is_authenticated());
        assert_eq!(store.get(STORAGE_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_verify_policy_accepts_known_profile() {
        let (store, mut session) = fresh();
        session.login("admin@electrysure.com", "admin123").await.unwrap();

        let restored =
            SessionState::restore(store, Duration::ZERO, RestorePolicy::VerifyKnownAccount);
        assert!(restored.is_admin());
    }

    #[test]
    fn test_malformed_saved_user_is_cleared() {
        let store = Arc::new(MemoryStore::new());
        store.set(STORAGE_USER_KEY, "{not json").unwrap();
        store.set(STORAGE_AUTH_FLAG_KEY, "true").unwrap();

        let session = SessionState::restore(store.clone(), Duration::ZERO, RestorePolicy::Trust);

        assert!(!session.is_authenticated());
        assert_eq!(store.get(STORAGE_USER_KEY).unwrap(), None);
        assert_eq!(
            store.get(STORAGE_AUTH_FLAG_KEY).unwrap().as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_snapshot_without_session() {
        let (_, session) = fresh();
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }

    /// Memory store whose writes can be switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        read_only: AtomicBool,
    }

    impl FlakyStore {
        fn check_writable(&self) -> Result<()> {
            if self.read_only.load(Ordering::SeqCst) {
                return Err(AdminError::StorageError("disk is read-only".to_string()));
            }
            Ok(())
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.check_writable()?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.check_writable()?;
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn test_login_that_cannot_be_saved_stays_signed_out() {
        let store = Arc::new(FlakyStore::default());
        store.read_only.store(true, Ordering::SeqCst);
        let mut session = SessionState::new(store.clone(), Duration::ZERO);

        let result = session.login("admin@electrysure.com", "admin123").await;

        assert!(matches!(result, Err(AdminError::StorageError(_))));
        assert!(!session.is_authenticated());
        assert_eq!(session.snapshot(), SessionSnapshot::default());
        assert_eq!(store.get(STORAGE_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_that_cannot_be_saved_keeps_session() {
        let store = Arc::new(FlakyStore::default());
        let mut session = SessionState::new(store.clone(), Duration::ZERO);
        assert!(session.login("employee@electrysure.com", "employee123").await.unwrap());

        store.read_only.store(true, Ordering::SeqCst);
        assert!(session.logout().is_err());

        // Memory and storage still agree on the signed-in user
        assert!(session.is_authenticated());
        let saved: User = serde_json::from_str(&store.get(STORAGE_USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(Some(&saved), session.user());

        store.read_only.store(false, Ordering::SeqCst);
        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(store.get(STORAGE_USER_KEY).unwrap(), None);
    }
}

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{HttpQuoteApi, QuoteApi};
use crate::app::Config;
use crate::router::{Navigation, Router};
use crate::session::SessionState;
use crate::stores::{EmployeeStore, QuoteStore};

/// Everything the client works with, owned in one place and handed to
/// command handlers by reference
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Signed-in user; sign-in holds the write lock until it settles
    pub session: Arc<RwLock<SessionState>>,
    /// Route table and guard
    pub router: Router,
    /// Quote cache backed by the quotes API
    pub quotes: QuoteStore,
    /// Local employee list
    pub employees: Arc<RwLock<EmployeeStore>>,
    /// File named with `--config`, if any; `init` writes there
    pub config_file: Option<PathBuf>,
}

impl AppState {
    /// Create new app state
    pub fn new(config: Config, session: SessionState, api: Arc<dyn QuoteApi>) -> Self {
        Self {
            config,
            session: Arc::new(RwLock::new(session)),
            router: Router::default(),
            quotes: QuoteStore::new(api),
            employees: Arc::new(RwLock::new(EmployeeStore::seeded())),
            config_file: None,
        }
    }

    pub fn with_config_file(mut self, config_file: Option<PathBuf>) -> Self {
        self.config_file = config_file;
        self
    }

    /// Wire up the file-backed session and the HTTP quotes API from `config`
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let session = SessionState::from_config(&config.session)?;
        let api = HttpQuoteApi::from_config(&config.api)?;
        Ok(Self::new(config, session, Arc::new(api)))
    }

    /// Run the guard for `path` against the current session
    pub async fn navigate(&self, path: &str) -> Navigation {
        // Waits for any sign-in in progress before reading
        let snapshot = self.session.read().await.snapshot();
        self.router.navigate(path, snapshot)
    }
}

pub mod api;
pub mod app;
pub mod cli;
pub mod constants;
pub mod models;
pub mod router;
pub mod runtime;
pub mod session;
pub mod stores;
pub mod utils;

pub use app::{load_config, AppState, Config};
pub use models::{Employee, Quote, QuoteStatus, Role, User};
pub use router::{Navigation, Router};
pub use session::SessionState;
pub use stores::{DashboardMetrics, EmployeeStore, QuoteStore};
pub use utils::AdminError;

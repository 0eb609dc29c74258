// Gateway module for collection state - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod employees;
mod metrics;
mod quotes;

// Public re-exports - the ONLY way to access the stores
pub use employees::EmployeeStore;
pub use metrics::DashboardMetrics;
pub use quotes::QuoteStore;

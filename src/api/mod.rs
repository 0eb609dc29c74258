// Gateway module for the remote quotes API - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod client;
mod traits;
mod types;

// Public re-exports - the ONLY way to access API functionality
pub use client::HttpQuoteApi;
pub use traits::QuoteApi;
pub use types::{ApiResponse, StatusUpdate};

#[cfg(test)]
pub(crate) use traits::MockQuoteApi;

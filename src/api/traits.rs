use async_trait::async_trait;

use crate::models::{Quote, QuoteStatus};
use crate::utils::Result;

/// Remote source of truth for quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteApi: Send + Sync {
    /// `GET /quotes`
    async fn list_quotes(&self) -> Result<Vec<Quote>>;

    /// `PUT /quotes/:id` with the full payload; the server recalculates pricing
    async fn update_quote(&self, id: &str, payload: &Quote) -> Result<Quote>;

    /// `PATCH /quotes/:id/status`
    async fn update_status(&self, id: &str, status: QuoteStatus) -> Result<Quote>;
}

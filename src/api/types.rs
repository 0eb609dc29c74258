use serde::{Deserialize, Serialize};

use crate::models::QuoteStatus;

/// Envelope every quotes API response is wrapped in.
///
/// `success = false` is a failure even when the HTTP status is 200.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Body of `PATCH /quotes/:id/status`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusUpdate {
    pub status: QuoteStatus,
}

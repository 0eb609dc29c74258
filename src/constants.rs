/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api/1.0";
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

// Session
pub const DEFAULT_LOGIN_LATENCY_MS: u64 = 500;
pub const STORAGE_USER_KEY: &str = "user";
pub const STORAGE_AUTH_FLAG_KEY: &str = "isAuthenticated";
pub const SESSION_FILE_NAME: &str = "session.json";

// Routes
pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_AUTHENTICATED_PATH: &str = "/dashboard";
pub const MAX_REDIRECT_HOPS: usize = 8;

// Error messages shown to the user
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the quotes service. Please check your connection and try again.";
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

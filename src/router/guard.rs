use super::routes::RouteMeta;
use crate::constants::{DEFAULT_AUTHENTICATED_PATH, LOGIN_PATH};
use crate::session::SessionSnapshot;

/// Outcome of a navigation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(String),
}

/// Where the user is trying to go
#[derive(Debug, Clone, Copy)]
pub struct Destination<'a> {
    pub path: &'a str,
    /// `None` when the path has no route metadata; treated as unrestricted
    pub meta: Option<RouteMeta>,
}

impl<'a> Destination<'a> {
    pub fn new(path: &'a str, meta: Option<RouteMeta>) -> Self {
        Self { path, meta }
    }
}

/// Decide whether `destination` may be shown for the given session.
///
/// Rules are checked in order and the first match wins:
/// 1. auth required, not signed in -> login page
/// 2. admin required, not an admin -> default page
/// 3. login page while signed in -> default page
pub fn evaluate(destination: &Destination<'_>, session: SessionSnapshot) -> Decision {
    let meta = destination.meta.unwrap_or_default();

    if meta.requires_auth && !session.is_authenticated {
        Decision::RedirectTo(LOGIN_PATH.to_string())
    } else if meta.requires_admin && !session.is_admin {
        Decision::RedirectTo(DEFAULT_AUTHENTICATED_PATH.to_string())
    } else if destination.path == LOGIN_PATH && session.is_authenticated {
        Decision::RedirectTo(DEFAULT_AUTHENTICATED_PATH.to_string())
    } else {
        Decision::Allow
    }
}

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::guard::{evaluate, Decision, Destination};
use crate::constants::{DEFAULT_AUTHENTICATED_PATH, LOGIN_PATH, MAX_REDIRECT_HOPS};
use crate::session::SessionSnapshot;

/// Access requirements attached to a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteMeta {
    pub const PUBLIC: Self = Self {
        requires_auth: false,
        requires_admin: false,
    };
    pub const AUTHENTICATED: Self = Self {
        requires_auth: true,
        requires_admin: false,
    };
    pub const ADMIN: Self = Self {
        requires_auth: true,
        requires_admin: true,
    };
}

/// One entry of the route table.
///
/// Segments starting with `:` in `pattern` capture a path parameter.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub pattern: &'static str,
    pub meta: Option<RouteMeta>,
    /// Static redirect applied before the guard runs
    pub redirect: Option<&'static str>,
}

impl Route {
    pub const fn page(name: &'static str, pattern: &'static str, meta: RouteMeta) -> Self {
        Self {
            name,
            pattern,
            meta: Some(meta),
            redirect: None,
        }
    }

    pub const fn redirect(name: &'static str, pattern: &'static str, to: &'static str) -> Self {
        Self {
            name,
            pattern,
            meta: None,
            redirect: Some(to),
        }
    }

    /// Match a normalized path, returning captured parameters
    fn capture(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = segments(self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, got) in pattern.iter().zip(actual.iter()) {
            if let Some(name) = expected.strip_prefix(':') {
                params.insert(name.to_string(), (*got).to_string());
            } else if expected != got {
                return None;
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Strip query, fragment and trailing slashes; always starts with `/`
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{}", joined)
}

/// The client's pages and their access requirements
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::redirect("root", "/", DEFAULT_AUTHENTICATED_PATH),
        Route::page("login", LOGIN_PATH, RouteMeta::PUBLIC),
        Route::page("dashboard", "/dashboard", RouteMeta::AUTHENTICATED),
        Route::page("quotes", "/quotes", RouteMeta::AUTHENTICATED),
        Route::page("quote-manage", "/quotes/manage/:id", RouteMeta::AUTHENTICATED),
        Route::page("employees", "/employees", RouteMeta::ADMIN),
    ]
}

/// A route table entry matched against a concrete path
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: BTreeMap<String, String>,
}

/// Where a navigation attempt ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Final path after all redirects
    pub path: String,
    /// Name of the matched route, `None` for unknown paths
    pub route: Option<&'static str>,
    pub params: BTreeMap<String, String>,
    /// Paths passed through on the way, in order
    pub redirects: Vec<String>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Route table plus the guard applied on every navigation
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(default_routes())
    }
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route matching `path`, in table order
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = normalize(path);
        self.routes.iter().find_map(|route| {
            route
                .capture(&path)
                .map(|params| RouteMatch { route, params })
        })
    }

    /// Follow static and guard redirects from `path` until a page is allowed.
    ///
    /// The session snapshot is taken once by the caller, so every hop is
    /// judged against the same state.
    pub fn navigate(&self, path: &str, session: SessionSnapshot) -> Navigation {
        let mut current = normalize(path);
        let mut redirects = Vec::new();

        for _ in 0..=MAX_REDIRECT_HOPS {
            let matched = self.resolve(&current);

            let next = match &matched {
                Some(RouteMatch {
                    route: Route {
                        redirect: Some(to), ..
                    },
                    ..
                }) => Some(to.to_string()),
                _ => {
                    let meta = matched.as_ref().and_then(|m| m.route.meta);
                    match evaluate(&Destination::new(&current, meta), session) {
                        Decision::Allow => None,
                        Decision::RedirectTo(to) => Some(to),
                    }
                }
            };

            match next {
                Some(to) => {
                    debug!("Redirecting {} -> {}", current, to);
                    redirects.push(std::mem::replace(&mut current, to));
                }
                None => {
                    return Navigation {
                        route: matched.as_ref().map(|m| m.route.name),
                        params: matched.map(|m| m.params).unwrap_or_default(),
                        path: current,
                        redirects,
                    };
                }
            }
        }

        // Only reachable with a cyclic route table; fall back to the login page
        warn!("Too many redirects starting from {}", path);
        Navigation {
            path: LOGIN_PATH.to_string(),
            route: self.resolve(LOGIN_PATH).map(|m| m.route.name),
            params: BTreeMap::new(),
            redirects,
        }
    }
}

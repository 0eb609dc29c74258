// Gateway module for navigation - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod guard;
mod routes;

// Public re-exports - the ONLY way to access navigation functionality
pub use guard::{evaluate, Decision, Destination};
pub use routes::{default_routes, Navigation, Route, RouteMatch, RouteMeta, Router};

// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod quote;
mod user;

// Public re-exports - the ONLY way to access model types
pub use quote::{ClientInfo, Quote, QuoteStatus, UseType, VehicleInfo};
pub use user::{Employee, EmployeePatch, NewEmployee, Role, User};

#[cfg(test)]
pub(crate) use quote::fixtures;

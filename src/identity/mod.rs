//! Request-scoped identity for the authorization gate.
//! Keep the public surface thin and split implementation across sub-modules.

mod mapper;
mod principal;
mod request_context;

pub use mapper::{DefaultPrincipalToLocal, PrincipalToLocal, RealmStrippingMapper};
pub use principal::{Attrs, Principal};
pub use request_context::RequestContext;

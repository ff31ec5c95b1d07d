//! Function-scoped ACL: source document parsing, snapshot store, decision
//! engine, and post-decision audit hooks.

pub mod authorizer;
pub mod entry;
pub mod hooks;
pub mod store;

pub use authorizer::{
    Authorizer, RequestKind, FUNCTION_KEY, OP_EXECUTE, OP_FAIL_REQUEST, OP_FETCH_REQUEST,
    OP_RESULT,
};
pub use entry::{AclFunctionEntry, CLIENT_USERS_KEY, INVOCATION_USER_KEY};
pub use hooks::{register_file_logger, register_post_decision, DecisionEvent, PostDecisionHook};
pub use store::{AclSnapshot, AclStore};

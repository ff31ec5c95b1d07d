//! Decision engine for the invocation gate. A whitelist evaluator, not a
//! rule engine: no precedence, no negative rules, no wildcards beyond
//! "missing entry + non-strict mode". Default posture is deny; allow requires
//! an explicit, non-empty, matching entry.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::acl::hooks::{emit_decision, DecisionEvent};
use crate::acl::store::AclStore;
use crate::config::GateConfig;
use crate::identity::{DefaultPrincipalToLocal, PrincipalToLocal, RequestContext};
use crate::tprintln;

/// Request-params key carrying the function name.
pub const FUNCTION_KEY: &str = "function.name";

/// Operation submitted by an application client.
pub const OP_EXECUTE: &str = "execute";
/// Operations performed by a worker against the invocations backend.
pub const OP_FETCH_REQUEST: &str = "fetchRequest";
pub const OP_RESULT: &str = "result";
pub const OP_FAIL_REQUEST: &str = "failRequest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A client submitting work for a function.
    Client,
    /// A worker fetching or completing work on a function's behalf.
    Invocation,
}

/// Field of an ACL entry consulted for a request kind. Selected with a plain
/// match, one case per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AclField {
    ClientUsers,
    InvocationUser,
}

impl RequestKind {
    fn field(self) -> AclField {
        match self {
            RequestKind::Client => AclField::ClientUsers,
            RequestKind::Invocation => AclField::InvocationUser,
        }
    }
}

pub struct Authorizer {
    store: AclStore,
    mapper: Arc<dyn PrincipalToLocal>,
}

impl Authorizer {
    pub fn new(config: GateConfig) -> Self {
        Self::with_mapper(config, Arc::new(DefaultPrincipalToLocal))
    }

    pub fn with_mapper(config: GateConfig, mapper: Arc<dyn PrincipalToLocal>) -> Self {
        Self { store: AclStore::new(config), mapper }
    }

    /// The backing store, for explicit reload triggers by the host.
    pub fn store(&self) -> &AclStore {
        &self.store
    }

    /// Routes an operation name to the request kind it represents. Unknown
    /// operations are denied.
    pub fn permit(&self, context: &RequestContext, operation: &str, params: &Value) -> bool {
        match operation {
            OP_EXECUTE => self.permit_client_request(context, operation, params),
            OP_FETCH_REQUEST | OP_RESULT | OP_FAIL_REQUEST => {
                self.permit_invocation_request(context, operation, params)
            }
            other => {
                debug!("denying unknown operation '{}'", other);
                false
            }
        }
    }

    pub fn permit_client_request(
        &self,
        context: &RequestContext,
        operation: &str,
        params: &Value,
    ) -> bool {
        self.permit_request(context, operation, params, RequestKind::Client)
    }

    pub fn permit_invocation_request(
        &self,
        context: &RequestContext,
        operation: &str,
        params: &Value,
    ) -> bool {
        self.permit_request(context, operation, params, RequestKind::Invocation)
    }

    fn permit_request(
        &self,
        context: &RequestContext,
        operation: &str,
        params: &Value,
        kind: RequestKind,
    ) -> bool {
        // Decisions always reflect the latest configuration; a failed reload
        // degrades to the last-good mapping, which still answers deny safely.
        if let Err(e) = self.store.reload_if_stale() {
            warn!("acl reload failed, deciding against last-good mapping: {}", e);
        }

        let function = params.get(FUNCTION_KEY).and_then(Value::as_str).unwrap_or("");
        let principal = context.principal_name();
        let local_user = self.mapper.to_local(context.principal.as_ref());

        let allow = self.decide(function, principal, local_user.as_deref(), kind);
        tprintln!("acl.decision op={} function={} allow={}", operation, function, allow);

        emit_decision(&DecisionEvent {
            principal: principal.map(str::to_string),
            local_user,
            function: function.to_string(),
            operation: operation.to_string(),
            kind,
            allow,
            request_id: context.request_id.clone(),
        });
        allow
    }

    fn decide(
        &self,
        function: &str,
        principal: Option<&str>,
        local_user: Option<&str>,
        kind: RequestKind,
    ) -> bool {
        if function.is_empty() {
            return false;
        }
        let Some(entry) = self.store.lookup(function) else {
            return self.store.permit_when_missing();
        };
        match kind.field() {
            AclField::ClientUsers => {
                if entry.client_users.is_empty() {
                    warn!(
                        "acl entry for function '{}' defines no client users; denying",
                        function
                    );
                    return false;
                }
                principal.map_or(false, |p| entry.client_users.contains(p))
                    || local_user.map_or(false, |u| entry.client_users.contains(u))
            }
            AclField::InvocationUser => {
                let Some(user) = entry.invocation_user.as_deref() else {
                    warn!(
                        "acl entry for function '{}' defines no invocation user; denying",
                        function
                    );
                    return false;
                };
                principal == Some(user) || local_user == Some(user)
            }
        }
    }
}

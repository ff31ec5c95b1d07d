use super::Principal;

/// Per-request holder of the caller's authenticated identity. Populated by
/// the surrounding transport layer; read-only to the decision engine.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_principal(principal: Principal) -> Self {
        Self { principal: Some(principal), request_id: None }
    }

    /// Name of the authenticated principal, if any. Absence means
    /// unauthenticated, never a wildcard.
    pub fn principal_name(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.name.as_str())
    }
}

//! Principal-to-local mapping: translate an authenticated principal into the
//! deployment-local user name the ACL entries are written against.

use super::Principal;

pub trait PrincipalToLocal: Send + Sync {
    /// Local user name for the principal, or None when unauthenticated.
    fn to_local(&self, principal: Option<&Principal>) -> Option<String>;
}

/// Uses the principal name unchanged.
pub struct DefaultPrincipalToLocal;

impl PrincipalToLocal for DefaultPrincipalToLocal {
    fn to_local(&self, principal: Option<&Principal>) -> Option<String> {
        principal.map(|p| p.name.clone())
    }
}

/// Strips kerberos-style decorations: `user/host@REALM` maps to `user`.
pub struct RealmStrippingMapper;

impl PrincipalToLocal for RealmStrippingMapper {
    fn to_local(&self, principal: Option<&Principal>) -> Option<String> {
        let name = principal?.name.as_str();
        let name = name.split('@').next().unwrap_or(name);
        let name = name.split('/').next().unwrap_or(name);
        if name.is_empty() { None } else { Some(name.to_string()) }
    }
}

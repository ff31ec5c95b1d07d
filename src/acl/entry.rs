use std::collections::{HashMap, HashSet};

use serde::Deserialize;

/// Key holding the list of users allowed to submit work for a function.
pub const CLIENT_USERS_KEY: &str = "client.users";
/// Key holding the single user allowed to act as the function's worker.
pub const INVOCATION_USER_KEY: &str = "invocation.user";

/// Per-function access entry. Both fields may be absent in the source
/// document; an entry with neither populated always denies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclFunctionEntry {
    pub client_users: HashSet<String>,
    pub invocation_user: Option<String>,
}

impl AclFunctionEntry {
    pub fn new<I: IntoIterator<Item = String>>(client_users: I, invocation_user: Option<String>) -> Self {
        Self { client_users: client_users.into_iter().collect(), invocation_user }
    }
}

/// On-disk shape of the ACL source. Functions live under the `acl` section;
/// a document without one yields an empty mapping.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AclDocument {
    #[serde(default)]
    pub acl: Option<HashMap<String, RawAclEntry>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAclEntry {
    #[serde(rename = "client.users", default)]
    pub client_users: Option<Vec<String>>,
    #[serde(rename = "invocation.user", default)]
    pub invocation_user: Option<String>,
}

impl From<RawAclEntry> for AclFunctionEntry {
    fn from(raw: RawAclEntry) -> Self {
        Self {
            client_users: raw.client_users.unwrap_or_default().into_iter().collect(),
            invocation_user: raw.invocation_user,
        }
    }
}

//! Boot-time configuration for the authorization gate.
//! The strict flag and the ACL file path are fixed at construction; only the
//! contents of the ACL file change over the life of the process.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateConfig {
    /// Deny functions with no ACL entry. When false, a missing entry allows.
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Path of the JSON document holding the `acl` section.
    pub acl_file: PathBuf,
    /// Freshness window in milliseconds for the ACL snapshot. None means
    /// every decision re-reads the file, so decisions always reflect the
    /// latest configuration.
    #[serde(default)]
    pub freshness_ms: Option<u64>,
}

fn default_strict() -> bool { true }

impl GateConfig {
    pub fn new(acl_file: impl Into<PathBuf>, strict: bool) -> Self {
        Self { strict, acl_file: acl_file.into(), freshness_ms: None }
    }

    pub fn with_freshness(mut self, window: Duration) -> Self {
        self.freshness_ms = Some(window.as_millis() as u64);
        self
    }

    pub fn freshness(&self) -> Option<Duration> {
        self.freshness_ms.map(Duration::from_millis)
    }
}

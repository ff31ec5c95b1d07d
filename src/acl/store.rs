//! Snapshot store for the function ACL. The mapping is replaced wholesale on
//! every reload and never mutated in place, so concurrent readers always see
//! a complete mapping. A failed reload keeps the last-good snapshot.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::acl::entry::{AclDocument, AclFunctionEntry};
use crate::config::GateConfig;
use crate::error::{Error, Result};

pub type AclSnapshot = Arc<HashMap<String, AclFunctionEntry>>;

pub struct AclStore {
    config: GateConfig,
    permit_when_missing: bool,
    snapshot: RwLock<AclSnapshot>,
    last_reload: Mutex<Option<Instant>>,
}

impl AclStore {
    /// Builds an empty store. The first decision (or an explicit `reload`)
    /// populates it from the configured file.
    pub fn new(config: GateConfig) -> Self {
        let permit_when_missing = !config.strict;
        Self {
            config,
            permit_when_missing,
            snapshot: RwLock::new(Arc::new(HashMap::new())),
            last_reload: Mutex::new(None),
        }
    }

    /// Whether a function with no entry resolves to allow. Fixed at boot.
    pub fn permit_when_missing(&self) -> bool {
        self.permit_when_missing
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Current snapshot handle. Cheap; never blocks on a reload in progress
    /// beyond the swap itself.
    pub fn snapshot(&self) -> AclSnapshot {
        self.snapshot.read().clone()
    }

    pub fn lookup(&self, function: &str) -> Option<AclFunctionEntry> {
        self.snapshot.read().get(function).cloned()
    }

    /// Re-reads the ACL file and swaps the snapshot. On any read or parse
    /// failure the previous mapping stays in service and the error is
    /// returned for the caller to surface.
    pub fn reload(&self) -> Result<()> {
        let path = &self.config.acl_file;
        let text = fs::read_to_string(path)
            .map_err(|e| Error::config(path.clone(), e.to_string()))?;
        let doc: AclDocument = serde_json::from_str(&text)
            .map_err(|e| Error::config(path.clone(), e.to_string()))?;

        let mapping: HashMap<String, AclFunctionEntry> = match doc.acl {
            Some(entries) => entries.into_iter().map(|(f, raw)| (f, raw.into())).collect(),
            None => {
                if !self.permit_when_missing {
                    warn!(
                        "acl file {} has no acl section while strict mode is on; all requests will be denied",
                        path.display()
                    );
                }
                HashMap::new()
            }
        };

        debug!("acl reloaded: {} function entries", mapping.len());
        *self.snapshot.write() = Arc::new(mapping);
        *self.last_reload.lock() = Some(Instant::now());
        Ok(())
    }

    /// Reload unless the current snapshot is within the freshness window.
    /// With no window configured every call reloads, so decisions always see
    /// the latest file contents.
    pub fn reload_if_stale(&self) -> Result<()> {
        if let Some(window) = self.config.freshness() {
            let last = *self.last_reload.lock();
            if let Some(at) = last {
                if at.elapsed() < window {
                    return Ok(());
                }
            }
        }
        self.reload()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    fn write_acl(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("acl.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reload_builds_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_acl(&dir, r#"{"acl": {"addNumbers": {"client.users": ["u1"]}}}"#);
        let store = AclStore::new(GateConfig::new(path, true));
        store.reload().unwrap();
        let entry = store.lookup("addNumbers").unwrap();
        assert!(entry.client_users.contains("u1"));
        assert!(store.lookup("other").is_none());
    }

    #[test]
    fn reload_replaces_never_merges() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_acl(&dir, r#"{"acl": {"a": {"invocation.user": "w1"}, "b": {}}}"#);
        let store = AclStore::new(GateConfig::new(path.clone(), true));
        store.reload().unwrap();
        assert!(store.lookup("a").is_some());
        assert!(store.lookup("b").is_some());

        fs::write(&path, r#"{"acl": {"a": {"invocation.user": "w2"}}}"#).unwrap();
        store.reload().unwrap();
        assert_eq!(store.lookup("a").unwrap().invocation_user.as_deref(), Some("w2"));
        // Stale entries do not linger after the swap
        assert!(store.lookup("b").is_none());
    }

    #[test]
    fn failed_reload_keeps_last_good() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_acl(&dir, r#"{"acl": {"a": {"client.users": ["u1"]}}}"#);
        let store = AclStore::new(GateConfig::new(path.clone(), true));
        store.reload().unwrap();

        fs::write(&path, "{ not json").unwrap();
        let err = store.reload().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        // Prior mapping still served
        assert!(store.lookup("a").is_some());

        fs::remove_file(&path).unwrap();
        assert!(store.reload().is_err());
        assert!(store.lookup("a").is_some());
    }

    #[test]
    fn unchanged_source_reloads_to_equal_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_acl(
            &dir,
            r#"{"acl": {"a": {"client.users": ["u1", "u2"], "invocation.user": "w1"}}}"#,
        );
        let store = AclStore::new(GateConfig::new(path, false));
        store.reload().unwrap();
        let first = store.snapshot();
        store.reload().unwrap();
        let second = store.snapshot();
        assert_eq!(*first, *second);
    }

    #[test]
    fn missing_acl_section_empties_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_acl(&dir, r#"{"acl": {"a": {}}}"#);
        let store = AclStore::new(GateConfig::new(path.clone(), true));
        store.reload().unwrap();
        assert!(store.lookup("a").is_some());

        fs::write(&path, r#"{}"#).unwrap();
        store.reload().unwrap();
        assert!(store.lookup("a").is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn freshness_window_skips_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_acl(&dir, r#"{"acl": {"a": {"client.users": ["u1"]}}}"#);
        let cfg = GateConfig::new(path.clone(), true).with_freshness(Duration::from_secs(60));
        let store = AclStore::new(cfg);
        store.reload_if_stale().unwrap();

        // Within the window the old snapshot is served even after a change
        fs::write(&path, r#"{"acl": {}}"#).unwrap();
        store.reload_if_stale().unwrap();
        assert!(store.lookup("a").is_some());

        // An explicit reload always re-reads
        store.reload().unwrap();
        assert!(store.lookup("a").is_none());
    }
}

//! Post-decision hooks. Keep non-blocking surfaces thin and small: hooks run
//! after the decision is made and can never change it.

use std::io::Write;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::authorizer::RequestKind;

#[derive(Debug, Clone)]
pub struct DecisionEvent {
    pub principal: Option<String>,
    pub local_user: Option<String>,
    pub function: String,
    pub operation: String,
    pub kind: RequestKind,
    pub allow: bool,
    pub request_id: Option<String>,
}

pub trait PostDecisionHook: Send + Sync {
    fn on_decision(&self, ev: &DecisionEvent);
}

// Global registry (process-local)
static REG: Lazy<RwLock<Vec<Box<dyn PostDecisionHook>>>> = Lazy::new(|| RwLock::new(Vec::new()));

pub fn register_post_decision(h: Box<dyn PostDecisionHook>) {
    REG.write().push(h);
}

pub fn emit_decision(ev: &DecisionEvent) {
    for h in REG.read().iter() {
        // Best-effort; hook implementors handle their own errors
        h.on_decision(ev);
    }
}

// --- Simple file logger sink for audit events ---

struct FileLogger {
    path: String,
}

impl PostDecisionHook for FileLogger {
    fn on_decision(&self, ev: &DecisionEvent) {
        // Write a compact JSON line; ignore errors
        let ts = chrono::Utc::now().timestamp_millis();
        let kind = match ev.kind {
            RequestKind::Client => "client",
            RequestKind::Invocation => "invocation",
        };
        let obj = serde_json::json!({
            "ts": ts,
            "principal": ev.principal,
            "local_user": ev.local_user,
            "function": ev.function,
            "operation": ev.operation,
            "kind": kind,
            "allow": ev.allow,
            "request_id": ev.request_id,
        });
        if let Ok(mut f) = std::fs::OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(&mut f, "{}", obj);
        }
    }
}

/// Convenience: register a file logger sink to capture decision audit events.
pub fn register_file_logger(path: &str) {
    register_post_decision(Box::new(FileLogger { path: path.to_string() }));
}

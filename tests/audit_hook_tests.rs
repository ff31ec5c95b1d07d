//! Decision audit sink test. Kept in its own binary because the hook
//! registry is process-local.

use std::fs;

use anyhow::Result;
use serde_json::{json, Value};
use tempfile::tempdir;

use drover::acl::{register_file_logger, Authorizer, FUNCTION_KEY, OP_EXECUTE};
use drover::config::GateConfig;
use drover::identity::{Principal, RequestContext};

#[test]
fn file_logger_records_decisions() -> Result<()> {
    let dir = tempdir()?;
    let acl_path = dir.path().join("acl.json");
    fs::write(&acl_path, r#"{"acl": {"f": {"client.users": ["alice"]}}}"#)?;
    let audit_path = dir.path().join("audit.jsonl");
    register_file_logger(audit_path.to_str().unwrap());

    let auth = Authorizer::new(GateConfig::new(&acl_path, true));
    let mut ctx = RequestContext::for_principal(Principal::named("alice"));
    ctx.request_id = Some("req-1".into());
    assert!(auth.permit_client_request(&ctx, OP_EXECUTE, &json!({ FUNCTION_KEY: "f" })));
    assert!(!auth.permit_client_request(
        &RequestContext::anonymous(),
        OP_EXECUTE,
        &json!({ FUNCTION_KEY: "f" })
    ));

    let lines: Vec<Value> = fs::read_to_string(&audit_path)?
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0]["principal"], "alice");
    assert_eq!(lines[0]["function"], "f");
    assert_eq!(lines[0]["operation"], "execute");
    assert_eq!(lines[0]["kind"], "client");
    assert_eq!(lines[0]["allow"], true);
    assert_eq!(lines[0]["request_id"], "req-1");
    assert!(lines[0]["ts"].as_i64().unwrap() > 0);

    assert_eq!(lines[1]["principal"], Value::Null);
    assert_eq!(lines[1]["allow"], false);
    Ok(())
}

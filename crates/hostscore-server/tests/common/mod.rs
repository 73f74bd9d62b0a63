#![allow(dead_code)]

use anyhow::Result;
use hostscore_server::config::ServerConfig;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

pub const NOW: i64 = 1_700_000_300;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub config: ServerConfig,
}

/// Writes `samples` (and `rules`, when given) into a temp dir together with
/// a config file pointing at them, then loads the config back.
pub fn build_test_context(samples: Value, rules: Option<Value>) -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let samples_path = temp_dir.path().join("samples.json");
    std::fs::write(&samples_path, serde_json::to_vec(&samples)?)?;

    let mut toml = format!(
        "samples_path = {:?}\nlocale = \"en\"\nmax_concurrent = 2\n",
        path_str(&samples_path)
    );
    if let Some(rules) = rules {
        let rules_path = temp_dir.path().join("rules.json");
        std::fs::write(&rules_path, serde_json::to_vec(&json!({ "rules": rules }))?)?;
        toml.push_str(&format!("rules_path = {:?}\n", path_str(&rules_path)));
    }

    let config_path = temp_dir.path().join("hostscore.toml");
    std::fs::write(&config_path, toml)?;
    let config = ServerConfig::load(path_str(&config_path))?;

    Ok(TestContext { temp_dir, config })
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap_or_default()
}

pub fn cpu_sample(host: &str, ts: i64, usr: f64, sys: f64, iow: f64) -> Value {
    json!({
        "host_id": host,
        "timestamp": ts,
        "cpu_usr": usr,
        "cpu_sys": sys,
        "cpu_iow": iow,
    })
}

pub fn rule(
    id: &str,
    kind: &str,
    target: Option<&str>,
    severity: &str,
    field: &str,
    op: &str,
    threshold: f64,
) -> Value {
    json!({
        "id": id,
        "name": id,
        "kind": kind,
        "target_host": target,
        "condition": { "field": field, "operator": op, "threshold": threshold },
        "severity": severity,
    })
}

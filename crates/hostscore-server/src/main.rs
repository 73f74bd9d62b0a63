use anyhow::Result;
use chrono::Utc;
use hostscore_alert::validation::validate_rule;
use hostscore_alert::AlertFilter;
use hostscore_common::types::{RuleKind, Severity, TimeWindow};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hostscore_server::config::ServerConfig;
use hostscore_server::{build_engine, fleet, load_store};

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  hostscore fleet <config.toml> [--hosts a,b] [--now <epoch>] [--brief]   Score all active hosts");
    eprintln!("  hostscore host <config.toml> <host_id> [--now <epoch>] [--brief]         Score one host");
    eprintln!("  hostscore alerts <config.toml> [--hosts a,b] [--severity s,..] [--kind global|specific] [--now <epoch>]");
    eprintln!("                                                                          List current alerts");
    eprintln!("  hostscore overview <config.toml> [--now <epoch>]                         Latest derived metrics per host");
    eprintln!("  hostscore check-rules <config.toml>                                      Validate the rule catalog");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hostscore=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);

    if matches!(command, None | Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let config_path = args.get(2).ok_or_else(|| {
        print_usage();
        anyhow::anyhow!("missing <config.toml> argument")
    })?;
    let config = ServerConfig::load(config_path)?;
    let opts = &args[3..];

    match command {
        Some("fleet") => run_fleet(&config, opts).await,
        Some("host") => {
            let host_id = opts.first().filter(|a| !a.starts_with("--")).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("host requires a <host_id> argument")
            })?;
            run_host(&config, host_id, &opts[1..])
        }
        Some("alerts") => run_alerts(&config, opts),
        Some("overview") => run_overview(&config, opts),
        Some("check-rules") => run_check_rules(&config),
        Some(other) => {
            print_usage();
            anyhow::bail!("unknown command '{other}'")
        }
        None => Ok(()),
    }
}

/// Value following `name` in `opts`, if present.
fn flag_value<'a>(opts: &'a [String], name: &str) -> Option<&'a str> {
    opts.iter()
        .position(|a| a == name)
        .and_then(|i| opts.get(i + 1))
        .map(String::as_str)
}

fn has_flag(opts: &[String], name: &str) -> bool {
    opts.iter().any(|a| a == name)
}

fn list_flag(opts: &[String], name: &str) -> Vec<String> {
    flag_value(opts, name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn evaluation_now(opts: &[String]) -> Result<i64> {
    match flag_value(opts, "--now") {
        Some(v) => v
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid --now value '{v}': {e}")),
        None => Ok(Utc::now().timestamp()),
    }
}

fn include_details(config: &ServerConfig, opts: &[String]) -> bool {
    config.include_details && !has_flag(opts, "--brief")
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_fleet(config: &ServerConfig, opts: &[String]) -> Result<()> {
    let now = evaluation_now(opts)?;
    let window = TimeWindow::ending_at(now, config.window_secs);
    let hosts = list_flag(opts, "--hosts");
    let host_ids = (!hosts.is_empty()).then_some(hosts);

    let engine = build_engine(config, load_store(config)?);
    let report = fleet::score_fleet(
        &engine,
        host_ids,
        window,
        now,
        include_details(config, opts),
        config.max_concurrent,
    )
    .await?;
    print_json(&report)
}

fn run_host(config: &ServerConfig, host_id: &str, opts: &[String]) -> Result<()> {
    let now = evaluation_now(opts)?;
    let window = TimeWindow::ending_at(now, config.window_secs);

    let engine = build_engine(config, load_store(config)?);
    let score = engine.score_host(host_id, window, now, include_details(config, opts))?;
    print_json(&score)
}

fn run_alerts(config: &ServerConfig, opts: &[String]) -> Result<()> {
    let now = evaluation_now(opts)?;
    let window = TimeWindow::ending_at(now, config.window_secs);

    let severities = list_flag(opts, "--severity")
        .iter()
        .map(|s| s.parse::<Severity>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("invalid --severity: {e}"))?;
    let kinds = list_flag(opts, "--kind")
        .iter()
        .map(|s| s.parse::<RuleKind>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("invalid --kind: {e}"))?;
    let filter = AlertFilter {
        hosts: list_flag(opts, "--hosts"),
        severities,
        kinds,
    };

    let engine = build_engine(config, load_store(config)?);
    let alerts = engine.list_alerts(&filter, window, now)?;
    tracing::info!(alerts = alerts.len(), "Alerts listed");
    print_json(&alerts)
}

fn run_overview(config: &ServerConfig, opts: &[String]) -> Result<()> {
    let now = evaluation_now(opts)?;
    let window = TimeWindow::ending_at(now, config.window_secs);

    let engine = build_engine(config, load_store(config)?);
    print_json(&engine.host_overview(window)?)
}

#[derive(Serialize)]
struct RuleCheck {
    id: String,
    name: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_check_rules(config: &ServerConfig) -> Result<()> {
    let store = load_store(config)?;
    let checks: Vec<RuleCheck> = store
        .rules()?
        .into_iter()
        .map(|rule| {
            let error = validate_rule(&rule).err().map(|e| e.to_string());
            RuleCheck {
                valid: error.is_none(),
                id: rule.id,
                name: rule.name,
                error,
            }
        })
        .collect();

    print_json(&checks)?;

    let invalid = checks.iter().filter(|c| !c.valid).count();
    if invalid > 0 {
        anyhow::bail!("{invalid} of {} rules are invalid", checks.len());
    }
    tracing::info!(rules = checks.len(), "All rules valid");
    Ok(())
}

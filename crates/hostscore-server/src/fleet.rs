use hostscore_alert::{FleetReport, FleetSummary, HealthEngine, MachineScore};
use hostscore_common::types::TimeWindow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Scores the fleet with at most `max_concurrent` hosts in flight.
///
/// Each host runs on the blocking pool since store reads may block. Scores
/// come back in host order. Once a host fails no further hosts are
/// scheduled, the rest are aborted and that host's error is returned.
pub async fn score_fleet(
    engine: &HealthEngine,
    host_ids: Option<Vec<String>>,
    window: TimeWindow,
    now: i64,
    include_details: bool,
    max_concurrent: usize,
) -> anyhow::Result<FleetReport> {
    let hosts = {
        let engine = engine.clone();
        tokio::task::spawn_blocking(move || engine.target_hosts(host_ids.as_deref(), window))
            .await??
    };

    tracing::info!(
        hosts = hosts.len(),
        max_concurrent,
        window_start = window.start,
        window_end = window.end,
        "Scoring fleet"
    );

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let failed = Arc::new(AtomicBool::new(false));
    let mut slots: Vec<Option<MachineScore>> = vec![None; hosts.len()];
    let mut tasks = JoinSet::new();

    for (idx, host) in hosts.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        if failed.load(Ordering::Acquire) {
            tracing::warn!(remaining_from = idx, "Host failure, no further hosts scheduled");
            break;
        }
        let engine = engine.clone();
        let failed = failed.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let result = engine.score_host(&host, window, now, include_details);
            if let Err(e) = &result {
                failed.store(true, Ordering::Release);
                tracing::error!(host_id = %host, error = %e, "Failed to score host");
            }
            (idx, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined? {
            (idx, Ok(score)) => slots[idx] = Some(score),
            (_, Err(e)) => {
                tasks.abort_all();
                return Err(e.into());
            }
        }
    }
    let scores: Vec<MachineScore> = slots.into_iter().flatten().collect();

    let summary = FleetSummary::from_scores(&scores);
    tracing::info!(
        hosts = summary.total_hosts,
        average_score = summary.average_score,
        alerts = summary.alert_distribution.total_alerts,
        "Fleet scoring complete"
    );
    Ok(FleetReport { scores, summary })
}

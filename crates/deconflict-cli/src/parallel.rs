//! Parallel pair checking.
//!
//! The registry is snapshotted up front, each mission pair runs on the
//! blocking pool, and results are put back into canonical pair order so the
//! report matches [`ConflictDetector::run`].

use anyhow::{Context, Result};
use deconflict_core::{Conflict, ConflictDetector, DetectionReport, Mission};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Check every registered pair with at most `max_concurrency` pairs in flight.
pub async fn run_parallel(
    detector: &ConflictDetector,
    max_concurrency: usize,
) -> Result<DetectionReport> {
    let snapshot = Arc::new(detector.clone());
    let missions: Arc<Vec<Mission>> = Arc::new(detector.missions().cloned().collect());
    let permits = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let pairs = snapshot.mission_pairs();

    let mut tasks: JoinSet<(usize, Vec<Conflict>)> = JoinSet::new();
    for (index, (i, j)) in pairs.iter().copied().enumerate() {
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .context("Pair scheduler closed")?;
        let snapshot = snapshot.clone();
        let missions = missions.clone();
        tasks.spawn_blocking(move || {
            let _permit = permit;
            (index, snapshot.detect_pair(&missions[i], &missions[j]))
        });
    }

    let mut results = Vec::with_capacity(pairs.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.context("Pair check task failed")?);
    }
    results.sort_by_key(|(index, _)| *index);

    let conflicts: Vec<Conflict> = results
        .into_iter()
        .flat_map(|(_, conflicts)| conflicts)
        .collect();
    tracing::info!(
        "Checked {} pair(s) in parallel: {} conflict(s)",
        pairs.len(),
        conflicts.len()
    );
    Ok(DetectionReport::from_conflicts(conflicts))
}

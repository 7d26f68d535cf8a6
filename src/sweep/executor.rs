//! Batch deletion over the expired set
//!
//! Runs after evaluation so the sweep operates on a stable list. Each
//! expired movie is removed from every manager instance that carries a
//! copy; a failed copy is logged and the batch moves on.

use std::collections::HashMap;

use crate::models::MovieSeed;
use crate::sweep::pipeline::SweepReport;

/// Final counts for one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    /// Movies selected for deletion (or that would be, in dry-run)
    pub deleted: usize,
    /// Movies examined and retained
    pub kept: usize,
    /// Movies inside the warning window
    pub expiring_soon: usize,
}

/// Delete every expired movie from all of its manager instances
///
/// In dry-run mode the selection is logged but nothing is removed.
pub async fn delete_expired(
    seeds: &HashMap<String, MovieSeed>,
    report: &SweepReport,
    dry_run: bool,
) -> SweepSummary {
    let mut deleted = 0usize;

    for tmdb_id in &report.expired {
        let Some(seed) = seeds.get(tmdb_id) else {
            continue;
        };

        if dry_run {
            tracing::info!(title = %seed.title, "Would delete movie");
            deleted += 1;
            continue;
        }

        tracing::info!(title = %seed.title, "Deleting movie");

        for copy in &seed.copies {
            match copy.instance.delete_movie(copy.radarr_id).await {
                Ok(()) => {
                    tracing::info!(
                        title = %seed.title,
                        instance = copy.instance.instance_name(),
                        "Deleted movie"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        title = %seed.title,
                        instance = copy.instance.instance_name(),
                        error = %e,
                        "Failed to delete movie copy"
                    );
                }
            }
        }

        // Counts movies selected for removal; per-copy failures are
        // logged above and retried on the next run.
        deleted += 1;
    }

    SweepSummary {
        deleted,
        kept: report.processed.saturating_sub(deleted),
        expiring_soon: report.expiring_soon.len(),
    }
}

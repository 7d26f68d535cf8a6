//! Concurrent movie evaluation pipeline
//!
//! Fans each movie seed out to the catalog and watch-history backends,
//! assembles a full [`MovieRecord`], and asks the retention policy for a
//! decision. Lookups run concurrently with a bounded in-flight count;
//! one movie's failure never stops the sweep.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};

use crate::models::{MovieRecord, MovieSeed, RequestLedger, RetentionStatus};
use crate::policy::RetentionPolicy;
use crate::types::{CatalogError, LibraryCatalog, WatchHistory};

/// Outcome of one evaluation pass over the library
#[derive(Debug, Default)]
pub struct SweepReport {
    /// TMDB ids of movies past their expiry
    pub expired: Vec<String>,
    /// Full records for movies inside the warning window
    pub expiring_soon: Vec<MovieRecord>,
    /// Number of seeds examined, including skipped ones
    pub processed: usize,
}

/// Evaluates movie seeds against the retention policy
pub struct MoviePipeline {
    catalog: Arc<dyn LibraryCatalog>,
    history: Arc<dyn WatchHistory>,
    policy: Arc<RetentionPolicy>,
    requests: Arc<RequestLedger>,
    concurrency: usize,
}

impl MoviePipeline {
    pub fn new(
        catalog: Arc<dyn LibraryCatalog>,
        history: Arc<dyn WatchHistory>,
        policy: Arc<RetentionPolicy>,
        requests: Arc<RequestLedger>,
        concurrency: usize,
    ) -> Self {
        Self {
            catalog,
            history,
            policy,
            requests,
            concurrency,
        }
    }

    /// Evaluate every seed and report what expired or is about to
    pub async fn evaluate(&self, seeds: Vec<MovieSeed>, now: DateTime<Utc>) -> SweepReport {
        let total = seeds.len();
        let processed = Arc::new(AtomicUsize::new(0));

        tracing::info!(total, "Evaluating movies");

        let outcomes: Vec<Option<(MovieRecord, RetentionStatus)>> = stream::iter(seeds.iter())
            .map(|seed| {
                let processed = Arc::clone(&processed);
                async move {
                    let outcome = self.evaluate_single(seed, now).await;

                    let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if current % 10 == 0 || current == total {
                        tracing::info!(
                            progress = format!("{}/{}", current, total),
                            "Evaluation progress"
                        );
                    }

                    outcome
                }
            })
            .buffer_unordered(self.concurrency.max(1))
            .collect()
            .await;

        let mut report = SweepReport {
            processed: total,
            ..SweepReport::default()
        };

        for (record, status) in outcomes.into_iter().flatten() {
            match status {
                RetentionStatus::Expired => report.expired.push(record.tmdb_id),
                RetentionStatus::ExpiringSoon => report.expiring_soon.push(record),
                RetentionStatus::Active => {}
            }
        }

        report
    }

    /// Gather one movie's signals and decide its status
    ///
    /// Returns None when the movie is not in the library or a lookup
    /// failed; those cases are logged and excluded from the report.
    async fn evaluate_single(
        &self,
        seed: &MovieSeed,
        now: DateTime<Utc>,
    ) -> Option<(MovieRecord, RetentionStatus)> {
        let entry = match self.catalog.movie_entry(&seed.tmdb_id).await {
            Ok(entry) => entry,
            Err(CatalogError::NotFound(_)) => {
                tracing::debug!(title = %seed.title, "Not in library, skipping");
                return None;
            }
            Err(e) => {
                tracing::error!(title = %seed.title, error = %e, "Error processing movie");
                return None;
            }
        };

        // A history outage falls back to the added-at anchor rather than
        // dropping the movie from the run.
        let last_watched = match self.history.last_watched(&entry.library_key).await {
            Ok(watched) => watched,
            Err(e) => {
                tracing::debug!(title = %seed.title, error = %e, "Watch history unavailable");
                None
            }
        };

        let mut record = MovieRecord {
            tmdb_id: seed.tmdb_id.clone(),
            title: seed.title.clone(),
            added_at: entry.added_at,
            external_ratings: seed.external_ratings.clone(),
            requested_by: self
                .requests
                .requested_by(&seed.tmdb_id)
                .map(str::to_string),
            last_watched,
            user_rating: entry.user_rating,
            expires_at: None,
        };

        let decision = self.policy.evaluate(&record, now);
        record.expires_at = decision.expires_at;

        if decision.status == RetentionStatus::ExpiringSoon {
            report_expiring_soon(&record);
        }

        Some((record, decision.status))
    }
}

fn report_expiring_soon(record: &MovieRecord) {
    if let Some(expires) = record.expires_at {
        tracing::info!(
            title = %record.title,
            expires_on = %expires.format("%Y-%m-%d"),
            added_at = %record.added_at.format("%Y-%m-%d"),
            last_watched = ?record.last_watched.map(|w| w.format("%Y-%m-%d").to_string()),
            user_rating = ?record.user_rating,
            external_rating = ?record.external_ratings.average(),
            "Movie will expire soon"
        );
    }
}

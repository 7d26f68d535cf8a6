//! Sweep orchestration
//!
//! A sweep runs in phases:
//! 1. **Setup:** connect to every backend; any failure here is fatal
//! 2. **Snapshots:** fetch the request ledger and exemption list; a
//!    failure degrades to the empty snapshot
//! 3. **Seeding:** merge movie lists from all manager instances by
//!    TMDB id
//! 4. **Evaluation:** concurrent per-movie signal gathering and policy
//!    decisions
//! 5. **Execution:** batch deletion of the expired set

pub mod executor;
pub mod pipeline;

pub use executor::{delete_expired, SweepSummary};
pub use pipeline::{MoviePipeline, SweepReport};

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use crate::config::Config;
use crate::models::{ExemptionList, MovieCopy, MovieSeed, RequestLedger};
use crate::policy::RetentionPolicy;
use crate::services::{
    ImdbChartClient, ImdbError, OverseerrClient, PlexClient, RadarrClient, TautulliClient,
};
use crate::types::MovieRemover;

/// Run one full sweep over the configured library
pub async fn run_sweep(config: &Config, dry_run: bool) -> anyhow::Result<SweepSummary> {
    if dry_run {
        tracing::info!("Dry run: movies will be evaluated but nothing deleted");
    } else {
        tracing::info!("Live run: expired movies will be deleted");
    }

    let plex = PlexClient::connect(&config.plex)
        .await
        .context("Failed to connect to Plex")?;

    let tautulli = TautulliClient::new(&config.tautulli).context("Failed to set up Tautulli")?;

    let mut instances: Vec<Arc<RadarrClient>> = Vec::new();
    for instance_config in &config.radarr {
        let client = RadarrClient::new(instance_config).with_context(|| {
            format!("Failed to set up Radarr instance '{}'", instance_config.name)
        })?;
        instances.push(Arc::new(client));
    }

    let overseerr = OverseerrClient::connect(&config.overseerr)
        .await
        .context("Failed to connect to Overseerr")?;

    let requests = match overseerr.request_ledger().await {
        Ok(ledger) => ledger,
        Err(e) => {
            tracing::error!(error = %e, "Error retrieving request history, requester checks disabled");
            RequestLedger::empty()
        }
    };

    let exemptions = fetch_exemptions().await;

    let seeds = combined_movie_seeds(&instances).await?;
    tracing::info!(count = seeds.len(), "Found movies to review from Radarr");

    let policy = RetentionPolicy::new(config.retention.clone(), &config.admin_emails, exemptions);

    let pipeline = MoviePipeline::new(
        Arc::new(plex),
        Arc::new(tautulli),
        Arc::new(policy),
        Arc::new(requests),
        config.retention.concurrency,
    );

    let seed_list: Vec<MovieSeed> = seeds.values().cloned().collect();
    let report = pipeline.evaluate(seed_list, Utc::now()).await;

    let summary = executor::delete_expired(&seeds, &report, dry_run).await;

    tracing::info!(count = summary.deleted, "Movies deleted");
    tracing::info!(count = summary.kept, "Movies kept");
    tracing::info!(count = summary.expiring_soon, "Movies scheduled for deletion soon");

    Ok(summary)
}

/// Fetch the chart-based exemption list, empty on any failure
async fn fetch_exemptions() -> ExemptionList {
    match chart_titles().await {
        Ok(titles) => {
            let list = ExemptionList::new(titles);
            tracing::info!(count = list.len(), "Loaded exemption list");
            list
        }
        Err(e) => {
            tracing::error!(error = %e, "Error retrieving IMDB Top 250, no exemptions this run");
            ExemptionList::empty()
        }
    }
}

async fn chart_titles() -> Result<Vec<String>, ImdbError> {
    let client = ImdbChartClient::new()?;
    client.top_250_titles().await
}

/// Merge the movie lists of all manager instances, keyed by TMDB id
///
/// Movies without a file on disk are skipped. A movie present on several
/// instances becomes one seed with one copy per instance.
async fn combined_movie_seeds(
    instances: &[Arc<RadarrClient>],
) -> anyhow::Result<HashMap<String, MovieSeed>> {
    let mut seeds: HashMap<String, MovieSeed> = HashMap::new();

    for instance in instances {
        let movies = instance.list_movies().await.with_context(|| {
            format!(
                "Failed to list movies from Radarr instance '{}'",
                instance.instance_name()
            )
        })?;

        for movie in movies {
            if !movie.has_file {
                continue;
            }

            let tmdb_id = movie.tmdb_id.to_string();
            let copy = MovieCopy {
                instance: Arc::clone(instance) as Arc<dyn MovieRemover>,
                radarr_id: movie.id,
                title: movie.title.clone(),
            };

            match seeds.entry(tmdb_id.clone()) {
                Entry::Occupied(mut occupied) => {
                    occupied.get_mut().copies.push(copy);
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(MovieSeed {
                        tmdb_id,
                        external_ratings: movie.external_ratings(),
                        title: movie.title,
                        copies: vec![copy],
                    });
                }
            }
        }
    }

    Ok(seeds)
}

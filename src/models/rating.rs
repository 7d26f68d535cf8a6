//! External rating aggregation

use serde::{Deserialize, Serialize};

/// Critic and community ratings for one movie, normalized to the 0-10 scale
///
/// Absent sources stay `None`. A present 0.0 is a real rating, not missing
/// data, and still contributes to the average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalRatings {
    pub imdb: Option<f64>,
    pub rotten_tomatoes: Option<f64>,
    pub tmdb: Option<f64>,
    pub metacritic: Option<f64>,
    pub trakt: Option<f64>,
}

impl ExternalRatings {
    /// Average of the sources that reported a value, rounded to one decimal
    ///
    /// `None` when no source reported anything. Callers must not read that
    /// as a low score.
    pub fn average(&self) -> Option<f64> {
        let present: Vec<f64> = [
            self.imdb,
            self.rotten_tomatoes,
            self.tmdb,
            self.metacritic,
            self.trakt,
        ]
        .into_iter()
        .flatten()
        .collect();

        if present.is_empty() {
            return None;
        }

        let mean = present.iter().sum::<f64>() / present.len() as f64;
        Some((mean * 10.0).round() / 10.0)
    }
}

//! Movie records assembled from the signal providers

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::ExternalRatings;
use crate::types::MovieRemover;

/// One copy of a movie on a specific manager instance
///
/// The same logical movie can exist on several instances (a 1080p library
/// and a 4K library, say). Deletion must reach every copy.
#[derive(Clone)]
pub struct MovieCopy {
    /// Instance holding this copy
    pub instance: Arc<dyn MovieRemover>,
    /// Id of the movie on that instance
    pub radarr_id: i64,
    /// Title as that instance reports it
    pub title: String,
}

impl fmt::Debug for MovieCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovieCopy")
            .field("instance", &self.instance.instance_name())
            .field("radarr_id", &self.radarr_id)
            .field("title", &self.title)
            .finish()
    }
}

/// Pipeline input: one unique TMDB id with every copy holding a file
///
/// The first copy seen supplies the title and ratings; all copies are kept
/// for the deletion phase.
#[derive(Debug, Clone)]
pub struct MovieSeed {
    /// TMDB id, kept opaque as a string key
    pub tmdb_id: String,
    pub title: String,
    /// Ratings as reported by the first copy, already scale-normalized
    pub external_ratings: ExternalRatings,
    pub copies: Vec<MovieCopy>,
}

/// Fully assembled record for one movie, ready for a retention decision
#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub tmdb_id: String,
    pub title: String,
    /// When the movie entered the media server library
    pub added_at: DateTime<Utc>,
    pub external_ratings: ExternalRatings,
    /// Email of the requester; None means the movie never went through the
    /// request manager and counts as administrator-originated
    pub requested_by: Option<String>,
    /// Most recent watch across all users; None means never watched
    pub last_watched: Option<DateTime<Utc>>,
    /// Rating the library owner assigned, if any (0-10)
    pub user_rating: Option<f64>,
    /// Computed expiry; None means the movie never expires
    pub expires_at: Option<DateTime<Utc>>,
}

/// Where a movie stands relative to its expiry date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionStatus {
    /// Expiry has passed; eligible for deletion
    Expired,
    /// Expiry falls inside the warning window; reported, never deleted
    ExpiringSoon,
    /// Keeps its place, indefinitely or beyond the window
    Active,
}

/// Outcome of one policy evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub status: RetentionStatus,
    /// None when the movie never expires
    pub expires_at: Option<DateTime<Utc>>,
}

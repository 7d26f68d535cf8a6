//! Retention policy evaluation
//!
//! Pure decision logic: a fully assembled movie record plus a fixed `now`
//! in, an expiry decision out. No I/O happens here, so evaluations are
//! repeatable and the rules stay table-testable.
//!
//! Keep-forever rules run first, in order: owner rating at or above the
//! never-expire threshold, exempt title, external average at or above the
//! fixed keep bar. Everything else gets a retention window anchored on the
//! last watch (or the added-at date when never watched).

use chrono::{DateTime, Duration, Utc};

use crate::config::RetentionConfig;
use crate::models::{Decision, ExemptionList, MovieRecord, RetentionStatus};

/// External average at or above this keeps a movie regardless of other
/// signals. Fixed on purpose, unlike the configurable day thresholds.
const EXTERNAL_KEEP_RATING: f64 = 8.0;

/// External average below this marks a movie as poorly received
const EXTERNAL_LOW_RATING: f64 = 3.5;

/// Retention rules bound to one run's thresholds and exemptions
pub struct RetentionPolicy {
    retention: RetentionConfig,
    /// Lowercased for case-insensitive requester matching
    admin_emails: Vec<String>,
    exemptions: ExemptionList,
}

impl RetentionPolicy {
    pub fn new(
        retention: RetentionConfig,
        admin_emails: &[String],
        exemptions: ExemptionList,
    ) -> Self {
        Self {
            retention,
            admin_emails: admin_emails.iter().map(|e| e.to_lowercase()).collect(),
            exemptions,
        }
    }

    /// Evaluate a record against the policy at the given instant
    ///
    /// A movie whose expiry has passed is Expired even when the instant
    /// also falls inside the warning window; the two statuses are exclusive.
    pub fn evaluate(&self, record: &MovieRecord, now: DateTime<Utc>) -> Decision {
        let expires_at = self.expiry(record);

        let status = match expires_at {
            Some(at) if at <= now => RetentionStatus::Expired,
            Some(at) if at <= now + Duration::days(self.retention.expiring_soon_days) => {
                RetentionStatus::ExpiringSoon
            }
            _ => RetentionStatus::Active,
        };

        Decision { status, expires_at }
    }

    /// Expiry instant for a movie, None when it never expires
    pub fn expiry(&self, record: &MovieRecord) -> Option<DateTime<Utc>> {
        if let Some(rating) = record.user_rating {
            if rating >= self.retention.never_expire_rating {
                return None;
            }
        }

        if self.exemptions.contains(&record.title) {
            return None;
        }

        if let Some(avg) = record.external_ratings.average() {
            if avg >= EXTERNAL_KEEP_RATING {
                return None;
            }
        }

        let reference = record.last_watched.unwrap_or(record.added_at);
        Some(reference + Duration::days(self.retention_days(record)))
    }

    /// Days of retention granted once no keep-forever rule matched
    fn retention_days(&self, record: &MovieRecord) -> i64 {
        if let Some(rating) = record.user_rating {
            if rating <= self.retention.low_rating_cutoff {
                return self.retention.low_rating_days;
            }
        }

        // A missing external average is "no data", never "low".
        let external_low = record
            .external_ratings
            .average()
            .map(|avg| avg < EXTERNAL_LOW_RATING)
            .unwrap_or(false);

        if record.user_rating.is_none() || external_low {
            return if self.is_admin_request(record.requested_by.as_deref()) {
                self.retention.admin_days
            } else {
                self.retention.user_days
            };
        }

        // Rated above the cutoff with middling external reception still
        // lands in the short window.
        self.retention.low_rating_days
    }

    /// Unrequested movies count as administrator requests
    fn is_admin_request(&self, requested_by: Option<&str>) -> bool {
        match requested_by {
            None => true,
            Some(email) => self.admin_emails.contains(&email.to_lowercase()),
        }
    }
}

//! Data models for sweeparr

pub mod movie;
pub mod rating;
pub mod snapshots;

pub use movie::{Decision, MovieCopy, MovieRecord, MovieSeed, RetentionStatus};
pub use rating::ExternalRatings;
pub use snapshots::{ExemptionList, RequestLedger};

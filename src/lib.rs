//! sweeparr - retention policy engine for a shared movie library
//!
//! Computes a per-movie expiry date from watch history, owner and
//! critic ratings, and request provenance, then deletes what has
//! expired from every Radarr instance carrying a copy.
//!
//! Signal sources:
//! - Radarr: library inventory, external critic ratings, deletion
//! - Plex: added-at timestamps and owner ratings
//! - Tautulli: watch history
//! - Overseerr: who requested each movie
//! - IMDB Top 250: curated exemption list

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;
pub mod sweep;
pub mod types;

pub use crate::error::{Error, Result};

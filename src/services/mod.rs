//! Backend service clients
//!
//! One client per upstream service. Radarr enumerates and deletes
//! movies, Plex supplies library metadata and user ratings, Tautulli
//! supplies watch history, Overseerr supplies request provenance, and
//! IMDB supplies the Top 250 exemption list.

pub mod imdb;
pub mod overseerr;
pub mod plex;
pub mod radarr;
pub mod tautulli;

pub use imdb::{ImdbChartClient, ImdbError};
pub use overseerr::{OverseerrClient, OverseerrError};
pub use plex::{PlexClient, PlexError};
pub use radarr::{RadarrClient, RadarrError, RadarrMovie};
pub use tautulli::TautulliClient;

// src/lib.rs
// Public library surface for integration tests (and the binary).

pub mod api;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod listing;
pub mod pipeline;
pub mod post;
pub mod scheduler;
pub mod select;
pub mod store;

// Notifications (Discord webhook)
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::fetch::{Fetch, FetchLimits, FetchPool, HttpFetchPool, HttpFetcher};
pub use crate::notify::{discord::DiscordNotifier, Publish};
pub use crate::pipeline::{run_once, RunReport};
pub use crate::post::{CandidatePost, EnrichedPost};
pub use crate::store::Store;

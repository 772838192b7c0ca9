//! OpenAlex API integration
//!
//! [`client::OpenAlexClient`] speaks the wire protocol; [`fetcher::WorkFetcher`]
//! wraps any [`client::WorkSource`] with the per-run memoization cache the
//! enrichment pass relies on.

pub mod client;
pub mod fetcher;
pub mod types;

pub use client::{OpenAlexClient, OpenAlexError, WorkSource, WorksQuery};
pub use fetcher::WorkFetcher;
pub use types::{OpenAlexWork, WorksPage};

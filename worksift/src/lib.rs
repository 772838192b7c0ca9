//! worksift library interface
//!
//! Builds a quality-gated scholarly corpus: collects work records from
//! OpenAlex, enriches them against the Scopus source registry and the
//! SCImago ranking tables, and writes the full and strict datasets.

pub mod enrich;
pub mod openalex;
pub mod pipeline;
pub mod reference;
pub mod store;

//! Pipeline stages
//!
//! The four stages run independently, each picking up where the previous
//! one left its files: `collect` writes a raw snapshot, `process` flattens
//! the latest snapshot into the raw work table, `build` enriches that table
//! and writes the enhanced and strict datasets, `strict` re-filters an
//! existing enhanced dataset at a different threshold without refetching.

pub mod build;
pub mod collect;
pub mod process;
pub mod summary;

pub use build::{build_datasets, rebuild_strict};
pub use collect::collect_works;
pub use process::process_latest_snapshot;

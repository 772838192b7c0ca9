//! Reference table loading
//!
//! Two authority datasets gate the strict corpus: the Scopus source list
//! (which venues count as indexed) and the per-year SCImago ranking tables
//! (which quartile a venue held in a given year). Both loaders are tolerant
//! of the messy exports these sources actually ship: variant column names,
//! variant file names, non-UTF8 bytes, multi-valued identifier cells.

pub mod scimago;
pub mod scopus;

pub use scimago::QuartileTables;
pub use scopus::IndexingRegistry;

//! # Worksift Common Library
//!
//! Shared code for the worksift pipeline crates including:
//! - Error and result types
//! - Layered configuration loading
//! - Serial identifier (ISSN) normalization
//! - Work record and dataset row models

pub mod config;
pub mod error;
pub mod ids;
pub mod models;

pub use error::{Error, Result};
pub use models::{Quartile, QuartileThreshold};

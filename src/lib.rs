//! # ncompare
//!
//! Side-by-side structural comparison of two NetCDF-style datasets: dimensions,
//! groups, variables and their properties, plus a randomized spot-check of the
//! values of one selected variable.

pub mod cli;
pub mod compare;
pub mod error;
pub mod export;
pub mod output;
pub mod paths;
pub mod sampling;
pub mod sequence;
pub mod source;

pub use compare::{compare, CompareOptions, VariableCounts};
pub use error::{NcompareError, Result};
pub use output::{FormatPolicy, Outputter};
pub use source::{open_source, DataSource, MemoryDataset};

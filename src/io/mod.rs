//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - table and pivot CSV exports (`export`)
//! - statistics report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;

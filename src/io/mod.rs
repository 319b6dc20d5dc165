//! Input/output helpers.
//!
//! - CSV ingest + validation for both feeds (`ingest`)
//! - metrics exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;

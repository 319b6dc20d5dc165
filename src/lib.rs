//! `covid-states` library crate.
//!
//! The binary (`cov`) is a thin wrapper around this library so that:
//!
//! - the aggregation pipeline is testable without spawning processes
//! - modules are reusable (e.g., a future web or GUI front-end)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod names;
pub mod pipeline;
pub mod report;
pub mod tui;

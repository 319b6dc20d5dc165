//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the two input record types (`CaseRecord`, `PopulationRecord`)
//! - per-state aggregation output (`StateMetrics`, `MetricsMap`)
//! - run selections (`MetricField`, `DateRange`, `RunConfig`)

pub mod types;

pub use types::*;

//! Demo dataset synthesis.

pub mod sample;

pub use sample::*;

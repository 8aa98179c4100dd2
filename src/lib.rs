//! `distfit` library crate.
//!
//! Continuous probability distributions on a shared numerical engine
//! (segment-cached integration, tabulated quantiles with Newton refinement,
//! bounded minimizers) plus method-of-quantiles fitting.
//!
//! The binary (`distfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the distributions and the engine are reusable on their own

pub mod app;
pub mod cli;
pub mod data;
pub mod distributions;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;

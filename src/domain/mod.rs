//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the tail selector threaded through every probability query (`Interval`)
//! - distribution descriptors (`DistributionKind`, `DistributionSpec`, `FamilySpec`)
//! - run configuration and fit outputs (`FitConfig`, `FitReport`, ...)

pub mod interval;
pub mod types;

pub use interval::*;
pub use types::*;

//! Method-of-quantiles fitting.
//!
//! Responsibilities:
//!
//! - build the probability grid and empirical quantiles
//! - fit one family by shape search plus quantile regression
//! - fit the requested families and select the best one

pub mod fitter;
pub mod grid;
pub mod selection;

pub use fitter::*;
pub use grid::*;
pub use selection::*;

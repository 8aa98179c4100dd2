//! Numerical engine: cumulative tables, table inversion, Newton polish,
//! bounded minimizers, least squares and the complex error function.

pub mod faddeeva;
pub mod minimize;
pub mod newton;
pub mod ols;
pub mod quantile_builder;
pub mod segment_cache;

pub use faddeeva::*;
pub use minimize::*;
pub use newton::*;
pub use ols::*;
pub use quantile_builder::*;
pub use segment_cache::*;

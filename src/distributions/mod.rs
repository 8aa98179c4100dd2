//! Continuous distribution families.
//!
//! Each family implements the capability traits it supports; families without
//! a closed-form quantile share the tabulation and refinement machinery in
//! `crate::math` through [`tabulated`].

pub mod any;
pub mod exponential;
pub mod gamma;
pub mod inverse_gauss;
pub mod kumaraswamy;
pub mod normal;
pub mod q_exponential;
pub mod q_gaussian;
pub mod skew_cauchy;
mod tabulated;
pub mod traits;
pub mod voigt;
pub mod weibull;

pub use any::*;
pub use exponential::*;
pub use gamma::*;
pub use inverse_gauss::*;
pub use kumaraswamy::*;
pub use normal::*;
pub use q_exponential::*;
pub use q_gaussian::*;
pub use skew_cauchy::*;
pub use traits::*;
pub use voigt::*;
pub use weibull::*;

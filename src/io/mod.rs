//! Input/output helpers.
//!
//! - sample text files (`samples`)
//! - fit report JSON read/write (`report_json`)

pub mod report_json;
pub mod samples;

pub use report_json::*;
pub use samples::*;

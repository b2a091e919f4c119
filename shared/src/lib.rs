//! Shared domain core for the Hatch & Carry field reporting platform
//!
//! This crate holds the models and pure transformations used by both the
//! backend and the browser module (via WASM): the estate location hierarchy,
//! date/time normalization and report filtering.

pub mod dashboard;
pub mod datetime;
pub mod form;
pub mod hierarchy;
pub mod models;
pub mod report_filter;
pub mod types;
pub mod validation;

pub use dashboard::*;
pub use datetime::*;
pub use form::*;
pub use hierarchy::*;
pub use models::*;
pub use report_filter::*;
pub use types::*;
pub use validation::*;

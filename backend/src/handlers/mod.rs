//! HTTP request handlers

pub mod dashboard;
pub mod geocoding;
pub mod health;
pub mod reference;
pub mod reports;

pub use dashboard::*;
pub use geocoding::*;
pub use health::*;
pub use reference::*;
pub use reports::*;

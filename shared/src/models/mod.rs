//! Domain models for Hatch & Carry field reporting

mod estate;
mod filter;
mod report;

pub use estate::*;
pub use filter::*;
pub use report::*;

pub(crate) use filter::active;

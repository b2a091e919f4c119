//! Business logic services for the Hatch & Carry reporting server

pub mod export;
pub mod media;
pub mod reference;
pub mod report;

pub use export::{export_file_name, export_to_csv, ExportRow};
pub use media::MediaStore;
pub use reference::{load_assets, load_hierarchy};
pub use report::ReportService;

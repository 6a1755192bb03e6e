//! Output module for crawl results
//!
//! This module handles:
//! - Exporting scraped products to the dated CSV file
//! - Printing a summary of a finished run

mod csv_export;
mod summary;

pub use csv_export::{
    date_stamp, ensure_directory, export, ExportError, ExportResult, EXPORT_HEADER,
};
pub use summary::{format_report, print_report};

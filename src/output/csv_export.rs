//! Dated CSV export of scraped products
//!
//! Each run writes `<data-dir>/<date>.csv`, replacing any export already
//! written on the same date.

use crate::crawler::ProductRecord;
use chrono::{Datelike, NaiveDate, SecondsFormat};
use csv::{QuoteStyle, WriterBuilder};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column header of the export, in column order
pub const EXPORT_HEADER: [&str; 5] = ["Title", "Price", "ImageURL", "URL", "Time"];

/// Errors that can occur while exporting
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{} exists but is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Formats the file stem for an export date
///
/// Without padding the stem is `YYYY-M-D` (`2024-3-5`); with padding it is
/// the ISO form `2024-03-05`.
pub fn date_stamp(date: NaiveDate, zero_pad: bool) -> String {
    if zero_pad {
        date.format("%Y-%m-%d").to_string()
    } else {
        format!("{}-{}-{}", date.year(), date.month(), date.day())
    }
}

/// Makes sure `dir` exists as a directory
///
/// An existing directory is fine. A missing one is created along with its
/// parents. Anything else is an error.
pub fn ensure_directory(dir: &Path) -> ExportResult<()> {
    match fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ExportError::NotADirectory {
            path: dir.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("Creating output directory {}", dir.display());
            match fs::create_dir_all(dir) {
                Ok(()) => Ok(()),
                // Lost a race with another creator
                Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
                Err(e) => Err(ExportError::io(dir, e)),
            }
        }
        Err(e) => Err(ExportError::io(dir, e)),
    }
}

/// Writes the records to `<output_dir>/<date_stamp>.csv`
///
/// The header row is always written, so an empty crawl still produces a
/// file. Every field is quoted. Rows go to a sibling `.csv.part` file that is
/// renamed over the export once complete, so a failed write leaves any
/// earlier export for the same date untouched. Returns the path written.
pub fn export(
    records: &[ProductRecord],
    output_dir: &Path,
    date_stamp: &str,
) -> ExportResult<PathBuf> {
    ensure_directory(output_dir)?;

    let path = output_dir.join(format!("{}.csv", date_stamp));
    let partial = output_dir.join(format!("{}.csv.part", date_stamp));

    if let Err(e) = write_rows(records, &partial) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    if let Err(e) = fs::rename(&partial, &path) {
        let _ = fs::remove_file(&partial);
        return Err(ExportError::io(&path, e));
    }

    tracing::info!("Exported {} products to {}", records.len(), path.display());

    Ok(path)
}

fn write_rows(records: &[ProductRecord], path: &Path) -> ExportResult<()> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(file);

    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        writer.write_record(record_fields(record))?;
    }
    writer.flush().map_err(|e| ExportError::io(path, e))?;

    Ok(())
}

fn record_fields(record: &ProductRecord) -> [String; 5] {
    [
        record.title.clone(),
        record.price.clone(),
        record.image_url.clone().unwrap_or_default(),
        record.url.to_string(),
        record.scraped_at.to_rfc3339_opts(SecondsFormat::Secs, false),
    ]
}

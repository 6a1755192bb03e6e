//! Durable error reporting
//!
//! Failures are appended to a plain-text log, one `[<timestamp>] <message>`
//! line each. The log is never truncated. Site-unreachable failures also
//! print a notice for whoever is running the crawl.

use chrono::{Local, SecondsFormat};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Failure to write the error log itself
#[derive(Debug, Error)]
#[error("cannot write error log {}: {source}", .path.display())]
pub struct LogSinkError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Classification of a reported failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// The catalog site could not be reached
    SiteUnreachable,

    /// The site answered but its markup lacked an expected element
    StructuralMismatch,

    /// Directory creation, serialization or file write failed locally
    LocalFailure,
}

impl ReportKind {
    /// Returns true if this kind warrants a user-facing notice
    pub fn notifies_user(&self) -> bool {
        matches!(self, Self::SiteUnreachable)
    }
}

/// Appends classified failures to the error log
///
/// The log file is created on the first entry, so a clean run leaves no file
/// behind.
#[derive(Debug)]
pub struct ErrorReporter {
    path: PathBuf,
    site: String,
    write_lock: Mutex<()>,
}

impl ErrorReporter {
    /// Creates a reporter appending to `path`
    ///
    /// `site` names the catalog in the user-facing notice.
    pub fn new(path: &Path, site: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            site: site.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Logs a failure, printing a notice for `SiteUnreachable`
    pub fn report(&self, kind: ReportKind, message: &str) -> Result<(), LogSinkError> {
        if kind.notifies_user() {
            eprintln!("{}", self.notice());
        }
        self.report_quiet(kind, message)
    }

    /// Logs a failure without any user-facing notice
    ///
    /// Used for per-product failures, which never stop the crawl.
    pub fn report_quiet(&self, kind: ReportKind, message: &str) -> Result<(), LogSinkError> {
        match kind {
            ReportKind::SiteUnreachable => tracing::warn!("{}", message),
            ReportKind::StructuralMismatch | ReportKind::LocalFailure => {
                tracing::error!("{}", message)
            }
        }

        let line = format_entry(&Local::now().to_rfc3339_opts(SecondsFormat::Secs, false), message);

        // Entries are whole lines, so a poisoned lock leaves the file usable
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                file.write_all(line.as_bytes())?;
                file.flush()
            })
            .map_err(|source| LogSinkError {
                path: self.path.clone(),
                source,
            })
    }

    /// The user-facing notice for an unreachable site
    pub fn notice(&self) -> String {
        format!(
            "Cannot connect to {}. The site may be down or unreachable.",
            self.site
        )
    }
}

/// Formats one log line
fn format_entry(timestamp: &str, message: &str) -> String {
    // One entry per line, whatever the message contains
    let message = message.replace(['\r', '\n'], " ");
    format!("[{}] {}\n", timestamp, message)
}

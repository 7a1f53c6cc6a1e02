//! Error types for the medreport-upload library.
//!
//! Every failure is local to one upload attempt. The variants split into two
//! groups by where they surface:
//!
//! * **Blocking** ([`UploadError::NoFileSelected`], [`UploadError::FileUnreadable`])
//!   are raised before anything is sent. They are reported through
//!   [`crate::notify::UploadObserver::alert`] and leave the display regions
//!   untouched.
//!
//! * **Inline** (transport, server and decoding failures) are written into the
//!   raw-text region as `"Error: <message>"` by
//!   [`crate::panel::ResultsPanel::show_error`].
//!
//! A missing field in the response is never an error; see [`crate::model`].

use std::path::PathBuf;
use thiserror::Error;

/// Message shown when the user triggers an upload without choosing a file.
pub const NO_FILE_MESSAGE: &str = "Please select a file first.";

/// All errors returned by the medreport-upload library.
#[derive(Debug, Error)]
pub enum UploadError {
    // ── Pre-submission ────────────────────────────────────────────────────
    /// No file was chosen.
    #[error("{}", NO_FILE_MESSAGE)]
    NoFileSelected,

    /// The chosen path could not be read.
    #[error("Cannot read '{path}': {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Request ───────────────────────────────────────────────────────────
    /// The request never produced a response (connection refused, DNS, reset).
    ///
    /// Displays the same generic text as [`UploadError::Server`]; the
    /// underlying reason is kept for logging.
    #[error("Server error")]
    Transport { reason: String },

    /// The server answered with a non-success status.
    #[error("Server error")]
    Server { status: u16 },

    /// The body was not valid JSON. Displays the parser's own message.
    #[error("{reason}")]
    MalformedResponse { reason: String },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UploadError {
    /// True for failures raised before submission, which are reported via a
    /// blocking notification rather than in the raw-text region.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            UploadError::NoFileSelected | UploadError::FileUnreadable { .. }
        )
    }

    /// The text written into the raw-text region for this failure.
    pub fn inline_message(&self) -> String {
        format!("Error: {self}")
    }
}

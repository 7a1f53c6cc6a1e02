//! Observer trait for upload lifecycle events.
//!
//! Inject an [`Arc<dyn UploadObserver>`] via
//! [`crate::config::UploadConfigBuilder::observer`] to receive events as an
//! upload progresses, and to present the blocking "no file" notification in
//! whatever way the host UI blocks (a modal dialog, a stderr prompt, …).
//!
//! # Example
//!
//! ```rust
//! use medreport_upload::{UploadConfig, UploadObserver};
//! use std::sync::Arc;
//!
//! struct StderrObserver;
//!
//! impl UploadObserver for StderrObserver {
//!     fn alert(&self, message: &str) {
//!         eprintln!("!! {message}");
//!     }
//! }
//!
//! let config = UploadConfig::builder()
//!     .observer(Arc::new(StderrObserver) as Arc<dyn UploadObserver>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::UploadError;
use std::sync::Arc;

/// Called by [`crate::upload::Uploader`] as an upload proceeds.
///
/// Implementations must be `Send + Sync`: several uploads may be in flight at
/// once. All methods default to no-ops.
pub trait UploadObserver: Send + Sync {
    /// Blocking notification for failures raised before anything is sent.
    fn alert(&self, message: &str) {
        let _ = message;
    }

    /// Called after the form is built, just before the request is issued.
    ///
    /// # Arguments
    /// * `file_name` — name sent in the multipart part
    /// * `size`      — body size in bytes
    fn on_upload_start(&self, file_name: &str, size: usize) {
        let _ = (file_name, size);
    }

    /// Called after a successful response has been decoded.
    fn on_upload_complete(&self, row_count: usize) {
        let _ = row_count;
    }

    /// Called when the request or decoding fails.
    fn on_upload_error(&self, error: &UploadError) {
        let _ = error;
    }
}

/// Observer that ignores every event. The default.
pub struct NoopObserver;

impl UploadObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::UploadConfig`].
pub type SharedObserver = Arc<dyn UploadObserver>;

//! # medreport-upload
//!
//! Send a medical report (PDF or scan) to an analysis service and browse
//! what comes back: the extracted text, the interpreted lab values, and a
//! summary.
//!
//! ## Flow
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Upload   multipart POST, single "file" part        (upload)
//!  ├─ 2. Decode   lenient JSON → UploadResult                (model)
//!  ├─ 3. View     InterpretedMap → RowView list              (view)
//!  ├─ 4. Panel    raw text / rows + expanded flags / summary (panel)
//!  └─ 5. Draw     ResultsPanel → terminal text               (terminal)
//! ```
//!
//! Steps 3 and 4 are pure and independent of any UI toolkit; `terminal` is
//! one adapter over them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medreport_upload::{ResultsPanel, UploadConfig, Uploader};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let uploader = Uploader::new(UploadConfig::default())?;
//!     let panel = ResultsPanel::shared();
//!
//!     // Errors are already written into the panel; `?` is for the caller.
//!     let _ = uploader.submit(Some(Path::new("blood_test.pdf")), &panel).await;
//!
//!     let panel = panel.lock().unwrap();
//!     println!("{}", panel.raw_text);
//!     for (row, _) in panel.iter_rows() {
//!         println!("{} {} {}", row.badge.emoji(), row.label, row.preview);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `medreport` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod panel;
pub mod terminal;
pub mod upload;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{UploadConfig, UploadConfigBuilder, DEFAULT_ENDPOINT};
pub use error::{UploadError, NO_FILE_MESSAGE};
pub use model::{InterpretedMap, Range, TestResult, UploadResult};
pub use notify::{NoopObserver, SharedObserver, UploadObserver};
pub use panel::{ResultsPanel, SharedPanel};
pub use terminal::{render_panel, RenderOptions};
pub use upload::Uploader;
pub use view::{build_rows, reference_range, BadgeKind, RowView, StatusColor};

//! Uploader: post one file to the analysis service and fill the panel.
//!
//! One call to [`Uploader::submit`] is one click of the upload button:
//!
//! ```text
//! file?  ── no ──▶ alert("Please select a file first.")   (nothing sent)
//!   │
//!  read bytes, build multipart form (part "file")
//!   │
//!  panel.begin_processing()        "Processing..."
//!   │
//!  POST endpoint  ── await ──▶ 2xx + JSON ──▶ panel.show_result()
//!                          └─▶ anything else ─▶ panel.show_error()  "Error: …"
//! ```
//!
//! The panel lock is never held across the await. Two submissions started
//! back to back both run to completion and whichever response arrives last
//! decides what the panel shows.

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::model::UploadResult;
use crate::panel::{lock_panel, SharedPanel};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Name of the optional summary-mode field.
pub const PREFER_AI_FIELD: &str = "prefer_ai";

/// A file read from disk, ready to be sent.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// HTTP client bound to one [`UploadConfig`].
///
/// Cheap to share: clone the `Arc` it sits in, or clone the uploader itself
/// (the inner `reqwest::Client` is reference-counted).
#[derive(Debug, Clone)]
pub struct Uploader {
    client: reqwest::Client,
    config: UploadConfig,
}

impl Uploader {
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| UploadError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload `file` and write the outcome into `panel`.
    ///
    /// Returns the decoded result as well, for callers that want more than
    /// the panel shows.
    ///
    /// # Errors
    /// - [`UploadError::NoFileSelected`] / [`UploadError::FileUnreadable`]:
    ///   reported through the observer's `alert`; the panel is untouched and
    ///   no request is made.
    /// - Transport, server and decoding failures: the panel's raw-text region
    ///   reads `"Error: <message>"` and the other regions stay cleared.
    pub async fn submit(
        &self,
        file: Option<&Path>,
        panel: &SharedPanel,
    ) -> Result<UploadResult, UploadError> {
        let observer = &self.config.observer;

        let selected = match read_selected(file).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Upload not started: {}", e);
                observer.alert(&e.to_string());
                return Err(e);
            }
        };

        lock_panel(panel).begin_processing();

        match self.send(selected).await {
            Ok(result) => {
                lock_panel(panel).show_result(&result);
                observer.on_upload_complete(result.interpreted.len());
                Ok(result)
            }
            Err(e) => {
                lock_panel(panel).show_error(&e);
                observer.on_upload_error(&e);
                Err(e)
            }
        }
    }

    /// Upload a file without a panel and return the decoded response.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadResult, UploadError> {
        let selected = read_file(path.as_ref()).await?;
        let outcome = self.send(selected).await;
        match &outcome {
            Ok(result) => self
                .config
                .observer
                .on_upload_complete(result.interpreted.len()),
            Err(e) => self.config.observer.on_upload_error(e),
        }
        outcome
    }

    async fn send(&self, file: SelectedFile) -> Result<UploadResult, UploadError> {
        let start = Instant::now();
        let endpoint = self.config.endpoint.as_str();
        let name = file.name.clone();
        let size = file.bytes.len();

        let form = build_form(file, self.config.prefer_ai)?;

        info!("Uploading '{}' ({} bytes) to {}", name, size, endpoint);
        self.config.observer.on_upload_start(&name, size);

        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", endpoint, e);
                UploadError::Transport {
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        debug!("{} answered {} after {}ms", endpoint, status, start.elapsed().as_millis());
        if !status.is_success() {
            warn!("Server rejected upload of '{}': HTTP {}", name, status);
            return Err(UploadError::Server {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            warn!("Reading response body failed: {}", e);
            UploadError::Transport {
                reason: e.to_string(),
            }
        })?;

        let result = UploadResult::from_slice(&body).map_err(|e| {
            warn!("Response for '{}' is not JSON: {}", name, e);
            UploadError::MalformedResponse {
                reason: e.to_string(),
            }
        })?;

        info!(
            "Upload of '{}' complete: {} interpreted values in {}ms",
            name,
            result.interpreted.len(),
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}

/// Build the multipart body: one `file` part, plus `prefer_ai` when set.
pub fn build_form(file: SelectedFile, prefer_ai: Option<bool>) -> Result<Form, UploadError> {
    let part = Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str(file.content_type)
        .map_err(|e| UploadError::Transport {
            reason: format!("invalid content type: {e}"),
        })?;

    let form = Form::new().part(FILE_FIELD, part);
    Ok(match prefer_ai {
        Some(v) => form.text(PREFER_AI_FIELD, v.to_string()),
        None => form,
    })
}

/// Resolve the user's selection to file contents.
async fn read_selected(file: Option<&Path>) -> Result<SelectedFile, UploadError> {
    match file {
        Some(path) => read_file(path).await,
        None => Err(UploadError::NoFileSelected),
    }
}

/// Read a file and derive the part's name and content type from its path.
pub async fn read_file(path: &Path) -> Result<SelectedFile, UploadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(SelectedFile {
        content_type: content_type_for(path),
        name,
        bytes,
    })
}

/// MIME type sent for the file part, from the extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn content_types() {
        assert_eq!(content_type_for(Path::new("a.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("scan.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("scan.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(content_type_for(Path::new("report")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("x.docx")), "application/octet-stream");
    }

    #[test]
    fn no_selection_is_no_file_selected() {
        let err = tokio_test::block_on(read_selected(None)).unwrap_err();
        assert!(matches!(err, UploadError::NoFileSelected));
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let path = PathBuf::from("/definitely/not/here/report.pdf");
        let err = read_file(&path).await.unwrap_err();
        match err {
            UploadError::FileUnreadable { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_file_keeps_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cbc.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"\x89PNG....")
            .unwrap();
        let f = read_file(&path).await.unwrap();
        assert_eq!(f.name, "cbc.png");
        assert_eq!(f.bytes, b"\x89PNG....");
        assert_eq!(f.content_type, "image/png");
    }

    #[test]
    fn form_builds_with_and_without_prefer_ai() {
        let file = SelectedFile {
            name: "a.pdf".into(),
            bytes: b"%PDF-1.7".to_vec(),
            content_type: "application/pdf",
        };
        assert!(build_form(file.clone(), None).is_ok());
        assert!(build_form(file, Some(false)).is_ok());
    }

    #[test]
    fn uploader_builds_from_default_config() {
        let u = Uploader::new(UploadConfig::default()).unwrap();
        assert_eq!(u.config().endpoint, crate::config::DEFAULT_ENDPOINT);
    }
}

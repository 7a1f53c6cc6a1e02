//! Configuration for the uploader.
//!
//! All behaviour is controlled through [`UploadConfig`], built via its
//! [`UploadConfigBuilder`]. The defaults reproduce the stock client exactly:
//! a single-part form posted to the local analysis service with no timeout.

use crate::error::UploadError;
use crate::notify::{NoopObserver, SharedObserver};
use std::fmt;
use std::sync::Arc;

/// Endpoint of a locally running analysis service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/upload";

/// Configuration for [`crate::upload::Uploader`].
///
/// # Example
/// ```rust
/// use medreport_upload::UploadConfig;
///
/// let config = UploadConfig::builder()
///     .endpoint("http://10.0.0.5:8000/upload")
///     .prefer_ai(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.prefer_ai, Some(false));
/// ```
#[derive(Clone)]
pub struct UploadConfig {
    /// URL the form is posted to. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Sends an extra `prefer_ai` form field when set. Default: None.
    ///
    /// The service treats a missing field as `true` and uses it to choose
    /// between an AI-written summary and its built-in template. Leaving this
    /// unset keeps the body to the single `file` part.
    pub prefer_ai: Option<bool>,

    /// Whole-request timeout in seconds. Default: None (transport default).
    pub request_timeout_secs: Option<u64>,

    /// Lifecycle observer. Default: [`NoopObserver`].
    pub observer: SharedObserver,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            prefer_ai: None,
            request_timeout_secs: None,
            observer: Arc::new(NoopObserver),
        }
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("endpoint", &self.endpoint)
            .field("prefer_ai", &self.prefer_ai)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("observer", &"<dyn UploadObserver>")
            .finish()
    }
}

impl UploadConfig {
    /// Create a new builder for `UploadConfig`.
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`UploadConfig`].
#[derive(Debug)]
pub struct UploadConfigBuilder {
    config: UploadConfig,
}

impl UploadConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn prefer_ai(mut self, v: bool) -> Self {
        self.config.prefer_ai = Some(v);
        self
    }

    /// A zero timeout means "no timeout".
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = (secs > 0).then_some(secs);
        self
    }

    pub fn observer(mut self, observer: SharedObserver) -> Self {
        self.config.observer = observer;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<UploadConfig, UploadError> {
        let endpoint = self.config.endpoint.trim();
        let rest = endpoint
            .strip_prefix("http://")
            .or_else(|| endpoint.strip_prefix("https://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => {
                self.config.endpoint = endpoint.to_string();
                Ok(self.config)
            }
            _ => Err(UploadError::InvalidConfig(format!(
                "endpoint must be an http:// or https:// URL, got '{}'",
                self.config.endpoint
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_client() {
        let c = UploadConfig::default();
        assert_eq!(c.endpoint, "http://127.0.0.1:8000/upload");
        assert_eq!(c.prefer_ai, None);
        assert_eq!(c.request_timeout_secs, None);
    }

    #[test]
    fn builder_sets_fields() {
        let c = UploadConfig::builder()
            .endpoint("https://lab.example/upload")
            .prefer_ai(true)
            .request_timeout_secs(30)
            .build()
            .unwrap();
        assert_eq!(c.endpoint, "https://lab.example/upload");
        assert_eq!(c.prefer_ai, Some(true));
        assert_eq!(c.request_timeout_secs, Some(30));
    }

    #[test]
    fn endpoint_is_stored_trimmed() {
        let c = UploadConfig::builder()
            .endpoint("  http://10.0.0.5:8000/upload\n")
            .build()
            .unwrap();
        assert_eq!(c.endpoint, "http://10.0.0.5:8000/upload");
    }

    #[test]
    fn zero_timeout_means_none() {
        let c = UploadConfig::builder()
            .request_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.request_timeout_secs, None);
    }

    #[test]
    fn rejects_non_http_endpoint() {
        for bad in ["ftp://host/upload", "127.0.0.1:8000/upload", "http://", "https:///x"] {
            let err = UploadConfig::builder().endpoint(bad).build().unwrap_err();
            assert!(matches!(err, UploadError::InvalidConfig(_)), "{bad}");
        }
    }

    #[test]
    fn debug_hides_observer() {
        let s = format!("{:?}", UploadConfig::default());
        assert!(s.contains("<dyn UploadObserver>"));
    }
}

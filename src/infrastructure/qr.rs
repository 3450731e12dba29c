//! Client for the external QR-image renderer.
//!
//! The booking core only hands over an opaque payload string. This module
//! turns it into a renderer URL and fetches the image on a worker thread.
//! Every failure becomes [`QrImage::Placeholder`]; nothing here returns an
//! error to the caller.

use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, warn};

use super::errors::InfrastructureError;

pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_QR_SIZE: u16 = 150;
pub const DEFAULT_QR_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct QrEndpoint {
    pub base_url: String,
    /// Edge length in pixels; the renderer always returns a square.
    pub size: u16,
    pub timeout: Duration,
    /// Skip the network entirely and show the placeholder.
    pub offline: bool,
}

impl Default for QrEndpoint {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_QR_ENDPOINT.to_string(),
            size: DEFAULT_QR_SIZE,
            timeout: DEFAULT_QR_TIMEOUT,
            offline: false,
        }
    }
}

impl QrEndpoint {
    /// `<base>?size=<n>x<n>&data=<url-encoded payload>`
    pub fn image_url(&self, payload: &str) -> Result<Url, InfrastructureError> {
        let size = format!("{0}x{0}", self.size);
        Url::parse_with_params(&self.base_url, &[("size", size.as_str()), ("data", payload)])
            .map_err(|e| InfrastructureError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }
}

/// Outcome of a QR image request, as the ticket view needs it.
#[derive(Debug, Clone, PartialEq)]
pub enum QrImage {
    Loaded {
        url: String,
        content_type: String,
        bytes: usize,
    },
    Placeholder {
        url: Option<String>,
        reason: String,
    },
}

impl QrImage {
    pub fn placeholder(url: Option<&Url>, reason: impl Into<String>) -> Self {
        QrImage::Placeholder {
            url: url.map(Url::to_string),
            reason: reason.into(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            QrImage::Loaded { url, .. } => Some(url),
            QrImage::Placeholder { url, .. } => url.as_deref(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, QrImage::Placeholder { .. })
    }
}

pub struct QrImageFetcher;

impl QrImageFetcher {
    /// Fetches the image synchronously, falling back to a placeholder.
    pub fn fetch(endpoint: &QrEndpoint, payload: &str) -> QrImage {
        let url = match endpoint.image_url(payload) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot build QR image URL");
                return QrImage::placeholder(None, e.to_string());
            }
        };

        if endpoint.offline {
            return QrImage::placeholder(Some(&url), "offline mode");
        }

        match Self::download(endpoint, &url) {
            Ok((content_type, bytes)) => {
                info!(%url, bytes, "QR image loaded");
                QrImage::Loaded {
                    url: url.to_string(),
                    content_type,
                    bytes,
                }
            }
            Err(e) => {
                warn!(%url, error = %e, "QR image unavailable, using placeholder");
                QrImage::placeholder(Some(&url), e.to_string())
            }
        }
    }

    /// Runs [`QrImageFetcher::fetch`] on a worker thread; the result arrives
    /// on the returned channel exactly once.
    pub fn spawn(endpoint: QrEndpoint, payload: String) -> Receiver<QrImage> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // Receiver may be gone if the booking was reset meanwhile.
            let _ = tx.send(Self::fetch(&endpoint, &payload));
        });
        rx
    }

    fn download(endpoint: &QrEndpoint, url: &Url) -> Result<(String, usize), InfrastructureError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(endpoint.timeout)
            .build()?;
        let response = client.get(url.clone()).send()?.error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(InfrastructureError::UnexpectedResponse(format!(
                "expected an image, got '{content_type}'"
            )));
        }

        let body = response.bytes()?;
        if body.is_empty() {
            return Err(InfrastructureError::UnexpectedResponse("empty image body".to_string()));
        }
        Ok((content_type, body.len()))
    }
}

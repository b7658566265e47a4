//! Structure depictions from an external image service.
//!
//! [`DepictionService`] is the seam the chemistry renderer talks to; the
//! HTTP implementation fetches `{service_url}/{query}/image?format=...` and
//! checks that the body really is an image of the requested format.

use crate::config::ChemistryConfig;
use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Depiction {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Errors produced while fetching a depiction.
#[derive(Debug, thiserror::Error)]
pub enum DepictionError {
    /// The configured service URL cannot carry a path.
    #[error("invalid depiction service URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request did not complete.
    #[error("depiction request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("depiction service returned status {status}")]
    Status { status: u16 },

    /// The body is not an image of the requested format.
    #[error("depiction service returned no {format} image")]
    UnexpectedContent { format: ImageFormat },
}

/// Resolves a chemistry query to an image. Enables faking in tests.
#[async_trait]
pub trait DepictionService: Send + Sync {
    async fn depict(&self, query: &str, format: ImageFormat) -> Result<Depiction, DepictionError>;
}

pub struct HttpDepictionService {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpDepictionService {
    pub fn new(config: &ChemistryConfig) -> Result<Self, DepictionError> {
        let base_url = Url::parse(&config.service_url)
            .map_err(|e| DepictionError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DepictionError::InvalidUrl(config.service_url.clone()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder
            .build()
            .map_err(|e| DepictionError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// `{service_url}/{query}/image?format={format}` with the query escaped
    /// as a single path segment.
    pub fn request_url(&self, query: &str, format: ImageFormat) -> Result<Url, DepictionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DepictionError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(query)
            .push("image");
        url.query_pairs_mut()
            .clear()
            .append_pair("format", format.as_str());
        Ok(url)
    }
}

#[async_trait]
impl DepictionService for HttpDepictionService {
    async fn depict(&self, query: &str, format: ImageFormat) -> Result<Depiction, DepictionError> {
        let url = self.request_url(query, format)?;
        debug!(%url, "requesting depiction");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DepictionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DepictionError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DepictionError::Request(e.to_string()))?;

        validate_depiction(format, bytes.to_vec())
    }
}

/// Accepts `bytes` only if they look like an image of `format`.
pub fn validate_depiction(format: ImageFormat, bytes: Vec<u8>) -> Result<Depiction, DepictionError> {
    let valid = match format {
        ImageFormat::Svg => String::from_utf8_lossy(&bytes)
            .to_ascii_lowercase()
            .contains("<svg"),
        ImageFormat::Png => bytes.starts_with(PNG_SIGNATURE),
    };
    if valid {
        Ok(Depiction { format, bytes })
    } else {
        Err(DepictionError::UnexpectedContent { format })
    }
}

/// Link offered to the reader when no depiction is available.
pub fn lookup_link(config: &ChemistryConfig, query: &str) -> Option<String> {
    let mut url = Url::parse(&config.lookup_url).ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(query);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> HttpDepictionService {
        HttpDepictionService::new(&ChemistryConfig::default()).unwrap()
    }

    #[test]
    fn request_url_escapes_the_query() {
        let url = service().request_url("benzene", ImageFormat::Svg).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cactus.nci.nih.gov/chemical/structure/benzene/image?format=svg"
        );

        let url = service().request_url("C#N/C 1", ImageFormat::Png).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cactus.nci.nih.gov/chemical/structure/C%23N%2FC%201/image?format=png"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_tolerated() {
        let config = ChemistryConfig {
            service_url: "https://depict.example/structure/".to_string(),
            ..ChemistryConfig::default()
        };
        let service = HttpDepictionService::new(&config).unwrap();
        let url = service.request_url("O", ImageFormat::Svg).unwrap();
        assert_eq!(url.as_str(), "https://depict.example/structure/O/image?format=svg");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        let config = ChemistryConfig {
            service_url: "mailto:someone@example.org".to_string(),
            ..ChemistryConfig::default()
        };
        assert!(matches!(
            HttpDepictionService::new(&config),
            Err(DepictionError::InvalidUrl(_))
        ));
    }

    #[test]
    fn content_is_validated() {
        assert!(validate_depiction(ImageFormat::Svg, b"<?xml?><SVG></SVG>".to_vec()).is_ok());
        assert!(matches!(
            validate_depiction(ImageFormat::Svg, b"<html>not found</html>".to_vec()),
            Err(DepictionError::UnexpectedContent {
                format: ImageFormat::Svg
            })
        ));
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(&[0, 0, 0, 13]);
        assert!(validate_depiction(ImageFormat::Png, png).is_ok());
        assert!(validate_depiction(ImageFormat::Png, b"GIF89a".to_vec()).is_err());
    }

    #[test]
    fn lookup_link_escapes_query() {
        let link = lookup_link(&ChemistryConfig::default(), "acetic acid").unwrap();
        assert_eq!(link, "https://pubchem.ncbi.nlm.nih.gov/compound/acetic%20acid");
    }
}

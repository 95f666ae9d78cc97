//! Recompression results and the URL transforms applied to them.

use serde::{Deserialize, Serialize};

/// Outcome of a successful recompression, as reported by the backend.
///
/// Transient display state: each new result replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecompressionResult {
    /// Path of the preview image
    pub url: String,
    /// Original file size in KB
    pub before_kb: f64,
    /// Compressed file size in KB
    pub after_kb: f64,
    /// Compression ratio percentage
    pub ratio: f64,
    /// Echoed `k`
    pub k: u32,
    /// Server-side runtime in seconds
    pub runtime: f64,
    /// Human-readable pixel dimensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    /// Richer SVD metrics, when the deployment reports them
    #[serde(flatten)]
    pub svd: SvdMetrics,
}

/// Optional algorithm metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SvdMetrics {
    /// Pixel count of the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pixels: Option<u64>,
    /// Values stored by the full matrices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncompressed_matrix_size: Option<u64>,
    /// Values stored by the rank-`k` factors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_matrix_size: Option<u64>,
    /// Image height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Image width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Matrix-level compression ratio percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svd_compression_ratio: Option<f64>,
    /// Share of the signal energy kept, as a percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_preserved: Option<f64>,
}

impl SvdMetrics {
    /// Whether any metric is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_pixels.is_none()
            && self.uncompressed_matrix_size.is_none()
            && self.compressed_matrix_size.is_none()
            && self.height.is_none()
            && self.width.is_none()
            && self.svd_compression_ratio.is_none()
            && self.info_preserved.is_none()
    }
}

impl RecompressionResult {
    /// Target of the download link for this result.
    #[must_use]
    pub fn download_href(&self) -> String {
        download_path(&self.url)
    }
}

/// Turn a preview path into its download counterpart by replacing the first
/// `preview` path segment with `download`.
///
/// Paths without a `preview` segment are returned unchanged.
#[must_use]
pub fn download_path(url: &str) -> String {
    let mut replaced = false;
    url.split('/')
        .map(|segment| {
            if !replaced && segment == "preview" {
                replaced = true;
                "download"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Append a cache-busting token so a reused URL is fetched again.
#[must_use]
pub fn cache_bust(url: &str, token: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{token}")
}

/// Current cache-busting token (milliseconds since the UNIX epoch).
#[must_use]
pub fn cache_token() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

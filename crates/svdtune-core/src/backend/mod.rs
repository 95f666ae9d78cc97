//! Recompression backend port.
//!
//! The page only ever talks to the compression server through
//! [`RecompressBackend`]. [`HttpBackend`] is the reqwest implementation used
//! by the CLI; tests substitute scripted backends.

pub mod http;

use async_trait::async_trait;

use crate::control::CompressionParameter;
use crate::error::Result;
use crate::session::RecompressionResult;

pub use http::{parse_recompress_response, secure_filename, HttpBackend};

/// Something that can recompress a stored original with a new `k`.
#[async_trait]
pub trait RecompressBackend: Send + Sync + 'static {
    /// Recompress the original stored under `fname` keeping `k` singular values.
    async fn recompress(&self, fname: &str, k: CompressionParameter)
        -> Result<RecompressionResult>;
}

//! Common test utilities for `svdtune` integration tests.
//!
//! This module provides a scripted recompression backend and image fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use svdtune_core::backend::RecompressBackend;
use svdtune_core::control::CompressionParameter;
use svdtune_core::session::{RecompressionResult, SvdMetrics};
use svdtune_core::{Error, Result};

/// Backend that answers from a script instead of a server.
///
/// Every request is recorded. Responses are delayed per `k` (default
/// `10ms`) so tests can force out-of-order completion.
#[derive(Default)]
pub struct ScriptedBackend {
    requests: Mutex<Vec<(String, u32)>>,
    delays: HashMap<u32, Duration>,
    failures: HashSet<u32>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay the response for `k`.
    pub fn with_delay(mut self, k: u32, delay: Duration) -> Self {
        self.delays.insert(k, delay);
        self
    }

    /// Answer requests for `k` with an `error` field.
    pub fn failing(mut self, k: u32) -> Self {
        self.failures.insert(k);
        self
    }

    /// Requests received so far, as `(fname, k)`.
    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecompressBackend for ScriptedBackend {
    async fn recompress(
        &self,
        fname: &str,
        k: CompressionParameter,
    ) -> Result<RecompressionResult> {
        let k = k.get();
        self.requests.lock().unwrap().push((fname.to_string(), k));

        let delay = self
            .delays
            .get(&k)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;

        if self.failures.contains(&k) {
            Err(Error::Backend("k must be int".to_string()))
        } else {
            Ok(result_for(fname, k))
        }
    }
}

/// The result a compression server would report for `fname` at `k`.
pub fn result_for(fname: &str, k: u32) -> RecompressionResult {
    let (stem, ext) = fname.rsplit_once('.').unwrap_or((fname, "jpg"));
    RecompressionResult {
        url: format!("/preview/{stem}_{k}.{ext}"),
        before_kb: 512.0,
        after_kb: f64::from(k) * 2.5,
        ratio: 100.0 - f64::from(k) * 2.5 / 512.0 * 100.0,
        k,
        runtime: 0.25,
        dimension: Some("600×800".to_string()),
        svd: SvdMetrics::default(),
    }
}

/// Create a temporary directory for test files.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write a solid-color PNG of the given size.
pub fn create_test_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgb([200, 30, 30])
        } else {
            image::Rgb([30, 30, 200])
        }
    })
    .save(&path)
    .expect("Failed to write test image");
    path
}

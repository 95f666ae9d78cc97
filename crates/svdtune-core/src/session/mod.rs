//! Recompression requests and their reconciliation with the view.
//!
//! Each request carries a sequence number. Responses can resolve in any
//! order, so [`RecompressionSession::apply`] keeps the highest sequence number
//! that has settled (succeeded or failed) and discards anything at or below
//! it. The view therefore always reflects the latest issued request that has
//! resolved, never an older one arriving late.
//!
//! ## Example
//!
//! ```rust,ignore
//! let ticket = session.issue(k);
//! // ... later, on the page loop:
//! let applied = session.apply(completion, &mut view);
//! ```

pub mod result;
pub mod stats;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::RecompressBackend;
use crate::control::CompressionParameter;
use crate::error::Result;
use crate::view::PageView;

pub use result::{cache_bust, cache_token, download_path, RecompressionResult, SvdMetrics};
pub use stats::StatsPanel;

/// Handle for an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// Sequence number, strictly increasing per session
    pub seq: u64,
    /// `k` sent with the request
    pub k: CompressionParameter,
}

/// A resolved request, posted back to the page loop.
#[derive(Debug)]
pub struct Completion {
    /// Sequence number of the request
    pub seq: u64,
    /// `k` sent with the request
    pub k: CompressionParameter,
    /// What the backend answered
    pub outcome: Result<RecompressionResult>,
}

/// What [`RecompressionSession::apply`] did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Image, statistics and download link were replaced
    Rendered,
    /// The request failed; the view was left untouched
    Failed,
    /// A newer request had already settled; the completion was dropped
    Stale,
}

/// Issues recompression requests for one uploaded original.
pub struct RecompressionSession<B> {
    backend: Arc<B>,
    fname: String,
    next_seq: u64,
    highest_settled: u64,
    tx: mpsc::UnboundedSender<Completion>,
    current: Option<RecompressionResult>,
}

impl<B: RecompressBackend> RecompressionSession<B> {
    /// Create a session for the original stored under `fname`.
    pub fn new(
        backend: Arc<B>,
        fname: impl Into<String>,
        tx: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            backend,
            fname: fname.into(),
            next_seq: 0,
            highest_settled: 0,
            tx,
            current: None,
        }
    }

    /// Send a request for `k`. The completion is posted to the session channel.
    pub fn issue(&mut self, k: CompressionParameter) -> Ticket {
        self.next_seq += 1;
        let ticket = Ticket {
            seq: self.next_seq,
            k,
        };

        let backend = Arc::clone(&self.backend);
        let fname = self.fname.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = backend.recompress(&fname, k).await;
            let _ = tx.send(Completion {
                seq: ticket.seq,
                k,
                outcome,
            });
        });

        tracing::info!(seq = ticket.seq, k = k.get(), fname = %self.fname, "recompression requested");
        ticket
    }

    /// Reconcile a completion with the view.
    pub fn apply(&mut self, completion: Completion, view: &mut PageView) -> Applied {
        self.apply_with_token(completion, view, cache_token())
    }

    /// Same as [`apply`](Self::apply) with an explicit cache-busting token.
    pub fn apply_with_token(
        &mut self,
        completion: Completion,
        view: &mut PageView,
        token: i64,
    ) -> Applied {
        if completion.seq <= self.highest_settled {
            tracing::debug!(
                seq = completion.seq,
                settled = self.highest_settled,
                "discarding stale recompression response"
            );
            return Applied::Stale;
        }
        self.highest_settled = completion.seq;

        match completion.outcome {
            Ok(result) => {
                view.compressed_image_src = Some(cache_bust(&result.url, token));
                view.stats_text = StatsPanel::render(&result);
                view.download_href = Some(result.download_href());
                tracing::debug!(seq = completion.seq, k = result.k, url = %result.url, "recompression rendered");
                self.current = Some(result);
                Applied::Rendered
            }
            Err(e) => {
                tracing::warn!(seq = completion.seq, k = completion.k.get(), "recompression failed: {e}");
                Applied::Failed
            }
        }
    }

    /// Point the session at a new original. Requests already in flight for
    /// the previous file are treated as settled and their responses dropped.
    pub fn retarget(&mut self, fname: impl Into<String>) {
        self.fname = fname.into();
        self.highest_settled = self.next_seq;
        self.current = None;
    }

    /// Stable filename of the original.
    #[must_use]
    pub fn fname(&self) -> &str {
        &self.fname
    }

    /// Result currently shown, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&RecompressionResult> {
        self.current.as_ref()
    }

    /// Whether a request has been issued but not settled.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.next_seq > self.highest_settled
    }
}

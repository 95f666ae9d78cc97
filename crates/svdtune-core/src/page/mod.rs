//! The tuning page event loop.
//!
//! [`Page`] owns the [`PageView`] and every component that renders into it.
//! Spawned work (debounce timers, backend calls, file reads) never touches
//! the view; it posts a [`PageEvent`] instead, and [`Page::dispatch`] applies
//! events one at a time:
//!
//! ```text
//! UserInput ──► handle_input ──► ParameterController ──► Debouncer ─┐
//!                    │                                               │
//!                    └──► UploadPreview ──► read task ─┐             │
//!                                                       ▼             ▼
//!                        dispatch ◄── next_event ◄── PreviewLoaded / DebounceFired
//!                           │                                         ▲
//!                           └──► RecompressionSession::issue ──► RecompressCompleted
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::RecompressBackend;
use crate::config::Config;
use crate::control::{
    CompressionParameter, ControlKind, Debouncer, Fired, ParameterController, Preset,
};
use crate::session::{Applied, Completion, RecompressionSession, Ticket};
use crate::upload::{
    EventDisposition, FileSource, PreviewLoaded, PreviewState, UploadPreview, Visibility,
};
use crate::view::PageView;

/// Input from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Slider moved to a compression rate percentage
    Slider(u8),
    /// Preset selected
    Preset(Preset),
    /// File picked through the file input
    FileChosen(FileSource),
    /// Files dropped onto the upload region
    FileDropped(Vec<FileSource>),
    /// Something dragged over the upload region
    DragOver,
    /// Page shown or hidden
    VisibilityChanged(Visibility),
}

/// Work finished off the page loop.
#[derive(Debug)]
pub enum PageEvent {
    /// A debounce window elapsed
    DebounceFired(Fired<CompressionParameter>),
    /// A recompression request resolved
    RecompressCompleted(Completion),
    /// A file read for the upload preview finished
    PreviewLoaded(PreviewLoaded),
}

/// What dispatching an event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageUpdate {
    /// A recompression request was sent
    Requested(Ticket),
    /// A recompression response was reconciled
    Recompressed(Applied),
    /// The upload preview settled in a new state
    Preview(PreviewState),
    /// The event was superseded or had nothing to act on
    Ignored,
}

/// The tuning page.
pub struct Page<B> {
    view: PageView,
    controller: ParameterController,
    session: Option<RecompressionSession<B>>,
    upload: UploadPreview,
    backend: Arc<B>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    debounce_rx: mpsc::UnboundedReceiver<Fired<CompressionParameter>>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    preview_rx: mpsc::UnboundedReceiver<PreviewLoaded>,
}

impl<B: RecompressBackend> Page<B> {
    /// Build the page and render its initial control state.
    pub fn new(config: &Config, backend: Arc<B>) -> Self {
        let (debounce_tx, debounce_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (preview_tx, preview_rx) = mpsc::unbounded_channel();

        let controller = ParameterController::new(
            &config.control,
            Debouncer::new(config.session.debounce, debounce_tx),
        );
        let mut view = PageView::default();
        controller.render(&mut view);

        Self {
            view,
            controller,
            session: None,
            upload: UploadPreview::new(config.upload.clone(), preview_tx),
            backend,
            completion_tx,
            debounce_rx,
            completion_rx,
            preview_rx,
        }
    }

    /// Start recompressing the original stored under `fname`.
    ///
    /// Switching to a different original drops whatever was shown for the
    /// previous one, along with any responses still in flight for it.
    /// Attaching the current original again changes nothing.
    pub fn attach_original(&mut self, fname: impl Into<String>) {
        let fname = fname.into();
        match &mut self.session {
            Some(session) if session.fname() == fname => {
                tracing::debug!(fname = %fname, "original already attached");
                return;
            }
            Some(session) => {
                session.retarget(fname.clone());
                self.view.compressed_image_src = None;
                self.view.stats_text.clear();
                self.view.download_href = None;
            }
            None => {
                self.session = Some(RecompressionSession::new(
                    Arc::clone(&self.backend),
                    fname.clone(),
                    self.completion_tx.clone(),
                ));
            }
        }
        tracing::info!(fname = %fname, "original attached");
    }

    /// Send a request for the current `k` without waiting for the debounce
    /// window. Returns `None` if no original is attached.
    pub fn request_current(&mut self) -> Option<Ticket> {
        self.controller.cancel_pending();
        let k = self.controller.k();
        self.session.as_mut().map(|session| session.issue(k))
    }

    /// Handle user input synchronously.
    pub fn handle_input(&mut self, input: UserInput) -> EventDisposition {
        match input {
            UserInput::Slider(rate) => {
                self.controller
                    .on_control_change(ControlKind::Slider(rate), &mut self.view);
                EventDisposition::Default
            }
            UserInput::Preset(preset) => {
                self.controller
                    .on_control_change(ControlKind::Preset(preset), &mut self.view);
                EventDisposition::Default
            }
            UserInput::FileChosen(source) => {
                self.upload.on_file_input_change(source, &mut self.view);
                EventDisposition::Default
            }
            UserInput::FileDropped(files) => self.upload.on_drop(files, &mut self.view),
            UserInput::DragOver => self.upload.on_drag_over(),
            UserInput::VisibilityChanged(visibility) => {
                self.upload.on_visibility_change(visibility, &mut self.view);
                EventDisposition::Default
            }
        }
    }

    /// Wait for the next finished piece of background work.
    ///
    /// Returns `None` only once every event source has closed.
    pub async fn next_event(&mut self) -> Option<PageEvent> {
        tokio::select! {
            Some(fired) = self.debounce_rx.recv() => Some(PageEvent::DebounceFired(fired)),
            Some(completion) = self.completion_rx.recv() => Some(PageEvent::RecompressCompleted(completion)),
            Some(loaded) = self.preview_rx.recv() => Some(PageEvent::PreviewLoaded(loaded)),
            else => None,
        }
    }

    /// Apply one event to the view.
    pub fn dispatch(&mut self, event: PageEvent) -> PageUpdate {
        match event {
            PageEvent::DebounceFired(fired) => {
                let Some(k) = self.controller.accept_fired(fired) else {
                    return PageUpdate::Ignored;
                };
                match self.session.as_mut() {
                    Some(session) => PageUpdate::Requested(session.issue(k)),
                    None => {
                        tracing::debug!(k = k.get(), "no original attached, request skipped");
                        PageUpdate::Ignored
                    }
                }
            }
            PageEvent::RecompressCompleted(completion) => match self.session.as_mut() {
                Some(session) => PageUpdate::Recompressed(session.apply(completion, &mut self.view)),
                None => PageUpdate::Ignored,
            },
            PageEvent::PreviewLoaded(loaded) => {
                if self.upload.finish(loaded, &mut self.view) {
                    PageUpdate::Preview(self.upload.state())
                } else {
                    PageUpdate::Ignored
                }
            }
        }
    }

    /// Wait for the next event and apply it.
    pub async fn step(&mut self) -> Option<PageUpdate> {
        let event = self.next_event().await?;
        Some(self.dispatch(event))
    }

    /// Whether no debounce timer, request or file read is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.controller.is_pending()
            && !self.session.as_ref().is_some_and(RecompressionSession::in_flight)
            && self.upload.state() != PreviewState::Loading
    }

    /// Current view.
    #[must_use]
    pub const fn view(&self) -> &PageView {
        &self.view
    }

    /// `k` the next request will carry.
    #[must_use]
    pub const fn k(&self) -> CompressionParameter {
        self.controller.k()
    }

    /// The parameter controller.
    #[must_use]
    pub const fn controller(&self) -> &ParameterController {
        &self.controller
    }

    /// The recompression session, once an original is attached.
    #[must_use]
    pub const fn session(&self) -> Option<&RecompressionSession<B>> {
        self.session.as_ref()
    }
}

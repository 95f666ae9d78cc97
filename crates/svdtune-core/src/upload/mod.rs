//! Upload preview.
//!
//! A file picked through the file input or dropped onto the upload region is
//! read off the page loop, decoded, and shown as an inline data URL sized to
//! its orientation:
//!
//! | State | Placeholder | Preview |
//! |-------|-------------|---------|
//! | Empty | shown | hidden |
//! | Loading | hidden | hidden |
//! | Previewing | hidden | shown |
//! | ErrorRecovered | shown | hidden |
//!
//! Each read carries a generation number; a read that finishes after a newer
//! one started is ignored.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::UploadConfig;
use crate::error::{Error, Result};
use crate::view::{PageView, PreviewFit};

/// A file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    /// Location on disk
    pub path: PathBuf,
}

impl FileSource {
    /// Wrap a path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Base name of the file, lossily converted.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Image orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Wider than tall
    Landscape,
    /// Taller than wide, or square
    Portrait,
}

impl Orientation {
    /// Classify by dimensions.
    #[must_use]
    pub const fn of(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    /// Preview sizing for this orientation.
    #[must_use]
    pub const fn fit(self) -> PreviewFit {
        match self {
            Self::Landscape => PreviewFit::FitWidth,
            Self::Portrait => PreviewFit::FitHeight,
        }
    }
}

/// A decoded file ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    /// Base name of the file
    pub file_name: String,
    /// MIME type of the encoded data
    pub mime_type: String,
    /// `data:<mime>;base64,...` source
    #[serde(skip)]
    pub data_url: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// File size in bytes
    pub size: u64,
    /// Orientation derived from the dimensions
    pub orientation: Orientation,
}

impl UploadedImage {
    /// Preview sizing for this image.
    #[must_use]
    pub const fn fit(&self) -> PreviewFit {
        self.orientation.fit()
    }
}

/// Upload preview state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// Nothing selected
    #[default]
    Empty,
    /// A file is being read
    Loading,
    /// A preview is shown
    Previewing,
    /// The last read failed; the placeholder is back
    ErrorRecovered,
}

/// Whether the host should run its default handling of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Suppress default handling (e.g. opening a dropped file)
    PreventDefault,
    /// Let default handling run
    Default,
}

/// Page visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Page shown again (including after back navigation)
    Visible,
    /// Page hidden
    Hidden,
}

/// A finished file read, posted back to the page loop.
#[derive(Debug)]
pub struct PreviewLoaded {
    /// Generation the read was started with
    pub generation: u64,
    /// Decoded image, or why reading failed
    pub outcome: Result<UploadedImage>,
}

/// Upload region controller.
#[derive(Debug)]
pub struct UploadPreview {
    config: UploadConfig,
    state: PreviewState,
    generation: u64,
    tx: mpsc::UnboundedSender<PreviewLoaded>,
    current: Option<UploadedImage>,
}

impl UploadPreview {
    /// Create a controller posting finished reads to `tx`.
    pub fn new(config: UploadConfig, tx: mpsc::UnboundedSender<PreviewLoaded>) -> Self {
        Self {
            config,
            state: PreviewState::Empty,
            generation: 0,
            tx,
            current: None,
        }
    }

    /// Enter the loading state and return the generation of the new read.
    pub fn begin(&mut self, view: &mut PageView) -> u64 {
        self.generation += 1;
        self.state = PreviewState::Loading;
        self.current = None;
        view.enter_loading();
        self.generation
    }

    /// The file input selection changed.
    pub fn on_file_input_change(&mut self, source: FileSource, view: &mut PageView) -> u64 {
        view.selected_file = Some(source.path.clone());
        let generation = self.begin(view);

        let config = self.config.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = read_source(&config, &source).await;
            let _ = tx.send(PreviewLoaded {
                generation,
                outcome,
            });
        });

        generation
    }

    /// Something is being dragged over the upload region.
    #[must_use]
    pub const fn on_drag_over(&self) -> EventDisposition {
        EventDisposition::PreventDefault
    }

    /// Files were dropped onto the upload region. The first one becomes the
    /// file input selection and goes through the same pipeline.
    pub fn on_drop(&mut self, files: Vec<FileSource>, view: &mut PageView) -> EventDisposition {
        match files.into_iter().next() {
            Some(first) => {
                self.on_file_input_change(first, view);
            }
            None => tracing::debug!("drop without files ignored"),
        }
        EventDisposition::PreventDefault
    }

    /// Apply a finished read. Returns `false` if a newer read superseded it.
    pub fn finish(&mut self, loaded: PreviewLoaded, view: &mut PageView) -> bool {
        if loaded.generation != self.generation || self.state != PreviewState::Loading {
            tracing::debug!(
                generation = loaded.generation,
                latest = self.generation,
                "discarding superseded preview"
            );
            return false;
        }

        match loaded.outcome {
            Ok(image) => {
                view.placeholder_visible = false;
                view.preview_visible = true;
                view.preview_src = Some(image.data_url.clone());
                view.preview_fit = Some(image.fit());
                tracing::debug!(
                    file = %image.file_name,
                    width = image.width,
                    height = image.height,
                    "preview ready"
                );
                self.current = Some(image);
                self.state = PreviewState::Previewing;
            }
            Err(e) => {
                tracing::warn!("could not preview file: {e}");
                view.selected_file = None;
                view.restore_placeholder();
                self.state = PreviewState::ErrorRecovered;
            }
        }
        true
    }

    /// The page became visible or hidden. Showing it again drops any
    /// selection left over from a previous visit.
    pub fn on_visibility_change(&mut self, visibility: Visibility, view: &mut PageView) {
        if visibility == Visibility::Hidden {
            return;
        }
        // invalidate reads still in flight
        self.generation += 1;
        self.state = PreviewState::Empty;
        self.current = None;
        view.selected_file = None;
        view.restore_placeholder();
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PreviewState {
        self.state
    }

    /// Image currently previewed.
    #[must_use]
    pub const fn current(&self) -> Option<&UploadedImage> {
        self.current.as_ref()
    }
}

/// Validate, read and decode `source` into a previewable image.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFile`] for a disallowed extension,
/// [`Error::FileTooLarge`] above `max_file_size`, [`Error::FileNotFound`] if
/// the file is missing, and [`Error::Decode`] if it is not a readable image.
pub async fn read_source(config: &UploadConfig, source: &FileSource) -> Result<UploadedImage> {
    let file_name = source.file_name();
    if !config.allows(&file_name) {
        return Err(Error::UnsupportedFile(file_name));
    }

    let metadata = tokio::fs::metadata(&source.path)
        .await
        .map_err(|e| not_found_or_io(e, &source.path))?;
    let size = metadata.len();
    if size > config.max_file_size {
        return Err(Error::FileTooLarge {
            file: file_name,
            size,
            limit: config.max_file_size,
        });
    }

    let bytes = tokio::fs::read(&source.path)
        .await
        .map_err(|e| not_found_or_io(e, &source.path))?;

    let name = file_name.clone();
    let (bytes, width, height, format) = tokio::task::spawn_blocking(move || {
        decode_dimensions(&bytes, &name).map(|(w, h, f)| (bytes, w, h, f))
    })
    .await
    .map_err(|e| Error::Internal(format!("decode task failed: {e}")))??;

    let mime_type = format.map_or_else(
        || {
            mime_guess::from_path(&source.path)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        },
        |f| f.to_mime_type().to_string(),
    );

    Ok(UploadedImage {
        data_url: data_url(&mime_type, &bytes),
        file_name,
        mime_type,
        width,
        height,
        size,
        orientation: Orientation::of(width, height),
    })
}

fn decode_dimensions(bytes: &[u8], file: &str) -> Result<(u32, u32, Option<image::ImageFormat>)> {
    use image::GenericImageView;

    let decode_error = |reason: String| Error::Decode {
        file: file.to_string(),
        reason,
    };

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?;
    let format = reader.format();
    let img = reader.decode().map_err(|e| decode_error(e.to_string()))?;
    let (width, height) = img.dimensions();
    Ok((width, height, format))
}

fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    use base64::Engine;

    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{encoded}")
}

fn not_found_or_io(e: std::io::Error, path: &Path) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::FileNotFound(path.display().to_string())
    } else {
        Error::Io(e)
    }
}

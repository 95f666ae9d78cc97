//! View model for the tuning page.
//!
//! [`PageView`] holds everything a front-end renders: the control widgets,
//! the recompressed image with its statistics panel, and the upload preview
//! region. Components only mutate it from the page event loop, one event at
//! a time, so no locking is involved.

use std::path::PathBuf;

use serde::Serialize;

use crate::control::Preset;

/// How the upload preview is sized inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewFit {
    /// Landscape: width 100%, height auto
    FitWidth,
    /// Portrait: height 100%, width auto
    FitHeight,
}

impl PreviewFit {
    /// CSS-style `(width, height)` pair for this fit.
    #[must_use]
    pub const fn dimensions(self) -> (&'static str, &'static str) {
        match self {
            Self::FitWidth => ("100%", "auto"),
            Self::FitHeight => ("auto", "100%"),
        }
    }
}

/// Rendered state of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Text next to the slider
    pub rate_label: String,
    /// Slider position (compression rate, 0-100)
    pub slider_position: u8,
    /// `k` that would be sent with the next request
    pub k_value: u32,
    /// Preset highlighted in the selector, if the last change was a preset
    pub selected_preset: Option<Preset>,
    /// Source of the recompressed image
    pub compressed_image_src: Option<String>,
    /// Full text of the statistics panel
    pub stats_text: String,
    /// Target of the download link
    pub download_href: Option<String>,
    /// Whether the "drop an image here" placeholder is shown
    pub placeholder_visible: bool,
    /// Whether the upload preview image is shown
    pub preview_visible: bool,
    /// Source of the upload preview (a data URL)
    pub preview_src: Option<String>,
    /// Sizing of the upload preview
    pub preview_fit: Option<PreviewFit>,
    /// File currently selected in the file input
    pub selected_file: Option<PathBuf>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            rate_label: String::new(),
            slider_position: 0,
            k_value: 0,
            selected_preset: None,
            compressed_image_src: None,
            stats_text: String::new(),
            download_href: None,
            placeholder_visible: true,
            preview_visible: false,
            preview_src: None,
            preview_fit: None,
            selected_file: None,
        }
    }
}

impl PageView {
    /// Hide the upload region entirely while a file is being read.
    pub(crate) fn enter_loading(&mut self) {
        self.placeholder_visible = false;
        self.preview_visible = false;
        self.preview_src = None;
        self.preview_fit = None;
    }

    /// Show the placeholder and drop any preview.
    pub(crate) fn restore_placeholder(&mut self) {
        self.placeholder_visible = true;
        self.preview_visible = false;
        self.preview_src = None;
        self.preview_fit = None;
    }

    /// The placeholder and the preview are never both shown, and once
    /// settled exactly one of them is.
    #[must_use]
    pub const fn upload_region_consistent(&self) -> bool {
        !(self.placeholder_visible && self.preview_visible)
            && (self.preview_visible == self.preview_src.is_some())
    }
}

//! # svdtune Core Library
//!
//! `svdtune-core` drives an interactive SVD image-compression page: the user
//! tunes the rank `k` with a slider or a preset, and the page re-renders the
//! recompressed image and its statistics once input settles.
//!
//! ## Features
//!
//! - **Two synchronized controls**: slider and presets always agree on `k`
//! - **Debounced requests**: one request per quiet window, carrying the last `k`
//! - **Latest wins**: out-of-order responses never overwrite a newer result
//! - **Upload preview**: picked or dropped files are previewed inline
//!
//! ## Modules
//!
//! - [`backend`] - Recompression backend port and HTTP client
//! - [`config`] - Configuration management
//! - [`control`] - Rate/preset to `k` mapping and debouncing
//! - [`error`] - Error types
//! - [`page`] - Page event loop
//! - [`session`] - Recompression requests, ordering and statistics
//! - [`upload`] - Upload preview pipeline
//! - [`view`] - View model
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use svdtune_core::{backend::HttpBackend, config::Config, page::{Page, UserInput}};
//!
//! let config = Config::load()?;
//! let backend = Arc::new(HttpBackend::new(&config.session)?);
//! let mut page = Page::new(&config, backend);
//! page.attach_original("photo.jpg");
//!
//! page.handle_input(UserInput::Slider(90));
//! while let Some(update) = page.step().await {
//!     println!("{update:?}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod backend;
pub mod config;
pub mod control;
pub mod error;
pub mod page;
pub mod session;
pub mod upload;
pub mod view;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default lower bound for `k`
pub const DEFAULT_K_MIN: u32 = 5;

/// Default upper bound for `k`
pub const DEFAULT_K_MAX: u32 = 200;

/// Default slider position (compression rate percentage)
pub const DEFAULT_INITIAL_RATE: u8 = 50;

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

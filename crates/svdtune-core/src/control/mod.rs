//! Compression parameter controls.
//!
//! The page exposes two interchangeable controls for the SVD rank `k`:
//!
//! | Control | Input | Mapping |
//! |---------|-------|---------|
//! | Slider | compression rate, 0-100% | [`KMapping`] (higher rate, lower `k`) |
//! | Preset | low / medium / high | fixed [`PresetTable`] lookup |
//!
//! [`ParameterController`] keeps both in sync: a preset repositions the
//! slider to the rate the active mapping would need to produce the same `k`.
//! Every change updates the visible label at once and re-arms the
//! [`Debouncer`] that eventually triggers a recompression request.

pub mod debounce;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{ControlConfig, MappingKind, PresetConfig};
use crate::error::{Error, Result};
use crate::view::PageView;

pub use debounce::{Debouncer, Fired};

/// Inclusive bounds for `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KBounds {
    /// Smallest allowed `k` (at least 1)
    pub min: u32,
    /// Largest allowed `k`
    pub max: u32,
}

impl KBounds {
    /// Create bounds, forcing `min >= 1` and `max >= min`.
    #[must_use]
    pub fn new(min: u32, max: u32) -> Self {
        let min = min.max(1);
        Self {
            min,
            max: max.max(min),
        }
    }

    fn clamp(self, value: i64) -> u32 {
        let clamped = value.clamp(i64::from(self.min), i64::from(self.max));
        u32::try_from(clamped).unwrap_or(self.max)
    }
}

/// The SVD rank sent to the backend. Always within its [`KBounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompressionParameter(u32);

impl CompressionParameter {
    /// Clamp an arbitrary value into `bounds`.
    #[must_use]
    pub fn clamped(value: i64, bounds: KBounds) -> Self {
        Self(bounds.clamp(value))
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CompressionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rate-to-`k` strategy. One instance drives both live updates and the
/// initial slider state so they can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KMapping {
    /// `k = round(k_max * (100 - rate) / 100)`, clamped to the bounds.
    InverseProportional {
        /// Output bounds
        bounds: KBounds,
    },
    /// `k = intercept - rate`, clamped to the bounds.
    Linear {
        /// Value of `k` at rate 0 before clamping
        intercept: i64,
        /// Output bounds
        bounds: KBounds,
    },
}

impl KMapping {
    /// Build the mapping described by the control configuration.
    #[must_use]
    pub fn from_config(config: &ControlConfig) -> Self {
        let bounds = KBounds::new(config.k_min, config.k_max);
        match config.mapping {
            MappingKind::InverseProportional => Self::InverseProportional { bounds },
            MappingKind::Linear => Self::Linear {
                intercept: config.linear_intercept,
                bounds,
            },
        }
    }

    /// Bounds every produced `k` falls within.
    #[must_use]
    pub const fn bounds(&self) -> KBounds {
        match self {
            Self::InverseProportional { bounds } | Self::Linear { bounds, .. } => *bounds,
        }
    }

    /// Map a slider rate (clamped to 0..=100) to `k`. Non-increasing in `rate`.
    #[must_use]
    pub fn rate_to_k(&self, rate: u8) -> CompressionParameter {
        let rate = i64::from(rate.min(100));
        match *self {
            Self::InverseProportional { bounds } => {
                // round-half-up of k_max * (100 - rate) / 100
                let scaled = (i64::from(bounds.max) * (100 - rate) + 50) / 100;
                CompressionParameter::clamped(scaled, bounds)
            }
            Self::Linear { intercept, bounds } => {
                CompressionParameter::clamped(intercept - rate, bounds)
            }
        }
    }

    /// Slider rate that maps back to `k` (within one step of rounding).
    #[must_use]
    pub fn k_to_rate(&self, k: CompressionParameter) -> u8 {
        let k = i64::from(k.get());
        let rate = match *self {
            Self::InverseProportional { bounds } => {
                let max = i64::from(bounds.max);
                100 - (k * 100 + max / 2) / max
            }
            Self::Linear { intercept, .. } => intercept - k,
        };
        u8::try_from(rate.clamp(0, 100)).unwrap_or(100)
    }
}

/// Named compression presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Light compression, keeps the most singular values
    Low,
    /// Balanced
    Medium,
    /// Aggressive compression
    High,
}

impl Preset {
    /// All presets in display order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Identifier used on the wire and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::InvalidControl(format!(
                "unknown preset '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Fixed preset-to-`k` lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetTable {
    low: CompressionParameter,
    medium: CompressionParameter,
    high: CompressionParameter,
}

impl PresetTable {
    /// Build the table, clamping entries into `bounds`.
    #[must_use]
    pub fn new(presets: PresetConfig, bounds: KBounds) -> Self {
        Self {
            low: CompressionParameter::clamped(i64::from(presets.low), bounds),
            medium: CompressionParameter::clamped(i64::from(presets.medium), bounds),
            high: CompressionParameter::clamped(i64::from(presets.high), bounds),
        }
    }

    /// `k` assigned to `preset`.
    #[must_use]
    pub const fn k_for(&self, preset: Preset) -> CompressionParameter {
        match preset {
            Preset::Low => self.low,
            Preset::Medium => self.medium,
            Preset::High => self.high,
        }
    }
}

/// A change to one of the visible controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Slider moved to a compression rate percentage
    Slider(u8),
    /// Preset selected
    Preset(Preset),
}

/// Owns the control-to-`k` mapping and the debounce timer.
#[derive(Debug)]
pub struct ParameterController {
    mapping: KMapping,
    presets: PresetTable,
    debouncer: Debouncer<CompressionParameter>,
    rate: u8,
    k: CompressionParameter,
    preset: Option<Preset>,
}

impl ParameterController {
    /// Create a controller whose initial slider position, label and `k`
    /// all come from `config.initial_rate` through the configured mapping.
    #[must_use]
    pub fn new(config: &ControlConfig, debouncer: Debouncer<CompressionParameter>) -> Self {
        let mapping = KMapping::from_config(config);
        let presets = PresetTable::new(config.presets, mapping.bounds());
        let rate = config.initial_rate.min(100);

        Self {
            mapping,
            presets,
            debouncer,
            rate,
            k: mapping.rate_to_k(rate),
            preset: None,
        }
    }

    /// Write the current control state into the view.
    pub fn render(&self, view: &mut PageView) {
        view.slider_position = self.rate;
        view.rate_label = self.rate.to_string();
        view.k_value = self.k.get();
        view.selected_preset = self.preset;
    }

    /// Apply a control change: recompute `k`, synchronize both controls in
    /// the view, and re-arm the debounce timer.
    pub fn on_control_change(
        &mut self,
        control: ControlKind,
        view: &mut PageView,
    ) -> CompressionParameter {
        match control {
            ControlKind::Slider(rate) => {
                self.rate = rate.min(100);
                self.k = self.mapping.rate_to_k(self.rate);
                self.preset = None;
            }
            ControlKind::Preset(preset) => {
                self.k = self.presets.k_for(preset);
                self.rate = self.mapping.k_to_rate(self.k);
                self.preset = Some(preset);
            }
        }

        self.render(view);
        self.debouncer.arm(self.k);
        tracing::debug!(?control, k = self.k.get(), rate = self.rate, "control changed");
        self.k
    }

    /// Pass a fired timer value through the debouncer.
    ///
    /// Returns the `k` to request, or `None` if the fire was superseded.
    pub fn accept_fired(&mut self, fired: Fired<CompressionParameter>) -> Option<CompressionParameter> {
        self.debouncer.accept(fired)
    }

    /// Drop any pending timer.
    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }

    /// Whether a request is waiting on the debounce window.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_armed()
    }

    /// Current `k`.
    #[must_use]
    pub const fn k(&self) -> CompressionParameter {
        self.k
    }

    /// Current slider rate.
    #[must_use]
    pub const fn rate(&self) -> u8 {
        self.rate
    }

    /// Active mapping.
    #[must_use]
    pub const fn mapping(&self) -> &KMapping {
        &self.mapping
    }
}

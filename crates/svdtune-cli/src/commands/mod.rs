//! CLI command definitions and handlers.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use svdtune_core::config::Config;
use svdtune_core::control::Preset;

/// Load configuration with graceful fallback to defaults.
///
/// This function should be used by all commands to load the user's configuration.
/// If the config file doesn't exist or can't be parsed, it falls back to defaults.
pub fn load_config() -> Config {
    Config::load().unwrap_or_default()
}

/// Load configuration and apply a `--server` override, if given.
pub fn load_config_with_server(server: Option<&str>) -> Config {
    let mut config = load_config();
    if let Some(server) = server {
        config.session.base_url = server.to_string();
    }
    config
}

pub mod config;
pub mod k;
pub mod preview;
pub mod recompress;
pub mod tune;

/// svdtune - Interactive SVD compression tuning
#[derive(Parser)]
#[command(name = "svdtune")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Show the k a slider rate or preset maps to
    K(KArgs),

    /// Preview an image the way the upload page would
    Preview(PreviewArgs),

    /// Recompress an uploaded original once
    Recompress(RecompressArgs),

    /// Tune k interactively against the compression server
    Tune(TuneArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Compression preset
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum PresetArg {
    /// Light compression
    Low,
    /// Balanced compression
    Medium,
    /// Aggressive compression
    High,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Low => Self::Low,
            PresetArg::Medium => Self::Medium,
            PresetArg::High => Self::High,
        }
    }
}

/// Arguments for the k command
#[derive(Parser)]
pub struct KArgs {
    /// Compression rate percentage (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100), required_unless_present = "preset", conflicts_with = "preset")]
    pub rate: Option<u8>,

    /// Preset to look up
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the preview command
#[derive(Parser)]
pub struct PreviewArgs {
    /// Image to preview
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the recompress command
#[derive(Parser)]
pub struct RecompressArgs {
    /// Stored filename of the uploaded original
    #[arg(long)]
    pub fname: String,

    /// Number of singular values to keep
    #[arg(short, long)]
    pub k: u32,

    /// Compression server URL (overrides session.base_url)
    #[arg(long, env = "SVDTUNE_SERVER")]
    pub server: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the tune command
#[derive(Parser)]
pub struct TuneArgs {
    /// Stored filename of an original already on the server
    #[arg(long, required_unless_present = "upload", conflicts_with = "upload")]
    pub fname: Option<String>,

    /// Upload this image first and tune it
    #[arg(long)]
    pub upload: Option<PathBuf>,

    /// Compression server URL (overrides session.base_url)
    #[arg(long, env = "SVDTUNE_SERVER")]
    pub server: Option<String>,
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show all configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

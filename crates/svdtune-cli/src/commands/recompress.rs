//! Recompress command implementation.

use anyhow::{Context, Result};

use svdtune_core::backend::{HttpBackend, RecompressBackend};
use svdtune_core::control::{CompressionParameter, KMapping};
use svdtune_core::session::StatsPanel;

use super::RecompressArgs;
use crate::ui;

/// Run the recompress command.
pub async fn run(args: RecompressArgs) -> Result<()> {
    let config = super::load_config_with_server(args.server.as_deref());
    let bounds = KMapping::from_config(&config.control).bounds();
    let k = CompressionParameter::clamped(i64::from(args.k), bounds);
    if k.get() != args.k {
        tracing::warn!("k = {} is outside {}..={}, using {}", args.k, bounds.min, bounds.max, k);
    }

    let backend = HttpBackend::new(&config.session).context("Failed to create HTTP client")?;

    let result = match backend.recompress(&args.fname, k).await {
        Ok(result) => result,
        Err(e) => {
            ui::print_error(&e);
            return Err(e).with_context(|| format!("Recompression of '{}' failed", args.fname));
        }
    };

    if args.json {
        let mut output = serde_json::to_value(&result)?;
        output["download"] = serde_json::Value::String(result.download_href());
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  Image:    {}", result.url);
    println!("  Download: {}", result.download_href());
    println!("{}", "─".repeat(50));
    for line in StatsPanel::render(&result).lines() {
        println!("  {}", line);
    }
    println!();

    Ok(())
}

//! Config command implementation.

use anyhow::{Context, Result};

use svdtune_core::config::Config;

use super::{ConfigAction, ConfigArgs};

/// Run the config command.
pub async fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = Config::load().context("Failed to load configuration")?;
            let presets = config.control.presets;

            println!();
            println!("svdtune Configuration");
            println!("{}", "─".repeat(50));
            println!();
            println!("[control]");
            println!("  mapping = {:?}", config.control.mapping);
            println!("  k_min = {}", config.control.k_min);
            println!("  k_max = {}", config.control.k_max);
            println!("  linear_intercept = {}", config.control.linear_intercept);
            println!("  initial_rate = {}", config.control.initial_rate);
            println!(
                "  presets = {{ low = {}, medium = {}, high = {} }}",
                presets.low, presets.medium, presets.high
            );
            println!();
            println!("[session]");
            println!("  base_url = \"{}\"", config.session.base_url);
            println!("  recompress_path = \"{}\"", config.session.recompress_path);
            println!("  upload_path = \"{}\"", config.session.upload_path);
            println!("  debounce = {}ms", config.session.debounce.as_millis());
            match config.session.request_timeout {
                Some(timeout) => println!("  request_timeout = {}s", timeout.as_secs()),
                None => println!("  request_timeout = (none)"),
            }
            println!();
            println!("[upload]");
            println!(
                "  allowed_extensions = [{}]",
                config.upload.allowed_extensions.join(", ")
            );
            println!("  max_file_size = {}", config.upload.max_file_size);
            println!();
        }

        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }

        ConfigAction::Reset => {
            Config::default()
                .save()
                .context("Failed to write configuration")?;
            println!("Configuration reset to defaults.");
        }
    }

    Ok(())
}

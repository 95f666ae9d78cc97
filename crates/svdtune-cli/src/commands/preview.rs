//! Preview command implementation.

use anyhow::{Context, Result};

use svdtune_core::upload::{read_source, FileSource};

use super::PreviewArgs;
use crate::ui;

/// Run the preview command.
pub async fn run(args: PreviewArgs) -> Result<()> {
    let config = super::load_config();
    let source = FileSource::new(&args.file);

    let image = match read_source(&config.upload, &source).await {
        Ok(image) => image,
        Err(e) => {
            ui::print_error(&e);
            return Err(e).with_context(|| format!("Cannot preview {}", args.file.display()));
        }
    };
    let (width, height) = image.fit().dimensions();

    if args.json {
        let output = serde_json::json!({
            "file": image.file_name,
            "mime_type": image.mime_type,
            "size": image.size,
            "width": image.width,
            "height": image.height,
            "orientation": image.orientation,
            "fit": { "width": width, "height": height },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  File:        {} ({})", image.file_name, image.mime_type);
    println!("  Size:        {}", ui::format_size(image.size));
    println!("  Dimensions:  {} x {}", image.width, image.height);
    println!("  Orientation: {:?}", image.orientation);
    println!("  Fit:         width {}, height {}", width, height);
    println!();

    Ok(())
}

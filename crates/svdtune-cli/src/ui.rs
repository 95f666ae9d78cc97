//! UI utilities for svdtune CLI.

use svdtune_core::page::PageUpdate;
use svdtune_core::session::Applied;
use svdtune_core::upload::PreviewState;
use svdtune_core::view::PageView;
use svdtune_core::Error;

const RULE_WIDTH: usize = 50;

/// Print an error with its suggestion, if any.
pub fn print_error(err: &Error) {
    eprintln!("  Error: {}", err);
    if let Some(suggestion) = err.suggestion() {
        for line in suggestion.lines() {
            eprintln!("  {}", line.trim());
        }
    }
}

/// Print the slider/preset line.
pub fn print_controls(view: &PageView) {
    let preset = view
        .selected_preset
        .map_or_else(|| "custom".to_string(), |p| p.to_string());
    println!(
        "  rate {:>3}%  k = {:<4} preset: {}",
        view.rate_label, view.k_value, preset
    );
}

/// Print the recompressed image, its links and the statistics panel.
pub fn print_result(view: &PageView) {
    let Some(src) = view.compressed_image_src.as_deref() else {
        println!("  (no recompressed image yet)");
        return;
    };
    println!("  Image:    {}", src);
    if let Some(href) = view.download_href.as_deref() {
        println!("  Download: {}", href);
    }
    println!("{}", "─".repeat(RULE_WIDTH));
    for line in view.stats_text.lines() {
        println!("  {}", line);
    }
    println!("{}", "─".repeat(RULE_WIDTH));
}

/// Print the upload region.
pub fn print_preview(view: &PageView) {
    if view.placeholder_visible {
        println!("  Upload: drop an image here");
        return;
    }
    match (view.preview_visible, view.preview_fit) {
        (true, Some(fit)) => {
            let (width, height) = fit.dimensions();
            let file = view
                .selected_file
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("  Upload: {} (width {}, height {})", file, width, height);
        }
        _ => println!("  Upload: loading..."),
    }
}

/// Print the whole page.
pub fn print_view(view: &PageView) {
    println!();
    print_controls(view);
    print_preview(view);
    print_result(view);
    println!();
}

/// Print what a dispatched event changed.
pub fn print_update(update: PageUpdate, view: &PageView) {
    match update {
        PageUpdate::Requested(ticket) => {
            println!("  … recompressing with k = {} (#{})", ticket.k, ticket.seq);
        }
        PageUpdate::Recompressed(Applied::Rendered) => print_result(view),
        PageUpdate::Recompressed(Applied::Failed) => {
            println!("  Recompression failed; keeping the previous result.");
        }
        PageUpdate::Preview(PreviewState::Previewing | PreviewState::ErrorRecovered) => {
            print_preview(view);
        }
        PageUpdate::Recompressed(Applied::Stale) | PageUpdate::Preview(_) | PageUpdate::Ignored => {}
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.00 MB");
    }
}

//! Statistics panel rendering.
//!
//! The panel is always rebuilt from a whole [`RecompressionResult`]; there is
//! no partial update.

use super::result::RecompressionResult;

/// Text renderer for the statistics panel.
pub struct StatsPanel;

impl StatsPanel {
    /// Render the full panel for `result`.
    #[must_use]
    pub fn render(result: &RecompressionResult) -> String {
        let rule = "─".repeat(32);
        let mut lines = vec![
            "File Size Metrics".to_string(),
            rule.clone(),
            format!(
                "Image pixel size: {}",
                result.dimension.as_deref().unwrap_or("-")
            ),
            format!("Original file size: {:.2} KB", result.before_kb),
            format!("Compressed file size: {:.2} KB", result.after_kb),
            format!("File compression ratio: {}", format_ratio(result.ratio)),
            rule.clone(),
            format!("k value: {}", result.k),
            format!("Runtime: {:.3} seconds", result.runtime),
        ];

        let svd = &result.svd;
        if !svd.is_empty() {
            lines.push(String::new());
            lines.push("SVD Metrics".to_string());
            lines.push(rule);
            if let (Some(height), Some(width)) = (svd.height, svd.width) {
                lines.push(format!("Matrix shape: {height} x {width}"));
            }
            if let Some(total) = svd.total_pixels {
                lines.push(format!("Total pixels: {total}"));
            }
            if let Some(size) = svd.uncompressed_matrix_size {
                lines.push(format!("Uncompressed matrix size: {size}"));
            }
            if let Some(size) = svd.compressed_matrix_size {
                lines.push(format!("Compressed matrix size: {size}"));
            }
            if let Some(ratio) = svd.svd_compression_ratio {
                lines.push(format!("SVD compression ratio: {ratio:.2}%"));
            }
            if let Some(kept) = svd.info_preserved {
                lines.push(format!("Information preserved: {kept:.2}%"));
            }
        }

        lines.join("\n")
    }
}

/// Format a compression ratio. A negative ratio means the output grew.
#[must_use]
pub fn format_ratio(ratio: f64) -> String {
    if ratio < 0.0 {
        format!("+{:.2}% (larger)", ratio.abs())
    } else {
        format!("{ratio:.2}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result::SvdMetrics;

    fn sample() -> RecompressionResult {
        RecompressionResult {
            url: "/preview/photo_15.jpg".to_string(),
            before_kb: 500.0,
            after_kb: 80.0,
            ratio: 16.0,
            k: 15,
            runtime: 0.42,
            dimension: Some("800x600".to_string()),
            svd: SvdMetrics::default(),
        }
    }

    #[test]
    fn test_render_basic_panel() {
        let text = StatsPanel::render(&sample());

        assert!(text.starts_with("File Size Metrics"));
        assert!(text.contains("Image pixel size: 800x600"));
        assert!(text.contains("Original file size: 500.00 KB"));
        assert!(text.contains("Compressed file size: 80.00 KB"));
        assert!(text.contains("File compression ratio: 16.00%"));
        assert!(text.contains("k value: 15"));
        assert!(text.contains("Runtime: 0.420 seconds"));
        assert!(!text.contains("SVD Metrics"));
    }

    #[test]
    fn test_render_svd_metrics_when_present() {
        let mut result = sample();
        result.svd = SvdMetrics {
            total_pixels: Some(480_000),
            height: Some(600),
            width: Some(800),
            info_preserved: Some(97.5),
            ..SvdMetrics::default()
        };

        let text = StatsPanel::render(&result);

        assert!(text.contains("SVD Metrics"));
        assert!(text.contains("Matrix shape: 600 x 800"));
        assert!(text.contains("Total pixels: 480000"));
        assert!(text.contains("Information preserved: 97.50%"));
    }

    #[test]
    fn test_panel_has_no_trailing_newline_and_blank_line_before_svd() {
        let mut result = sample();
        assert!(StatsPanel::render(&result).ends_with("Runtime: 0.420 seconds"));

        result.svd.info_preserved = Some(90.0);
        let text = StatsPanel::render(&result);
        assert!(text.contains("Runtime: 0.420 seconds\n\nSVD Metrics\n"));
        assert!(text.ends_with("Information preserved: 90.00%"));
    }

    #[test]
    fn test_missing_dimension_renders_placeholder() {
        let mut result = sample();
        result.dimension = None;
        assert!(StatsPanel::render(&result).contains("Image pixel size: -"));
    }

    #[test]
    fn test_negative_ratio_marks_growth() {
        assert_eq!(format_ratio(-3.5), "+3.50% (larger)");
        assert_eq!(format_ratio(42.0), "42.00%");
    }
}

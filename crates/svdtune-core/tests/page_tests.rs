//! Page event loop tests against a scripted backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{create_temp_dir, create_test_png, ScriptedBackend};
use svdtune_core::config::{Config, MappingKind};
use svdtune_core::control::Preset;
use svdtune_core::page::{Page, PageUpdate, UserInput};
use svdtune_core::session::Applied;
use svdtune_core::upload::{EventDisposition, FileSource, PreviewState};
use svdtune_core::view::PreviewFit;

fn linear_config() -> Config {
    let mut config = Config::default();
    config.control.mapping = MappingKind::Linear;
    config.control.linear_intercept = 105;
    config.control.k_min = 1;
    config.control.k_max = 100;
    config
}

#[tokio::test(start_paused = true)]
async fn test_burst_sends_one_request_with_last_k() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut page = Page::new(&Config::default(), Arc::clone(&backend));
    page.attach_original("photo.jpg");

    for rate in [10, 20, 30, 40, 60] {
        page.handle_input(UserInput::Slider(rate));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let last_k = page.k();

    let update = page.step().await.unwrap();
    assert!(matches!(update, PageUpdate::Requested(ticket) if ticket.k == last_k));
    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Rendered))
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.requests(), vec![("photo.jpg".to_string(), 80)]);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_responses_keep_latest() {
    // k=100 answers slowly, k=5 quickly
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_delay(100, Duration::from_secs(3))
            .with_delay(5, Duration::from_millis(50)),
    );
    let mut page = Page::new(&Config::default(), Arc::clone(&backend));
    page.attach_original("photo.jpg");

    page.handle_input(UserInput::Slider(50));
    let first = page.step().await.unwrap();
    assert!(matches!(first, PageUpdate::Requested(t) if t.k.get() == 100));

    page.handle_input(UserInput::Slider(100));
    let second = page.step().await.unwrap();
    assert!(matches!(second, PageUpdate::Requested(t) if t.k.get() == 5));

    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Rendered))
    );
    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Stale))
    );

    let src = page.view().compressed_image_src.clone().unwrap();
    assert!(src.starts_with("/preview/photo_5.jpg?"), "got {src}");
    assert!(page.view().stats_text.contains("k value: 5"));
    assert_eq!(
        page.view().download_href.as_deref(),
        Some("/download/photo_5.jpg")
    );
}

#[tokio::test(start_paused = true)]
async fn test_error_response_leaves_view_unchanged() {
    let backend = Arc::new(ScriptedBackend::new().failing(30));
    let mut page = Page::new(&Config::default(), Arc::clone(&backend));
    page.attach_original("photo.jpg");

    page.request_current();
    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Rendered))
    );
    let rendered = page.view().clone();

    page.handle_input(UserInput::Slider(85));
    assert_eq!(page.k().get(), 30);
    page.step().await;
    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Failed))
    );

    assert_eq!(page.view().compressed_image_src, rendered.compressed_image_src);
    assert_eq!(page.view().stats_text, rendered.stats_text);
    assert_eq!(page.view().download_href, rendered.download_href);
}

#[tokio::test(start_paused = true)]
async fn test_preset_then_slider_end_to_end() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut page = Page::new(&linear_config(), Arc::clone(&backend));
    page.attach_original("photo.jpg");

    page.handle_input(UserInput::Preset(Preset::Medium));
    assert_eq!(page.view().k_value, 50);
    assert_eq!(page.view().slider_position, 55);

    let started = tokio::time::Instant::now();
    page.handle_input(UserInput::Slider(90));
    assert_eq!(page.view().k_value, 15);
    assert_eq!(page.view().selected_preset, None);

    let update = page.step().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert!(matches!(update, PageUpdate::Requested(t) if t.k.get() == 15));

    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Rendered))
    );
    assert_eq!(backend.requests(), vec![("photo.jpg".to_string(), 15)]);
    let view = page.view();
    assert!(view
        .compressed_image_src
        .as_deref()
        .unwrap()
        .starts_with("/preview/photo_15.jpg?"));
    assert_eq!(view.download_href.as_deref(), Some("/download/photo_15.jpg"));
}

#[tokio::test(start_paused = true)]
async fn test_switching_original_drops_previous_results() {
    let backend = Arc::new(ScriptedBackend::new().with_delay(100, Duration::from_secs(1)));
    let mut page = Page::new(&Config::default(), Arc::clone(&backend));
    page.attach_original("old.jpg");
    page.request_current();

    page.attach_original("new.jpg");
    assert_eq!(page.session().unwrap().fname(), "new.jpg");

    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Stale))
    );
    assert!(page.view().compressed_image_src.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reattaching_same_original_keeps_results() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut page = Page::new(&Config::default(), Arc::clone(&backend));
    page.attach_original("photo.jpg");
    page.request_current();

    page.attach_original("photo.jpg");

    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Rendered))
    );
    assert!(page
        .view()
        .compressed_image_src
        .as_deref()
        .unwrap()
        .starts_with("/preview/photo_100.jpg?"));
}

#[tokio::test(start_paused = true)]
async fn test_idle_waits_for_debounce_and_response() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut page = Page::new(&Config::default(), Arc::clone(&backend));
    page.attach_original("photo.jpg");
    assert!(page.is_idle());

    page.handle_input(UserInput::Slider(90));
    assert!(!page.is_idle());

    assert!(matches!(page.step().await, Some(PageUpdate::Requested(_))));
    assert!(!page.is_idle());

    assert_eq!(
        page.step().await,
        Some(PageUpdate::Recompressed(Applied::Rendered))
    );
    assert!(page.is_idle());
}

#[tokio::test]
async fn test_idle_waits_for_preview_read() {
    let dir = create_temp_dir();
    let wide = FileSource::new(create_test_png(dir.path(), "wide.png", 80, 60));

    let mut page = Page::new(&Config::default(), Arc::new(ScriptedBackend::new()));
    page.handle_input(UserInput::FileChosen(wide));
    assert!(!page.is_idle());

    page.step().await;
    assert!(page.is_idle());
}

#[tokio::test]
async fn test_dropped_and_picked_files_preview_identically() {
    let dir = create_temp_dir();
    let wide = FileSource::new(create_test_png(dir.path(), "wide.png", 800, 600));

    let mut picked = Page::new(&Config::default(), Arc::new(ScriptedBackend::new()));
    picked.handle_input(UserInput::FileChosen(wide.clone()));
    assert_eq!(
        picked.step().await,
        Some(PageUpdate::Preview(PreviewState::Previewing))
    );

    let mut dropped = Page::new(&Config::default(), Arc::new(ScriptedBackend::new()));
    assert_eq!(
        dropped.handle_input(UserInput::DragOver),
        EventDisposition::PreventDefault
    );
    assert_eq!(
        dropped.handle_input(UserInput::FileDropped(vec![wide.clone()])),
        EventDisposition::PreventDefault
    );
    assert_eq!(
        dropped.step().await,
        Some(PageUpdate::Preview(PreviewState::Previewing))
    );

    assert_eq!(picked.view(), dropped.view());
    assert_eq!(dropped.view().preview_fit, Some(PreviewFit::FitWidth));
    assert!(!dropped.view().placeholder_visible);
    assert!(dropped.view().upload_region_consistent());
}

#[tokio::test]
async fn test_portrait_preview_fits_height() {
    let dir = create_temp_dir();
    let tall = FileSource::new(create_test_png(dir.path(), "tall.png", 600, 800));

    let mut page = Page::new(&Config::default(), Arc::new(ScriptedBackend::new()));
    page.handle_input(UserInput::FileChosen(tall));
    page.step().await;

    assert_eq!(page.view().preview_fit, Some(PreviewFit::FitHeight));
    assert_eq!(
        page.view().preview_fit.map(PreviewFit::dimensions),
        Some(("auto", "100%"))
    );
}

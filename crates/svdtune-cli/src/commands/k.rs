//! K command implementation.

use anyhow::Result;
use tokio::sync::mpsc;

use svdtune_core::config::MappingKind;
use svdtune_core::control::{ControlKind, Debouncer, ParameterController, Preset};
use svdtune_core::view::PageView;

use super::KArgs;

/// Run the k command.
pub async fn run(args: KArgs) -> Result<()> {
    let config = super::load_config();

    let (tx, _rx) = mpsc::unbounded_channel();
    let mut controller =
        ParameterController::new(&config.control, Debouncer::new(config.session.debounce, tx));

    let control = match (args.rate, args.preset) {
        (Some(rate), _) => ControlKind::Slider(rate),
        (None, Some(preset)) => ControlKind::Preset(Preset::from(preset)),
        (None, None) => anyhow::bail!("either --rate or --preset is required"),
    };

    let mut view = PageView::default();
    let k = controller.on_control_change(control, &mut view);
    controller.cancel_pending();

    let mapping = match config.control.mapping {
        MappingKind::InverseProportional => "inverse_proportional",
        MappingKind::Linear => "linear",
    };

    if args.json {
        let output = serde_json::json!({
            "k": k.get(),
            "rate": view.slider_position,
            "preset": view.selected_preset,
            "mapping": mapping,
            "k_min": config.control.k_min,
            "k_max": config.control.k_max,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    if let Some(preset) = view.selected_preset {
        println!("  Preset:  {}", preset);
    }
    println!("  Rate:    {}%", view.rate_label);
    println!("  k:       {}", k);
    println!(
        "  Mapping: {} (k in {}..={})",
        mapping, config.control.k_min, config.control.k_max
    );
    println!();

    Ok(())
}

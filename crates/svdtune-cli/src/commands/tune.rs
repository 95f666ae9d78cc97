//! Tune command implementation.
//!
//! Reads one command per line from stdin and feeds it to the page as user
//! input, while printing every update the page loop produces.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use svdtune_core::backend::HttpBackend;
use svdtune_core::control::Preset;
use svdtune_core::page::{Page, PageUpdate, UserInput};
use svdtune_core::upload::{FileSource, PreviewState};
use svdtune_core::{Error, Result as CoreResult};

use super::TuneArgs;
use crate::ui;

/// A line typed at the tune prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuneCommand {
    /// Move the slider
    Rate(u8),
    /// Select a preset
    Preset(Preset),
    /// Drop a file onto the upload region
    Drop(PathBuf),
    /// Print the whole page
    Show,
    /// Leave
    Quit,
    /// Blank line
    Empty,
}

/// Parse one input line.
pub fn parse_command(line: &str) -> CoreResult<TuneCommand> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    match word.to_ascii_lowercase().as_str() {
        "" => Ok(TuneCommand::Empty),
        "rate" | "r" => {
            let rate: u8 = rest
                .trim_end_matches('%')
                .parse()
                .ok()
                .filter(|r| *r <= 100)
                .ok_or_else(|| {
                    Error::InvalidControl(format!("rate must be 0-100, got '{rest}'"))
                })?;
            Ok(TuneCommand::Rate(rate))
        }
        "preset" | "p" => rest.parse().map(TuneCommand::Preset),
        "drop" | "d" if !rest.is_empty() => Ok(TuneCommand::Drop(PathBuf::from(rest))),
        "drop" | "d" => Err(Error::InvalidControl("drop needs a file path".to_string())),
        "show" | "s" => Ok(TuneCommand::Show),
        "quit" | "exit" | "q" => Ok(TuneCommand::Quit),
        other => Err(Error::InvalidControl(format!(
            "unknown command '{other}' (try: rate N, preset low|medium|high, drop PATH, show, quit)"
        ))),
    }
}

/// Run the tune command.
pub async fn run(args: TuneArgs) -> Result<()> {
    let config = super::load_config_with_server(args.server.as_deref());
    let backend =
        Arc::new(HttpBackend::new(&config.session).context("Failed to create HTTP client")?);
    let mut page = Page::new(&config, Arc::clone(&backend));

    let fname = match (args.fname, args.upload) {
        (Some(fname), _) => fname,
        (None, Some(path)) => upload(&backend, &page, &path)
            .await
            .with_context(|| format!("Failed to upload {}", path.display()))?,
        (None, None) => anyhow::bail!("either --fname or --upload is required"),
    };
    let mut uploaded: Option<PathBuf> = None;

    page.attach_original(fname.as_str());
    page.request_current();

    println!();
    println!("  Tuning '{}' on {}", fname, config.session.base_url);
    println!("  Commands: rate N, preset low|medium|high, drop PATH, show, quit");
    ui::print_controls(page.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    // finish whatever piped input already started
                    stdin_open = false;
                    if page.is_idle() {
                        break;
                    }
                    continue;
                };
                match parse_command(&line) {
                    Ok(TuneCommand::Quit) => break,
                    Ok(TuneCommand::Empty) => {}
                    Ok(TuneCommand::Show) => ui::print_view(page.view()),
                    Ok(TuneCommand::Rate(rate)) => {
                        page.handle_input(UserInput::Slider(rate));
                        ui::print_controls(page.view());
                    }
                    Ok(TuneCommand::Preset(preset)) => {
                        page.handle_input(UserInput::Preset(preset));
                        ui::print_controls(page.view());
                    }
                    Ok(TuneCommand::Drop(path)) => {
                        page.handle_input(UserInput::DragOver);
                        page.handle_input(UserInput::FileDropped(vec![FileSource::new(path)]));
                        ui::print_preview(page.view());
                    }
                    Err(e) => ui::print_error(&e),
                }
            }
            event = page.next_event() => {
                let Some(event) = event else {
                    break;
                };
                let update = page.dispatch(event);
                ui::print_update(update, page.view());

                let dropped = page
                    .view()
                    .selected_file
                    .clone()
                    .filter(|path| uploaded.as_ref() != Some(path));
                if let (PageUpdate::Preview(PreviewState::Previewing), Some(path)) = (update, dropped) {
                    match upload(&backend, &page, &path).await {
                        Ok(fname) => {
                            println!("  Now tuning '{}'", fname);
                            page.attach_original(fname);
                            page.request_current();
                            uploaded = Some(path);
                        }
                        Err(e) => ui::print_error(&e),
                    }
                }

                if !stdin_open && page.is_idle() {
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn upload(
    backend: &HttpBackend,
    page: &Page<HttpBackend>,
    path: &std::path::Path,
) -> CoreResult<String> {
    let preset = page.view().selected_preset;
    backend.upload(path, page.k(), preset).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_command("rate 90").unwrap(), TuneCommand::Rate(90));
        assert_eq!(parse_command("  r 15% ").unwrap(), TuneCommand::Rate(15));
        assert!(matches!(
            parse_command("rate 150"),
            Err(Error::InvalidControl(_))
        ));
        assert!(parse_command("rate").is_err());
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!(
            parse_command("preset Medium").unwrap(),
            TuneCommand::Preset(Preset::Medium)
        );
        assert!(parse_command("preset extreme").is_err());
    }

    #[test]
    fn test_parse_drop_keeps_spaces_in_path() {
        assert_eq!(
            parse_command("drop ./My Photos/cat.png").unwrap(),
            TuneCommand::Drop(PathBuf::from("./My Photos/cat.png"))
        );
        assert!(parse_command("drop").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("").unwrap(), TuneCommand::Empty);
        assert_eq!(parse_command("show").unwrap(), TuneCommand::Show);
        assert_eq!(parse_command("QUIT").unwrap(), TuneCommand::Quit);
        assert!(matches!(
            parse_command("jump"),
            Err(Error::InvalidControl(_))
        ));
    }
}

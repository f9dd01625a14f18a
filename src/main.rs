mod preferences;
mod settings;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use preferences::{Document, LookupSource, PREFERENCES_FILE};

/// Marker file whose presence at startup raises log verbosity to debug
/// for this run only.
const DEBUG_MARKER_FILE: &str = "./debug";

/// Events flowing from the dialog thread back to the main loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Preferences were saved; re-read them from disk the way the main
    /// logger does after the dialog closes.
    ReloadPreferences,
    Quit,
}

fn main() -> Result<()> {
    let level = if Path::new(DEBUG_MARKER_FILE).exists() {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("fdprefs={level}").parse()?),
        )
        .init();

    info!("Starting fdprefs - Field Day logger preferences");

    // The logger creates the preferences file before this dialog is ever
    // opened. A missing or malformed document is fatal; no default is
    // synthesized.
    let prefs_path = PathBuf::from(PREFERENCES_FILE);
    let document = Document::load(&prefs_path)
        .context("the preferences file must exist before the settings dialog opens")?;
    info!("Loaded {} preference keys", document.len());
    info!(
        "Lookup source: {:?}, CW backend: {:?}",
        LookupSource::from_document(&document),
        document.cw_backend()
    );

    let (event_tx, event_rx): (Sender<AppEvent>, Receiver<AppEvent>) = bounded(100);
    settings::show_settings_dialog(prefs_path.clone(), event_tx);

    // Iteration ends when the dialog thread drops its sender, so a build
    // without the dialog falls straight through.
    for event in event_rx {
        match event {
            AppEvent::ReloadPreferences => {
                info!("Reloading preferences...");
                match Document::load(&prefs_path) {
                    Ok(reloaded) => {
                        info!("Preferences reloaded: {} keys", reloaded.len());
                    }
                    Err(e) => error!("Failed to reload preferences: {:#}", e),
                }
            }
            AppEvent::Quit => {
                info!("Shutting down...");
                break;
            }
        }
    }

    Ok(())
}

//! Settings dialog
//!
//! The form state in [`form`] is plain data bound to the preferences
//! document; the GTK window that presents it is optional.

pub mod form;

#[cfg(feature = "gui")]
mod dialog;

#[cfg(feature = "gui")]
pub use dialog::*;

#[cfg(not(feature = "gui"))]
pub fn show_settings_dialog(
    _prefs_path: std::path::PathBuf,
    _event_tx: crossbeam_channel::Sender<crate::AppEvent>,
) {
    tracing::warn!(
        "Settings dialog requires the 'gui' feature. Rebuild with: cargo build --features gui"
    );
}

//! Global singletons.

pub mod preferences;

pub use preferences::Preferences;

/// Get the shared user settings.
pub fn settings() -> &'static storyboard_core::settings::Settings {
    &Preferences::get().settings
}

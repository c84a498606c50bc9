use anyhow::Context;
use storyboard_core::settings::Settings;

const DOCUMENTATION: &str = r#"# Storyboard settings. You may edit this file, but be aware that formatting and comments will not
# be preserved. Any key left out takes its default value.

# canvas_width, canvas_height: size of new documents, each in 100..=4096.
# brush_size: initial brush size in pixels, 1..=50.
# project_name: name of new projects, used to name exported files.
# [export] padding, border: spacing and frame thickness of exported panels, in pixels.

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

pub struct Preferences {
    failed_to_load: bool,
    pub settings: Settings,
}
impl Preferences {
    const FILENAME: &'static str = "settings.toml";
    /// Shared global preferences, loaded from the user's preferences directory.
    /// (Or defaulted, if unavailable for some reason)
    #[must_use]
    pub fn get() -> &'static Self {
        static GLOBAL_PREFERENCES: std::sync::OnceLock<Preferences> = std::sync::OnceLock::new();

        GLOBAL_PREFERENCES.get_or_init(|| {
            let mut dir = preferences_dir();
            match dir.as_mut() {
                None => Self::no_path(),
                Some(dir) => {
                    dir.push(Self::FILENAME);
                    Self::load_or_default(dir)
                }
            }
        })
    }
    #[must_use]
    pub fn no_path() -> Self {
        log::warn!("No preferences directory, using default settings.");
        Self::fallback()
    }
    fn fallback() -> Self {
        Self {
            failed_to_load: true,
            settings: Settings::default(),
        }
    }
    #[must_use]
    fn load_or_default(path: &std::path::Path) -> Self {
        if !path.exists() {
            let defaults = Self {
                failed_to_load: false,
                settings: Settings::default(),
            };
            match defaults.save() {
                Ok(()) => log::info!("Wrote default settings to {}", path.display()),
                Err(e) => log::warn!("Couldn't write default settings: {e:#}"),
            }
            return defaults;
        }
        let settings: anyhow::Result<Settings> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings : Settings = toml::from_str(&string)?;
            // Reject now rather than on first use.
            settings.canvas_size()?;

            Ok(settings)
        };

        match settings {
            Ok(settings) => Self {
                failed_to_load: false,
                settings,
            },
            Err(e) => {
                log::warn!(
                    "Ignoring settings at {}, using defaults: {e:#}",
                    path.display()
                );
                Self::fallback()
            }
        }
    }
    /// Return true if loading user's settings failed. This can be useful for
    /// displaying a warning.
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    /// Write the current settings, with a commented header, to the preferences directory.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = preferences_dir()
            .ok_or_else(|| anyhow::anyhow!("no preferences directory for this platform"))?;
        // Only our own folder is made, a missing parent is left for the write below to report.
        match std::fs::create_dir(&dir) {
            Err(e) if e.kind() != std::io::ErrorKind::AlreadyExists => {
                log::debug!("creating {}: {e}", dir.display());
            }
            _ => (),
        }

        let path = dir.join(Self::FILENAME);
        let body = toml::ser::to_string_pretty(&self.settings)?;
        std::fs::write(&path, format!("{DOCUMENTATION}{body}"))
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use storyboard_core::settings::Settings;
    #[test]
    fn toml_round_trip() {
        let settings = Settings {
            brush_size: 7.5,
            project_name: "pilot".to_owned(),
            ..Settings::default()
        };
        let string = toml::ser::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&(super::DOCUMENTATION.to_owned() + &string)).unwrap();
        assert_eq!(parsed, settings);
    }
    #[test]
    fn invalid_file_falls_back() {
        let path = std::env::temp_dir().join(format!(
            "storyboard-settings-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "canvas_width = 5\nbrush_size = 9.0\n").unwrap();
        let preferences = super::Preferences::load_or_default(&path);
        let _ = std::fs::remove_file(&path);
        assert!(preferences.did_fail_to_load());
        assert_eq!(preferences.settings, Settings::default());
    }
    #[test]
    fn sparse_file() {
        let parsed: Settings = toml::from_str("canvas_width = 800\n[export]\nborder = 4\n").unwrap();
        assert_eq!(parsed.canvas_width, 800);
        assert_eq!(parsed.canvas_height, 1080);
        assert_eq!(parsed.export.border, 4);
        assert_eq!(parsed.export.padding, 20);
    }
}

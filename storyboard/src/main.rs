#![warn(clippy::pedantic)]

pub mod global;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use rayon::prelude::*;
use storyboard_core::{export, io::codec, settings::Settings, Editor};

/// Make a project name safe to use as part of a file name.
fn file_stem(project_name: &str) -> String {
    let stem: String = project_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if stem.is_empty() {
        "storyboard".to_owned()
    } else {
        stem.to_owned()
    }
}

/// Load one project file and write its sheet and individual frames beside it.
fn export_project(path: &Path, settings: &Settings) -> AnyResult<()> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut editor = Editor::from_settings(settings)?;
    editor.load_project(&json)?;

    let dir = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
    let stem = file_stem(editor.project_name());

    let sheet = export::sheet(editor.document(), settings.export)?;
    let sheet_path = dir.join(format!("{stem}_all.png"));
    std::fs::write(&sheet_path, codec::encode_png(&sheet)?)
        .with_context(|| format!("writing {}", sheet_path.display()))?;

    let frames_dir = dir.join(format!("{stem}_frames"));
    std::fs::create_dir_all(&frames_dir)
        .with_context(|| format!("creating {}", frames_dir.display()))?;
    export::frames(editor.document(), settings.export)?
        .into_par_iter()
        .try_for_each(|(name, frame)| -> AnyResult<()> {
            let frame_path = frames_dir.join(name);
            std::fs::write(&frame_path, codec::encode_png(&frame)?)
                .with_context(|| format!("writing {}", frame_path.display()))?;
            Ok(())
        })?;

    log::info!(
        "{}: wrote {} and {} frames",
        path.display(),
        sheet_path.display(),
        editor.document().panels().len()
    );
    Ok(())
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: {} <project.json>...", env!("CARGO_PKG_NAME"));
    }
    if global::Preferences::get().did_fail_to_load() {
        log::warn!("Using default settings.");
    }
    let settings = global::settings();

    let failures = paths
        .par_iter()
        .filter(|path| match export_project(path, settings) {
            Ok(()) => false,
            Err(e) => {
                log::error!("{}: {e:#}", path.display());
                true
            }
        })
        .count();

    if failures > 0 {
        anyhow::bail!("{failures} of {} projects failed to export", paths.len());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::file_stem;
    #[test]
    fn stems() {
        assert_eq!(file_stem("My Board"), "My Board");
        assert_eq!(file_stem("../etc/passwd"), "_etc_passwd");
        assert_eq!(file_stem("  "), "storyboard");
        assert_eq!(file_stem("絵コンテ"), "絵コンテ");
    }
}

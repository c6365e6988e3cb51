use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use miette::{Context, IntoDiagnostic};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    result::Result,
    types::{FormatSpec, MediaFormat},
};

/// Characters that are not allowed in Windows file names
const INVALID_CHARS: &str = r#"[\\/:*?"<>|]"#;

/// Per-stream leftovers, e.g. `Title.f140.webm` or `Title.f243.mp4`
const FRAGMENT_SUFFIX: &str = r"\.f\d+\.(mp4|webm)$";

fn invalid_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(INVALID_CHARS).unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn fragment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FRAGMENT_SUFFIX).unwrap())
}

/// Make a title usable as a file name on every platform.
///
/// Invalid characters are removed, whitespace runs become a single space,
/// and the result is trimmed.
pub fn sanitize_filename(title: &str) -> String {
    let stripped = invalid_chars_re().replace_all(title, "");
    whitespace_re()
        .replace_all(&stripped, " ")
        .trim()
        .to_owned()
}

/// Format for the file: `<title>[ [<label>]].<ext>`
pub fn output_path(folder: &Path, title: &str, format: MediaFormat, spec: &FormatSpec) -> PathBuf {
    let ext = format.extension();
    let name = if format.is_audio() || spec.is_best() {
        format!("{title}.{ext}")
    } else {
        format!("{title} [{}].{ext}", spec.label)
    };

    folder.join(name)
}

/// Create the folder and its parents if needed.
/// Return whether it had to be created.
pub fn ensure_folder(folder: &Path) -> Result<bool> {
    if folder.is_dir() {
        return Ok(false);
    }

    std::fs::create_dir_all(folder)
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not create folder {}", folder.display()))?;
    Ok(true)
}

fn is_fragment(name: &str, title: &str) -> bool {
    name.contains(title) && (name.ends_with(".webm") || fragment_re().is_match(name))
}

/// Remove what the downloader left behind for this title in the folder.
///
/// Only direct entries are looked at. A file that cannot be removed is
/// reported and skipped. Return the removed paths.
pub fn cleanup_fragments(folder: &Path, title: &str) -> Result<Vec<PathBuf>> {
    let entries = folder
        .read_dir()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not read folder {}", folder.display()))?;

    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_fragment(name, title) {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed leftover fragment {name}");
                removed.push(path);
            }
            Err(err) => warn!("Could not remove leftover fragment {name}: {err}"),
        }
    }

    debug!("{} fragment(s) removed", removed.len());
    Ok(removed)
}

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;

/// Name of the settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "vidfetch.toml";

/// Prefix of the environment variables overriding the settings
pub const ENV_PREFIX: &str = "VIDFETCH";

#[cfg(windows)]
const DEFAULT_TOOL_NAME: &str = "yt-dlp.exe";
#[cfg(not(windows))]
const DEFAULT_TOOL_NAME: &str = "yt-dlp";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder used when the user does not give one.
    /// Relative paths are taken from the working directory.
    pub default_folder: PathBuf,

    /// File name of the downloader executable
    pub tool_name: String,

    /// Folder holding the bundled downloader.
    /// When set, the downloader is copied from there into the working directory.
    pub assets_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_folder: PathBuf::from("downloaded"),
            tool_name: DEFAULT_TOOL_NAME.to_owned(),
            assets_dir: None,
        }
    }
}

impl Settings {
    /// Layer the settings: defaults, then the TOML file, then the environment.
    ///
    /// An explicitly given file must exist. Otherwise `vidfetch.toml` is read
    /// from the working directory if there is one.
    pub fn load(file: Option<&Path>, workdir: &Path) -> Result<Self> {
        let source = match file {
            Some(path) => File::from(path),
            None => File::from(workdir.join(DEFAULT_CONFIG_FILE)).required(false),
        };

        Config::builder()
            .add_source(source)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .into_diagnostic()
            .wrap_err("Could not read the settings")?
            .try_deserialize()
            .into_diagnostic()
            .wrap_err("Invalid settings")
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(None, dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_folder, Path::new("downloaded"));
    }

    #[test]
    fn file_in_the_working_directory_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            indoc! {r#"
                default_folder = "videos"
                assets_dir = "/opt/vidfetch/assets"
            "#},
        )
        .unwrap();

        let settings = Settings::load(None, dir.path()).unwrap();
        assert_eq!(settings.default_folder, Path::new("videos"));
        assert_eq!(
            settings.assets_dir.as_deref(),
            Some(Path::new("/opt/vidfetch/assets"))
        );
        assert_eq!(settings.tool_name, DEFAULT_TOOL_NAME);
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(Settings::load(Some(&missing), dir.path()).is_err());
    }
}

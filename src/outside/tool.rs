use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    result::{Error, Result},
    settings::Settings,
};

/// Copy the bundled tool to `target`, unless something is already there
fn stage_tool(source: &Path, target: &Path) -> Result<()> {
    if target.exists() {
        debug!("{} already staged", target.display());
        return Ok(());
    }

    info!("Copying the bundled downloader to {}", target.display());
    std::fs::copy(source, target).map_err(|cause| Error::ToolStaging {
        source: source.to_path_buf(),
        target: target.to_path_buf(),
        cause,
    })?;

    Ok(())
}

/// Find where the downloader should be run from.
///
/// With an assets folder configured, the bundled tool is copied into the
/// working directory on first use. Otherwise the tool is expected in the
/// working directory; when it is not there, the bare name is returned so
/// that the child search path finds it.
pub fn resolve_tool_path(settings: &Settings, workdir: &Path) -> Result<PathBuf> {
    let target = workdir.join(&settings.tool_name);

    match &settings.assets_dir {
        Some(assets) => {
            stage_tool(&assets.join(&settings.tool_name), &target)?;
            Ok(target)
        }
        None if target.is_file() => Ok(target),
        None => {
            debug!(
                "{} not found in {}, relying on the search path",
                settings.tool_name,
                workdir.display()
            );
            Ok(PathBuf::from(&settings.tool_name))
        }
    }
}

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::debug;

use super::{
    command::{prepend_search_dir, run_command, stream_command, Capture, StreamLine},
    tool::resolve_tool_path,
};
use crate::{
    result::{Error, Result},
    settings::Settings,
    types::{FormatSpec, MediaFormat},
};

/// Everything needed to download one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub url: String,
    pub format: MediaFormat,
    pub spec: FormatSpec,
    pub output: PathBuf,
}

/// Interface for the program doing the actual downloads
pub trait MediaTool {
    /// Get the title of the video, as given by the tool, without downloading it.
    fn probe_title(&self, url: &str) -> Result<String>;

    /// Download the video, handing every output line to `relay` as it comes.
    ///
    /// A run that ends with a failure code is [`Error::DownloadProcess`].
    fn download(&self, job: &DownloadJob, relay: &mut dyn FnMut(StreamLine)) -> Result<()>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
#[derive(Debug)]
pub struct Ytdl {
    program: PathBuf,
    search_dir: PathBuf,
}

impl Ytdl {
    /// `search_dir` is put first in the child search path,
    /// which lets the tool find an `ffmpeg` placed there.
    pub fn new(program: PathBuf, search_dir: PathBuf) -> Self {
        Self {
            program,
            search_dir,
        }
    }

    /// Locate the tool, staging the bundled one first if needed
    pub fn resolve(settings: &Settings, workdir: &Path) -> Result<Self> {
        let program = resolve_tool_path(settings, workdir)?;
        debug!("Using downloader {}", program.display());
        Ok(Self::new(program, workdir.to_path_buf()))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        prepend_search_dir(&mut cmd, &self.search_dir);
        cmd
    }

    /// Build the download invocation. Every value is its own argument,
    /// nothing goes through a shell.
    pub fn download_command(&self, job: &DownloadJob) -> Command {
        let mut cmd = self.command();

        if job.format.is_audio() {
            cmd.arg("-x")
                .args(["--audio-format", job.format.extension()])
                .args(["--audio-quality", "0"]);
        } else {
            cmd.args(["-f", job.spec.selector.as_str()])
                .args(["--merge-output-format", job.format.extension()]);
        }

        cmd.arg("--no-playlist")
            // One line per progress update instead of carriage returns
            .arg("--newline")
            .args([OsStr::new("-o"), job.output.as_os_str()])
            .arg("--")
            .arg(&job.url);
        cmd
    }
}

/// The last `ERROR:` line of the tool, if any
fn last_error(stderr: &str) -> Option<&str> {
    stderr
        .lines()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
}

impl MediaTool for Ytdl {
    fn probe_title(&self, url: &str) -> Result<String> {
        let mut cmd = self.command();
        cmd.arg("--no-playlist")
            // JSON-encoded, so that any title fits on one line
            .args(["--print", "%(title)j"])
            .arg("--")
            .arg(url);

        let res = run_command(&mut cmd, Capture::STDOUT | Capture::STDERR)
            .map_err(|err| Error::Metadata(miette::Report::from(err).to_string()))?;

        if !res.status.success() {
            let stderr = String::from_utf8_lossy(&res.stderr);
            let reason = match last_error(&stderr) {
                Some(line) => line.to_owned(),
                None => format!("the downloader exited with {}", res.status),
            };
            return Err(Error::Metadata(reason));
        }

        let stdout = String::from_utf8_lossy(&res.stdout);
        let line = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        match serde_json::from_str::<Option<String>>(line) {
            Ok(Some(title)) => Ok(title),
            Ok(None) => Err(Error::Metadata("the video has no title".to_owned())),
            // Older builds without the `j` conversion print the raw title
            Err(_) => Ok(line.to_owned()),
        }
    }

    fn download(&self, job: &DownloadJob, relay: &mut dyn FnMut(StreamLine)) -> Result<()> {
        let status = stream_command(&mut self.download_command(job), relay)?;

        if status.success() {
            Ok(())
        } else {
            debug!("Download exited with {status}");
            Err(Error::DownloadProcess {
                code: status.code(),
            })
        }
    }
}

use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;
use tracing::{debug, warn};

use crate::{
    console::Console,
    io::{cleanup_fragments, ensure_folder, output_path, sanitize_filename},
    link::{normalize_url, validate_url},
    outside::{DownloadJob, MediaTool, Ytdl},
    result::{Error, Result},
    settings::Settings,
    types::{select_format_spec, FormatSpec, MediaFormat},
};

/// Titles the downloader falls back to when it knows nothing about the video.
/// `NA` is how a missing field is printed.
const PLACEHOLDER_TITLE: &str = r"^(?:NA|(?i:(?:youtube )?video(?: #\S+)?))$";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_TITLE).unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CollectingInput,
    Normalizing,
    ResolvingTool,
    ProbingMetadata,
    BuildingCommand,
    Executing,
    CleaningUp,
    Done,
    Failed,
}

/// What the user asked for, once interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub format: MediaFormat,
    pub spec: FormatSpec,
    pub folder: PathBuf,
}

/// Ask the tool for the title and turn it into a file name.
/// Empty and placeholder titles are refused.
pub fn probe_title(tool: &dyn MediaTool, url: &str) -> Result<String> {
    let title = sanitize_filename(&tool.probe_title(url)?);

    if title.is_empty() || placeholder_re().is_match(&title) {
        return Err(Error::Metadata(format!("no usable title, got {title:?}")));
    }

    Ok(title)
}

/// One pass from the first question to the downloaded file
pub struct Session<'a, R, W, E> {
    console: &'a mut Console<R, W, E>,
    settings: &'a Settings,
    workdir: &'a Path,
    stage: Stage,
}

impl<'a, R: BufRead, W: Write, E: Write> Session<'a, R, W, E> {
    pub fn new(console: &'a mut Console<R, W, E>, settings: &'a Settings, workdir: &'a Path) -> Self {
        Self {
            console,
            settings,
            workdir,
            stage: Stage::CollectingInput,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Run every stage with the real downloader.
    /// Return the path of the downloaded file.
    pub fn run(&mut self) -> Result<PathBuf> {
        let res = self.collect_request().and_then(|request| {
            self.enter(Stage::ResolvingTool);
            let tool = Ytdl::resolve(self.settings, self.workdir)
                .map_err(|err| err.wrap_err_with(|| "Could not set up the downloader"))?;
            self.fetch(&tool, &request)
        });

        if res.is_err() {
            self.enter(Stage::Failed);
        }
        res
    }

    /// Ask the questions and interpret the answers.
    ///
    /// The link is checked right away so that a bad one stops the session
    /// before any other question. The output folder is created if needed.
    pub fn collect_request(&mut self) -> Result<Request> {
        self.enter(Stage::CollectingInput);

        let answer = self.console.ask("Video URL:")?;

        // The remaining answers are interpreted in this stage too
        self.enter(Stage::Normalizing);
        let url = normalize_url(&answer);
        validate_url(&url)?;

        let format = MediaFormat::from_answer(&self.console.ask("Format (mp4/mp3):")?);
        let quality = if format.is_audio() {
            String::new()
        } else {
            self.console
                .ask("Quality (1080p/720p/480p/360p), or Enter for the best:")?
                .to_lowercase()
        };

        let folder_question = format!(
            "Folder to save into (Enter for {:?}):",
            self.settings.default_folder.display().to_string()
        );
        let folder = self.console.ask(&folder_question)?;

        let spec = if format.is_audio() {
            FormatSpec::best()
        } else {
            select_format_spec(&quality)
        };

        let folder = if folder.is_empty() {
            self.workdir.join(&self.settings.default_folder)
        } else {
            self.workdir.join(folder)
        };
        if ensure_folder(&folder)? {
            self.console
                .say(format_args!("Folder created: {}", folder.display()))?;
        }

        let request = Request {
            url,
            format,
            spec,
            folder,
        };
        debug!("{request:?}");
        Ok(request)
    }

    /// Probe, download, and tidy up the folder
    pub fn fetch(&mut self, tool: &dyn MediaTool, request: &Request) -> Result<PathBuf> {
        self.enter(Stage::ProbingMetadata);
        let title = probe_title(tool, &request.url)?;
        debug!("title = {title}");

        self.enter(Stage::BuildingCommand);
        let job = DownloadJob {
            url: request.url.clone(),
            format: request.format,
            spec: request.spec.clone(),
            output: output_path(&request.folder, &title, request.format, &request.spec),
        };

        if job.format.is_audio() {
            self.console
                .say(format_args!("Downloading audio as {}...", job.format))?;
        } else {
            let quality = if job.spec.is_best() {
                "best quality"
            } else {
                job.spec.label
            };
            self.console
                .say(format_args!("Downloading video as {} ({quality})...", job.format))?;
        }

        self.enter(Stage::Executing);
        let console = &mut *self.console;
        tool.download(&job, &mut |line| console.relay(line))?;

        let file_name = job
            .output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.console
            .say(format_args!("Download finished: {file_name}"))?;

        self.enter(Stage::CleaningUp);
        if let Err(err) = cleanup_fragments(&request.folder, &title) {
            warn!("Leftover fragments not cleaned up: {}", miette::Report::from(err));
        }

        self.enter(Stage::Done);
        Ok(job.output)
    }
}

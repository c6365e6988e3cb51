use std::path::PathBuf;

use clap::{ArgAction, Parser};
use indoc::indoc;

macro_rules! arg_env {
    ($v:literal) => {
        concat!("VIDFETCH_", $v)
    };
}

/// Download a video or its audio with `yt-dlp`, without remembering any flag.
#[derive(Parser, Debug)]
#[command(
    version,
    long_about = indoc! {"
        Download a video or its audio with `yt-dlp`, without remembering any flag.

        The program asks for the link, the format (mp4 or mp3), the quality and
        the folder, runs the downloader while showing its progress, then removes
        the partial files it left behind.

        `yt-dlp` is looked up in the working directory first, then in the PATH.
        An `ffmpeg` placed in the working directory is found the same way.
    "}
)]
pub struct Args {
    /// The path to a TOML settings file.
    /// Defaults to `vidfetch.toml` in the working directory, if it exists.
    #[arg(long, env = arg_env!("CONFIG"))]
    pub config: Option<PathBuf>,

    /// The folder holding the bundled downloader.
    /// The downloader is copied from there into the working directory if missing.
    #[arg(long, env = arg_env!("ASSETS_DIR"))]
    pub assets_dir: Option<PathBuf>,

    /// Show more details. Can be repeated
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn verbosity_flags() {
        let args = Args::try_parse_from(["vidfetch", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(!args.quiet);

        assert!(Args::try_parse_from(["vidfetch", "-v", "-q"]).is_err());
    }
}

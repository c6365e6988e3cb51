use std::{fmt::Display, path::PathBuf};

use miette::miette;

#[derive(Debug)]
pub enum Error {
    /// The given link does not look like a web address
    InvalidUrl(String),

    /// The bundled downloader could not be copied next to the program
    ToolStaging {
        source: PathBuf,
        target: PathBuf,
        cause: std::io::Error,
    },

    /// The title probe failed or returned nothing usable
    Metadata(String),

    /// The download process did run but exited with a failure code
    DownloadProcess { code: Option<i32> },

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidUrl(url) => miette!("Invalid URL: {url:?}"),
            Error::ToolStaging {
                source,
                target,
                cause,
            } => miette!(
                "Could not copy the bundled downloader from {} to {}: {cause}",
                source.display(),
                target.display()
            ),
            Error::Metadata(reason) => miette!("Could not get the video title: {reason}"),
            // The exit code is only worth a debug line, the user gets a plain message
            Error::DownloadProcess { .. } => miette!("An error occurred during the download"),
            Error::Miette(err) => err,
        }
    }
}

impl Error {
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Miette(report) => Error::Miette(report.wrap_err(f())),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Heights the user can ask for, highest first
const HEIGHTS: [&str; 4] = ["1080p", "720p", "480p", "360p"];

/// Selector given to the downloader when no height limit applies
const BEST: &str = "best";

/// A downloader format selector along with the quality label
/// used in the output file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pub selector: String,
    /// Empty when the best available quality is requested
    pub label: &'static str,
}

impl FormatSpec {
    pub fn best() -> Self {
        Self {
            selector: BEST.to_owned(),
            label: "",
        }
    }

    pub fn is_best(&self) -> bool {
        self.label.is_empty()
    }
}

/// Map a quality keyword (`1080p`, `720p`, `480p`, `360p`) to a format selector.
///
/// The best video stream under the height ceiling is merged with the best audio
/// stream, falling back to the best single file.
/// Unknown keywords, including the empty one, select the best available quality.
pub fn select_format_spec(label: &str) -> FormatSpec {
    match HEIGHTS.iter().find(|&&height| height == label) {
        Some(&height) => {
            let ceiling = height.trim_end_matches('p');
            FormatSpec {
                selector: format!("bestvideo[height<={ceiling}]+bestaudio/best"),
                label: height,
            }
        }
        None => FormatSpec::best(),
    }
}

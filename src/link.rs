use url::Url;

use crate::result::{Error, Result};

/// Hosts whose watch links get rewritten to the canonical form.
/// Subdomains (`www.`, `m.`, `music.`) are accepted as well.
const KNOWN_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Query parameter holding the video identifier
const VIDEO_ID_PARAM: &str = "v";

const CANONICAL_WATCH: &str = "https://www.youtube.com/watch?v=";

fn is_known_host(host: &str) -> bool {
    KNOWN_HOSTS.iter().any(|known| {
        host == *known
            || host
                .strip_suffix(known)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Strip a video link down to `https://www.youtube.com/watch?v=<id>`.
///
/// Playlist, timestamp, and tracking parameters are dropped that way.
/// Links that cannot be parsed, that point elsewhere, or that carry no
/// video identifier are returned unchanged.
pub fn normalize_url(input: &str) -> String {
    let Ok(url) = Url::parse(input) else {
        return input.to_owned();
    };

    if !url.host_str().is_some_and(is_known_host) {
        return input.to_owned();
    }

    url.query_pairs()
        .find(|(key, value)| key == VIDEO_ID_PARAM && !value.is_empty())
        .map(|(_, id)| format!("{CANONICAL_WATCH}{id}"))
        .unwrap_or_else(|| input.to_owned())
}

/// Check that the link is something the downloader can be given
pub fn validate_url(url: &str) -> Result<()> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidUrl(url.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_parameters_are_dropped() {
        assert_eq!(
            normalize_url("https://www.youtube.com/watch?v=abc123&list=xyz"),
            "https://www.youtube.com/watch?v=abc123"
        );
        assert_eq!(
            normalize_url("https://m.youtube.com/watch?t=42&v=abc123"),
            "https://www.youtube.com/watch?v=abc123"
        );
        assert_eq!(
            normalize_url("http://music.youtube.com/watch?v=abc123&si=tracking"),
            "https://www.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in [
            "https://www.youtube.com/watch?v=abc123&list=xyz",
            "https://youtu.be/watch?v=dQw4w9WgXcQ&t=30",
            "https://www.youtube.com/watch?v=abc123",
        ] {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once);
        }
    }

    #[test]
    fn unparsable_input_is_returned_unchanged() {
        for input in ["", "not a url", "www.youtube.com/watch?v=abc", "  https://"] {
            assert_eq!(normalize_url(input), input);
        }
    }

    #[test]
    fn other_links_are_returned_unchanged() {
        for input in [
            "https://vimeo.com/123456789?v=abc",
            "https://notyoutube.com/watch?v=abc",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/playlist?list=PLrAXtmRdnEQy",
            "https://www.youtube.com/watch?v=",
        ] {
            assert_eq!(normalize_url(input), input);
        }
    }

    #[test]
    fn only_web_schemes_are_valid() {
        assert!(validate_url("https://www.youtube.com/watch?v=abc").is_ok());
        assert!(validate_url("HTTP://example.com/video").is_ok());

        for input in ["", "ftp://example.com/file", "youtube.com/watch?v=abc", "httpx"] {
            assert!(matches!(validate_url(input), Err(Error::InvalidUrl(_))));
        }
    }
}

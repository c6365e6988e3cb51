use std::fmt::Display;

/// The container the user wants to end up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// Audio only, extracted and converted by the downloader
    Mp3,
    /// Video with its best audio stream merged in
    Mp4,
}

impl MediaFormat {
    /// Interpret the user answer to the format question.
    /// Anything that is not `mp3` falls back to video.
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("mp3") {
            Self::Mp3
        } else {
            Self::Mp4
        }
    }

    /// Return the extension without the leading dot.
    /// e.g. "ext"
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }

    pub fn is_audio(self) -> bool {
        matches!(self, Self::Mp3)
    }
}

impl Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp3_answer_ignores_case_and_spaces() {
        assert_eq!(MediaFormat::from_answer("MP3"), MediaFormat::Mp3);
        assert_eq!(MediaFormat::from_answer("  mp3\n"), MediaFormat::Mp3);
    }

    #[test]
    fn anything_else_is_video() {
        assert_eq!(MediaFormat::from_answer("anything-else"), MediaFormat::Mp4);
        assert_eq!(MediaFormat::from_answer(""), MediaFormat::Mp4);
        assert_eq!(MediaFormat::from_answer("mp4"), MediaFormat::Mp4);
    }
}

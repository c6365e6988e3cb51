use std::{
    fmt::Arguments,
    io::{BufRead, Stderr, StdinLock, Stdout, Write},
};

use miette::{Context, IntoDiagnostic};

use crate::{outside::StreamLine, result::Result};

/// The terminal the user talks to: questions and messages go to `out`,
/// answers come from `input`, and the downloader errors go to `err`.
pub struct Console<R, W, E> {
    input: R,
    out: W,
    err: E,
}

impl Console<StdinLock<'static>, Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write, E: Write> Console<R, W, E> {
    pub fn new(input: R, out: W, err: E) -> Self {
        Self { input, out, err }
    }

    /// Print the question and wait for a line.
    /// The answer is trimmed. The end of the input counts as an empty answer.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.out, "{question} ")
            .and_then(|()| self.out.flush())
            .into_diagnostic()
            .wrap_err("Could not write to the terminal")?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .into_diagnostic()
            .wrap_err("Could not read the answer")?;

        Ok(answer.trim().to_owned())
    }

    pub fn say(&mut self, message: Arguments<'_>) -> Result<()> {
        writeln!(self.out, "{message}")
            .into_diagnostic()
            .wrap_err("Could not write to the terminal")?;
        Ok(())
    }

    /// Echo a downloader line on the matching stream.
    ///
    /// The terminal going away must not stop the download,
    /// so write failures are ignored here.
    pub fn relay(&mut self, line: StreamLine) {
        let _ = match line {
            StreamLine::Stdout(line) => writeln!(self.out, "{line}").and_then(|()| self.out.flush()),
            StreamLine::Stderr(line) => writeln!(self.err, "{line}").and_then(|()| self.err.flush()),
        };
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (R, W, E) {
        (self.input, self.out, self.err)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    type TestConsole = Console<Cursor<&'static [u8]>, Vec<u8>, Vec<u8>>;

    fn console(input: &'static str) -> TestConsole {
        Console::new(Cursor::new(input.as_bytes()), Vec::new(), Vec::new())
    }

    #[test]
    fn answers_are_trimmed_and_eof_is_empty() {
        let mut console = console("  mp3 \r\n");

        assert_eq!(console.ask("Format?").unwrap(), "mp3");
        assert_eq!(console.ask("Folder?").unwrap(), "");

        let (_, out, _) = console.into_parts();
        assert_eq!(String::from_utf8(out).unwrap(), "Format? Folder? ");
    }

    #[test]
    fn lines_are_relayed_on_their_own_stream() {
        let mut console = console("");
        console.relay(StreamLine::Stdout("[download] 50.0%".to_owned()));
        console.relay(StreamLine::Stderr("WARNING: slow".to_owned()));
        console.say(format_args!("done")).unwrap();

        let (_, out, err) = console.into_parts();
        assert_eq!(String::from_utf8(out).unwrap(), "[download] 50.0%\ndone\n");
        assert_eq!(String::from_utf8(err).unwrap(), "WARNING: slow\n");
    }
}

use miette::{IntoDiagnostic, Result, WrapErr};
use owo_colors::OwoColorize;
use time::{
    format_description::{self, BorrowedFormatItem},
    OffsetDateTime, UtcOffset,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
    FmtSubscriber,
};

/// Pick the log level from the verbosity flags
pub fn level_from_flags(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Initialize the logging system.
///
/// Logs go to stderr, so that they never get mixed with the questions.
pub fn init_logging(level: Level) -> Result<()> {
    // Only reliable while the program is still single-threaded
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let formatter = ConsoleFormatter::new(local_offset)?;

    let subscriber = FmtSubscriber::builder()
        .event_format(formatter)
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .into_diagnostic()
        .wrap_err("Setting default subscriber failed")
}

/// `hh:mm:ss LEVEL thread message`, colored when the terminal allows it
struct ConsoleFormatter {
    offset: UtcOffset,
    time_format: Vec<BorrowedFormatItem<'static>>,
}

impl ConsoleFormatter {
    fn new(offset: UtcOffset) -> Result<Self> {
        let time_format = format_description::parse_borrowed::<2>("[hour]:[minute]:[second]")
            .into_diagnostic()
            .wrap_err("Invalid log time format")?;

        Ok(Self {
            offset,
            time_format,
        })
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        let now = OffsetDateTime::now_utc().to_offset(self.offset).time();
        let now = now.format(&self.time_format).map_err(|_| std::fmt::Error)?;

        // The relay threads are named after the stream they read
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("-");

        if writer.has_ansi_escapes() {
            let level = match *metadata.level() {
                Level::ERROR => metadata.level().red().to_string(),
                Level::WARN => metadata.level().yellow().to_string(),
                Level::DEBUG | Level::TRACE => metadata.level().blue().to_string(),
                _ => metadata.level().green().to_string(),
            };

            write!(
                &mut writer,
                "{} {:>5} {} ",
                now.dimmed(),
                level,
                thread_name.yellow(),
            )?;
        } else {
            write!(
                &mut writer,
                "{} {:>5} {} ",
                now,
                metadata.level(),
                thread_name,
            )?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_format_is_valid() {
        let formatter = ConsoleFormatter::new(UtcOffset::UTC).unwrap();
        let noon = time::Time::from_hms(12, 5, 9).unwrap();
        assert_eq!(noon.format(&formatter.time_format).unwrap(), "12:05:09");
    }

    #[test]
    fn flags_to_level() {
        assert_eq!(level_from_flags(0, false), Level::INFO);
        assert_eq!(level_from_flags(1, false), Level::DEBUG);
        assert_eq!(level_from_flags(5, false), Level::TRACE);
        assert_eq!(level_from_flags(2, true), Level::WARN);
    }
}

mod cli;
mod console;
mod io;
mod link;
mod logging;
mod outside;
mod result;
mod session;
mod settings;
mod types;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::debug;

use crate::{
    cli::Args,
    console::Console,
    logging::{init_logging, level_from_flags},
    session::Session,
    settings::Settings,
};

fn main() -> Result<()> {
    // Initialize the logging & CLI
    let args = Args::parse();
    init_logging(level_from_flags(args.verbose, args.quiet))?;

    let workdir = std::env::current_dir()
        .into_diagnostic()
        .wrap_err("Could not get the working directory")?;

    let mut settings = Settings::load(args.config.as_deref(), &workdir)?;
    if let Some(assets_dir) = args.assets_dir {
        settings.assets_dir = Some(assets_dir);
    }
    debug!("{settings:?}");

    // The console, and with it stdin, is released on every way out
    let mut console = Console::stdio();
    let mut session = Session::new(&mut console, &settings, &workdir);
    let res = session.run();
    debug!("Session ended at {:?}", session.stage());
    let output = res?;

    debug!("Saved to {}", output.display());
    Ok(())
}

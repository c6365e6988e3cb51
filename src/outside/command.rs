use std::{
    io::{BufRead, BufReader, Read},
    path::Path,
    process::{Command, ExitStatus, Output, Stdio},
    thread::Scope,
};

use bitflags::bitflags;
use crossbeam_channel::{unbounded, Sender};
use miette::{miette, Context, IntoDiagnostic};
use tracing::{debug, level_enabled, trace, Level};

use crate::result::Result;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capture: u8 {
        const STDOUT = 0b0000001;
        const STDERR = 0b0000010;
    }
}

/// A line printed by a child process, tagged with the stream it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLine {
    Stdout(String),
    Stderr(String),
}

/// Put `dir` in front of the child search path, so that programs sitting
/// there are found first. Only this command's environment is changed.
pub fn prepend_search_dir<'c>(cmd: &'c mut Command, dir: &Path) -> &'c mut Command {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let paths = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&inherited));

    match std::env::join_paths(paths) {
        Ok(path) => cmd.env("PATH", path),
        Err(err) => {
            debug!("Search path left as is, {} cannot be joined: {err}", dir.display());
            cmd
        }
    }
}

/// Run a command to completion, returning its raw output handle.
///
/// IO handles will be captured only if the caller required it or if the log level is Debug.
/// In that last case, `stdout` and `stderr` will be logged.
///
/// The function returns an error only if the command failed to execute.
/// If the program runs but returns a non-0 status code, it will not trigger an error.
pub fn run_command(cmd: &mut Command, capture: Capture) -> Result<Output> {
    let is_debug = level_enabled!(Level::DEBUG);
    let get_io = |capture| {
        if capture {
            Stdio::piped()
        } else {
            Stdio::null()
        }
    };

    let cmd = cmd
        .stdin(Stdio::null())
        .stdout(get_io(is_debug || capture.contains(Capture::STDOUT)))
        .stderr(get_io(is_debug || capture.contains(Capture::STDERR)));

    debug!("Executing command: {cmd:?}");
    let res = cmd
        .output()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not run {:?}", cmd.get_program()))?;

    if is_debug {
        debug!("status: {}", res.status);
        debug!("stdout: {} bytes long", res.stdout.len());
        trace!("stdout: {:?}", String::from_utf8_lossy(&res.stdout));
        debug!("stderr: {} bytes long", res.stderr.len());
        trace!("stderr: {:?}", String::from_utf8_lossy(&res.stderr));
    }

    Ok(res)
}

/// Read `stream` line by line on a named thread, forwarding every line.
/// The thread stops at the end of the stream or when nobody listens anymore.
fn spawn_reader<'scope, R>(
    scope: &'scope Scope<'scope, '_>,
    name: &str,
    stream: R,
    send: Sender<StreamLine>,
    tag: fn(String) -> StreamLine,
) -> Result<()>
where
    R: Read + Send + 'scope,
{
    std::thread::Builder::new()
        .name(name.to_owned())
        .spawn_scoped(scope, move || {
            for chunk in BufReader::new(stream).split(b'\n') {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        debug!("Stopped reading: {err}");
                        break;
                    }
                };

                let line = String::from_utf8_lossy(&chunk);
                let line = line.trim_end_matches('\r').to_owned();
                trace!("{line}");

                if send.send(tag(line)).is_err() {
                    break;
                }
            }
        })
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not start the {name} reader"))?;

    Ok(())
}

/// Run a command while relaying its output as it comes.
///
/// Both output streams are read concurrently and handed to `relay` on the
/// calling thread, in arrival order. The exit status is only taken once
/// both streams are fully drained.
///
/// As with [`run_command`], a non-0 status code is not an error.
pub fn stream_command(cmd: &mut Command, relay: &mut dyn FnMut(StreamLine)) -> Result<ExitStatus> {
    let cmd = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("Executing command: {cmd:?}");
    let mut child = cmd
        .spawn()
        .into_diagnostic()
        .wrap_err_with(|| format!("Could not run {:?}", cmd.get_program()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| miette!("Child stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| miette!("Child stderr was not captured"))?;

    let (send, receive) = unbounded();
    std::thread::scope(|scope| -> Result<()> {
        spawn_reader(scope, "stdout", stdout, send.clone(), StreamLine::Stdout)?;
        spawn_reader(scope, "stderr", stderr, send, StreamLine::Stderr)?;

        // Ends once both readers have dropped their sender
        for line in receive {
            relay(line);
        }

        Ok(())
    })?;

    let status = child
        .wait()
        .into_diagnostic()
        .wrap_err("Could not wait for the child process")?;
    debug!("status: {status}");

    Ok(status)
}

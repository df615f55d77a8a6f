//! Process-level shim around [`Cli::execute`].
//!
//! Prints command results to stdout and help to stderr, reports errors as
//! `ERR <message>.` followed by the help of the failing command, and maps
//! every outcome to a process exit code.

use std::io::{self, Write};
use std::path::PathBuf;

use cmdtree_engine::{Cli, CliError, Outcome};
use tracing::debug;

use crate::render::{OutputFormat, format_help, format_output};

pub struct Shim {
    cli: Cli,
    format: OutputFormat,
    cwd: PathBuf,
}

impl Shim {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            format: OutputFormat::default(),
            cwd: PathBuf::from("."),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Runs `argv` (program name first) against the process streams and
    /// returns the exit code.
    pub fn execute<I, S>(&self, argv: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = argv.into_iter().skip(1).map(Into::into).collect();
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run(&tokens, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Runs `tokens` (program name excluded), writing to the given streams.
    pub fn run(&self, tokens: &[String], out: &mut dyn Write, err: &mut dyn Write) -> i32 {
        let code = match self.cli.execute(tokens, &self.cwd) {
            Ok(Outcome::Output(output)) => {
                let printed = match format_output(&output, self.format) {
                    Ok(Some(text)) => write_line(out, &text),
                    Ok(None) => Ok(()),
                    Err(message) => write_error(err, &message).and(Err(io::Error::other(message))),
                };
                if printed.is_ok() { 0 } else { 1 }
            }
            Ok(Outcome::Help { help, requested }) => {
                let printed = format_help(&help, self.format)
                    .map_err(io::Error::other)
                    .and_then(|text| write_line(err, &text));
                if requested && printed.is_ok() { 0 } else { 1 }
            }
            Err(error) => self.report(&error, err),
        };

        debug!(code, "Invocation finished");
        code
    }

    /// Prints the error and its help. The error's own exit code is kept
    /// unless it is zero and nothing could be written.
    fn report(&self, error: &CliError, err: &mut dyn Write) -> i32 {
        let mut printed = write_error(err, &error.to_string());
        if let Some(help) = error.help() {
            printed = printed.and_then(|()| {
                let text = format_help(help, self.format).map_err(io::Error::other)?;
                write_line(err, "")?;
                write_line(err, &text)
            });
        }

        let code = error.exit_code();
        match printed {
            Ok(()) => code,
            Err(e) => {
                debug!(error = %e, "Failed to report error");
                if code == 0 { 1 } else { code }
            }
        }
    }
}

fn write_line(stream: &mut dyn Write, text: &str) -> io::Result<()> {
    writeln!(stream, "{}", text.trim_end_matches('\n'))
}

fn write_error(stream: &mut dyn Write, message: &str) -> io::Result<()> {
    let message = message.trim_end();
    if message.ends_with(['.', '?', '!']) {
        writeln!(stream, "ERR {message}")
    } else {
        writeln!(stream, "ERR {message}.")
    }
}

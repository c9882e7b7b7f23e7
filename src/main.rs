mod builtins;
mod error;
mod exec;
mod jobs;
mod parser;
mod path;
mod shell;
mod signals;
mod terminal;
mod utils;

use clap::Parser;
use error::ShellError;
use nix::libc::STDIN_FILENO;
use nix::unistd::isatty;
use shell::Reader;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "lash", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Script to run instead of reading commands from standard input.
    script: Option<PathBuf>,
}

fn usage_error() -> ! {
    // Nothing useful to do if stdout is gone as well.
    let _ = utils::print_usage(&mut io::stdout());
    process::exit(1);
}

fn open_reader(cli: &Cli, interactive: bool) -> Result<Reader, ShellError> {
    match &cli.script {
        Some(script) => {
            let display = script.display().to_string();
            let file = File::open(script).map_err(ShellError::io(&display))?;
            Ok(Reader::batch(BufReader::new(file)))
        }
        None if interactive => Reader::interactive(),
        None => Ok(Reader::batch(io::stdin().lock())),
    }
}

fn main() {
    env_logger::init();

    // Every option is a usage error, including ones clap would accept.
    if env::args_os().skip(1).any(|arg| arg.as_bytes().starts_with(b"-")) {
        usage_error();
    }
    let cli = Cli::try_parse().unwrap_or_else(|_| usage_error());
    log::debug!("CLI args parsed: {:?}", cli);

    let interactive = cli.script.is_none() && isatty(STDIN_FILENO).unwrap_or(false);

    let mut reader = match open_reader(&cli, interactive) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let code = match shell::run_shell(&mut reader, interactive) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };
    reader.save_history();
    process::exit(code);
}

use crate::error::ShellError;
use crate::jobs::JobRegistry;
use crate::parser::Command;
use crate::utils::print_usage;
use nix::unistd::{chdir, getcwd};
use std::env;
use std::io::Write;

/// What the dispatcher did with a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Builtin {
    /// Not a built-in; the launcher should run it.
    NotBuiltin,
    /// Executed in the shell process.
    Handled,
    /// `exit`: the shell should terminate now with this status.
    Exit(i32),
}

/// Checks if the command is a built-in command and, if so, executes it.
/// Supported built-ins are "help", "exit", "pwd", "cd" and "wait".
///
/// Normal output goes to `out`; failures are reported on standard error and
/// never abort the shell.
pub fn handle_builtin(cmd: &Command, jobs: &mut JobRegistry, out: &mut impl Write) -> Builtin {
    let Some(name) = cmd.name() else {
        return Builtin::NotBuiltin;
    };
    let result = match name {
        "help" => print_usage(out).map_err(ShellError::io("help")),
        "exit" => return Builtin::Exit(cmd.arg(1).map_or(0, parse_exit_code)),
        "pwd" => pwd(out),
        "cd" => cd(cmd.arg(1)),
        "wait" => jobs.drain().map(|reaped| {
            log::debug!("wait reaped {} background job(s)", reaped);
        }),
        _ => return Builtin::NotBuiltin,
    };
    if let Err(e) = result {
        eprintln!("{}", e);
    }
    Builtin::Handled
}

fn pwd(out: &mut impl Write) -> Result<(), ShellError> {
    let cwd = getcwd().map_err(ShellError::sys("pwd"))?;
    writeln!(out, "{}", cwd.display()).map_err(ShellError::io("pwd"))
}

fn cd(target: Option<&str>) -> Result<(), ShellError> {
    let path = match target {
        Some(path) => path.to_string(),
        None => match env::var("HOME") {
            Ok(home) => home,
            Err(_) => {
                eprintln!("cd: HOME not set");
                return Ok(());
            }
        },
    };
    chdir(path.as_str()).map_err(ShellError::sys("cd"))
}

/// Reads an exit status the way C's `atoi` does: optional leading
/// whitespace and sign, then as many decimal digits as follow. Anything
/// unparsable is 0.
pub fn parse_exit_code(arg: &str) -> i32 {
    let s = arg.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| acc.wrapping_mul(10).wrapping_add(i32::from(d - b'0')));
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

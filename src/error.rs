use nix::errno::Errno;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Everything that can go wrong while reading or running a command.
///
/// None of these end the shell by themselves; the read-dispatch loop prints
/// them to standard error and moves on to the next line.
#[derive(Debug, Error)]
pub enum ShellError {
    /// An OS call failed. Renders as `<context>: <system error text>`.
    #[error("{context}: {}", .source.desc())]
    Sys {
        context: String,
        #[source]
        source: Errno,
    },
    #[error("{0}: command not found")]
    NotFound(String),
    /// A token that cannot be handed to the OS (it holds a NUL byte).
    #[error("{0}: invalid argument")]
    InvalidArgument(String),
    #[error("read error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Adapter for `map_err`, tagging an errno with the operation or path it came from.
    pub fn sys(context: &str) -> impl FnOnce(Errno) -> ShellError + '_ {
        move |source| ShellError::Sys {
            context: context.to_string(),
            source,
        }
    }

    /// Like [`sys`](Self::sys) for `std::io` failures that carry an OS error code.
    pub fn io(context: &str) -> impl FnOnce(std::io::Error) -> ShellError + '_ {
        move |e| match e.raw_os_error() {
            Some(code) => ShellError::sys(context)(Errno::from_i32(code)),
            None => ShellError::Io(e),
        }
    }
}

use crate::error::ShellError;
use nix::libc::STDIN_FILENO;
use nix::sys::signal::{SigSet, Signal};
use nix::unistd::{getpgrp, tcsetpgrp, Pid};
use std::os::unix::io::RawFd;

/// The controlling terminal of an interactive shell.
///
/// Only exists in interactive mode; a shell reading a script or a pipe never
/// moves terminal ownership around.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
    fd: RawFd,
    shell_pgid: Pid,
}

impl Terminal {
    /// The terminal on standard input, owned by the shell's current group.
    pub fn from_stdin() -> Self {
        Terminal {
            fd: STDIN_FILENO,
            shell_pgid: getpgrp(),
        }
    }

    pub fn shell_pgid(&self) -> Pid {
        self.shell_pgid
    }

    /// Makes `pgid` the foreground group until the returned guard is dropped,
    /// at which point the shell's group gets the terminal back.
    pub fn hand_to(&self, pgid: Pid) -> Result<Foreground, ShellError> {
        tcsetpgrp(self.fd, pgid).map_err(ShellError::sys("tcsetpgrp"))?;
        log::debug!("terminal handed to group {}", pgid);
        Ok(Foreground { terminal: *self })
    }

    /// Called in a forked child: takes the terminal for the child's own group.
    ///
    /// The child has already restored `SIGTTOU` to its default and may still
    /// be a background group here, so the signal is blocked for the duration
    /// of the call instead of stopping the child.
    pub fn claim_for_child(&self) -> Result<(), ShellError> {
        let mut ttou = SigSet::empty();
        ttou.add(Signal::SIGTTOU);
        ttou.thread_block().map_err(ShellError::sys("sigprocmask"))?;
        let claimed = tcsetpgrp(self.fd, getpgrp()).map_err(ShellError::sys("tcsetpgrp"));
        ttou.thread_unblock().map_err(ShellError::sys("sigprocmask"))?;
        claimed
    }
}

/// Terminal ownership lent to a foreground job.
#[must_use = "the terminal returns to the shell as soon as this is dropped"]
#[derive(Debug)]
pub struct Foreground {
    terminal: Terminal,
}

impl Drop for Foreground {
    fn drop(&mut self) {
        match tcsetpgrp(self.terminal.fd, self.terminal.shell_pgid) {
            Ok(()) => log::debug!("terminal reclaimed by group {}", self.terminal.shell_pgid),
            Err(e) => eprintln!("tcsetpgrp: {}", e.desc()),
        }
    }
}

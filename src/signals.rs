use crate::error::ShellError;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Signals the terminal can deliver to a foreground job, plus `SIGTERM`.
///
/// An interactive shell ignores all of them while it waits; every child
/// gets them back at their default disposition.
pub const JOB_CONTROL_SIGNALS: [Signal; 6] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTERM,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// The shell's own signal disposition while it is in charge of a terminal.
///
/// Created by [`ShellSignals::enter`]; dropping it puts back whatever
/// dispositions were in place before, so an embedded or repeated shell does
/// not leave its caller ignoring signals.
#[derive(Debug)]
pub struct ShellSignals {
    saved: Vec<(Signal, SigAction)>,
}

impl ShellSignals {
    /// Ignores the job-control signals for as long as the guard lives.
    pub fn enter() -> Result<Self, ShellError> {
        let mut guard = ShellSignals { saved: Vec::new() };
        let action = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        for signal in JOB_CONTROL_SIGNALS {
            // Pushed one at a time so a failure part way still restores the rest on drop.
            let old = unsafe { sigaction(signal, &action) }.map_err(ShellError::sys("sigaction"))?;
            guard.saved.push((signal, old));
        }
        log::debug!("shell signal disposition entered");
        Ok(guard)
    }
}

impl Drop for ShellSignals {
    fn drop(&mut self) {
        for (signal, old) in self.saved.drain(..).rev() {
            if let Err(e) = unsafe { sigaction(signal, &old) } {
                log::warn!("could not restore {}: {}", signal, e.desc());
            }
        }
    }
}

/// Reset in every child on top of the job-control signals. The Rust runtime
/// starts the shell with `SIGPIPE` ignored, and an ignored disposition
/// survives `execv`.
pub const INHERITED_IGNORED_SIGNALS: [Signal; 1] = [Signal::SIGPIPE];

/// Puts every job-control signal, and `SIGPIPE`, back to its default disposition.
///
/// Called in each freshly forked child, interactive or not, before it touches
/// redirection or replaces its image. Nothing is restored afterwards: the
/// process is about to become someone else.
pub fn enter_child_mode() -> Result<(), ShellError> {
    let action = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    for signal in JOB_CONTROL_SIGNALS.into_iter().chain(INHERITED_IGNORED_SIGNALS) {
        unsafe { sigaction(signal, &action) }.map_err(ShellError::sys("sigaction"))?;
    }
    Ok(())
}

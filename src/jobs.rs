use crate::error::ShellError;
use nix::errno::Errno;
use nix::sys::wait::{wait, WaitStatus};
use nix::unistd::Pid;
use std::collections::HashMap;

/// A process started with `&` and not yet reaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub cmdline: String,
}

/// Background jobs keyed by process ID.
///
/// Owned by the shell loop and lent to the launcher and the `wait` built-in;
/// only ever touched from the shell's single thread.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: HashMap<Pid, Job>,
}

impl JobRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        JobRegistry::default()
    }

    /// Records a freshly started background process.
    pub fn register(&mut self, pid: Pid, cmdline: String) {
        log::debug!("background job {} registered: {}", pid, cmdline);
        self.jobs.insert(pid, Job { pid, cmdline });
    }

    /// Forgets a reaped process. Returns the record if it was one of ours.
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        self.jobs.remove(&pid)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Blocks until every registered job has been reaped, or until there is
    /// no child left to wait for. Returns how many registered jobs were reaped.
    ///
    /// The wait accepts any child of the shell, so a child that was never
    /// registered is reaped here as well.
    pub fn drain(&mut self) -> Result<usize, ShellError> {
        self.drain_with(wait)
    }

    /// [`drain`](Self::drain) over an arbitrary "wait for any child" primitive.
    pub fn drain_with<F>(&mut self, mut wait_any: F) -> Result<usize, ShellError>
    where
        F: FnMut() -> nix::Result<WaitStatus>,
    {
        let mut reaped = 0;
        while !self.is_empty() {
            let status = match wait_any() {
                Ok(status) => status,
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => {
                    log::warn!("{} background job(s) already gone", self.len());
                    break;
                }
                Err(e) => return Err(ShellError::sys("wait")(e)),
            };
            let Some(pid) = status.pid() else {
                continue;
            };
            match self.remove(pid) {
                Some(job) => {
                    log::debug!("job {} reaped ({:?}): {}", job.pid, status, job.cmdline);
                    reaped += 1;
                }
                None => log::warn!("reaped unregistered child {} ({:?})", pid, status),
            }
        }
        Ok(reaped)
    }
}

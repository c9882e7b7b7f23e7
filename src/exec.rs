use crate::error::ShellError;
use crate::jobs::JobRegistry;
use crate::parser::{Command, LaunchSpec};
use crate::path;
use crate::signals;
use crate::terminal::Terminal;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, dup2, execv, fork, setpgid, ForkResult, Pid};
use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;
use std::process;

/// Exit status of a child whose program could not be found.
const EXIT_NOT_FOUND: i32 = 127;
/// Exit status of a child whose program was found but could not be run.
const EXIT_NOT_EXECUTABLE: i32 = 126;

/// How a launch ended, as far as the shell is concerned.
#[derive(Debug, PartialEq, Eq)]
pub enum Launch {
    /// Only operators, no program: nothing was started.
    Nothing,
    /// Started with `&` and registered; still running.
    Background(Pid),
    /// Ran in the foreground and has been reaped.
    Foreground(WaitStatus),
}

/// Everything the child needs, converted before forking so the child does
/// no more than system calls between `fork` and `execv`.
#[derive(Debug)]
struct Prepared {
    program: CString,
    argv: Vec<CString>,
    /// The resolver found nothing; the child reports the name as missing.
    unresolved: bool,
}

impl Prepared {
    fn new(spec: &LaunchSpec, resolved: &Path) -> Result<Self, ShellError> {
        let program = CString::new(resolved.as_os_str().as_bytes())
            .map_err(|_| ShellError::InvalidArgument(spec.program().to_string()))?;
        let argv = spec
            .argv()
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| ShellError::InvalidArgument(arg.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Prepared {
            program,
            argv,
            unresolved: path::is_unresolved(resolved),
        })
    }
}

/// Executes an external command.
///
/// - Classifies the tokens; a command with no program left is a silent no-op.
/// - Resolves the program against `PATH` and forks.
/// - The child resets its signals, heads a new process group, takes the
///   terminal when it runs in the foreground of an interactive shell, applies
///   redirections and replaces itself with the program.
/// - The parent registers a background child and returns at once, or hands
///   the terminal to a foreground child, reaps it and takes the terminal back.
///
/// `terminal` is `None` when the shell is not interactive.
pub fn execute_command(
    cmd: &Command,
    jobs: &mut JobRegistry,
    terminal: Option<&Terminal>,
) -> Result<Launch, ShellError> {
    let Some(spec) = LaunchSpec::classify(cmd) else {
        return Ok(Launch::Nothing);
    };
    let program = path::resolve(spec.program());
    log::debug!("{} resolved to {}", spec.program(), program.display());
    let prepared = Prepared::new(&spec, &program)?;
    let terminal = if spec.is_background() { None } else { terminal };

    // Anything still buffered would otherwise be written twice.
    io::stdout().flush().map_err(ShellError::io("stdout"))?;

    match unsafe { fork() }.map_err(ShellError::sys("fork"))? {
        ForkResult::Child => process::exit(run_child(&spec, &prepared, terminal)),
        ForkResult::Parent { child } => {
            log::debug!("started {} as {}", cmd.display(), child);
            run_parent(child, &spec, cmd, jobs, terminal)
        }
    }
}

/// Child side of the fork. Only returns if the program could not be started,
/// with the status the child should exit with.
fn run_child(spec: &LaunchSpec, prepared: &Prepared, terminal: Option<&Terminal>) -> i32 {
    if let Err(e) = enter_child(spec, terminal) {
        eprintln!("{}", e);
        return 1;
    }
    if prepared.unresolved {
        eprintln!("{}", ShellError::NotFound(spec.program().to_string()));
        return EXIT_NOT_FOUND;
    }
    let errno = match execv(&prepared.program, &prepared.argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    match errno {
        Errno::ENOENT | Errno::ENOTDIR => {
            eprintln!("{}", ShellError::NotFound(spec.program().to_string()));
            EXIT_NOT_FOUND
        }
        errno => {
            eprintln!("{}", ShellError::sys(spec.program())(errno));
            EXIT_NOT_EXECUTABLE
        }
    }
}

fn enter_child(spec: &LaunchSpec, terminal: Option<&Terminal>) -> Result<(), ShellError> {
    signals::enter_child_mode()?;

    if let Err(e) = setpgid(Pid::from_raw(0), Pid::from_raw(0)) {
        log::warn!("child setpgid: {}", e.desc());
    }
    if let Some(terminal) = terminal {
        if let Err(e) = terminal.claim_for_child() {
            log::warn!("child could not take the terminal: {}", e);
        }
    }

    if let Some(infile) = spec.infile() {
        redirect(infile, OFlag::O_RDONLY, STDIN_FILENO)?;
    }
    if let Some(outfile) = spec.outfile() {
        redirect(
            outfile,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            STDOUT_FILENO,
        )?;
    }
    Ok(())
}

/// Opens `path` and puts it in place of `target`.
fn redirect(path: &str, flags: OFlag, target: RawFd) -> Result<(), ShellError> {
    let mode = Mode::from_bits_truncate(0o666);
    let fd = open(path, flags, mode).map_err(ShellError::sys(path))?;
    if fd != target {
        dup2(fd, target).map_err(ShellError::sys("dup2"))?;
        close(fd).map_err(ShellError::sys("close"))?;
    }
    Ok(())
}

fn run_parent(
    child: Pid,
    spec: &LaunchSpec,
    cmd: &Command,
    jobs: &mut JobRegistry,
    terminal: Option<&Terminal>,
) -> Result<Launch, ShellError> {
    // Also done by the child; whichever runs second may fail harmlessly.
    if let Err(e) = setpgid(child, child) {
        log::debug!("setpgid({}) in parent: {}", child, e.desc());
    }

    if spec.is_background() {
        jobs.register(child, cmd.display());
        return Ok(Launch::Background(child));
    }

    let foreground = match terminal.map(|t| t.hand_to(child)).transpose() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    };
    let status = wait_foreground(child)?;
    drop(foreground);
    Ok(Launch::Foreground(status))
}

/// Blocks until `child` exits or is killed by a signal.
fn wait_foreground(child: Pid) -> Result<WaitStatus, ShellError> {
    loop {
        match waitpid(child, None) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => return Ok(status),
            Ok(status) => log::trace!("foreground job {} changed state: {:?}", child, status),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ShellError::sys("waitpid")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(argv: &[&str]) -> LaunchSpec {
        let words = argv.iter().map(|a| a.to_string()).collect();
        LaunchSpec::classify(&Command::new(words)).unwrap()
    }

    #[test]
    fn operators_only_start_nothing() {
        let mut jobs = JobRegistry::new();
        let cmd = Command::parse("> out.txt &");
        assert_eq!(execute_command(&cmd, &mut jobs, None).unwrap(), Launch::Nothing);
        assert!(jobs.is_empty());
    }

    #[test]
    fn prepared_keeps_argv_zero_as_typed() {
        let prepared = Prepared::new(&spec(&["ls", "-l"]), Path::new("/bin/ls")).unwrap();
        assert_eq!(prepared.program.as_bytes(), b"/bin/ls");
        assert_eq!(prepared.argv[0].as_bytes(), b"ls");
        assert_eq!(prepared.argv[1].as_bytes(), b"-l");
        assert!(!prepared.unresolved);
    }

    #[test]
    fn bare_name_left_by_the_resolver_is_not_run_from_cwd() {
        let prepared = Prepared::new(&spec(&["greet"]), Path::new("greet")).unwrap();
        assert!(prepared.unresolved);

        let prepared = Prepared::new(&spec(&["./greet"]), Path::new("./greet")).unwrap();
        assert!(!prepared.unresolved);
    }

    #[test]
    fn interior_nul_aborts_the_launch() {
        let err = Prepared::new(&spec(&["echo", "a\0b"]), Path::new("/bin/echo")).unwrap_err();
        assert!(matches!(err, ShellError::InvalidArgument(arg) if arg == "a\0b"));
    }
}

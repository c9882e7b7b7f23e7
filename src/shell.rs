use crate::builtins::{handle_builtin, Builtin};
use crate::error::ShellError;
use crate::exec::{execute_command, Launch};
use crate::jobs::JobRegistry;
use crate::parser::Command;
use crate::signals::ShellSignals;
use crate::terminal::Terminal;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, BufRead};
use std::path::PathBuf;

/// Global prompt string.
pub static PROMPT: &str = "lash> ";

/// History file, kept in the user's home directory.
const HISTORY_FILE: &str = ".lash_history";

/// Where commands come from.
pub enum Reader {
    /// A terminal: prompt, line editing and history.
    Interactive {
        editor: DefaultEditor,
        history: Option<PathBuf>,
    },
    /// A script file or piped standard input, read silently line by line.
    Batch(Box<dyn BufRead>),
}

impl Reader {
    pub fn interactive() -> Result<Self, ShellError> {
        let mut editor = DefaultEditor::new()?;
        let history = dirs_next::home_dir().map(|home| home.join(HISTORY_FILE));
        if let Some(path) = &history {
            if let Err(e) = editor.load_history(path) {
                log::debug!("no history loaded from {}: {}", path.display(), e);
            }
        }
        Ok(Reader::Interactive { editor, history })
    }

    pub fn batch(input: impl BufRead + 'static) -> Self {
        Reader::Batch(Box::new(input))
    }

    /// Reads the next command. `Ok(None)` means end of input.
    ///
    /// A blank line, or Ctrl-C at the prompt, yields an empty command.
    pub fn read_command(&mut self) -> Result<Option<Command>, ShellError> {
        match self {
            Reader::Interactive { editor, .. } => match editor.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = editor.add_history_entry(line.as_str()) {
                            log::warn!("history: {}", e);
                        }
                    }
                    Ok(Some(Command::parse(&line)))
                }
                Err(ReadlineError::Interrupted) => Ok(Some(Command::default())),
                Err(ReadlineError::Eof) => Ok(None),
                Err(e) => Err(e.into()),
            },
            Reader::Batch(input) => {
                // Bytes, not `read_line`: a stray non-UTF-8 byte must not end the script.
                let mut line = Vec::new();
                if input.read_until(b'\n', &mut line)? == 0 {
                    return Ok(None);
                }
                Ok(Some(Command::parse(&String::from_utf8_lossy(&line))))
            }
        }
    }

    /// Writes the interactive history back to disk; a no-op in batch mode.
    pub fn save_history(&mut self) {
        if let Reader::Interactive {
            editor,
            history: Some(path),
        } = self
        {
            if let Err(e) = editor.save_history(path.as_path()) {
                log::warn!("could not save history to {}: {}", path.display(), e);
            }
        }
    }
}

/// Runs the main shell loop: reads a command, tries it as a built-in, and
/// otherwise launches it. Returns the status the shell should exit with.
///
/// In interactive mode the shell ignores job-control signals for the length
/// of the loop and lends the terminal to each foreground job.
pub fn run_shell(reader: &mut Reader, interactive: bool) -> Result<i32, ShellError> {
    let _signals = if interactive {
        Some(ShellSignals::enter()?)
    } else {
        None
    };
    let terminal = interactive.then(Terminal::from_stdin);
    if let Some(terminal) = &terminal {
        log::debug!("interactive, shell group {}", terminal.shell_pgid());
    }

    let mut jobs = JobRegistry::new();
    let mut stdout = io::stdout();

    loop {
        let cmd = match reader.read_command() {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return Ok(0),
            Err(e) => {
                eprintln!("{}", e);
                return Ok(1);
            }
        };
        if cmd.is_empty() {
            continue;
        }
        log::debug!("received command: {}", cmd.display());

        match handle_builtin(&cmd, &mut jobs, &mut stdout) {
            Builtin::Handled => {}
            Builtin::Exit(code) => return Ok(code),
            Builtin::NotBuiltin => match execute_command(&cmd, &mut jobs, terminal.as_ref()) {
                Ok(Launch::Background(pid)) => log::debug!("[{}] {}", pid, cmd.display()),
                Ok(Launch::Foreground(status)) => log::debug!("{:?}", status),
                Ok(Launch::Nothing) => {}
                Err(e) => eprintln!("{}", e),
            },
        }
    }
}

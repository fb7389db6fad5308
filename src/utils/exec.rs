use std::{
    fmt,
    path::{Path, PathBuf},
};

use subprocess::{Exec, ExitStatus, Redirection};

use super::error::{ProvisionError, Result};

/// how many trailing stderr lines are kept in error messages
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// stdout goes straight to the terminal instead of being captured
    pub stream_stdout: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: vec![],
            cwd: None,
            stream_stdout: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// For long-running installers whose progress should stay visible.
    pub fn streamed(mut self) -> Self {
        self.stream_stdout = true;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Last few lines of stderr, enough to tell what went wrong.
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }

    pub fn check(self, step: &'static str, cmd: &CommandSpec) -> Result<CommandOutput> {
        if self.success() {
            Ok(self)
        } else {
            Err(ProvisionError::CommandFailed {
                step,
                command: cmd.to_string(),
                status: self.status,
                stderr: self.stderr_tail(),
            })
        }
    }
}

/// Something that can run an external program to completion.
pub trait CommandRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands on the host and waits for them.
pub struct SystemRunner {}

impl SystemRunner {
    pub fn new() -> SystemRunner {
        SystemRunner {}
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
        debug!("running `{}`", cmd);

        let stdout = if cmd.stream_stdout {
            Redirection::None
        } else {
            Redirection::Pipe
        };
        let mut exec = Exec::cmd(&cmd.program)
            .args(cmd.args.as_slice())
            .stdout(stdout)
            .stderr(Redirection::Pipe);
        if let Some(dir) = &cmd.cwd {
            exec = exec.cwd(dir);
        }

        let data = exec.capture().map_err(|source| ProvisionError::Spawn {
            command: cmd.to_string(),
            source,
        })?;

        let out = CommandOutput {
            status: data.exit_status,
            stdout: data.stdout_str(),
            stderr: data.stderr_str(),
        };

        for line in out.stdout.lines() {
            debug!("[{}] {}", cmd.program, line);
        }
        if !out.success() {
            for line in out.stderr.lines() {
                warn!("[{}] {}", cmd.program, line);
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
pub mod testing {
    use std::{cell::RefCell, collections::VecDeque};

    use super::*;

    /// Records every command and answers from a script of canned outputs.
    /// Commands without a scripted answer succeed with empty output.
    pub struct FakeRunner {
        pub calls: RefCell<Vec<CommandSpec>>,
        responses: RefCell<VecDeque<(String, CommandOutput)>>,
        hook: Option<Box<dyn Fn(&CommandSpec)>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            FakeRunner {
                calls: RefCell::new(vec![]),
                responses: RefCell::new(VecDeque::new()),
                hook: None,
            }
        }

        /// Side effect executed for every command, e.g. creating files a real tool would.
        pub fn with_hook(mut self, hook: impl Fn(&CommandSpec) + 'static) -> Self {
            self.hook = Some(Box::new(hook));
            self
        }

        /// The next command whose program matches gets this answer.
        pub fn respond(&self, program: &str, code: u32, stdout: &str, stderr: &str) {
            self.responses.borrow_mut().push_back((
                program.to_string(),
                CommandOutput {
                    status: ExitStatus::Exited(code),
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                },
            ));
        }

        pub fn programs(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.program.clone()).collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(cmd.clone());
            if let Some(hook) = &self.hook {
                hook(cmd);
            }

            let mut responses = self.responses.borrow_mut();
            let pos = responses.iter().position(|(p, _)| *p == cmd.program);
            Ok(match pos.and_then(|i| responses.remove(i)) {
                Some((_, out)) => out,
                None => CommandOutput {
                    status: ExitStatus::Exited(0),
                    stdout: String::new(),
                    stderr: String::new(),
                },
            })
        }
    }
}

use std::{
    io::{self, Write},
    os::unix::prelude::AsRawFd,
    path::Path,
};

use memfd::{Memfd, MemfdOptions};

use super::{
    error::{ProvisionError, Result},
    exec::{CommandRunner, CommandSpec},
};

/// Calls `setup_drake(version=, build=)` from `setup_drake_colab.py` in the working directory.
const INVOKE_INSTALLER: &[u8] = include_bytes!("invoke_installer.py");

/// A script compiled into the binary, readable by child processes through procfs.
pub struct EmbeddedScript {
    mfd: Memfd,
}

impl EmbeddedScript {
    pub fn create(name: &str, script: &[u8]) -> Result<EmbeddedScript> {
        let mfd = MemfdOptions::default()
            .create(name)
            .map_err(|e| {
                ProvisionError::io(
                    format!("failed to create memfd '{}'", name),
                    io::Error::new(io::ErrorKind::Other, e),
                )
            })?;
        mfd.as_file()
            .write_all(script)
            .map_err(|e| ProvisionError::io(format!("failed to write script '{}'", name), e))?;

        Ok(EmbeddedScript { mfd })
    }

    /// Path valid for as long as `self` is alive.
    pub fn path(&self) -> String {
        format!(
            "/proc/{}/fd/{}",
            nix::unistd::getpid(),
            self.mfd.as_file().as_raw_fd()
        )
    }
}

/// Runs the entry point of a previously downloaded remote installer.
pub fn run_remote_installer(
    runner: &dyn CommandRunner,
    python: &str,
    installer_dir: &Path,
    version: &str,
    build: &str,
) -> Result<()> {
    let shim = EmbeddedScript::create("invoke-installer.py", INVOKE_INSTALLER)?;

    let cmd = CommandSpec::new(python)
        .arg(shim.path())
        .args([version, build])
        .cwd(installer_dir)
        .streamed();
    let out = runner.run(&cmd)?;

    if out.success() {
        Ok(())
    } else {
        Err(ProvisionError::RemoteInstaller {
            status: out.status,
            stderr: out.stderr_tail(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::utils::exec::{testing::FakeRunner, SystemRunner};

    #[test]
    fn embedded_script_is_readable_through_procfs() {
        let script = EmbeddedScript::create("test-script", b"echo embedded\n").unwrap();
        assert_eq!(fs::read(script.path()).unwrap(), b"echo embedded\n");

        let out = SystemRunner::new()
            .run(&CommandSpec::new("sh").arg(script.path()))
            .unwrap();
        assert_eq!(out.stdout.trim(), "embedded");
    }

    #[test]
    fn installer_runs_in_download_directory_with_version_and_build() {
        let runner = FakeRunner::new();
        let dir = Path::new("/tmp/downloads");

        run_remote_installer(&runner, "python3", dir, "0.27.0", "releases").unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "python3");
        assert!(calls[0].args[0].starts_with("/proc/"));
        assert_eq!(&calls[0].args[1..], ["0.27.0", "releases"]);
        assert_eq!(calls[0].cwd.as_deref(), Some(dir));
        assert!(calls[0].stream_stdout);
    }

    #[test]
    fn installer_failure_is_reported() {
        let runner = FakeRunner::new();
        runner.respond("python3", 1, "", "Traceback\nValueError: bad build");

        let err = run_remote_installer(&runner, "python3", Path::new("."), "1.0", "nope")
            .unwrap_err();
        match err {
            ProvisionError::RemoteInstaller { stderr, .. } => {
                assert!(stderr.contains("bad build"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

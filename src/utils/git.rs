use std::path::Path;

use super::{
    error::{ProvisionError, Result},
    exec::{CommandOutput, CommandRunner, CommandSpec},
};

fn git(runner: &dyn CommandRunner, op: &'static str, cmd: CommandSpec) -> Result<CommandOutput> {
    let out = runner.run(&cmd)?;
    if out.success() {
        Ok(out)
    } else {
        Err(ProvisionError::Git {
            op,
            status: out.status,
            stderr: out.stderr_tail(),
        })
    }
}

pub fn clone(runner: &dyn CommandRunner, url: &str, path: &Path) -> Result<()> {
    let cmd = CommandSpec::new("git")
        .args(["clone", url])
        .arg(path.to_string_lossy());
    git(runner, "clone", cmd).map(|_| ())
}

pub fn checkout(runner: &dyn CommandRunner, path: &Path, commit: &str) -> Result<()> {
    let cmd = CommandSpec::new("git").args(["checkout", commit]).cwd(path);
    git(runner, "checkout", cmd).map(|_| ())
}

/// Commit hash the working copy currently points at.
pub fn head(runner: &dyn CommandRunner, path: &Path) -> Result<String> {
    let cmd = CommandSpec::new("git").args(["rev-parse", "HEAD"]).cwd(path);
    git(runner, "rev-parse", cmd).map(|out| out.stdout.trim().to_string())
}


#[cfg(test)]
mod tests {
    use super::{testing::*, *};
    use crate::utils::exec::{testing::FakeRunner, SystemRunner};

    #[test]
    fn clone_passes_url_and_destination() {
        let runner = FakeRunner::new();
        clone(&runner, "https://example.com/repo.git", Path::new("/opt/repo")).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].to_string(), "git clone https://example.com/repo.git /opt/repo");
        assert_eq!(calls[0].cwd, None);
    }

    #[test]
    fn failed_checkout_is_a_git_error() {
        let runner = FakeRunner::new();
        runner.respond("git", 1, "", "error: pathspec 'nope' did not match");

        match checkout(&runner, Path::new("/opt/repo"), "nope") {
            Err(ProvisionError::Git { op, stderr, .. }) => {
                assert_eq!(op, "checkout");
                assert!(stderr.contains("did not match"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn checkout_moves_head_to_requested_commit() {
        if !git_available() {
            eprintln!("git not found, skipping");
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let (upstream, first, second) = upstream_with_two_commits(tmp.path());
        let runner = SystemRunner::new();
        let work = tmp.path().join("work");

        clone(&runner, &upstream.to_string_lossy(), &work).unwrap();
        assert_eq!(head(&runner, &work).unwrap(), second);

        checkout(&runner, &work, &first).unwrap();
        assert_eq!(head(&runner, &work).unwrap(), first);

        checkout(&runner, &work, &second).unwrap();
        assert_eq!(head(&runner, &work).unwrap(), second);
    }

    #[test]
    fn checkout_of_unknown_commit_fails() {
        if !git_available() {
            eprintln!("git not found, skipping");
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        let (upstream, _, _) = upstream_with_two_commits(tmp.path());
        let runner = SystemRunner::new();
        let work = tmp.path().join("work");
        clone(&runner, &upstream.to_string_lossy(), &work).unwrap();

        let res = checkout(&runner, &work, "0000000000000000000000000000000000000000");
        assert!(matches!(res, Err(ProvisionError::Git { op: "checkout", .. })));
    }
}

use std::path::PathBuf;

use subprocess::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{0} must not be empty")]
    InvalidArgument(&'static str),

    #[error("failed to download '{url}': {reason}")]
    Download { url: String, reason: String },

    #[error("remote installer exited with {status:?}\n{stderr}")]
    RemoteInstaller { status: ExitStatus, stderr: String },

    #[error("git {op} failed with {status:?}\n{stderr}")]
    Git {
        op: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{step} step failed: `{command}` exited with {status:?}\n{stderr}")]
    CommandFailed {
        step: &'static str,
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: subprocess::PopenError,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Installation failed. Package '{package}' could not be found on the search path.")]
    NotFound { package: String },

    #[error(
        "Installation failed. Package '{package}' was found at '{}', but not in the expected path '{}'.",
        .origin.display(),
        .expected.display()
    )]
    OutsideExpectedPath {
        package: String,
        origin: PathBuf,
        expected: PathBuf,
    },
}

impl ProvisionError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ProvisionError::Io {
            context: context.into(),
            source,
        }
    }
}

use std::path::{Path, PathBuf};

use super::{
    error::{ProvisionError, Result},
    exec::{CommandRunner, CommandSpec},
    external_prog::run_remote_installer,
    fetch::{installer_url, Fetcher, INSTALLER_FILE_NAME},
    git,
    locate::{resolve_with_fallback, search_path, Resolution, SearchPath},
    report::{CloneOutcome, Report},
};

pub const DEFAULT_TARGET_PATH: &str = "/opt/manipulation";
pub const DEFAULT_REPO_URL: &str = "https://github.com/RussTedrake/manipulation.git";
pub const DEFAULT_PACKAGE: &str = "manipulation";
pub const DEFAULT_INSTALLER_BASE_URL: &str = "https://drake-packages.csail.mit.edu";

/// prerequisite installer, relative to the working copy
const PREREQS_SCRIPT: &str = "scripts/setup/ubuntu/18.04/install_prereqs.sh";
const REQUIREMENTS_FILE: &str = "requirements.txt";

#[derive(Debug, Clone)]
pub struct Settings {
    pub target_path: PathBuf,
    pub repo_url: String,
    pub package: String,
    pub installer_base_url: String,
    pub python: String,
    pub pip: String,
    /// where the remote installer is saved and run from; also the interpreter's cwd
    pub download_dir: PathBuf,
    /// keep going when the prerequisite script or the requirements install fails
    pub ignore_install_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            target_path: PathBuf::from(DEFAULT_TARGET_PATH),
            repo_url: DEFAULT_REPO_URL.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            installer_base_url: DEFAULT_INSTALLER_BASE_URL.to_string(),
            python: "python3".to_string(),
            pip: "pip3".to_string(),
            download_dir: PathBuf::from("."),
            ignore_install_errors: false,
        }
    }
}

fn non_empty(value: &str, what: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ProvisionError::InvalidArgument(what))
    } else {
        Ok(())
    }
}

pub struct Provisioner<'a> {
    pub settings: Settings,
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn Fetcher,
}

impl<'a> Provisioner<'a> {
    pub fn new(settings: Settings, runner: &'a dyn CommandRunner, fetcher: &'a dyn Fetcher) -> Self {
        Provisioner {
            settings,
            runner,
            fetcher,
        }
    }

    fn target(&self) -> &Path {
        &self.settings.target_path
    }

    /// Download the Drake installer for `version`/`build` and run it.
    pub fn setup_drake(&self, version: &str, build: &str) -> Result<()> {
        non_empty(version, "drake version")?;
        non_empty(build, "drake build")?;

        let url = installer_url(&self.settings.installer_base_url, version, build);
        let dest = self.settings.download_dir.join(INSTALLER_FILE_NAME);
        self.fetcher.fetch(&url, &dest)?;

        info!("running drake installer {} ({})", version, build);
        run_remote_installer(
            self.runner,
            &self.settings.python,
            &self.settings.download_dir,
            version,
            build,
        )
    }

    /// Clone the course repository unless the target directory already exists.
    pub fn ensure_working_copy(&self) -> Result<CloneOutcome> {
        if self.target().is_dir() {
            info!("working copy already present at '{}'", self.target().display());
            return Ok(CloneOutcome::AlreadyPresent);
        }

        info!("cloning {} into '{}'", self.settings.repo_url, self.target().display());
        git::clone(self.runner, &self.settings.repo_url, self.target())?;
        Ok(CloneOutcome::Cloned)
    }

    /// Check out `commit` and return the resolved HEAD.
    pub fn checkout(&self, commit: &str) -> Result<String> {
        non_empty(commit, "commit")?;

        info!("checking out {}", commit);
        git::checkout(self.runner, self.target(), commit)?;
        git::head(self.runner, self.target())
    }

    /// Returns a warning instead of an error when install failures are ignored.
    fn run_install_step(&self, step: &'static str, cmd: CommandSpec) -> Result<Option<String>> {
        info!("{}: `{}`", step, cmd);
        match self.runner.run(&cmd).and_then(|out| out.check(step, &cmd)) {
            Ok(_) => Ok(None),
            Err(e) if self.settings.ignore_install_errors => {
                warn!("ignoring failure: {}", e);
                Ok(Some(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn install_prereqs(&self) -> Result<Option<String>> {
        let script = self.target().join(PREREQS_SCRIPT);
        let cmd = CommandSpec::new(script.to_string_lossy()).streamed();
        self.run_install_step("prerequisites", cmd)
    }

    pub fn install_requirements(&self) -> Result<Option<String>> {
        let requirements = self.target().join(REQUIREMENTS_FILE);
        let cmd = CommandSpec::new(self.settings.pip.as_str())
            .args(["install", "--disable-pip-version-check", "--requirement"])
            .arg(requirements.to_string_lossy())
            .streamed();
        self.run_install_step("requirements", cmd)
    }

    /// Directories to look for the package in, as the interpreter sees them right now.
    pub fn search_path(&self, explicit: &[PathBuf]) -> Result<SearchPath> {
        search_path(
            self.runner,
            &self.settings.python,
            &self.settings.download_dir,
            explicit,
        )
    }

    pub fn verify(&self, search: &mut SearchPath) -> Result<Resolution> {
        debug!("search path: {:?}", search.dirs());
        let res = resolve_with_fallback(search, &self.settings.package, self.target())?;
        if res.appended {
            info!(
                "'{}' resolves from '{}' once '{}' is on PYTHONPATH",
                self.settings.package,
                res.origin.path.display(),
                self.target().display()
            );
        } else {
            info!(
                "'{}' resolves from '{}'",
                self.settings.package,
                res.origin.path.display()
            );
        }
        Ok(res)
    }

    /// Run every step in order; the first fatal failure aborts the rest.
    pub fn provision(
        &self,
        drake_version: &str,
        drake_build: &str,
        commit: &str,
        explicit_search_path: &[PathBuf],
    ) -> Result<Report> {
        non_empty(drake_version, "drake version")?;
        non_empty(drake_build, "drake build")?;
        non_empty(commit, "commit")?;

        self.setup_drake(drake_version, drake_build)?;
        let working_copy = self.ensure_working_copy()?;
        let head = self.checkout(commit)?;

        let mut warnings = vec![];
        warnings.extend(self.install_prereqs()?);
        warnings.extend(self.install_requirements()?);

        // installs may have added to sys.path, so look only now
        let mut search = self.search_path(explicit_search_path)?;
        let resolution = self.verify(&mut search)?;

        Ok(Report {
            drake_version: drake_version.to_string(),
            drake_build: drake_build.to_string(),
            commit: commit.to_string(),
            head,
            target_path: self.target().display().to_string(),
            working_copy,
            resolution,
            warnings,
        })
    }
}

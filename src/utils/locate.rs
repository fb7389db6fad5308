//! Static lookup of Python packages on disk.
//!
//! Instead of asking a live interpreter to import something, we walk an explicit
//! list of search directories the same way the interpreter's path finder would:
//! a regular package or plain module wins as soon as one is seen, a bare
//! directory only counts as a namespace package when nothing better exists.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{
    error::{ProvisionError, Result},
    exec::{CommandRunner, CommandSpec},
};

/// `''` on `sys.path` stands for the interpreter's working directory
const QUERY_SYS_PATH: &str = "import os, sys; print('\\n'.join(p or os.getcwd() for p in sys.path))";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Package,
    Module,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOrigin {
    pub path: PathBuf,
    pub kind: ModuleKind,
}

impl ModuleOrigin {
    pub fn is_under(&self, root: &Path) -> bool {
        self.path.starts_with(root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        SearchPath { dirs }
    }

    /// Ask the interpreter, started in `cwd`, for its `sys.path`.
    pub fn from_interpreter(
        runner: &dyn CommandRunner,
        python: &str,
        cwd: &Path,
    ) -> Result<Self> {
        let cmd = CommandSpec::new(python)
            .args(["-c", QUERY_SYS_PATH])
            .cwd(cwd);
        let out = runner.run(&cmd)?.check("search path query", &cmd)?;

        let dirs = out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect();
        Ok(SearchPath { dirs })
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Add `dir` at the end unless it is already listed.
    pub fn append(&mut self, dir: &Path) -> bool {
        if self.dirs.iter().any(|d| d == dir) {
            return false;
        }
        self.dirs.push(dir.to_path_buf());
        true
    }

    pub fn find(&self, name: &str) -> Option<ModuleOrigin> {
        let mut namespace = None;

        for dir in &self.dirs {
            let pkg = dir.join(name);
            let init = pkg.join("__init__.py");
            if init.is_file() {
                return Some(ModuleOrigin {
                    path: init,
                    kind: ModuleKind::Package,
                });
            }

            let module = dir.join(format!("{}.py", name));
            if module.is_file() {
                return Some(ModuleOrigin {
                    path: module,
                    kind: ModuleKind::Module,
                });
            }

            if namespace.is_none() && pkg.is_dir() {
                namespace = Some(ModuleOrigin {
                    path: pkg,
                    kind: ModuleKind::Namespace,
                });
            }
        }

        namespace
    }
}

/// Explicit directories win; otherwise the interpreter is asked.
pub fn search_path(
    runner: &dyn CommandRunner,
    python: &str,
    cwd: &Path,
    explicit: &[PathBuf],
) -> Result<SearchPath> {
    if explicit.is_empty() {
        SearchPath::from_interpreter(runner, python, cwd)
    } else {
        Ok(SearchPath::new(explicit.to_vec()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub origin: ModuleOrigin,
    /// whether `target` had to be added to the search path
    pub appended: bool,
    /// whether a second lookup was needed
    pub retried: bool,
}

/// Locate `package`, adding `target` to the search path (once) if it is not found.
/// The package must end up resolving from inside `target`.
pub fn resolve_with_fallback(
    search: &mut SearchPath,
    package: &str,
    target: &Path,
) -> Result<Resolution> {
    let mut appended = false;
    let mut retried = false;
    let mut found = search.find(package);

    if found.is_none() {
        debug!("'{}' not on search path, adding '{}'", package, target.display());
        appended = search.append(target);
        retried = true;
        found = search.find(package);
    }

    let origin = found.ok_or_else(|| ProvisionError::NotFound {
        package: package.to_string(),
    })?;

    if !origin.is_under(target) {
        return Err(ProvisionError::OutsideExpectedPath {
            package: package.to_string(),
            origin: origin.path,
            expected: target.to_path_buf(),
        });
    }

    Ok(Resolution {
        origin,
        appended,
        retried,
    })
}

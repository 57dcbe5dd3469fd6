//! Lock and install steps run after a successful merge

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ImportError, Result};

/// Warning shown when the manifest changed but nothing was locked.
pub const LOCK_OUT_OF_DATE_WARNING: &str = "poetry.lock is not consistent with pyproject.toml. \
Run `poetry lock [--no-update]` to fix it.";

/// Requested post-merge actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostActions {
    pub lock: bool,
    /// Pass `--no-update` to `poetry lock`
    pub no_update: bool,
    pub install: bool,
}

impl PostActions {
    pub fn needs_lock(&self) -> bool {
        self.lock || self.install
    }
}

/// A step that was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStep {
    Lock { no_update: bool },
    Install,
}

/// Something that can lock and install a Poetry project.
pub trait PackageManager {
    fn lock(&mut self, no_update: bool) -> Result<()>;
    fn install(&mut self) -> Result<()>;
}

/// Runs the `poetry` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct PoetryCli {
    project_dir: PathBuf,
    program: Option<PathBuf>,
}

impl PoetryCli {
    /// `project_dir` is where `poetry` runs, normally the manifest's
    /// directory.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        PoetryCli {
            project_dir: project_dir.into(),
            program: None,
        }
    }

    /// Use the directory containing `manifest_path`.
    pub fn for_manifest(manifest_path: &Path) -> Self {
        let dir = match manifest_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        PoetryCli::new(dir)
    }

    fn program(&mut self) -> Result<PathBuf> {
        if let Some(program) = &self.program {
            return Ok(program.clone());
        }
        let program = which::which("poetry").map_err(|_| {
            ImportError::PostAction("poetry not found in PATH. Install Poetry to use --lock or --install.".to_string())
        })?;
        self.program = Some(program.clone());
        Ok(program)
    }

    fn run(&mut self, args: &[&str]) -> Result<()> {
        let program = self.program()?;
        log::debug!("running poetry {} in {}", args.join(" "), self.project_dir.display());

        let status = Command::new(&program)
            .args(args)
            .current_dir(&self.project_dir)
            .status()
            .map_err(|e| ImportError::PostAction(format!("failed to start {}: {}", program.display(), e)))?;

        if !status.success() {
            return Err(ImportError::PostAction(format!(
                "`poetry {}` failed with {}",
                args.join(" "),
                status
            )));
        }
        Ok(())
    }
}

impl PackageManager for PoetryCli {
    fn lock(&mut self, no_update: bool) -> Result<()> {
        if no_update {
            self.run(&["lock", "--no-update"])
        } else {
            self.run(&["lock"])
        }
    }

    fn install(&mut self) -> Result<()> {
        self.run(&["install"])
    }
}

/// Run the requested actions in order: lock first, then install.
///
/// Installing always locks first. With neither action requested nothing runs
/// and a warning about the stale lock file is logged.
pub fn dispatch(actions: &PostActions, manager: &mut dyn PackageManager) -> Result<Vec<PostStep>> {
    let mut steps = Vec::new();
    if !actions.needs_lock() {
        log::warn!("{}", LOCK_OUT_OF_DATE_WARNING);
        return Ok(steps);
    }

    manager.lock(actions.no_update)?;
    steps.push(PostStep::Lock {
        no_update: actions.no_update,
    });

    if actions.install {
        manager.install()?;
        steps.push(PostStep::Install);
    }
    Ok(steps)
}

//! Hook execution.
//!
//! A hook is a script under the metadata `hooks/` directory, executed with no
//! arguments and the environment augmented with `RVS_DIR` pointing at the
//! metadata directory. A nonzero exit from `pre-commit` aborts the commit;
//! `post-commit` is advisory.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PreCommit,
    PostCommit,
}

impl HookKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PreCommit => "pre-commit",
            Self::PostCommit => "post-commit",
        }
    }
}

pub struct HookResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl HookResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn skipped() -> Self {
        Self {
            exit_code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }
}

pub struct HookRunner {
    hooks_dir: PathBuf,
    meta_dir: PathBuf,
    work_dir: PathBuf,
}

impl HookRunner {
    /// Create a runner for a repository. Hooks live under the shared
    /// metadata directory so all worktrees see the same hooks.
    pub fn new(repo: &Repository) -> Self {
        Self {
            hooks_dir: repo.common_dir().join("hooks"),
            meta_dir: repo.common_dir().to_path_buf(),
            work_dir: repo.work_dir().to_path_buf(),
        }
    }

    /// Resolve the script path for a hook, preferring the `.bat` variant on
    /// Windows. Returns `None` when no runnable hook is installed.
    fn hook_path(&self, hook: HookKind) -> Option<PathBuf> {
        let base = self.hooks_dir.join(hook.name());

        #[cfg(windows)]
        {
            let bat = self.hooks_dir.join(format!("{}.bat", hook.name()));
            if bat.is_file() {
                return Some(bat);
            }
        }

        if !base.is_file() {
            return None;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let executable = std::fs::metadata(&base)
                .map(|m| m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false);
            if !executable {
                return None;
            }
        }

        Some(base)
    }

    /// Execute a hook. A missing or non-executable hook counts as success.
    pub fn run(&self, hook: HookKind) -> Result<HookResult, std::io::Error> {
        let Some(path) = self.hook_path(hook) else {
            return Ok(HookResult::skipped());
        };

        let output = Command::new(&path)
            .current_dir(&self.work_dir)
            .env("RVS_DIR", &self.meta_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(HookResult {
            exit_code: output.status.code().unwrap_or(128),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

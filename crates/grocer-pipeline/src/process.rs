//! Invocation of the external scraper and parser processes.
//!
//! Both collaborators are node scripts launched in a configured working
//! directory. They report only an exit status; what they produced has to be
//! discovered afterwards on the filesystem.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PipelineError;

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub timeout: Option<Duration>,
}

/// Captured result of a finished (or timed-out) process.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal or timed out.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Human-readable failure detail: stderr when present, otherwise a generic note.
    #[must_use]
    pub fn failure_detail(&self) -> String {
        if self.timed_out {
            return "process timed out".to_string();
        }
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            match self.exit_code {
                Some(code) => format!("Unknown error (exit code {code})"),
                None => "Unknown error".to_string(),
            }
        } else {
            stderr.to_string()
        }
    }
}

/// Runs external commands to completion.
///
/// [`TokioCommandRunner`] spawns real processes; tests substitute a runner
/// that writes the artifacts a real parser would.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `invocation` and waits for it to exit.
    ///
    /// A non-zero exit is reported through [`CommandOutput`], not as an error.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PipelineError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PipelineError> {
        let child = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PipelineError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let wait = child.wait_with_output();
        let output = match invocation.timeout {
            Some(limit) => {
                if let Ok(result) = tokio::time::timeout(limit, wait).await {
                    result
                } else {
                    // Dropping the wait future drops the child, which kills it.
                    tracing::warn!(
                        program = %invocation.program,
                        args = ?invocation.args,
                        timeout_secs = limit.as_secs(),
                        "external process timed out; killed"
                    );
                    return Ok(CommandOutput {
                        timed_out: true,
                        ..CommandOutput::default()
                    });
                }
            }
            None => wait.await,
        }
        .map_err(|source| PipelineError::Wait {
            program: invocation.program.clone(),
            source,
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            timed_out: false,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Where the external scripts live and how to launch them.
#[derive(Debug, Clone)]
pub struct ExternalTools {
    pub program: String,
    pub workdir: PathBuf,
    pub parser_script: PathBuf,
    pub scraper_script: PathBuf,
    pub timeout: Option<Duration>,
}

impl ExternalTools {
    /// `<program> <scraper_script> <product> <location>`
    #[must_use]
    pub fn scrape(&self, product: &str, location: &str) -> Invocation {
        self.invocation(vec![
            self.scraper_script.to_string_lossy().into_owned(),
            product.to_string(),
            location.to_string(),
        ])
    }

    /// `<program> <parser_script> <target>`; `target` may be a file or a directory.
    #[must_use]
    pub fn parse(&self, target: &Path) -> Invocation {
        self.invocation(vec![
            self.parser_script.to_string_lossy().into_owned(),
            target.to_string_lossy().into_owned(),
        ])
    }

    #[must_use]
    pub fn parser_path(&self) -> PathBuf {
        self.workdir.join(&self.parser_script)
    }

    #[must_use]
    pub fn scraper_path(&self) -> PathBuf {
        self.workdir.join(&self.scraper_script)
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        Invocation {
            program: self.program.clone(),
            args,
            workdir: self.workdir.clone(),
            timeout: self.timeout,
        }
    }
}

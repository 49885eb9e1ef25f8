use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use tokio::{process::Command, runtime::Handle, task::JoinHandle};
use tracing::{debug, error, warn};

use crate::config::CaptureConfig;
use crate::events::{CaptureEvent, EventSink};
use crate::process;
use crate::AnalysisError;

/// How a completed analysis run went.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Exit status zero; captured stdout.
    Success { lines: Vec<String> },
    /// Non-zero (or missing) exit status; captured stderr.
    Failure {
        exit_code: Option<i32>,
        lines: Vec<String>,
    },
}

/// Runs the external analysis over the shop log as `<command> <script> <log>`.
#[derive(Debug, Clone)]
pub struct AnalysisRunner {
    command: PathBuf,
    script: PathBuf,
    working_dir: PathBuf,
    runtime: Option<Handle>,
}

impl AnalysisRunner {
    pub fn new(
        command: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            command: command.into(),
            script: script.into(),
            working_dir: working_dir.into(),
            runtime: None,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(
            config.analysis_command.clone(),
            config.analysis_script_path(),
            config.resolved_data_dir(),
        )
    }

    /// Pins background runs to `handle` instead of the ambient runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Runs the analysis to completion.
    pub async fn run(&self, log_path: &Path) -> Result<AnalysisOutcome, AnalysisError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(&self.script)
            .arg(log_path)
            .current_dir(&self.working_dir);

        debug!(
            command = %self.command.display(),
            script = %self.script.display(),
            "running analysis"
        );
        let output = process::run_command(cmd, &self.command).await?;

        if output.status.success() {
            Ok(AnalysisOutcome::Success {
                lines: process::output_lines(&output.stdout),
            })
        } else {
            Ok(AnalysisOutcome::Failure {
                exit_code: output.status.code(),
                lines: process::output_lines(&output.stderr),
            })
        }
    }

    /// Starts a detached run that reports through `events`.
    ///
    /// Returns `None` without reporting anything when the script is absent.
    /// Failures to start or await the process surface as
    /// [`CaptureEvent::AnalysisErrored`] and never reach the caller.
    pub fn trigger(&self, log_path: &Path, events: Arc<dyn EventSink>) -> Option<JoinHandle<()>> {
        if !self.script.exists() {
            warn!(
                script = %self.script.display(),
                "analysis script not found, skipping analysis"
            );
            return None;
        }

        let Some(handle) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            error!("no tokio runtime available, skipping analysis");
            events.emit(CaptureEvent::AnalysisErrored {
                message: AnalysisError::NoRuntime.to_string(),
            });
            return None;
        };

        let runner = self.clone();
        let log_path = log_path.to_path_buf();
        Some(handle.spawn(async move {
            match runner.run(&log_path).await {
                Ok(outcome) => events.emit(CaptureEvent::AnalysisFinished { outcome }),
                Err(err) => {
                    error!(error = %err, "an error occurred while running the analysis");
                    events.emit(CaptureEvent::AnalysisErrored {
                        message: err.to_string(),
                    });
                }
            }
        }))
    }
}

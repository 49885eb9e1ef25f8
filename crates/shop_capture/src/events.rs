use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::analysis::AnalysisOutcome;

/// User-facing notifications. The host decides how and where to render them.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CaptureEvent {
    RecordLogged {
        item: String,
        owner: String,
        count: u32,
        threshold: u32,
    },
    ThresholdReached {
        threshold: u32,
    },
    AnalysisFinished {
        outcome: AnalysisOutcome,
    },
    AnalysisErrored {
        message: String,
    },
}

impl CaptureEvent {
    /// Plain chat lines for hosts that render events as text.
    pub fn render_lines(&self) -> Vec<String> {
        match self {
            CaptureEvent::RecordLogged {
                item,
                owner,
                count,
                threshold,
            } => vec![format!("Logged shop: {item} by {owner} ({count}/{threshold})")],
            CaptureEvent::ThresholdReached { threshold } => {
                vec![format!("Logged {threshold} shops. Running analysis script...")]
            }
            CaptureEvent::AnalysisFinished { outcome } => {
                let mut out = vec!["Analysis script finished.".to_string()];
                match outcome {
                    AnalysisOutcome::Success { lines } => {
                        out.push("Analysis Result:".to_string());
                        out.extend(lines.iter().cloned());
                    }
                    AnalysisOutcome::Failure { exit_code, lines } => {
                        let code = exit_code
                            .map(|code| code.to_string())
                            .unwrap_or_else(|| "none".to_string());
                        out.push(format!("Analysis script failed (code {code}):"));
                        if lines.is_empty() {
                            out.push("No error output was captured.".to_string());
                        } else {
                            out.extend(lines.iter().cloned());
                        }
                    }
                }
                out
            }
            CaptureEvent::AnalysisErrored { .. } => vec![
                "An unexpected error occurred running the analysis script. Check logs.".to_string(),
            ],
        }
    }
}

/// Receives events from the line path and from background analysis runs.
///
/// Implementations must not block; anything that touches presentation state
/// belongs on the host's side of the sink.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: CaptureEvent);
}

impl EventSink for UnboundedSender<CaptureEvent> {
    fn emit(&self, event: CaptureEvent) {
        if self.send(event).is_err() {
            debug!("event receiver dropped; discarding capture event");
        }
    }
}

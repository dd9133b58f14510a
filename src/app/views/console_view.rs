use serde_json::json;
use std::io::Write;
use tracing::warn;
use uuid::Uuid;

use crate::common::FileDescriptor;
use crate::intake::RejectionReason;
use crate::pipeline::orchestration::PipelineObserver;
use crate::pipeline::types::{AnalysisReport, DetectionResult, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders session notifications to a terminal or any other writer.
pub struct ConsoleView<W: Write + Send> {
    out: W,
    format: OutputFormat,
}

impl<W: Write + Send> ConsoleView<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!("Failed to write console output: {}", e);
        }
    }

    fn render_text(&mut self, file: &FileDescriptor, result: &DetectionResult, verdict: Verdict) {
        self.emit(&format!("{}: {}", file.name(), verdict.headline()));
        self.emit(&format!(
            "  model: {}  processing time: {:.1}s",
            result.model_used, result.processing_time_seconds
        ));
        for frame in &result.frame_analysis {
            let anomalies = if frame.anomalies.is_empty() {
                "-".to_string()
            } else {
                frame.anomalies.join(", ")
            };
            self.emit(&format!(
                "  frame {:>4} @ {:>4.1}s  {:>5.1}%  {}",
                frame.frame_index, frame.timestamp_seconds, frame.confidence, anomalies
            ));
        }
    }
}

impl<W: Write + Send> PipelineObserver for ConsoleView<W> {
    fn on_rejected(&mut self, file: &FileDescriptor, reason: RejectionReason) {
        match self.format {
            OutputFormat::Text => self.emit(&format!("{}: rejected, {}", file.name(), reason)),
            OutputFormat::Json => {
                let value = json!({ "file": file, "rejected": reason });
                self.emit(&value.to_string());
            }
        }
    }

    fn on_progress(&mut self, _run_id: Uuid, percent: u8, label: &str) {
        if self.format == OutputFormat::Text {
            self.emit(&format!("[{:>3}%] {}", percent, label));
        }
    }

    fn on_completed(&mut self, file: &FileDescriptor, result: &DetectionResult, verdict: Verdict) {
        match self.format {
            OutputFormat::Text => self.render_text(file, result, verdict),
            OutputFormat::Json => {
                let report = AnalysisReport::new(file.clone(), result.clone());
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => self.emit(&json),
                    Err(e) => warn!("Failed to serialize report for '{}': {}", file.name(), e),
                }
            }
        }
    }
}

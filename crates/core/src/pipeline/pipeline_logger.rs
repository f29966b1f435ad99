use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use crate::error::ScrubError;

/// Cross-cutting logger for batch orchestration events.
///
/// Decouples the folder use case from specific output mechanisms (stdout,
/// log crate, test capture) so each caller can observe progress without
/// changing the orchestration code.
pub trait PipelineLogger: Send {
    /// One file went through load, detect, redact and save.
    fn file_processed(&mut self, input: &Path, output: &Path, faces: usize);

    /// One file was skipped because of a per-file error.
    fn file_failed(&mut self, input: &Path, error: &ScrubError);

    /// Record how long a named pipeline stage took for one file.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn file_processed(&mut self, _input: &Path, _output: &Path, _faces: usize) {}
    fn file_failed(&mut self, _input: &Path, _error: &ScrubError) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
}

/// CLI-oriented logger.
///
/// Prints one progress line per processed file to stdout, reports failures
/// through `log`, and keeps per-stage timings for an end-of-batch summary.
pub struct StdoutPipelineLogger {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    processed: usize,
    failed: usize,
    faces: usize,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            processed: 0,
            failed: 0,
            faces: 0,
        }
    }

    /// The progress line printed for a processed file.
    pub fn progress_line(input: &Path, output: &Path) -> String {
        format!(
            "Face removed from {} and saved to {}",
            input.display(),
            output.display()
        )
    }

    /// Returns the formatted summary string, or `None` if nothing happened.
    pub fn summary_string(&self) -> Option<String> {
        if self.processed == 0 && self.failed == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Batch summary ({} processed, {} failed, {} faces, {:.1}s total):",
            self.processed,
            self.failed,
            self.faces,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:7.1}ms  total {total_ms:8.0}ms"
            ));
        }

        Some(lines.join("\n"))
    }

    /// Returns the timing data for a given stage.
    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn file_processed(&mut self, input: &Path, output: &Path, faces: usize) {
        self.processed += 1;
        self.faces += faces;
        println!("{}", Self::progress_line(input, output));
        log::debug!("{}: {faces} face(s)", input.display());
    }

    fn file_failed(&mut self, input: &Path, error: &ScrubError) {
        self.failed += 1;
        log::warn!("Skipping {}: {error}", input.display());
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

use std::path::PathBuf;

use crate::error::ScrubError;

#[derive(Debug)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub faces: usize,
}

#[derive(Debug)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: ScrubError,
}

/// Outcome of one folder run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn total_faces(&self) -> usize {
        self.processed.iter().map(|p| p.faces).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

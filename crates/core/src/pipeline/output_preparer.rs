use std::fs;
use std::path::Path;

use crate::error::ScrubError;

/// Creates `output_dir` and any missing parents. Existing directories are fine.
pub fn prepare(output_dir: &Path) -> Result<(), ScrubError> {
    fs::create_dir_all(output_dir).map_err(|e| ScrubError::OutputDirectoryUnwritable {
        path: output_dir.to_path_buf(),
        source: e,
    })
}

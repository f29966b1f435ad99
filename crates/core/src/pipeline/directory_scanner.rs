use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScrubError;
use crate::shared::constants::IMAGE_SUFFIXES;

/// A supported image file found directly inside the input folder.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileEntry {
    pub file_name: String,
    pub path: PathBuf,
}

/// True when `file_name` ends in one of the supported suffixes.
///
/// The match is case-sensitive: `photo.PNG` is not picked up.
pub fn is_supported(file_name: &str) -> bool {
    IMAGE_SUFFIXES.iter().any(|suffix| file_name.ends_with(suffix))
}

/// Lists supported image files in `input_dir`, sorted by name.
///
/// Not recursive. Subdirectories and non-UTF-8 names are skipped.
pub fn scan(input_dir: &Path) -> Result<Vec<FileEntry>, ScrubError> {
    let read_dir = fs::read_dir(input_dir).map_err(|e| ScrubError::InputNotFound {
        path: input_dir.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", input_dir.display());
                continue;
            }
        };
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            log::debug!("Skipping non-UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if !is_supported(&file_name) {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            log::debug!("Skipping {}: not a regular file", path.display());
            continue;
        }
        entries.push(FileEntry { file_name, path });
    }

    entries.sort();
    log::debug!(
        "Found {} image(s) in {}",
        entries.len(),
        input_dir.display()
    );
    Ok(entries)
}

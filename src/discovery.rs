//! Capture file discovery.
//!
//! The acquisition system writes one `baseband_<event>_<freq>.data` file per
//! frequency into a single capture directory; discovery lists that directory
//! without descending into subdirectories.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const CAPTURE_PREFIX: &str = "baseband_";
const CAPTURE_SUFFIX: &str = ".data";

/// Whether a file name looks like a raw baseband capture.
pub fn is_capture_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };

    name.len() >= CAPTURE_PREFIX.len() + CAPTURE_SUFFIX.len()
        && name.starts_with(CAPTURE_PREFIX)
        && name.ends_with(CAPTURE_SUFFIX)
}

/// Discover capture files directly inside `input_dir`.
///
/// A missing directory is reported but not fatal: the scan yields zero files
/// and the run completes as a visible no-op. File order is whatever the
/// directory listing yields.
pub fn discover_captures(input_dir: &Path) -> Vec<PathBuf> {
    if !input_dir.is_dir() {
        warn!("Input directory not found: {:?}", input_dir);
        warn!(
            "Pass the full capture directory path, \
             e.g. /data/baseband_raw/baseband_raw_20211020160923"
        );
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !is_capture_file(path) {
            continue;
        }

        debug!("Discovered capture: {:?}", path);
        files.push(path.to_path_buf());
    }

    files
}

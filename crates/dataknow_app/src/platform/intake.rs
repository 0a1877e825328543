use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use dataknow_core::CandidateFile;

/// Turns command-line paths into intake candidates. File contents are never read.
pub fn candidates_from_paths<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Vec<CandidateFile>> {
    paths
        .iter()
        .map(|path| candidate(path.as_ref()))
        .collect()
}

fn candidate(path: &Path) -> anyhow::Result<CandidateFile> {
    let meta =
        fs::metadata(path).with_context(|| format!("reading metadata of {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(CandidateFile::new(name, meta.len()))
}

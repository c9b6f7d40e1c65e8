//! Artifact persistence.
//!
//! Generation never touches the filesystem; callers use these helpers to
//! store what it returns.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GenerationError, Result};
use crate::types::EncodedArtifact;

/// Writes the artifact bytes to `path`, replacing any existing file.
///
/// # Example
///
/// ```ignore
/// use synthimg::encode::write_artifact;
///
/// write_artifact(&artifact, Path::new("/tmp/random-image.jpg"))?;
/// ```
pub fn write_artifact(artifact: &EncodedArtifact, path: &Path) -> Result<()> {
    fs::write(path, &artifact.bytes)
        .map_err(|e| GenerationError::output_write_failed(path.display(), e))
}

/// Writes the artifact into `dir` under [`EncodedArtifact::file_name`].
///
/// Creates `dir` if it does not exist. Returns the full path written.
pub fn write_artifact_to_dir(artifact: &EncodedArtifact, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| GenerationError::output_write_failed(dir.display(), e))?;

    let path = dir.join(artifact.file_name());
    write_artifact(artifact, &path)?;
    Ok(path)
}

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

/// Directory holding uploaded images under their client file names.
///
/// A later upload with the same name replaces the earlier file. Writes land
/// in a temporary file first and are renamed into place, so concurrent
/// uploads of one name leave exactly one whole file behind.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create uploads directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `bytes` under the final path component of `file_name`.
    pub fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = sanitize_file_name(file_name)?;
        let target = self.dir.join(name);

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed to create temp file in {}", self.dir.display()))?;
        tmp.write_all(bytes)
            .with_context(|| format!("failed to write upload {name}"))?;
        tmp.persist(&target)
            .with_context(|| format!("failed to store upload: {}", target.display()))?;

        Ok(target)
    }
}

/// Reduce a client-supplied name to a bare file name.
///
/// Browsers on Windows may send `C:\Users\..\photo.png`, so both separators
/// are stripped.
fn sanitize_file_name(raw: &str) -> Result<&str> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        bail!("unusable upload file name: {raw:?}");
    }
    Ok(name)
}

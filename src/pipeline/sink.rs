// ABOUTME: Output sinks - write a task result verbatim to a file, creating
// ABOUTME: parent directories and overwriting any previous content.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::SinkError;

/// Resolve a sink path; relative paths are placed under `root` when given.
pub fn resolve(root: Option<&Path>, path: &Path) -> PathBuf {
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

/// Write `contents` to `path`, replacing the file if it exists.
pub async fn write(path: &Path, contents: &str) -> Result<(), SinkError> {
    let wrap = |source| SinkError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(wrap)?;
    }

    let mut file = tokio::fs::File::create(path).await.map_err(wrap)?;
    file.write_all(contents.as_bytes()).await.map_err(wrap)?;
    file.flush().await.map_err(wrap)?;
    Ok(())
}

//! Plain-text file reads for the `/read` endpoint.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Path is outside the workspace: {0}")]
    OutsideRoot(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a text file. Relative paths resolve against `root`; with `confine`
/// the resolved path must stay inside `root` (symlinks are followed first).
pub async fn read_text(root: &Path, path: &str, confine: bool) -> Result<String, ReadError> {
    let requested = Path::new(path);
    let full = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };

    let resolved = match tokio::fs::canonicalize(&full).await {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ReadError::NotFound(full)),
        Err(source) => return Err(ReadError::Io { path: full, source }),
    };

    if confine {
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|source| ReadError::Io {
                path: root.to_path_buf(),
                source,
            })?;
        if !resolved.starts_with(&root) {
            return Err(ReadError::OutsideRoot(resolved));
        }
    }

    tokio::fs::read_to_string(&resolved)
        .await
        .map_err(|source| ReadError::Io {
            path: resolved,
            source,
        })
}

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use thiserror::Error;
use tokio::fs;

type Result<T> = std::result::Result<T, StorageError>;

/// Directory that uploaded test reports are written into.
#[derive(Clone, Debug)]
pub struct ReportStore {
    dir: Utf8PathBuf,
}

#[derive(Error, Diagnostic, Debug)]
pub enum StorageError {
    #[error("invalid report filename {0:?}")]
    #[diagnostic(code(ht::error::filename))]
    InvalidFilename(String),
    #[error("failed to create reports directory {path}: {source}")]
    #[diagnostic(code(ht::error::io))]
    CreateDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report {path}: {source}")]
    #[diagnostic(code(ht::error::io))]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, StorageError::InvalidFilename(_))
    }
}

impl ReportStore {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Creates the reports directory if it is missing. Returns `true` if it had
    /// to be created.
    pub async fn ensure_dir(&self) -> Result<bool> {
        match fs::metadata(&self.dir).await {
            Ok(metadata) if metadata.is_dir() => Ok(false),
            _ => {
                fs::create_dir_all(&self.dir)
                    .await
                    .map_err(|source| StorageError::CreateDir {
                        path: self.dir.clone(),
                        source,
                    })?;
                tracing::debug!(path = self.dir.as_str(), "created reports directory");
                Ok(true)
            }
        }
    }

    /// Writes `contents` to `<dir>/<filename>`, replacing any earlier report with
    /// the same name.
    pub async fn save(&self, filename: &str, contents: &[u8]) -> Result<Utf8PathBuf> {
        let filename = validate_filename(filename)?;
        self.ensure_dir().await?;

        let path = self.dir.join(filename);
        fs::write(&path, contents)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = path.as_str(), bytes = contents.len(), "report saved");

        Ok(path)
    }
}

/// Accepts a bare file name only. Anything that could resolve outside the
/// reports directory is rejected.
pub fn validate_filename(filename: &str) -> Result<&str> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);

    if invalid {
        Err(StorageError::InvalidFilename(filename.to_string()))
    } else {
        Ok(filename)
    }
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{ReportArtifact, ReportError, ReportFormat};

/// Owns the on-disk lifecycle of generated reports. Each file-producing
/// request gets its own `<root>/<id>/` directory, so two requests for the same
/// code never write the same path. Nothing is removed until the caller asks.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn init(&self) -> Result<(), ReportError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Creates a fresh directory for one report.
    pub async fn allocate(&self) -> Result<(Uuid, PathBuf), ReportError> {
        let id = Uuid::new_v4();
        let dir = self.root.join(id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok((id, dir))
    }

    /// Allocates a directory and fills it with `write` on the blocking pool.
    /// The directory is removed again when writing fails, since its id never
    /// reaches a caller who could delete it.
    pub async fn create<F>(
        &self,
        format: ReportFormat,
        write: F,
    ) -> Result<ReportArtifact, ReportError>
    where
        F: FnOnce(&Path) -> Result<PathBuf, ReportError> + Send + 'static,
    {
        let (id, dir) = self.allocate().await?;

        let written = tokio::task::spawn_blocking(move || write(&dir))
            .await
            .map_err(|e| ReportError::Io(std::io::Error::other(e)))
            .and_then(|result| result);

        match written {
            Ok(path) => Ok(ReportArtifact { id, format, path }),
            Err(err) => {
                match self.remove(id).await {
                    Ok(()) | Err(ReportError::NotFound(_)) => {}
                    Err(cleanup) => {
                        tracing::warn!(
                            report.id = %id,
                            error = %cleanup,
                            "Failed to clean up report directory"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    #[tracing::instrument(name = "artifact find", skip(self))]
    pub async fn find(&self, id: Uuid) -> Result<ReportArtifact, ReportError> {
        let dir = self.root.join(id.to_string());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ReportError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ReportFormat::from_extension);
            if let Some(format) = format {
                return Ok(ReportArtifact { id, format, path });
            }
        }

        Err(ReportError::NotFound(id.to_string()))
    }

    #[tracing::instrument(name = "artifact remove", skip(self))]
    pub async fn remove(&self, id: Uuid) -> Result<(), ReportError> {
        let dir = self.root.join(id.to_string());
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::info!(report.id = %id, "Report removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ReportError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

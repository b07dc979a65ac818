use std::path::{Path, PathBuf};
use async_trait::async_trait;
use crate::error::{Error, Result};
use crate::interfaces::MetricsSink;
use crate::persistence::batch::ExportBatch;
use crate::ranking::RestorePoint;
use tokio::fs as async_fs;

/// Snapshot Store - Persists export batches to a local directory
///
/// ## Format
/// - **Serialization**: `bincode`
/// - **Checksum**: SHA-256 over the batch contents, verified on load
/// - **Naming Convention**: `export_{exported_at_ms}.bin`
/// - **Line protocol**: a sibling `export_{exported_at_ms}.lp` holds the
///   same points as InfluxDB line protocol for external loaders
///
/// ## Retention Policy
/// - **Max Snapshots**: `max_snapshots` batches (default 96)
/// - **Cleanup Strategy**: FIFO - oldest batches deleted after each save
///
/// ## Atomicity
/// - **Write**: data goes to a `.tmp` file which is then renamed
/// - **Read**: a corrupt or unreadable latest batch falls back to the
///   previous one
pub struct SnapshotStore {
    directory: PathBuf,
    max_snapshots: usize,
}

impl SnapshotStore {
    pub fn new(directory: impl AsRef<Path>, max_snapshots: usize) -> Self {
        SnapshotStore {
            directory: directory.as_ref().to_path_buf(),
            max_snapshots: max_snapshots.max(1),
        }
    }

    /// Save batch to disk
    pub async fn save(&self, batch: &ExportBatch) -> Result<PathBuf> {
        async_fs::create_dir_all(&self.directory).await?;

        let stem = format!("export_{}", batch.exported_at.as_millis());
        let filepath = self.directory.join(format!("{}.bin", stem));
        let temp_path = self.directory.join(format!("{}.bin.tmp", stem));

        let data = bincode::serialize(batch)
            .map_err(|e| Error::SerializationError(e.to_string()))?;

        async_fs::write(&temp_path, data).await?;

        // The batch only becomes visible to restore once its line protocol
        // sibling is on disk.
        let lines = batch.to_line_protocol();
        if !lines.is_empty() {
            let line_path = self.directory.join(format!("{}.lp", stem));
            if let Err(e) = async_fs::write(&line_path, lines).await {
                let _ = async_fs::remove_file(&temp_path).await;
                return Err(Error::IoError(e));
            }
        }
        async_fs::rename(&temp_path, &filepath).await?;

        tracing::info!("Saved export of {} symbols to {:?}", batch.points.len(), filepath);

        if let Err(e) = self.cleanup_old_snapshots().await {
            tracing::warn!("Export retention cleanup failed: {}", e);
        }
        Ok(filepath)
    }

    /// Load the newest batch that passes its checksum
    pub async fn load_latest_batch(&self) -> Result<ExportBatch> {
        let snapshots = self.list_snapshots().await?;

        for path in snapshots.iter().rev() {
            match self.load_batch(path).await {
                Ok(batch) => return Ok(batch),
                Err(e) => tracing::warn!("Skipping unreadable export {:?}: {}", path, e),
            }
        }

        Err(Error::NoSnapshotFound)
    }

    async fn load_batch(&self, filepath: &Path) -> Result<ExportBatch> {
        let data = async_fs::read(filepath).await?;

        let batch: ExportBatch = bincode::deserialize(&data)
            .map_err(|e| Error::DeserializationError(e.to_string()))?;

        if !batch.verify_checksum() {
            return Err(Error::InvalidChecksum);
        }

        tracing::info!("Loaded export from {:?}", filepath);
        Ok(batch)
    }

    /// All saved batches, oldest first
    async fn list_snapshots(&self) -> Result<Vec<PathBuf>> {
        let mut snapshots = Vec::new();

        let mut entries = match async_fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(snapshots),
            Err(e) => return Err(Error::IoError(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if snapshot_millis(&path).is_some() {
                snapshots.push(path);
            }
        }

        snapshots.sort_by_key(|path| snapshot_millis(path).unwrap_or(0));
        Ok(snapshots)
    }

    /// Cleanup old batches, keeping only the most recent N
    async fn cleanup_old_snapshots(&self) -> Result<()> {
        let snapshots = self.list_snapshots().await?;

        if snapshots.len() <= self.max_snapshots {
            return Ok(());
        }

        let to_delete = snapshots.len() - self.max_snapshots;
        for snapshot_path in snapshots.iter().take(to_delete) {
            async_fs::remove_file(snapshot_path).await?;
            let line_path = snapshot_path.with_extension("lp");
            if let Err(e) = async_fs::remove_file(&line_path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(Error::IoError(e));
                }
            }

            tracing::info!("Deleted old export: {:?}", snapshot_path);
        }

        Ok(())
    }
}

/// `export_<millis>.bin` -> millis
fn snapshot_millis(path: &Path) -> Option<u64> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|s| s.strip_prefix("export_"))
        .and_then(|s| s.strip_suffix(".bin"))
        .and_then(|s| s.parse::<u64>().ok())
}

#[async_trait]
impl MetricsSink for SnapshotStore {
    async fn write_batch(&self, batch: &ExportBatch) -> Result<()> {
        self.save(batch)
            .await
            .map(|_| ())
            .map_err(|e| Error::PersistenceError(e.to_string()))
    }

    async fn load_latest(&self) -> Result<Vec<RestorePoint>> {
        match self.load_latest_batch().await {
            Ok(batch) => Ok(batch.restore_points()),
            Err(Error::NoSnapshotFound) => Err(Error::NoSnapshotFound),
            Err(e) => Err(Error::PersistenceError(e.to_string())),
        }
    }
}

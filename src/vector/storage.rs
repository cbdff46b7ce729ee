use anyhow::{anyhow, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::vector::config::VectorConfig;
use crate::vector::records::{discover_media, FileRecord};
use crate::vector::types::{ImportReport, MediaKind};
use crate::TARGET_VECTOR;

/// Produces the vector for a media file. Supplied by the deployment; the
/// multimodal model is not part of this crate.
#[async_trait]
pub trait MediaEmbedder: Send + Sync {
    async fn embed(&self, record: &FileRecord, bytes: &[u8]) -> Result<Vec<f32>>;
}

/// Destination of point batches.
#[async_trait]
pub trait PointWriter: Send + Sync {
    async fn upsert(&self, collection: &str, points: Vec<PointStruct>) -> Result<()>;
}

#[async_trait]
impl PointWriter for Qdrant {
    async fn upsert(&self, collection: &str, points: Vec<PointStruct>) -> Result<()> {
        self.upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await?;
        Ok(())
    }
}

/// Create the collection for `kind` unless it already exists.
/// Returns whether a new collection was created.
pub async fn define_collection(client: &Qdrant, kind: MediaKind, dimensions: u64) -> Result<bool> {
    let name = kind.collection_name();
    if client.collection_exists(name).await? {
        info!(target: TARGET_VECTOR, "Collection {} already exists", name);
        return Ok(false);
    }

    client
        .create_collection(
            CreateCollectionBuilder::new(name)
                .vectors_config(VectorParamsBuilder::new(dimensions, Distance::Cosine)),
        )
        .await?;
    info!(target: TARGET_VECTOR, "Created collection {} ({}, {} dimensions)", name, kind.description(), dimensions);
    Ok(true)
}

/// Build the point for one file: metadata, embedding and deterministic id.
pub async fn build_point(
    path: &Path,
    kind: MediaKind,
    embedder: &dyn MediaEmbedder,
) -> Result<PointStruct> {
    let record = FileRecord::from_path(path, kind)?;
    let bytes = tokio::fs::read(path).await?;
    let vector = embedder.embed(&record, &bytes).await?;
    if vector.is_empty() {
        return Err(anyhow!("embedder returned an empty vector"));
    }
    let payload = Payload::try_from(record.payload())
        .map_err(|e| anyhow!("invalid payload for {}: {}", record.filename, e))?;
    Ok(PointStruct::new(
        record.point_id().to_string(),
        vector,
        payload,
    ))
}

/// Store every matching file of `dir` in the collection for `kind`.
///
/// Extensions and batch size come from `config`. A file that cannot be read
/// or embedded, or whose batch is rejected, is listed in the report's
/// failures; the remaining files are still written.
pub async fn import_media(
    writer: &dyn PointWriter,
    embedder: &dyn MediaEmbedder,
    kind: MediaKind,
    dir: &Path,
    config: &VectorConfig,
) -> Result<ImportReport> {
    let files = discover_media(dir, &config.extensions_for(kind))?;
    let collection = kind.collection_name();
    let mut report = ImportReport {
        attempted: files.len(),
        ..Default::default()
    };
    info!(target: TARGET_VECTOR, "Importing {} files from {} into {}", files.len(), dir.display(), collection);

    for chunk in files.chunks(config.batch_size.max(1)) {
        let mut points = Vec::with_capacity(chunk.len());
        let mut paths: Vec<PathBuf> = Vec::with_capacity(chunk.len());

        for path in chunk {
            match build_point(path, kind, embedder).await {
                Ok(point) => {
                    points.push(point);
                    paths.push(path.clone());
                }
                Err(e) => {
                    warn!(target: TARGET_VECTOR, "Skipping {}: {:#}", path.display(), e);
                    report.fail(path.clone(), format!("{:#}", e));
                }
            }
        }

        if points.is_empty() {
            continue;
        }

        match writer.upsert(collection, points).await {
            Ok(()) => report.stored.extend(paths),
            Err(e) => {
                error!(target: TARGET_VECTOR, "Batch of {} files rejected by {}: {:#}", paths.len(), collection, e);
                let message = format!("batch write failed: {:#}", e);
                for path in paths {
                    report.fail(path, &message);
                }
            }
        }
    }

    info!(
        target: TARGET_VECTOR,
        "{} insertions complete, {} errors within",
        report.stored.len(),
        report.failures.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::point_id::PointIdOptions;
    use std::sync::Mutex;

    struct LengthEmbedder;

    #[async_trait]
    impl MediaEmbedder for LengthEmbedder {
        async fn embed(&self, record: &FileRecord, bytes: &[u8]) -> Result<Vec<f32>> {
            if record.filename.starts_with("corrupt") {
                return Err(anyhow!("cannot decode {}", record.filename));
            }
            Ok(vec![bytes.len() as f32, 1.0, 0.0])
        }
    }

    #[derive(Default)]
    struct MemoryWriter {
        batches: Mutex<Vec<(String, Vec<String>)>>,
        reject_batch: Option<usize>,
    }

    #[async_trait]
    impl PointWriter for MemoryWriter {
        async fn upsert(&self, collection: &str, points: Vec<PointStruct>) -> Result<()> {
            let mut batches = self.batches.lock().unwrap();
            if Some(batches.len()) == self.reject_batch {
                batches.push((collection.to_string(), Vec::new()));
                return Err(anyhow!("service unavailable"));
            }
            let ids = points
                .iter()
                .filter_map(|p| match p.id.as_ref()?.point_id_options.as_ref()? {
                    PointIdOptions::Uuid(uuid) => Some(uuid.clone()),
                    PointIdOptions::Num(n) => Some(n.to_string()),
                })
                .collect();
            batches.push((collection.to_string(), ids));
            Ok(())
        }
    }

    fn media_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"frames").unwrap();
        }
        dir
    }

    fn batches_of(batch_size: usize) -> VectorConfig {
        VectorConfig {
            batch_size,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_import_reports_per_item_failures() {
        let dir = media_dir(&["a.mp4", "corrupt.mp4", "c.mp4", "notes.txt"]);
        let writer = MemoryWriter::default();

        let report = import_media(&writer, &LengthEmbedder, MediaKind::Video, dir.path(), &batches_of(2))
            .await
            .unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.stored.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("corrupt.mp4"));
        assert!(report.has_errors());

        // "corrupt.mp4" sorts last and is alone in the second chunk, which is skipped
        let batches = writer.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].0, "videos");
        assert_eq!(batches[0].1.len(), 2);
    }

    #[tokio::test]
    async fn test_reimport_uses_same_ids() {
        let dir = media_dir(&["a.mp4"]);
        let writer = MemoryWriter::default();
        for _ in 0..2 {
            import_media(&writer, &LengthEmbedder, MediaKind::Video, dir.path(), &batches_of(8))
                .await
                .unwrap();
        }
        let batches = writer.batches.lock().unwrap();
        assert_eq!(batches[0].1, batches[1].1);
        assert_eq!(
            batches[0].1,
            vec![crate::vector::records::point_id("a.mp4").to_string()]
        );
    }

    #[tokio::test]
    async fn test_rejected_batch_marks_only_its_items() {
        let dir = media_dir(&["a.mp4", "b.mp4", "c.mp4"]);
        let writer = MemoryWriter {
            reject_batch: Some(0),
            ..Default::default()
        };

        let report = import_media(&writer, &LengthEmbedder, MediaKind::Video, dir.path(), &batches_of(2))
            .await
            .unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.stored.len(), 1);
        assert!(report.stored[0].ends_with("c.mp4"));
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].error.contains("service unavailable"));
    }

    #[tokio::test]
    async fn test_configured_extensions_and_batch_size_apply() {
        let dir = media_dir(&["a.mp4", "b.webm", "c.webm", "d.webm"]);
        let writer = MemoryWriter::default();
        let config = VectorConfig {
            extensions: vec!["webm".to_string()],
            batch_size: 1,
            ..Default::default()
        };

        let report = import_media(&writer, &LengthEmbedder, MediaKind::Video, dir.path(), &config)
            .await
            .unwrap();

        assert_eq!(report.attempted, 3);
        assert!(report.stored.iter().all(|path| path.extension().unwrap() == "webm"));
        assert_eq!(writer.batches.lock().unwrap().len(), 3);

        // Without the override only the kind's own extensions are picked up.
        let writer = MemoryWriter::default();
        let report = import_media(&writer, &LengthEmbedder, MediaKind::Video, dir.path(), &batches_of(16))
            .await
            .unwrap();
        assert_eq!(report.attempted, 1);
        assert!(report.stored[0].ends_with("a.mp4"));
        assert_eq!(writer.batches.lock().unwrap().len(), 1);
    }
}

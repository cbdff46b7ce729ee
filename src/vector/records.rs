use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::vector::types::MediaKind;

/// Stable point id for a file name. Storing the same file twice overwrites
/// the same point instead of adding a duplicate.
pub fn point_id(filename: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, filename.as_bytes())
}

/// Lowercased extension without the dot.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Metadata stored alongside each media vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub kind: MediaKind,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub size_kb: String,
    pub author: String,
}

impl FileRecord {
    pub fn from_path(path: &Path, kind: MediaKind) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("reading metadata of {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .with_context(|| format!("{} has no file name", path.display()))?;
        let extension = file_extension(path).unwrap_or_default();

        let modified: DateTime<Utc> = metadata.modified()?.into();
        // Not every filesystem records creation time.
        let created: DateTime<Utc> = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified);

        Ok(Self {
            path: path.to_path_buf(),
            filename,
            extension,
            kind,
            date_created: created,
            date_modified: modified,
            size_kb: format!("{:.2}", metadata.len() as f64 / 1024.0),
            author: "0".to_string(),
        })
    }

    pub fn point_id(&self) -> Uuid {
        point_id(&self.filename)
    }

    /// Payload stored with the point. The split creation date fields back the
    /// year/month/day range predicates.
    pub fn payload(&self) -> Value {
        json!({
            "filename": self.filename,
            "extension": self.extension,
            "kind": self.kind,
            "date_created": self.date_created.to_rfc3339(),
            "date_modified": self.date_modified.to_rfc3339(),
            "created_ts": self.date_created.timestamp(),
            "created_year": self.date_created.year(),
            "created_month": self.date_created.month(),
            "created_day": self.date_created.day(),
            "file_size": self.size_kb,
            "author": self.author,
        })
    }
}

/// Files directly under `dir` whose extension is in `extensions`, sorted by name.
pub fn discover_media(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            file_extension(path)
                .map(|ext| extensions.iter().any(|wanted| *wanted == ext))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_is_deterministic() {
        assert_eq!(point_id("beach.jpg"), point_id("beach.jpg"));
        assert_ne!(point_id("beach.jpg"), point_id("beach2.jpg"));
        assert_eq!(point_id("beach.jpg").get_version_num(), 5);
    }

    #[test]
    fn test_record_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Summit.MP4");
        fs::write(&path, vec![0u8; 2048]).unwrap();

        let record = FileRecord::from_path(&path, MediaKind::Video).unwrap();
        assert_eq!(record.filename, "Summit.MP4");
        assert_eq!(record.extension, "mp4");
        assert_eq!(record.size_kb, "2.00");
        assert_eq!(record.point_id(), point_id("Summit.MP4"));

        let payload = record.payload();
        assert_eq!(payload["kind"], "video");
        assert_eq!(payload["author"], "0");
        assert_eq!(payload["created_year"], record.date_created.year());
        assert!(payload["date_created"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_discover_media_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.PNG", "notes.txt", "c.jpeg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let extensions: Vec<String> = MediaKind::Image
            .default_extensions()
            .iter()
            .map(|e| e.to_string())
            .collect();
        let names: Vec<String> = discover_media(dir.path(), &extensions)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg", "c.jpeg"]);
    }
}

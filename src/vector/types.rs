use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Kind of media stored in the vector store; each kind has its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Image, MediaKind::Video];

    pub fn collection_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["jpg", "jpeg", "png"],
            MediaKind::Video => &["mp4"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MediaKind::Image => "Image collection",
            MediaKind::Video => "Video collection",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection_name())
    }
}

/// A file that could not be stored, and why.
#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-item outcome of a batch import. A failed item never aborts the rest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub attempted: usize,
    pub stored: Vec<PathBuf>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn fail(&mut self, path: PathBuf, error: impl fmt::Display) {
        self.failures.push(ImportFailure {
            path,
            error: error.to_string(),
        });
    }
}

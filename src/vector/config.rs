use anyhow::{Context, Result};
use qdrant_client::Qdrant;
use std::time::Duration;

use crate::environment::{get_env_var_as_vec, get_env_var_or};
use crate::vector::types::MediaKind;

pub const QDRANT_URL_ENV: &str = "QDRANT_URL";

/// Connection and ingestion settings for the vector store.
#[derive(Debug, Clone)]
pub struct VectorConfig {
    pub qdrant_url: Option<String>,
    pub dimensions: u64,
    pub batch_size: usize,
    pub timeout_secs: u64,
    /// Overrides the per-kind extension lists when non-empty.
    pub extensions: Vec<String>,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            qdrant_url: None,
            // ImageBind-sized vectors, matching the multimodal vectorizer
            dimensions: 1024,
            batch_size: 16,
            timeout_secs: 60,
            extensions: Vec::new(),
        }
    }
}

impl VectorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            qdrant_url: std::env::var(QDRANT_URL_ENV).ok().filter(|u| !u.is_empty()),
            dimensions: get_env_var_or("EMBEDDING_DIMENSIONS", defaults.dimensions),
            batch_size: get_env_var_or("IMPORT_BATCH_SIZE", defaults.batch_size).max(1),
            timeout_secs: get_env_var_or("QDRANT_TIMEOUT_SECS", defaults.timeout_secs),
            extensions: get_env_var_as_vec("FILE_EXTENSIONS", ';')
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Extensions imported for `kind`: the configured list when set,
    /// otherwise the kind's defaults.
    pub fn extensions_for(&self, kind: MediaKind) -> Vec<String> {
        if self.extensions.is_empty() {
            kind.default_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect()
        } else {
            self.extensions.clone()
        }
    }

    pub fn connect(&self) -> Result<Qdrant> {
        let url = self
            .qdrant_url
            .as_deref()
            .with_context(|| format!("{} environment variable required", QDRANT_URL_ENV))?;
        let client = Qdrant::from_url(url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;
        Ok(client)
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use super::models::{Author, Book};

const BUILTIN_SEED: &str = include_str!("seed.json");

/// Catalog contents installed by a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub books: Vec<Book>,
}

impl SeedCatalog {
    pub fn builtin() -> anyhow::Result<Self> {
        serde_json::from_str(BUILTIN_SEED).context("built-in seed catalog is malformed")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse seed file {}", path.display()))
    }
}

/// Where reset data comes from. Read on every reset so edits to the file
/// apply without a restart.
#[derive(Debug, Clone, Default)]
pub enum SeedSource {
    #[default]
    Builtin,
    File(PathBuf),
}

impl SeedSource {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map_or(SeedSource::Builtin, SeedSource::File)
    }

    pub fn load(&self) -> anyhow::Result<SeedCatalog> {
        match self {
            SeedSource::Builtin => SeedCatalog::builtin(),
            SeedSource::File(path) => SeedCatalog::from_file(path),
        }
    }
}

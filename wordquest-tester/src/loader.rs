use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use wordquest_game::{DataLoader, EmbeddedDataLoader, LoadError, QuestionBank};

/// Reads the catalog (and optional `<name>.json` configs beside it) from disk,
/// falling back to the assets compiled into the game crate.
#[derive(Debug, Clone, Default)]
pub struct FsDataLoader {
    catalog: Option<PathBuf>,
}

impl FsDataLoader {
    pub const fn new(catalog: Option<PathBuf>) -> Self {
        Self { catalog }
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog.as_deref()
    }

    fn read(path: &Path) -> Result<String, LoadError> {
        fs::read_to_string(path)
            .map_err(|err| LoadError::Missing(format!("{}: {err}", path.display())))
    }
}

impl DataLoader for FsDataLoader {
    type Error = LoadError;

    fn load_catalog(&self) -> Result<QuestionBank, Self::Error> {
        match &self.catalog {
            Some(path) => {
                log::debug!("loading catalog from {}", path.display());
                QuestionBank::from_json(&Self::read(path)?)
            }
            None => EmbeddedDataLoader.load_catalog(),
        }
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let sibling = self
            .catalog
            .as_deref()
            .and_then(Path::parent)
            .map(|dir| dir.join(format!("{config_name}.json")))
            .filter(|path| path.exists());
        match sibling {
            Some(path) => Ok(serde_json::from_str(&Self::read(&path)?)?),
            None => EmbeddedDataLoader.load_config(config_name),
        }
    }
}

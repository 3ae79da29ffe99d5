//! Local state file: the persisted record of managed blocks.
//!
//! Keyed by path. Holds each block's identifier and last-observed content.
//! Written only after an operation has committed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use restconf_core::ConfigBlock;

use crate::error::CliError;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    #[serde(default)]
    blocks: Vec<ConfigBlock>,
}

/// Tracked blocks plus the file they were loaded from.
#[derive(Debug)]
pub struct StateFile {
    path: PathBuf,
    blocks: BTreeMap<String, ConfigBlock>,
}

impl StateFile {
    /// Load from `path`; a missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let blocks = match std::fs::read_to_string(path) {
            Ok(text) => {
                let doc: StateDocument =
                    serde_json::from_str(&text).map_err(|e| CliError::State {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                if doc.version != FORMAT_VERSION {
                    return Err(CliError::State {
                        path: path.display().to_string(),
                        reason: format!("unsupported state version {}", doc.version),
                    });
                }
                doc.blocks
                    .into_iter()
                    .map(|b| (b.path().to_owned(), b))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), blocks = blocks.len(), "state loaded");
        Ok(Self {
            path: path.to_owned(),
            blocks,
        })
    }

    /// Write the state back, replacing the file atomically.
    pub fn save(&self) -> Result<(), CliError> {
        let doc = StateDocument {
            version: FORMAT_VERSION,
            blocks: self.blocks.values().cloned().collect(),
        };
        let text = serde_json::to_string_pretty(&doc)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), blocks = self.blocks.len(), "state saved");
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&ConfigBlock> {
        self.blocks.get(path)
    }

    /// The tracked block at `path`, or `NotTracked`.
    pub fn tracked(&self, path: &str) -> Result<ConfigBlock, CliError> {
        self.blocks
            .get(path)
            .filter(|b| b.is_present())
            .cloned()
            .ok_or_else(|| CliError::NotTracked { path: path.into() })
    }

    /// Insert or replace a block. Absent blocks are dropped.
    pub fn put(&mut self, block: ConfigBlock) {
        if block.is_present() {
            self.blocks.insert(block.path().to_owned(), block);
        } else {
            self.blocks.remove(block.path());
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<ConfigBlock> {
        self.blocks.remove(path)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &ConfigBlock> {
        self.blocks.values()
    }

    pub fn paths(&self) -> Vec<String> {
        self.blocks.keys().cloned().collect()
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a [`ConfigBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    /// No identifier assigned; nothing is managed on the device.
    Absent,
    /// Identifier assigned; content tracks the device.
    Present,
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "absent",
            Self::Present => "present",
        })
    }
}

/// One managed configuration document.
///
/// `path` is the immutable key: changing it means deleting this block and
/// creating another. `id` is assigned by create/import and cleared by
/// delete. `content` holds the desired document before create and the last
/// observed one afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBlock {
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    content: String,
}

impl ConfigBlock {
    /// A block that is not yet on the device, carrying its desired content.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id: None,
            content: content.into(),
        }
    }

    /// A block adopted from an external identifier with no local content.
    pub(crate) fn adopt(id: &str) -> Self {
        Self {
            path: id.to_owned(),
            id: Some(id.to_owned()),
            content: String::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> BlockState {
        if self.id.is_some() {
            BlockState::Present
        } else {
            BlockState::Absent
        }
    }

    pub fn is_present(&self) -> bool {
        self.state() == BlockState::Present
    }

    pub(crate) fn assign_id(&mut self) {
        self.id = Some(self.path.clone());
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub(crate) fn clear(&mut self) {
        self.id = None;
        self.content.clear();
    }

    /// The identifier, or `InvalidState` if the block is absent.
    pub(crate) fn require_present(&self, operation: &'static str) -> Result<&str, CoreError> {
        self.id.as_deref().ok_or_else(|| self.invalid(operation))
    }

    pub(crate) fn require_absent(&self, operation: &'static str) -> Result<(), CoreError> {
        match self.id {
            None => Ok(()),
            Some(_) => Err(self.invalid(operation)),
        }
    }

    fn invalid(&self, operation: &'static str) -> CoreError {
        CoreError::InvalidState {
            path: self.path.clone(),
            operation,
            state: self.state(),
        }
    }
}

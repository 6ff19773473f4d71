//! Document files.
//!
//! A document is the JSON form of a [`CanvasState`] wrapped with a format
//! version and metadata. Every v-object and command inside it carries its
//! `__type` tag so the right variant is rebuilt on load.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::canvas::{Canvas, CanvasState};

/// Document file format version
const FILE_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: String,
    pub metadata: DocumentMetadata,
    pub canvas: CanvasState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

impl DocumentFile {
    /// Wraps the current state of `canvas`.
    pub fn new(name: impl Into<String>, canvas: &Canvas) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: DocumentMetadata {
                name: name.into(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
            },
            canvas: canvas.to_state(),
        }
    }

    /// Refreshes the canvas snapshot and the modified timestamp.
    pub fn update_from(&mut self, canvas: &Canvas) {
        self.canvas = canvas.to_state();
        self.metadata.modified = Utc::now();
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize document")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let document: DocumentFile =
            serde_json::from_str(json).context("Failed to parse document")?;
        if document.version.split('.').next() != FILE_FORMAT_VERSION.split('.').next() {
            bail!("Unsupported document version {}", document.version);
        }
        Ok(document)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write document file {}", path.display()))?;
        info!(
            "Saved document '{}' ({} layer(s)) to {}",
            self.metadata.name,
            self.canvas.layers.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document file {}", path.display()))?;
        let document = Self::from_json(&content)?;
        info!(
            "Loaded document '{}' (version {}) from {}",
            document.metadata.name,
            document.version,
            path.display()
        );
        Ok(document)
    }

    /// Builds a canvas from the stored state. History tracking is paused
    /// while the layers are rebuilt.
    pub fn into_canvas(self) -> Canvas {
        Canvas::from_state(self.canvas)
    }

    /// Loads the stored state into an existing canvas.
    pub fn apply_to(&self, canvas: &mut Canvas) {
        canvas.apply_state(self.canvas.clone());
    }
}

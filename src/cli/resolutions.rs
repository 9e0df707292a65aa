use crate::document::Document;
use crate::review::SuggestionRecord;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Editable record list, pinned to the document it was exported from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionFile {
    pub document_digest: String,
    pub records: Vec<SuggestionRecord>,
}

impl ResolutionFile {
    pub fn new(document: &Document, records: Vec<SuggestionRecord>) -> Self {
        Self {
            document_digest: document.digest(),
            records,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read resolution file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse resolution file: {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize resolution file")
    }

    /// Refuse records exported from a different version of the document.
    pub fn verify(&self, document: &Document) -> Result<()> {
        let digest = document.digest();
        if digest != self.document_digest {
            bail!(
                "Resolution file was exported from a different document (expected digest {}, found {})",
                self.document_digest,
                digest
            );
        }
        Ok(())
    }
}

pub mod text;
pub mod walk;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;

pub use walk::{walk, Location, Root, Step, Visitor};

/// A structured document: body blocks plus footnote and endnote containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Block>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<Note>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endnotes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph(Paragraph),
    Table(Table),
    Container {
        #[serde(default)]
        children: Vec<Block>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SpellError>,

    /// Footnote/endnote references, in reading order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<NoteRef>,
}

/// A detected misspelling inside a paragraph.
///
/// `start` and `end` are char offsets into the paragraph's current text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellError {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub candidates: Vec<String>,

    /// Text that replaced the span, set once a correction is applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Footnote,
    Endnote,
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteKind::Footnote => write!(f, "footnote"),
            NoteKind::Endnote => write!(f, "endnote"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteRef {
    pub kind: NoteKind,
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub number: u32,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse document: {}", path.display()))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize document")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write document: {}", path.display()))
    }

    /// Look up a note container by kind and number. The first match wins.
    pub fn note(&self, kind: NoteKind, number: u32) -> Option<&Note> {
        self.notes(kind).iter().find(|note| note.number == number)
    }

    pub fn note_mut(&mut self, kind: NoteKind, number: u32) -> Option<&mut Note> {
        let notes = match kind {
            NoteKind::Footnote => &mut self.footnotes,
            NoteKind::Endnote => &mut self.endnotes,
        };
        notes.iter_mut().find(|note| note.number == number)
    }

    fn notes(&self, kind: NoteKind) -> &[Note] {
        match kind {
            NoteKind::Footnote => &self.footnotes,
            NoteKind::Endnote => &self.endnotes,
        }
    }

    /// SHA-256 of the document's canonical JSON form, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        // Serializing plain structs into a Vec cannot fail
        if let Ok(bytes) = serde_json::to_vec(self) {
            hasher.update(&bytes);
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    /// Concatenated text of every reachable paragraph, one per line.
    pub fn plain_text(&self) -> String {
        struct Collect(Vec<String>);

        impl Visitor for Collect {
            fn visit_paragraph(&mut self, _: &Location, _: &str, paragraph: &Paragraph) {
                self.0.push(paragraph.text.clone());
            }
        }

        let mut collect = Collect(Vec::new());
        walk(self, &mut collect);
        collect.0.join("\n")
    }
}

impl Block {
    pub fn paragraph(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::Paragraph(Paragraph {
                text: text.into(),
                ..Default::default()
            }),
        }
    }

    pub fn container(id: impl Into<String>, children: Vec<Block>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::Container { children },
        }
    }

    pub fn table(id: impl Into<String>, rows: Vec<Vec<Vec<Block>>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|cells| Row {
                cells: cells.into_iter().map(|blocks| Cell { blocks }).collect(),
            })
            .collect();
        Self {
            id: id.into(),
            kind: BlockKind::Table(Table { rows }),
        }
    }

    /// Attach an error to a paragraph block. No-op on other kinds.
    pub fn with_error(mut self, error: SpellError) -> Self {
        if let BlockKind::Paragraph(paragraph) = &mut self.kind {
            paragraph.errors.push(error);
        }
        self
    }

    pub fn with_note(mut self, kind: NoteKind, number: u32) -> Self {
        if let BlockKind::Paragraph(paragraph) = &mut self.kind {
            paragraph.notes.push(NoteRef { kind, number });
        }
        self
    }
}

impl SpellError {
    pub fn new(id: impl Into<String>, start: usize, end: usize, candidates: &[&str]) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            replacement: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "body": [
            {"id": "p1", "type": "paragraph", "text": "teh cat",
             "errors": [{"id": "e1", "start": 0, "end": 3, "candidates": ["the"]}],
             "notes": [{"kind": "footnote", "number": 1}]},
            {"id": "t1", "type": "table", "rows": [
                {"cells": [{"blocks": [{"id": "p2", "type": "paragraph", "text": "cell"}]}]}
            ]},
            {"id": "s1", "type": "container", "children": []}
        ],
        "footnotes": [
            {"number": 1, "blocks": [{"id": "f1", "type": "paragraph", "text": "note"}]}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let doc: Document = serde_json::from_str(SAMPLE).unwrap();
        let body = doc.body.as_ref().unwrap();
        assert_eq!(body.len(), 3);

        match &body[0].kind {
            BlockKind::Paragraph(p) => {
                assert_eq!(p.text, "teh cat");
                assert_eq!(p.errors[0].candidates, vec!["the"]);
                assert_eq!(p.notes[0].kind, NoteKind::Footnote);
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
        assert!(matches!(body[1].kind, BlockKind::Table(_)));
        assert!(doc.note(NoteKind::Footnote, 1).is_some());
        assert!(doc.note(NoteKind::Endnote, 1).is_none());
    }

    #[test]
    fn test_json_roundtrip_preserves_document() {
        let doc: Document = serde_json::from_str(SAMPLE).unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn test_missing_body_parses() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.body.is_none());
    }

    #[test]
    fn test_digest_tracks_content() {
        let doc: Document = serde_json::from_str(SAMPLE).unwrap();
        let mut changed = doc.clone();
        changed.footnotes.clear();

        assert_eq!(doc.digest().len(), 64);
        assert_eq!(doc.digest(), doc.clone().digest());
        assert_ne!(doc.digest(), changed.digest());
    }

    #[test]
    fn test_plain_text_follows_notes() {
        let doc: Document = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(doc.plain_text(), "teh cat\nnote\ncell");
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let doc: Document = serde_json::from_str(SAMPLE).unwrap();

        doc.write_to(&path).unwrap();
        assert_eq!(Document::from_file(&path).unwrap(), doc);
    }
}

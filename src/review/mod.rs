pub mod reconcile;
pub mod session;

use crate::config::Config;
use crate::document::{self, text, Document, Location, Paragraph, Visitor};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use reconcile::{reconcile, ApplyError, Reconciled};
pub use session::{ReviewHost, ReviewSession};

/// Which source supplies the replacement text for a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Leave the span as it is
    #[default]
    None,
    /// Use the original offending text
    Original,
    /// Use the candidate at this index
    Candidate(usize),
    /// Use the free-typed text
    UserText,
}

/// One reviewable error plus the user's edit state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub paragraph_id: String,
    pub error_id: String,
    pub original: String,
    pub candidates: Vec<String>,

    #[serde(default)]
    pub user_text: String,

    #[serde(default)]
    pub resolution: Resolution,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("candidate {index} does not exist ({available} available)")]
    NoSuchCandidate { index: usize, available: usize },
}

impl SuggestionRecord {
    pub fn choose_original(&mut self) {
        self.resolution = Resolution::Original;
    }

    pub fn choose_candidate(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.candidates.len() {
            return Err(SelectionError::NoSuchCandidate {
                index,
                available: self.candidates.len(),
            });
        }
        self.resolution = Resolution::Candidate(index);
        Ok(())
    }

    /// Store typed text. Does not change the resolution.
    pub fn set_user_text(&mut self, text: impl Into<String>) {
        self.user_text = text.into();
    }

    pub fn choose_user_text(&mut self) {
        self.resolution = Resolution::UserText;
    }

    pub fn clear(&mut self) {
        self.resolution = Resolution::None;
    }

    pub fn selected_candidate(&self) -> Option<&str> {
        match self.resolution {
            Resolution::Candidate(index) => self.candidates.get(index).map(String::as_str),
            _ => None,
        }
    }

    /// Text this record would write, or `None` when the span stays as is.
    pub fn resolved_text(&self) -> Result<Option<&str>, ApplyError> {
        match self.resolution {
            Resolution::None => Ok(None),
            Resolution::Original => Ok(Some(self.original.as_str())),
            Resolution::Candidate(index) => match self.candidates.get(index) {
                Some(candidate) => Ok(Some(candidate.as_str())),
                None => Err(ApplyError::NoSuchCandidate {
                    paragraph_id: self.paragraph_id.clone(),
                    error_id: self.error_id.clone(),
                    index,
                }),
            },
            Resolution::UserText => {
                if self.user_text.trim().is_empty() {
                    Err(ApplyError::BlankUserText {
                        paragraph_id: self.paragraph_id.clone(),
                        error_id: self.error_id.clone(),
                    })
                } else {
                    Ok(Some(self.user_text.as_str()))
                }
            }
        }
    }
}

/// Knobs for the default selection applied during extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Pre-select the candidate when an error has exactly one
    pub auto_select_single: bool,
    /// Original text matching any of these resolves to `Original`
    pub keep_patterns: Vec<Regex>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            auto_select_single: true,
            keep_patterns: Vec::new(),
        }
    }
}

impl ExtractOptions {
    pub fn from_config(config: &Config) -> Self {
        let mut keep_patterns = Vec::new();
        for pattern in &config.keep_patterns {
            match Regex::new(pattern) {
                Ok(re) => keep_patterns.push(re),
                Err(e) => warn!(pattern = %pattern, error = %e, "invalid keep pattern, ignoring"),
            }
        }

        Self {
            auto_select_single: config.auto_select_single,
            keep_patterns,
        }
    }

    fn default_resolution(&self, original: &str, candidates: &[String]) -> Resolution {
        if !original.is_empty() && self.keep_patterns.iter().any(|re| re.is_match(original)) {
            return Resolution::Original;
        }
        if self.auto_select_single && candidates.len() == 1 {
            return Resolution::Candidate(0);
        }
        Resolution::None
    }
}

/// Flatten every reachable error into records, in traversal order.
pub fn extract(document: &Document) -> Vec<SuggestionRecord> {
    extract_with(document, &ExtractOptions::default())
}

pub fn extract_with(document: &Document, options: &ExtractOptions) -> Vec<SuggestionRecord> {
    let mut extractor = Extractor {
        options,
        records: Vec::new(),
    };
    document::walk(document, &mut extractor);
    debug!(count = extractor.records.len(), "extracted suggestion records");
    extractor.records
}

struct Extractor<'a> {
    options: &'a ExtractOptions,
    records: Vec<SuggestionRecord>,
}

impl Visitor for Extractor<'_> {
    fn visit_paragraph(&mut self, _: &Location, id: &str, paragraph: &Paragraph) {
        for error in &paragraph.errors {
            let original = match text::slice(&paragraph.text, error.start, error.end) {
                Some(original) => original.to_string(),
                None => {
                    warn!(
                        paragraph = id,
                        error = %error.id,
                        start = error.start,
                        end = error.end,
                        "error span does not fit paragraph text"
                    );
                    String::new()
                }
            };

            let resolution = self.options.default_resolution(&original, &error.candidates);
            self.records.push(SuggestionRecord {
                paragraph_id: id.to_string(),
                error_id: error.id.clone(),
                original,
                candidates: error.candidates.clone(),
                user_text: String::new(),
                resolution,
            });
        }
    }
}

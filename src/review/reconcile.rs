use super::SuggestionRecord;
use crate::document::{self, text, Document, Location, Paragraph, Visitor};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("typed correction for error '{error_id}' in paragraph '{paragraph_id}' is blank")]
    BlankUserText {
        paragraph_id: String,
        error_id: String,
    },

    #[error("error '{error_id}' in paragraph '{paragraph_id}' selects missing candidate {index}")]
    NoSuchCandidate {
        paragraph_id: String,
        error_id: String,
        index: usize,
    },

    #[error(
        "error '{error_id}' in paragraph '{paragraph_id}' spans {start}..{end}, \
         outside the paragraph text ({len} chars)"
    )]
    SpanOutOfRange {
        paragraph_id: String,
        error_id: String,
        start: isize,
        end: isize,
        len: usize,
    },
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub document: Document,
    /// Spans whose text actually changed
    pub replaced: usize,
}

/// Write every record's resolved text back into a copy of `document`.
///
/// All records are validated before anything is written; any failure returns
/// an error and no document. Within a paragraph, errors are applied in stored
/// order and later spans shift by the running length delta.
pub fn reconcile(
    document: &Document,
    records: &[SuggestionRecord],
) -> Result<Reconciled, ApplyError> {
    let mut resolved: HashMap<(&str, &str), &str> = HashMap::new();
    for record in records {
        if let Some(text) = record.resolved_text()? {
            resolved.insert((record.paragraph_id.as_str(), record.error_id.as_str()), text);
        }
    }

    let mut targets = Targets::default();
    document::walk(document, &mut targets);

    let mut updated = document.clone();
    let mut replaced = 0;

    for (location, id) in &targets.0 {
        let Some(paragraph) = updated.paragraph_mut(location) else {
            debug!(paragraph = %id, "location vanished from copy, skipping");
            continue;
        };
        replaced += apply_paragraph(id, paragraph, &resolved)?;
    }

    info!(records = records.len(), replaced, "reconciled document");
    Ok(Reconciled {
        document: updated,
        replaced,
    })
}

/// Paragraphs carrying errors, in traversal order.
#[derive(Default)]
struct Targets(Vec<(Location, String)>);

impl Visitor for Targets {
    fn visit_paragraph(&mut self, location: &Location, id: &str, paragraph: &Paragraph) {
        if !paragraph.errors.is_empty() {
            self.0.push((location.clone(), id.to_string()));
        }
    }
}

fn apply_paragraph(
    paragraph_id: &str,
    paragraph: &mut Paragraph,
    resolved: &HashMap<(&str, &str), &str>,
) -> Result<usize, ApplyError> {
    let Paragraph {
        text: content,
        errors,
        ..
    } = paragraph;
    let mut offset: isize = 0;
    let mut replaced = 0;

    for error in errors.iter_mut() {
        let out_of_range = || ApplyError::SpanOutOfRange {
            paragraph_id: paragraph_id.to_string(),
            error_id: error.id.clone(),
            start: error.start as isize + offset,
            end: error.end as isize + offset,
            len: text::char_len(content),
        };

        let (Some(start), Some(end)) = (
            error.start.checked_add_signed(offset),
            error.end.checked_add_signed(offset),
        ) else {
            return Err(out_of_range());
        };
        let current = text::slice(content, start, end).ok_or_else(out_of_range)?.to_string();

        let key = (paragraph_id, error.id.as_str());
        let replacement = match resolved.get(&key) {
            Some(chosen) => chosen.to_string(),
            None => current.clone(),
        };

        if replacement != current {
            replaced += 1;
        }

        let len = text::char_len(&replacement);
        text::splice(content, start, end, &replacement);
        offset += len as isize - (error.end as isize - error.start as isize);

        error.start = start;
        error.end = start + len;
        if resolved.contains_key(&key) {
            error.replacement = Some(replacement);
        }
    }

    Ok(replaced)
}

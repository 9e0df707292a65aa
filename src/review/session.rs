use super::{extract_with, reconcile, ApplyError, ExtractOptions, SuggestionRecord};
use crate::document::Document;
use tracing::debug;

/// Receives the two notifications a review session emits.
pub trait ReviewHost {
    /// Called with the updated document after a successful apply.
    fn on_applied(&mut self, document: &Document);

    /// Called when a record row is selected, so the editor can focus the span.
    fn on_focus(&mut self, _paragraph_id: &str, _error_id: &str) {}
}

/// One editing session: the current document and its suggestion records.
pub struct ReviewSession {
    document: Document,
    records: Vec<SuggestionRecord>,
    options: ExtractOptions,
}

impl ReviewSession {
    pub fn new(document: Document) -> Self {
        Self::with_options(document, ExtractOptions::default())
    }

    pub fn with_options(document: Document, options: ExtractOptions) -> Self {
        let records = extract_with(&document, &options);
        Self {
            document,
            records,
            options,
        }
    }

    /// Replace the document and regenerate every record.
    pub fn load(&mut self, document: Document) {
        self.records = extract_with(&document, &self.options);
        self.document = document;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn records(&self) -> &[SuggestionRecord] {
        &self.records
    }

    pub fn record_mut(&mut self, index: usize) -> Option<&mut SuggestionRecord> {
        self.records.get_mut(index)
    }

    /// Notify the host that row `index` was selected. Returns `false` if
    /// there is no such row.
    pub fn focus(&self, index: usize, host: &mut impl ReviewHost) -> bool {
        match self.records.get(index) {
            Some(record) => {
                host.on_focus(&record.paragraph_id, &record.error_id);
                true
            }
            None => false,
        }
    }

    /// Reconcile the current selections into a new document.
    ///
    /// On success the host receives the new document and the session reloads
    /// from it; on failure nothing changes. Returns the number of replaced spans.
    pub fn apply(&mut self, host: &mut impl ReviewHost) -> Result<usize, ApplyError> {
        let reconciled = reconcile(&self.document, &self.records)?;
        debug!(replaced = reconciled.replaced, "applying reconciled document");

        host.on_applied(&reconciled.document);
        self.load(reconciled.document);
        Ok(reconciled.replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::tests::sample_document;
    use crate::review::Resolution;

    #[derive(Default)]
    struct RecordingHost {
        applied: Vec<Document>,
        focused: Vec<(String, String)>,
    }

    impl ReviewHost for RecordingHost {
        fn on_applied(&mut self, document: &Document) {
            self.applied.push(document.clone());
        }

        fn on_focus(&mut self, paragraph_id: &str, error_id: &str) {
            self.focused.push((paragraph_id.to_string(), error_id.to_string()));
        }
    }

    #[test]
    fn test_focus_reports_ids() {
        let session = ReviewSession::new(sample_document());
        let mut host = RecordingHost::default();

        assert!(session.focus(4, &mut host));
        assert!(!session.focus(99, &mut host));
        assert_eq!(host.focused, vec![("c2".to_string(), "e1".to_string())]);
    }

    #[test]
    fn test_apply_notifies_and_reloads() {
        let mut session = ReviewSession::new(sample_document());
        let mut host = RecordingHost::default();

        session.record_mut(1).unwrap().choose_candidate(0).unwrap();
        let replaced = session.apply(&mut host).unwrap();

        assert_eq!(replaced, 4);
        assert_eq!(host.applied.len(), 1);
        assert_eq!(&host.applied[0], session.document());
        assert!(session.document().plain_text().starts_with("the cat sat"));

        // records are regenerated from the new text
        assert_eq!(session.records()[0].original, "the");
        assert_eq!(session.records()[1].original, "cat");
        assert_eq!(session.records()[1].resolution, Resolution::None);
    }

    #[test]
    fn test_failed_apply_keeps_state() {
        let original = sample_document();
        let mut session = ReviewSession::new(original.clone());
        let mut host = RecordingHost::default();

        let record = session.record_mut(0).unwrap();
        record.set_user_text("");
        record.choose_user_text();

        assert!(matches!(
            session.apply(&mut host),
            Err(ApplyError::BlankUserText { .. })
        ));
        assert!(host.applied.is_empty());
        assert_eq!(session.document(), &original);
        assert_eq!(session.records()[0].resolution, Resolution::UserText);
    }

    #[test]
    fn test_load_regenerates_records() {
        let mut session = ReviewSession::new(Document::default());
        assert!(session.records().is_empty());

        session.load(sample_document());
        assert_eq!(session.records().len(), 5);
    }
}

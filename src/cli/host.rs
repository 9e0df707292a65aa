use crate::cli::output::format_context;
use crate::document::{self, Document, Location, Paragraph, Visitor};
use crate::review::ReviewHost;
use anyhow::{Context, Result};
use colored::*;
use std::collections::HashMap;
use std::path::PathBuf;

/// Where an applied document ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn label(&self) -> String {
        match self {
            Destination::Stdout => "stdout".to_string(),
            Destination::File(path) => path.display().to_string(),
        }
    }

    pub fn write(&self, document: &Document) -> Result<()> {
        match self {
            Destination::Stdout => {
                let json =
                    serde_json::to_string_pretty(document).context("Failed to serialize document")?;
                println!("{}", json);
                Ok(())
            }
            Destination::File(path) => document.write_to(path),
        }
    }
}

/// Terminal side of a review session: prints focused paragraphs and
/// writes the applied document.
pub struct TerminalHost {
    destination: Destination,
    colored: bool,
    paragraphs: HashMap<String, String>,
    write_result: Option<Result<()>>,
}

impl TerminalHost {
    pub fn new(document: &Document, destination: Destination, colored: bool) -> Self {
        Self {
            destination,
            colored,
            paragraphs: paragraph_texts(document),
            write_result: None,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Text of a paragraph as last seen by this host.
    pub fn paragraph_text(&self, paragraph_id: &str) -> Option<&str> {
        self.paragraphs.get(paragraph_id).map(String::as_str)
    }

    /// Outcome of the last write; `Ok(false)` if nothing was applied.
    pub fn finish(self) -> Result<bool> {
        match self.write_result {
            Some(result) => result.map(|_| true),
            None => Ok(false),
        }
    }
}

impl ReviewHost for TerminalHost {
    fn on_applied(&mut self, document: &Document) {
        self.paragraphs = paragraph_texts(document);
        self.write_result = Some(self.destination.write(document));
    }

    fn on_focus(&mut self, paragraph_id: &str, error_id: &str) {
        let header = format!("{}:{}", paragraph_id, error_id);
        let context = self.paragraph_text(paragraph_id).unwrap_or_default();
        if self.colored {
            eprintln!("\n{} {}", "Reviewing".yellow().bold(), header.blue());
        } else {
            eprintln!("\nReviewing {}", header);
        }
        eprintln!("  {}", context);
    }
}

/// Paragraph id to text, for every paragraph reachable in the document.
fn paragraph_texts(document: &Document) -> HashMap<String, String> {
    struct Texts(HashMap<String, String>);

    impl Visitor for Texts {
        fn visit_paragraph(&mut self, _: &Location, id: &str, paragraph: &Paragraph) {
            self.0.insert(id.to_string(), paragraph.text.clone());
        }
    }

    let mut texts = Texts(HashMap::new());
    document::walk(document, &mut texts);
    texts.0
}

/// Paragraph text with `word` highlighted, for prompts.
pub fn highlighted(host: &TerminalHost, paragraph_id: &str, word: &str) -> String {
    let context = host.paragraph_text(paragraph_id).unwrap_or_default();
    format_context(context, word, host.colored)
}

pub mod cli;
pub mod config;
pub mod document;
pub mod review;

pub use config::Config;
pub use document::{Block, BlockKind, Document, Paragraph, SpellError};
pub use review::{
    extract, extract_with, reconcile, ApplyError, ExtractOptions, Reconciled, Resolution,
    ReviewHost, ReviewSession, SuggestionRecord,
};

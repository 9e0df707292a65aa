//! Depth-first traversal shared by extraction and reconciliation.
//!
//! Order: blocks in sequence; container children and table cells (row-major)
//! are entered where they appear; a paragraph's note references are resolved
//! and walked right after the paragraph itself. Each note container is walked
//! at most once per traversal.

use super::{Block, BlockKind, Document, NoteKind, NoteRef, Paragraph};
use std::collections::HashSet;
use tracing::debug;

/// Which block list a [`Location`] starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    Body,
    Note(NoteKind, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Index into the current block list
    Block(usize),
    /// Enter a table cell; the next step indexes the cell's blocks
    Cell { row: usize, cell: usize },
}

/// Structural path to a paragraph, valid for any clone of the walked document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub root: Root,
    pub steps: Vec<Step>,
}

pub trait Visitor {
    fn visit_paragraph(&mut self, location: &Location, id: &str, paragraph: &Paragraph);
}

pub fn walk<V: Visitor + ?Sized>(document: &Document, visitor: &mut V) {
    let Some(body) = &document.body else {
        debug!("document has no body, nothing to walk");
        return;
    };

    let mut walker = Walker {
        document,
        visitor,
        root: Root::Body,
        path: Vec::new(),
        visited_notes: HashSet::new(),
    };
    walker.blocks(body);
}

struct Walker<'d, 'v, V: ?Sized> {
    document: &'d Document,
    visitor: &'v mut V,
    root: Root,
    path: Vec<Step>,
    visited_notes: HashSet<NoteRef>,
}

impl<'d, V: Visitor + ?Sized> Walker<'d, '_, V> {
    fn blocks(&mut self, blocks: &'d [Block]) {
        for (index, block) in blocks.iter().enumerate() {
            self.path.push(Step::Block(index));
            self.block(block);
            self.path.pop();
        }
    }

    fn block(&mut self, block: &'d Block) {
        match &block.kind {
            BlockKind::Paragraph(paragraph) => {
                let location = Location {
                    root: self.root,
                    steps: self.path.clone(),
                };
                self.visitor.visit_paragraph(&location, &block.id, paragraph);

                for note in &paragraph.notes {
                    self.note(*note);
                }
            }
            BlockKind::Table(table) => {
                for (row_index, row) in table.rows.iter().enumerate() {
                    for (cell_index, cell) in row.cells.iter().enumerate() {
                        self.path.push(Step::Cell {
                            row: row_index,
                            cell: cell_index,
                        });
                        self.blocks(&cell.blocks);
                        self.path.pop();
                    }
                }
            }
            BlockKind::Container { children } => self.blocks(children),
        }
    }

    fn note(&mut self, reference: NoteRef) {
        if !self.visited_notes.insert(reference) {
            debug!(kind = %reference.kind, number = reference.number, "note already walked");
            return;
        }

        let Some(note) = self.document.note(reference.kind, reference.number) else {
            debug!(kind = %reference.kind, number = reference.number, "note not found, skipping");
            return;
        };

        let root = std::mem::replace(&mut self.root, Root::Note(reference.kind, reference.number));
        let path = std::mem::take(&mut self.path);
        self.blocks(&note.blocks);
        self.root = root;
        self.path = path;
    }
}

impl Document {
    pub fn paragraph(&self, location: &Location) -> Option<&Paragraph> {
        let blocks = match location.root {
            Root::Body => self.body.as_deref()?,
            Root::Note(kind, number) => self.note(kind, number)?.blocks.as_slice(),
        };
        resolve(blocks, &location.steps)
    }

    pub fn paragraph_mut(&mut self, location: &Location) -> Option<&mut Paragraph> {
        let blocks = match location.root {
            Root::Body => self.body.as_deref_mut()?,
            Root::Note(kind, number) => self.note_mut(kind, number)?.blocks.as_mut_slice(),
        };
        resolve_mut(blocks, &location.steps)
    }
}

fn resolve<'a>(blocks: &'a [Block], steps: &[Step]) -> Option<&'a Paragraph> {
    let (Step::Block(index), rest) = steps.split_first()? else {
        return None;
    };

    match (&blocks.get(*index)?.kind, rest) {
        (BlockKind::Paragraph(paragraph), []) => Some(paragraph),
        (BlockKind::Container { children }, rest) => resolve(children, rest),
        (BlockKind::Table(table), [Step::Cell { row, cell }, rest @ ..]) => {
            let cell = table.rows.get(*row)?.cells.get(*cell)?;
            resolve(&cell.blocks, rest)
        }
        _ => None,
    }
}

fn resolve_mut<'a>(blocks: &'a mut [Block], steps: &[Step]) -> Option<&'a mut Paragraph> {
    let (Step::Block(index), rest) = steps.split_first()? else {
        return None;
    };

    match (&mut blocks.get_mut(*index)?.kind, rest) {
        (BlockKind::Paragraph(paragraph), []) => Some(paragraph),
        (BlockKind::Container { children }, rest) => resolve_mut(children, rest),
        (BlockKind::Table(table), [Step::Cell { row, cell }, rest @ ..]) => {
            let cell = table.rows.get_mut(*row)?.cells.get_mut(*cell)?;
            resolve_mut(&mut cell.blocks, rest)
        }
        _ => None,
    }
}

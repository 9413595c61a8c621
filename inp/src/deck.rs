//! This module implements the general structure of an input deck as we
//! interpret it: an ordered list of keyword usages, with an index over them
//! that's kept in sync as usages come and go.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::grammar::Registry;
use crate::index::ImplementationIndex;
use crate::parser::Implementation;

/// An input deck.
#[derive(Debug, Default)]
pub struct Deck {
  /// The name of the file this was read from, if any.
  pub filename: Option<String>,
  /// The usages, in document order.
  blocks: Vec<Arc<Implementation>>,
  /// Every usage in `blocks`, by keyword.
  index: Arc<ImplementationIndex>
}

impl Deck {
  /// Makes an empty deck.
  pub fn new() -> Self {
    return Self::default();
  }

  /// Parses a deck from text.
  pub fn parse(registry: &Registry, text: &str) -> Self {
    let mut deck = Self::new();
    for imp in registry.parse_document(text) {
      deck.push(imp);
    }
    return deck;
  }

  /// Parses from a BufRead instance.
  pub fn parse_bufread<R: BufRead>(
    registry: &Registry,
    mut reader: R
  ) -> io::Result<Self> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    return Ok(Self::parse(registry, &text));
  }

  /// Utility method -- reads and parses a file.
  pub fn parse_file<P: AsRef<Path>>(
    registry: &Registry,
    path: P
  ) -> io::Result<Self> {
    let file = File::open(path.as_ref())?;
    let mut deck = Self::parse_bufread(registry, BufReader::new(file))?;
    deck.filename = path.as_ref().file_name()
      .and_then(|s| s.to_str())
      .map(String::from);
    return Ok(deck);
  }

  /// The usages, in document order.
  pub fn implementations(&self) -> &[Arc<Implementation>] {
    return &self.blocks;
  }

  /// The index over this deck's usages. Forms hold on to it to list
  /// cross-reference candidates.
  pub fn index(&self) -> &Arc<ImplementationIndex> {
    return &self.index;
  }

  /// Number of blocks, passthrough ones included.
  pub fn len(&self) -> usize {
    return self.blocks.len();
  }

  /// Whether the deck has no blocks at all.
  pub fn is_empty(&self) -> bool {
    return self.blocks.is_empty();
  }

  /// Appends a usage.
  pub fn push(&mut self, imp: Implementation) -> Arc<Implementation> {
    let imp = Arc::new(imp);
    self.index.register(imp.clone());
    self.blocks.push(imp.clone());
    return imp;
  }

  /// Inserts a usage at a position, shifting the ones after it. Positions
  /// past the end append.
  pub fn insert(
    &mut self,
    pos: usize,
    imp: Implementation
  ) -> Arc<Implementation> {
    let imp = Arc::new(imp);
    self.index.register(imp.clone());
    self.blocks.insert(pos.min(self.blocks.len()), imp.clone());
    return imp;
  }

  /// Removes the usage at a position.
  pub fn remove(&mut self, pos: usize) -> Option<Arc<Implementation>> {
    if pos >= self.blocks.len() {
      return None;
    }
    let imp = self.blocks.remove(pos);
    self.index.unregister(&imp);
    debug!("Removed a {} block at position {}.", imp.keyword_name(), pos);
    return Some(imp);
  }

  /// Swaps the usage at a position for another one, e.g. after editing it.
  /// Returns the old one.
  pub fn replace(
    &mut self,
    pos: usize,
    imp: Implementation
  ) -> Option<Arc<Implementation>> {
    let slot = self.blocks.get_mut(pos)?;
    let imp = Arc::new(imp);
    let old = std::mem::replace(slot, imp.clone());
    self.index.unregister(&old);
    self.index.register(imp);
    return Some(old);
  }

  /// The blocks that didn't match any keyword.
  pub fn unknown_blocks(&self) -> impl Iterator<Item = &Arc<Implementation>> {
    return self.blocks.iter().filter(|b| b.is_unknown());
  }

  /// Writes the deck back out as text, one line per line, with a trailing
  /// newline.
  pub fn to_text(&self) -> String {
    let mut out = String::new();
    for line in self.blocks.iter().flat_map(|b| b.text_lines()) {
      out.push_str(line);
      out.push('\n');
    }
    return out;
  }
}

//! This module implements the parser for input decks, and the implementation
//! structure that holds one usage of a keyword.
//!
//! Parsing is shallow on purpose: a block is matched to its keyword by name
//! and then stored verbatim. Structure is only recovered when someone wants to
//! edit the block, through `hydrate`.

pub mod hydrate;

use std::sync::Arc;

use log::{debug, warn};

use crate::errors::ParseError;
use crate::generator::generate;
use crate::grammar::Registry;
use crate::session::Session;
use crate::tree::Keyword;
use crate::util::*;

/// The keyword name used for blocks that match nothing in the grammar.
pub const UNKNOWN_KEYWORD: &str = "<unknown>";

/// The keyword an implementation belongs to.
#[derive(Clone, Debug)]
pub enum KeywordRef {
  /// A keyword from the grammar.
  Known(Arc<Keyword>),
  /// Text we couldn't match. It's passed through untouched.
  Unknown
}

/// One concrete usage of a keyword in a document.
#[derive(Clone, Debug)]
pub struct Implementation {
  /// What this is a usage of.
  keyword: KeywordRef,
  /// The text, verbatim.
  text_lines: Vec<String>
}

impl Implementation {
  /// Makes a usage of a known keyword from its text.
  pub fn new(keyword: Arc<Keyword>, text_lines: Vec<String>) -> Self {
    return Self { keyword: KeywordRef::Known(keyword), text_lines };
  }

  /// Makes a passthrough block.
  pub fn unknown(text_lines: Vec<String>) -> Self {
    return Self { keyword: KeywordRef::Unknown, text_lines };
  }

  /// Makes a usage out of a filled-in session.
  pub fn from_session(session: &Session) -> Self {
    return Self::new(session.keyword().clone(), generate(session));
  }

  /// The keyword, if this isn't a passthrough block.
  pub fn keyword(&self) -> Option<&Arc<Keyword>> {
    return match self.keyword {
      KeywordRef::Known(ref kw) => Some(kw),
      KeywordRef::Unknown => None
    };
  }

  /// The keyword's name, or `UNKNOWN_KEYWORD` for passthrough blocks.
  pub fn keyword_name(&self) -> &str {
    return self.keyword().map_or(UNKNOWN_KEYWORD, |kw| kw.name());
  }

  /// Whether this is a passthrough block.
  pub fn is_unknown(&self) -> bool {
    return matches!(self.keyword, KeywordRef::Unknown);
  }

  /// The text, one string per line.
  pub fn text_lines(&self) -> &[String] {
    return &self.text_lines;
  }

  /// The name other usages refer to this one by: the `NAME=` parameter on
  /// the first line, or the one named like the keyword itself (`NSET=` for
  /// `*NSET`).
  pub fn name(&self) -> Option<String> {
    let keyword = self.keyword()?;
    let first = self.text_lines.first()?;
    let own_key = keyword.name()
      .chars()
      .skip(1)
      .collect::<String>();
    let names = |k: &str| k == "NAME" || k == own_key;
    return line_tokens(first)
      .into_iter()
      .skip(1)
      .find(|t| t.key.as_deref().is_some_and(names))
      .map(|t| t.value)
      .filter(|v| !v.is_empty());
  }
}

impl Registry {
  /// Is this line the start of a keyword block? Comment lines start with the
  /// sigil too, but twice.
  pub fn is_keyword_line(&self, line: &str) -> bool {
    let mut chars = line.trim_start().chars();
    return chars.next() == Some(self.sigil())
      && chars.next() != Some(self.sigil());
  }

  /// Is this line a comment?
  pub fn is_comment_line(&self, line: &str) -> bool {
    let mut chars = line.trim_start().chars();
    return chars.next() == Some(self.sigil())
      && chars.next() == Some(self.sigil());
  }

  /// Matches a block of text to its keyword. The text is kept as-is.
  pub fn parse_keyword<S: AsRef<str>>(
    &self,
    text_lines: &[S]
  ) -> Result<Implementation, ParseError> {
    let first = text_lines.first().ok_or(ParseError::EmptyBlock)?;
    let name = leading_name(first.as_ref());
    if name.is_empty() {
      return Err(ParseError::EmptyBlock);
    }
    let keyword = self.lookup(&name)
      .ok_or_else(|| ParseError::UnknownKeyword(name.clone()))?;
    let lines = text_lines.iter()
      .map(|l| l.as_ref().to_string())
      .collect();
    return Ok(Implementation::new(keyword.clone(), lines));
  }

  /// Splits a whole document into blocks and parses each of them. Blocks with
  /// an unknown name, and any text before the first keyword, become
  /// passthrough blocks instead of failing the whole document.
  pub fn parse_document(&self, text: &str) -> Vec<Implementation> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
      if blocks.is_empty() || self.is_keyword_line(line) {
        blocks.push(Vec::from([line]));
      } else if let Some(block) = blocks.last_mut() {
        block.push(line);
      }
    }
    let mut impls = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.into_iter().enumerate() {
      if !self.is_keyword_line(block[0]) {
        debug!("Block {} comes before any keyword, passing it through.", i);
        impls.push(Implementation::unknown(
          block.into_iter().map(String::from).collect()
        ));
        continue;
      }
      match self.parse_keyword(&block) {
        Ok(imp) => impls.push(imp),
        Err(e) => {
          warn!("Block {} could not be parsed ({}), passing it through.", i, e);
          impls.push(Implementation::unknown(
            block.into_iter().map(String::from).collect()
          ));
        }
      }
    }
    debug!("Parsed a document into {} blocks.", impls.len());
    return impls;
  }
}

//! This submodule implements re-hydration: mapping the stored text of an
//! implementation back onto its keyword's argument tree, so it can be edited.
//!
//! The walk mirrors the code generator. A cursor tracks where the generator
//! would have written each leaf, and a leaf only takes a token it clearly
//! owns. Anything it can't place is left unset and reported, so an odd block
//! still opens for editing instead of being rejected.

use std::sync::Arc;

use log::{debug, warn};

use crate::errors::ParseError;
use crate::parser::Implementation;
use crate::session::Session;
use crate::tree::*;
use crate::util::{leading_name, line_tokens, normalise_name, Token};

/// A line of the block being hydrated.
#[derive(Clone, Debug)]
struct Line {
  /// The line as written.
  raw: String,
  /// Its tokens; for the first line, without the keyword name.
  tokens: Vec<Token>,
  /// Comments and blank lines are skipped.
  skip: bool
}

/// Where the generator would be writing.
#[derive(Copy, Clone, Debug)]
struct Cursor {
  /// Current line.
  line: usize,
  /// First token on the line that may still be taken positionally.
  col: usize,
  /// Whether the next value would go on a fresh line.
  pending_break: bool
}

/// Everything a walk changes, so trial walks can be rolled back.
#[derive(Clone, Debug)]
struct Progress {
  /// Position.
  cursor: Cursor,
  /// Which tokens were taken, per line.
  consumed: Vec<Vec<bool>>,
  /// The session being filled in.
  session: Session,
  /// Number of tokens (or data lines) taken so far.
  claimed: usize
}

/// Checks whether a leaf owns a token, and returns the value it would take.
fn accepts(leaf: &Leaf, token: &Token) -> Option<String> {
  if leaf.is_flag() && !leaf.name.is_empty() {
    let is_flag = token.key.is_none()
      && normalise_name(&token.value) == normalise_name(&leaf.name);
    return is_flag.then(|| leaf.name.clone());
  }
  if leaf.name.is_empty() {
    return token.key.is_none().then(|| token.value.clone());
  }
  let key = normalise_name(&leaf.name);
  return (token.key.as_deref() == Some(key.as_str()))
    .then(|| token.value.clone());
}

/// Walks a keyword's tree over a block of text.
struct Hydrator<'a> {
  /// The keyword.
  keyword: &'a Keyword,
  /// The text, broken down.
  lines: Vec<Line>,
  /// The walk so far.
  progress: Progress
}

impl<'a> Hydrator<'a> {
  /// Breaks the text down and starts from a fresh session.
  fn new(keyword: &'a Arc<Keyword>, text_lines: &[String]) -> Self {
    let sigil = keyword.name().chars().next().unwrap_or('*');
    let lines = text_lines.iter()
      .enumerate()
      .map(|(i, raw)| {
        let trimmed = raw.trim_start();
        let comment = trimmed.starts_with(sigil)
          && trimmed.chars().nth(1) == Some(sigil);
        let skip = i > 0 && (comment || trimmed.is_empty());
        let mut tokens = if skip { Vec::new() } else { line_tokens(raw) };
        if i == 0 && !tokens.is_empty() {
          tokens.remove(0);
        }
        return Line { raw: raw.clone(), tokens, skip };
      })
      .collect::<Vec<_>>();
    let consumed = lines.iter().map(|l| vec![false; l.tokens.len()]).collect();
    return Self {
      keyword: keyword.as_ref(),
      lines,
      progress: Progress {
        cursor: Cursor { line: 0, col: 0, pending_break: false },
        consumed,
        session: Session::new(keyword.clone()),
        claimed: 0
      }
    };
  }

  /// The first line after another that isn't skipped.
  fn next_line(&self, after: usize) -> Option<usize> {
    return (after+1..self.lines.len()).find(|i| !self.lines[*i].skip);
  }

  /// Where a leaf's value would be written: a line, and the first token on
  /// it that's up for grabs.
  fn target(&self, newline: bool) -> Option<(usize, usize)> {
    let cursor = self.progress.cursor;
    if newline || cursor.pending_break {
      return self.next_line(cursor.line).map(|l| (l, 0));
    }
    return Some((cursor.line, cursor.col));
  }

  /// Marks a token as taken and gives its value to a leaf.
  fn claim(
    &mut self,
    id: NodeId,
    line: usize,
    idx: usize,
    value: String,
    in_order: bool
  ) -> Result<(), ParseError> {
    self.progress.session.set_value(id, value)?;
    self.take(line, idx, in_order);
    return Ok(());
  }

  /// Marks a token as taken and moves the cursor past it. Tokens taken out of
  /// order leave the column alone, unless they're on another line.
  fn take(&mut self, line: usize, idx: usize, in_order: bool) {
    self.progress.consumed[line][idx] = true;
    self.progress.claimed += 1;
    let cursor = &mut self.progress.cursor;
    if in_order {
      cursor.col = idx + 1;
    } else if cursor.line != line {
      cursor.col = 0;
    }
    cursor.line = line;
    cursor.pending_break = false;
  }

  /// Looks for a group's name written as a bare flag and takes it: first
  /// where the generator would have put it, then anywhere on that line.
  fn take_flag(&mut self, name: &str) -> bool {
    let Some((line, col)) = self.target(false) else {
      return false;
    };
    let wanted = normalise_name(name);
    let is_flag = |t: &Token| {
      return t.key.is_none() && normalise_name(&t.value) == wanted;
    };
    let consumed = &self.progress.consumed[line];
    let tokens = &self.lines[line].tokens;
    let next = (col..tokens.len())
      .find(|i| !consumed[*i])
      .filter(|i| is_flag(&tokens[*i]));
    let found = (0..tokens.len())
      .find(|i| !consumed[*i] && is_flag(&tokens[*i]));
    match (next, found) {
      (Some(idx), _) => self.take(line, idx, true),
      (None, Some(idx)) => self.take(line, idx, false),
      (None, None) => return false
    }
    return true;
  }

  /// Takes every remaining line as a free-text data block.
  fn take_data_block(&mut self, id: NodeId) -> Result<bool, ParseError> {
    let Some(start) = self.next_line(self.progress.cursor.line) else {
      return Ok(false);
    };
    let end = (start..self.lines.len())
      .rev()
      .find(|i| !self.lines[*i].raw.trim().is_empty())
      .unwrap_or(start);
    let value = self.lines[start..=end].iter()
      .map(|l| l.raw.as_str())
      .collect::<Vec<_>>()
      .join("\n");
    for line in start..=end {
      self.progress.consumed[line].iter_mut().for_each(|c| *c = true);
      if !self.lines[line].skip {
        self.progress.claimed += 1;
      }
    }
    self.progress.session.set_value(id, value)?;
    self.progress.cursor = Cursor {
      line: end,
      col: self.lines[end].tokens.len(),
      pending_break: false
    };
    return Ok(true);
  }

  /// Tries to give a leaf its value. Leaves that find nothing are cleared.
  fn leaf(&mut self, id: NodeId, leaf: &Leaf) -> Result<(), ParseError> {
    let breaking = leaf.newline || self.progress.cursor.pending_break;
    if leaf.form == LeafForm::Text && breaking && self.take_data_block(id)? {
      return Ok(());
    }
    if let Some((line, col)) = self.target(leaf.newline) {
      let consumed = &self.progress.consumed[line];
      let tokens = &self.lines[line].tokens;
      // positionally, where the generator would have put it
      let next = (col..tokens.len()).find(|i| !consumed[*i]);
      if let Some(idx) = next {
        if let Some(value) = accepts(leaf, &tokens[idx]) {
          return self.claim(id, line, idx, value, true);
        }
      }
      // named arguments may be written in any order on their line
      if !leaf.name.is_empty() {
        let found = (0..tokens.len())
          .filter(|i| !consumed[*i])
          .find_map(|i| accepts(leaf, &tokens[i]).map(|v| (i, v)));
        if let Some((idx, value)) = found {
          return self.claim(id, line, idx, value, false);
        }
      }
    }
    self.progress.session.set_value(id, "")?;
    return Ok(());
  }

  /// Walks a node and everything below it.
  fn walk(&mut self, id: NodeId) -> Result<(), ParseError> {
    let keyword = self.keyword;
    let Some(node) = keyword.node(id) else {
      return Ok(());
    };
    match node.kind {
      NodeKind::Leaf(ref leaf) => return self.leaf(id, leaf),
      NodeKind::Sequential(ref g) if node.parent.is_none() => {
        for child in g.children.iter() {
          self.walk(*child)?;
        }
      },
      NodeKind::Sequential(ref g) => {
        let before = self.progress.clone();
        let default_on = before.session.is_enabled(id);
        if g.newline {
          self.progress.cursor.pending_break = true;
        }
        let flagged = match g.name.as_deref().filter(|_| g.flag) {
          Some(name) => {
            if !self.take_flag(name) {
              // no flag, no group
              self.progress = before;
              self.progress.session.set_enabled(id, false)?;
              return Ok(());
            }
            true
          },
          None => false
        };
        for child in g.children.iter() {
          self.walk(*child)?;
        }
        if flagged || self.progress.claimed > before.claimed || default_on {
          self.progress.session.set_enabled(id, true)?;
        } else {
          self.progress = before;
        }
      },
      NodeKind::Exclusive(ref g) => {
        if g.newline {
          self.progress.cursor.pending_break = true;
        }
        let base = self.progress.clone();
        let mut best: Option<Progress> = None;
        for (i, child) in g.children.iter().enumerate() {
          self.progress = base.clone();
          self.progress.session.select(id, i)?;
          self.walk(*child)?;
          let better = best.as_ref()
            .map_or(true, |b| self.progress.claimed > b.claimed);
          if better {
            best = Some(self.progress.clone());
          }
        }
        self.progress = best.unwrap_or(base);
      }
    }
    return Ok(());
  }

  /// The tokens nobody took.
  fn leftovers(&self) -> Vec<String> {
    return self.lines.iter()
      .zip(self.progress.consumed.iter())
      .flat_map(|(line, consumed)| {
        line.tokens.iter()
          .zip(consumed.iter())
          .filter(|(_, c)| !**c)
          .map(|(t, _)| t.raw.clone())
      })
      .collect();
  }
}

/// Rebuilds an editing session from an implementation's text, and also
/// returns the tokens that couldn't be placed.
pub fn hydrate_with_leftovers(
  imp: &Implementation
) -> Result<(Session, Vec<String>), ParseError> {
  let keyword = imp.keyword().ok_or_else(|| {
    let first = imp.text_lines().first().map_or("", String::as_str);
    return ParseError::UnknownKeyword(leading_name(first));
  })?;
  let mut hydrator = Hydrator::new(keyword, imp.text_lines());
  hydrator.walk(keyword.root())?;
  let leftovers = hydrator.leftovers();
  if leftovers.is_empty() {
    debug!("Hydrated a {} block completely.", keyword.name());
  } else {
    warn!(
      "Could not place {} token(s) of a {} block: {}",
      leftovers.len(),
      keyword.name(),
      leftovers.join(", ")
    );
  }
  return Ok((hydrator.progress.session, leftovers));
}

/// Rebuilds an editing session from an implementation's text, as well as it
/// can. Anything that can't be placed is left unset.
pub fn hydrate(imp: &Implementation) -> Result<Session, ParseError> {
  return Ok(hydrate_with_leftovers(imp)?.0);
}

//! This module implements code generation: turning a session into the lines of
//! text for one usage of its keyword.
//!
//! Generation is a pure function of the session. It re-walks the whole tree
//! every time instead of patching previous output, so the result never
//! depends on the order in which edits were made.

use crate::session::Session;
use crate::tree::*;
use crate::util::SEPARATOR;

/// Accumulates output text and applies the separator and line break rules.
struct Emitter {
  /// The text so far.
  text: String,
  /// Whether nothing has been written on the current line yet.
  at_line_start: bool,
  /// Whether the next value must go on a fresh line.
  pending_break: bool
}

impl Emitter {
  /// Starts with the keyword's name on the first line.
  fn new(name: &str) -> Self {
    return Self {
      text: name.to_string(),
      at_line_start: false,
      pending_break: false
    };
  }

  /// Asks for the next value to start a new line. Breaks are only written
  /// when something follows them, and repeated requests collapse.
  fn request_break(&mut self) {
    self.pending_break = true;
  }

  /// Writes a value, preceded by a separator or a line break.
  fn emit(&mut self, piece: &str, newline: bool) {
    if (newline || self.pending_break) && !self.at_line_start {
      self.text.push('\n');
      self.at_line_start = true;
    }
    self.pending_break = false;
    if !self.at_line_start {
      self.text.push_str(SEPARATOR);
    }
    self.text.push_str(piece);
    self.at_line_start = false;
  }
}

/// Renders what a leaf writes for a given value: `NAME=VALUE`, a bare value for
/// positional leaves, or just the name for flags.
pub(crate) fn leaf_text(leaf: &Leaf, value: &str) -> String {
  if leaf.is_flag() && !leaf.name.is_empty() {
    return leaf.name.clone();
  }
  if leaf.name.is_empty() {
    return value.to_string();
  }
  return format!("{}={}", leaf.name, value);
}

/// Walks a node, skipping anything hidden.
fn walk(session: &Session, emitter: &mut Emitter, id: NodeId) {
  let Some(node) = session.keyword().node(id) else {
    return;
  };
  match node.kind {
    NodeKind::Leaf(ref leaf) => {
      let value = session.effective_value(id)
        .trim_end_matches(['\r', '\n']);
      if value.trim().is_empty() {
        return;
      }
      emitter.emit(&leaf_text(leaf, value), leaf.newline);
    },
    NodeKind::Sequential(ref g) => {
      if !session.is_enabled(id) {
        return;
      }
      if g.newline {
        emitter.request_break();
      }
      if let Some(name) = g.name.as_deref().filter(|_| g.flag) {
        emitter.emit(name, false);
      }
      for child in g.children.iter() {
        walk(session, emitter, *child);
      }
    },
    NodeKind::Exclusive(ref g) => {
      if g.newline {
        emitter.request_break();
      }
      let sel = session.selected(id).unwrap_or(0);
      if let Some(child) = g.children.get(sel) {
        walk(session, emitter, *child);
      }
    }
  }
}

/// Generates the text for a session, one string per line. The first line
/// always starts with the keyword's name.
pub fn generate(session: &Session) -> Vec<String> {
  let keyword = session.keyword();
  let mut emitter = Emitter::new(keyword.name());
  walk(session, &mut emitter, keyword.root());
  return emitter.text.lines().map(String::from).collect();
}

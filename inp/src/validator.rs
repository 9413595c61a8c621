//! This module implements the required-field check run before a form is
//! accepted. It's advisory: it lists problems and leaves the decision to the
//! caller.

use std::fmt::Display;

use serde::Serialize;

use crate::session::Session;
use crate::tree::NodeId;

/// A required leaf that's visible but has nothing in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
  /// The leaf.
  pub node: NodeId,
  /// The leaf's name; empty for positional values.
  pub leaf_name: String,
  /// Labels of the named groups around the leaf, outermost first.
  pub path: Vec<String>
}

impl Display for ValidationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = if self.leaf_name.is_empty() {
      "(unnamed value)"
    } else {
      self.leaf_name.as_str()
    };
    if self.path.is_empty() {
      return write!(f, "required field {} is empty", name);
    }
    return write!(
      f,
      "required field {} (in {}) is empty",
      name,
      self.path.join(" > ")
    );
  }
}

/// Lists every visible required leaf without a value, in document order.
/// Hidden leaves are never reported, filled or not.
pub fn validate(session: &Session) -> Vec<ValidationError> {
  let keyword = session.keyword();
  return session.visible_leaves()
    .filter(|(_, leaf)| leaf.required)
    .filter(|(id, _)| session.effective_value(*id).trim().is_empty())
    .map(|(id, leaf)| ValidationError {
      node: id,
      leaf_name: leaf.name.clone(),
      path: keyword.path(id)
    })
    .collect();
}

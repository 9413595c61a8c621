//! This module implements editing sessions: the per-usage values and flags
//! layered over a keyword's immutable argument tree.
//!
//! A session owns its state outright and only shares the keyword (read-only)
//! with others, so any number of sessions can edit usages of the same keyword
//! side by side. The three setters are the only ways to change a session, and
//! they either apply completely or not at all.

use std::sync::Arc;

use crate::errors::SessionError;
use crate::index::ImplementationIndex;
use crate::tree::*;

/// The mutable state of a single node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeState {
  /// A leaf's current value and whether it's switched on.
  Leaf {
    /// The text in the slot.
    value: String,
    /// Disabled leaves write nothing.
    enabled: bool
  },
  /// Whether a sequential group is switched on.
  Group {
    /// Disabled groups hide everything below them.
    enabled: bool
  },
  /// Which alternative of an exclusive group is active.
  Choice {
    /// Always a valid index into the group's children.
    selected: usize
  }
}

/// The editing state for one usage of a keyword.
#[derive(Clone, Debug)]
pub struct Session {
  /// The keyword being edited.
  keyword: Arc<Keyword>,
  /// One state per node, indexed like the keyword's arena.
  states: Vec<NodeState>
}

impl Session {
  /// Starts a session with every node in its default state.
  pub fn new(keyword: Arc<Keyword>) -> Self {
    let states = Self::defaults(&keyword);
    return Self { keyword, states };
  }

  /// Computes the default state for a keyword's tree. Optional groups start
  /// off, unless a required leaf inside them would otherwise be hidden.
  fn defaults(keyword: &Keyword) -> Vec<NodeState> {
    let mut states = keyword.nodes()
      .map(|n| match n.kind {
        NodeKind::Leaf(ref leaf) => NodeState::Leaf {
          value: leaf.default.clone(),
          enabled: true
        },
        NodeKind::Sequential(ref g) => NodeState::Group {
          enabled: !g.optional || n.parent.is_none()
        },
        NodeKind::Exclusive(_) => NodeState::Choice { selected: 0 }
      })
      .collect::<Vec<_>>();
    // a required leaf switches on its groups, but never changes a choice:
    // propagation stops at an alternative that isn't selected by default.
    for (id, leaf) in keyword.leaves() {
      if !leaf.required {
        continue;
      }
      let mut child = id;
      for anc in keyword.ancestors(id) {
        match anc.kind {
          NodeKind::Sequential(_) => {
            states[anc.id.index()] = NodeState::Group { enabled: true };
          },
          NodeKind::Exclusive(ref g) => {
            if g.children.first() != Some(&child) {
              break;
            }
          },
          NodeKind::Leaf(_) => {}
        }
        child = anc.id;
      }
    }
    return states;
  }

  /// Puts every node back in its default state.
  pub fn reset(&mut self) {
    self.states = Self::defaults(&self.keyword);
  }

  /// The keyword being edited.
  pub fn keyword(&self) -> &Arc<Keyword> {
    return &self.keyword;
  }

  /// Gets a node, failing if it belongs to another keyword.
  fn checked(&self, id: NodeId) -> Result<&Node, SessionError> {
    return self.keyword.node(id).ok_or(SessionError::InvalidNode(id));
  }

  /// The state of a node.
  pub fn state(&self, id: NodeId) -> Option<&NodeState> {
    if !self.keyword.contains(id) {
      return None;
    }
    return self.states.get(id.index());
  }

  /// The current value of a leaf, regardless of whether it's enabled.
  pub fn value(&self, id: NodeId) -> Option<&str> {
    return match self.state(id) {
      Some(NodeState::Leaf { value, .. }) => Some(value.as_str()),
      _ => None
    };
  }

  /// The value a leaf would contribute: empty when the leaf is disabled.
  pub fn effective_value(&self, id: NodeId) -> &str {
    return match self.state(id) {
      Some(NodeState::Leaf { value, enabled: true }) => value.as_str(),
      _ => ""
    };
  }

  /// Whether a leaf or group is switched on. Exclusive groups are always on.
  pub fn is_enabled(&self, id: NodeId) -> bool {
    return match self.state(id) {
      Some(NodeState::Leaf { enabled, .. }) => *enabled,
      Some(NodeState::Group { enabled }) => *enabled,
      Some(NodeState::Choice { .. }) => true,
      None => false
    };
  }

  /// The selected alternative of an exclusive group.
  pub fn selected(&self, id: NodeId) -> Option<usize> {
    return match self.state(id) {
      Some(NodeState::Choice { selected }) => Some(*selected),
      _ => None
    };
  }

  /// Sets the value of a leaf.
  pub fn set_value<S: Into<String>>(
    &mut self,
    id: NodeId,
    value: S
  ) -> Result<(), SessionError> {
    let node = self.checked(id)?;
    if node.as_leaf().is_none() {
      return Err(SessionError::WrongNodeKind { node: id, expected: "a leaf" });
    }
    if let NodeState::Leaf { value: ref mut v, .. } = self.states[id.index()] {
      *v = value.into();
    }
    return Ok(());
  }

  /// Switches a leaf or a sequential group on or off. The root can't be
  /// switched off.
  pub fn set_enabled(
    &mut self,
    id: NodeId,
    enabled: bool
  ) -> Result<(), SessionError> {
    let node = self.checked(id)?;
    let wrong_kind = SessionError::WrongNodeKind {
      node: id,
      expected: "a leaf or a non-root sequential group"
    };
    if node.parent.is_none() {
      return Err(wrong_kind);
    }
    match self.states[id.index()] {
      NodeState::Leaf { enabled: ref mut e, .. } => *e = enabled,
      NodeState::Group { enabled: ref mut e } => *e = enabled,
      NodeState::Choice { .. } => return Err(wrong_kind)
    }
    return Ok(());
  }

  /// Selects an alternative of an exclusive group.
  pub fn select(
    &mut self,
    id: NodeId,
    index: usize
  ) -> Result<(), SessionError> {
    let node = self.checked(id)?;
    let len = match node.kind {
      NodeKind::Exclusive(ref g) => g.children.len(),
      _ => return Err(SessionError::WrongNodeKind {
        node: id,
        expected: "an exclusive group"
      })
    };
    if index >= len {
      return Err(SessionError::IndexOutOfRange { node: id, index, len });
    }
    self.states[id.index()] = NodeState::Choice { selected: index };
    return Ok(());
  }

  /// Whether a node can be reached through switched-on groups and selected
  /// alternatives. The node's own flag doesn't matter here.
  pub fn is_visible(&self, id: NodeId) -> bool {
    if !self.keyword.contains(id) {
      return false;
    }
    let mut child = id;
    for anc in self.keyword.ancestors(id) {
      let active = match anc.kind {
        NodeKind::Sequential(_) => self.is_enabled(anc.id),
        NodeKind::Exclusive(ref g) => self.selected(anc.id)
          .and_then(|i| g.children.get(i))
          .is_some_and(|sel| *sel == child),
        NodeKind::Leaf(_) => true
      };
      if !active {
        return false;
      }
      child = anc.id;
    }
    return true;
  }

  /// The leaves reachable through switched-on groups and selected
  /// alternatives, in document order. Computed afresh on every call.
  pub fn visible_leaves(&self) -> VisibleLeaves<'_> {
    return VisibleLeaves {
      session: self,
      stack: Vec::from([self.keyword.root()])
    };
  }

  /// The values a control for a leaf should offer. Cross-references are read
  /// live from the index; free-text leaves offer nothing.
  pub fn candidates(
    &self,
    id: NodeId,
    index: &ImplementationIndex
  ) -> Result<Vec<String>, SessionError> {
    let leaf = self.checked(id)?
      .as_leaf()
      .ok_or(SessionError::WrongNodeKind { node: id, expected: "a leaf" })?;
    return Ok(match leaf.values {
      AllowedValues::FreeText => Vec::new(),
      AllowedValues::List(ref v) => v.clone(),
      AllowedValues::CrossReference(ref kw) => index.names_of(kw)
    });
  }
}

/// Iterator over a session's visible leaves. See `Session::visible_leaves`.
pub struct VisibleLeaves<'s> {
  /// The session being walked.
  session: &'s Session,
  /// Nodes still to visit, next on top.
  stack: Vec<NodeId>
}

impl<'s> Iterator for VisibleLeaves<'s> {
  type Item = (NodeId, &'s Leaf);

  fn next(&mut self) -> Option<Self::Item> {
    let session = self.session;
    while let Some(id) = self.stack.pop() {
      let node = session.keyword.node(id)?;
      match node.kind {
        NodeKind::Leaf(ref leaf) => return Some((id, leaf)),
        NodeKind::Sequential(ref g) => {
          if session.is_enabled(id) {
            self.stack.extend(g.children.iter().rev());
          }
        },
        NodeKind::Exclusive(ref g) => {
          let sel = session.selected(id).unwrap_or(0);
          self.stack.extend(g.children.get(sel));
        }
      }
    }
    return None;
  }
}

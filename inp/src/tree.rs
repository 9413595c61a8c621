//! This module implements the static shape of a keyword: its argument tree.
//!
//! Nodes live in a flat arena owned by the keyword and are addressed by
//! `NodeId`s. The arena is laid out in document order (a pre-order walk of the
//! tree), so iterating over it visits arguments in the order they're written.
//! Parents are stored as ids, never as references.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifies a node within one keyword's argument tree.
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize
)]
pub struct NodeId {
  /// The ordinal of the keyword owning the node.
  pub(crate) tree: u32,
  /// The position of the node in the keyword's arena.
  pub(crate) index: u32
}

impl NodeId {
  /// Makes a node ID, if the index fits.
  pub(crate) fn new(tree: u32, index: usize) -> Option<Self> {
    let index = u32::try_from(index).ok()?;
    return Some(Self { tree, index });
  }

  /// The position of this node in its keyword's arena.
  pub const fn index(&self) -> usize {
    return self.index as usize;
  }
}

impl Display for NodeId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "#{}.{}", self.tree, self.index);
  }
}

/// The kind of control a leaf is rendered as.
#[derive(
  Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize
)]
#[serde(rename_all = "lowercase")]
pub enum LeafForm {
  /// A single line of free text.
  #[default]
  Line,
  /// An integer.
  Int,
  /// A real number.
  Float,
  /// A free-text data block spanning several lines.
  Text,
  /// A choice between several values.
  Combo,
  /// A flag that's either written (by name) or not.
  Bool,
  /// A path to a file.
  File
}

/// What a leaf is allowed to contain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllowedValues {
  /// Anything goes.
  FreeText,
  /// One of a fixed list of values.
  List(Vec<String>),
  /// The name of an existing implementation of another keyword.
  CrossReference(String)
}

/// A single value slot.
#[derive(Clone, Debug)]
pub struct Leaf {
  /// The argument name, written as `NAME=VALUE`. Empty for positional values.
  pub name: String,
  /// A short explanation for the user.
  pub comment: Option<String>,
  /// Whether the argument must be filled.
  pub required: bool,
  /// Whether the user may edit it.
  pub readonly: bool,
  /// Whether the argument starts a new line.
  pub newline: bool,
  /// The control kind.
  pub form: LeafForm,
  /// The legal values.
  pub values: AllowedValues,
  /// The value a fresh session starts with.
  pub default: String
}

impl Leaf {
  /// Returns the keyword this leaf refers to, if it's a cross-reference.
  pub fn cross_reference(&self) -> Option<&str> {
    return match self.values {
      AllowedValues::CrossReference(ref kw) => Some(kw.as_str()),
      _ => None
    };
  }

  /// Returns the fixed value list, if any.
  pub fn allowed_values(&self) -> Option<&[String]> {
    return match self.values {
      AllowedValues::List(ref v) => Some(v.as_slice()),
      _ => None
    };
  }

  /// Is this leaf a flag?
  pub fn is_flag(&self) -> bool {
    return self.form == LeafForm::Bool;
  }
}

/// A bundle of sibling arguments that's included as a whole or not at all.
#[derive(Clone, Debug)]
pub struct SequentialGroup {
  /// A label for the group.
  pub name: Option<String>,
  /// A short explanation for the user.
  pub comment: Option<String>,
  /// Whether the group's content starts a new line.
  pub newline: bool,
  /// Whether the user can switch the group off. Non-optional groups are just
  /// layout and start switched on.
  pub optional: bool,
  /// Whether the group writes its name as a bare flag while switched on,
  /// e.g. `NLGEOM` in `*STEP, NLGEOM, INC=100`.
  pub flag: bool,
  /// The group's members, in order.
  pub children: Vec<NodeId>
}

/// A set of alternatives where exactly one is active.
#[derive(Clone, Debug)]
pub struct ExclusiveGroup {
  /// Whether the active alternative starts a new line.
  pub newline: bool,
  /// The alternatives, in order. Never empty.
  pub children: Vec<NodeId>
}

/// The three kinds of argument nodes.
#[derive(Clone, Debug, derive_more::From)]
pub enum NodeKind {
  /// A value slot.
  Leaf(Leaf),
  /// An optional bundle.
  Sequential(SequentialGroup),
  /// A choice.
  Exclusive(ExclusiveGroup)
}

/// A node in the argument tree.
#[derive(Clone, Debug)]
pub struct Node {
  /// This node's ID.
  pub id: NodeId,
  /// The enclosing group. Only the root has none.
  pub parent: Option<NodeId>,
  /// What the node is.
  pub kind: NodeKind
}

impl Node {
  /// Returns the node's label, if it has one.
  pub fn name(&self) -> Option<&str> {
    return match self.kind {
      NodeKind::Leaf(ref leaf) => Some(leaf.name.as_str()),
      NodeKind::Sequential(ref g) => g.name.as_deref(),
      NodeKind::Exclusive(_) => None
    };
  }

  /// Returns the node's direct children.
  pub fn children(&self) -> &[NodeId] {
    return match self.kind {
      NodeKind::Leaf(_) => &[],
      NodeKind::Sequential(ref g) => &g.children,
      NodeKind::Exclusive(ref g) => &g.children
    };
  }

  /// Returns the leaf inside, if this is one.
  pub fn as_leaf(&self) -> Option<&Leaf> {
    return match self.kind {
      NodeKind::Leaf(ref leaf) => Some(leaf),
      _ => None
    };
  }

  /// Whether this node requests a line break before its content.
  pub fn newline(&self) -> bool {
    return match self.kind {
      NodeKind::Leaf(ref leaf) => leaf.newline,
      NodeKind::Sequential(ref g) => g.newline,
      NodeKind::Exclusive(ref g) => g.newline
    };
  }
}

/// A keyword in the solver's grammar. Immutable once loaded.
#[derive(Clone, Debug)]
pub struct Keyword {
  /// The name, sigil included, e.g. `*CONSTRAINT`.
  pub(crate) name: String,
  /// A short explanation for the user.
  pub(crate) comment: Option<String>,
  /// Position of the keyword in its registry.
  pub(crate) ordinal: u32,
  /// The argument arena. Index 0 is the implicit root group.
  pub(crate) nodes: Vec<Node>
}

impl Keyword {
  /// The keyword's name, sigil included.
  pub fn name(&self) -> &str {
    return &self.name;
  }

  /// The keyword's comment, if any.
  pub fn comment(&self) -> Option<&str> {
    return self.comment.as_deref();
  }

  /// The root group, which holds the first-level arguments.
  pub fn root(&self) -> NodeId {
    return NodeId { tree: self.ordinal, index: 0 };
  }

  /// Number of nodes in the tree, root included.
  pub fn len(&self) -> usize {
    return self.nodes.len();
  }

  /// A keyword always has at least its root.
  pub fn is_empty(&self) -> bool {
    return false;
  }

  /// Checks if a node belongs to this keyword.
  pub fn contains(&self, id: NodeId) -> bool {
    return id.tree == self.ordinal && id.index() < self.nodes.len();
  }

  /// Gets a node by ID.
  pub fn node(&self, id: NodeId) -> Option<&Node> {
    if !self.contains(id) {
      return None;
    }
    return self.nodes.get(id.index());
  }

  /// All nodes, in document order.
  pub fn nodes(&self) -> impl Iterator<Item = &Node> {
    return self.nodes.iter();
  }

  /// The direct children of a node; empty for leaves and foreign IDs.
  pub fn children(&self, id: NodeId) -> &[NodeId] {
    return self.node(id).map_or(&[], |n| n.children());
  }

  /// The enclosing group of a node.
  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    return self.node(id).and_then(|n| n.parent);
  }

  /// Walks from a node's parent up to the root.
  pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &Node> + '_ {
    return std::iter::successors(
      self.parent(id).and_then(|p| self.node(p)),
      |n| n.parent.and_then(|p| self.node(p))
    );
  }

  /// The labels of the named groups enclosing a node, outermost first. The
  /// root is left out.
  pub fn path(&self, id: NodeId) -> Vec<String> {
    let mut labels = self.ancestors(id)
      .filter(|n| n.parent.is_some())
      .filter_map(|n| n.name())
      .filter(|s| !s.is_empty())
      .map(String::from)
      .collect::<Vec<_>>();
    labels.reverse();
    return labels;
  }

  /// All leaves, in document order.
  pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &Leaf)> {
    return self.nodes.iter()
      .filter_map(|n| n.as_leaf().map(|l| (n.id, l)));
  }

  /// Finds the first node with a given label (case-insensitive).
  pub fn find(&self, name: &str) -> Option<NodeId> {
    return self.nodes.iter()
      .find(|n| n.name().is_some_and(|s| s.eq_ignore_ascii_case(name)))
      .map(|n| n.id);
  }
}

impl Display for Keyword {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name);
  }
}

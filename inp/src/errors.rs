//! This module contains the error types for grammar loading, parsing and
//! session editing.

use std::io;

use thiserror::Error;

use crate::tree::NodeId;

/// Errors found while loading a grammar. These are fatal for the grammar
/// source they come from.
#[derive(Debug, Error)]
pub enum GrammarError {
  /// The grammar source is not valid TOML or has unexpected fields.
  #[error("malformed grammar source: {0}")]
  Syntax(#[from] toml::de::Error),
  /// The grammar file could not be read.
  #[error("could not read grammar: {0}")]
  Io(#[from] io::Error),
  /// The grammar declares a sigil that isn't exactly one character.
  #[error("bad sigil \"{0}\", must be a single character")]
  BadSigil(String),
  /// Two keywords share a name.
  #[error("keyword {0} is defined more than once")]
  DuplicateKeyword(String),
  /// A keyword name is empty or does not start with the sigil.
  #[error("bad keyword name \"{name}\", must start with '{sigil}'")]
  BadKeywordName {
    /// The offending name.
    name: String,
    /// The grammar's sigil.
    sigil: char
  },
  /// An "or" node has nothing to choose from.
  #[error("exclusive group in {keyword} has no alternatives")]
  EmptyExclusiveGroup {
    /// The keyword containing the group.
    keyword: String
  },
  /// A leaf declares both a value list and a cross-reference.
  #[error("argument {argument} of {keyword} has both values and a cross-reference")]
  ConflictingValues {
    /// The keyword containing the leaf.
    keyword: String,
    /// The leaf's name.
    argument: String
  },
  /// A leaf declares nested arguments.
  #[error("argument {argument} of {keyword} is a leaf but has nested arguments")]
  LeafWithChildren {
    /// The keyword containing the leaf.
    keyword: String,
    /// The leaf's name.
    argument: String
  },
  /// A leaf refers to a keyword that the grammar doesn't define.
  #[error("argument {argument} of {keyword} refers to unknown keyword {target}")]
  UnknownCrossReference {
    /// The keyword containing the leaf.
    keyword: String,
    /// The leaf's name.
    argument: String,
    /// The missing keyword.
    target: String
  },
  /// A free-text data block is declared where it couldn't be read back after
  /// being written.
  #[error("data block in {keyword} {reason}")]
  BadDataBlock {
    /// The keyword containing the block.
    keyword: String,
    /// What's wrong with it.
    reason: &'static str
  },
  /// A group that writes its name as a flag has no name.
  #[error("flag group in {keyword} has no name")]
  UnnamedFlagGroup {
    /// The keyword containing the group.
    keyword: String
  },
  /// A keyword has more argument nodes than node IDs can address.
  #[error("keyword {keyword} has too many arguments")]
  TooManyNodes {
    /// The keyword.
    keyword: String
  },
  /// The grammar has more keywords than node IDs can address.
  #[error("grammar has too many keywords")]
  TooManyKeywords
}

/// Errors when turning text into implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  /// The leading name of a block matches no keyword in the grammar.
  #[error("unknown keyword {0}")]
  UnknownKeyword(String),
  /// There was no text to parse at all.
  #[error("empty keyword block")]
  EmptyBlock,
  /// Re-hydration tried to touch the session in a way it doesn't allow.
  #[error(transparent)]
  Session(#[from] SessionError)
}

/// Misuse of the session API. These indicate a bug in the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
  /// The node doesn't belong to the session's keyword.
  #[error("node {0} does not belong to this session")]
  InvalidNode(NodeId),
  /// The node exists but the operation doesn't apply to its kind.
  #[error("node {node} is not {expected}")]
  WrongNodeKind {
    /// The node.
    node: NodeId,
    /// What the operation expected it to be.
    expected: &'static str
  },
  /// An exclusive group was asked to select an alternative it doesn't have.
  #[error("node {node} has {len} alternatives, can't select {index}")]
  IndexOutOfRange {
    /// The exclusive group.
    node: NodeId,
    /// The requested index.
    index: usize,
    /// The number of alternatives.
    len: usize
  }
}

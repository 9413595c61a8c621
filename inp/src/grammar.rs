//! This module implements the grammar registry: the static definition of every
//! keyword the solver understands, loaded once from a TOML description.
//!
//! A grammar looks like this:
//!
//! ```toml
//! sigil = "*"
//!
//! [[keyword]]
//! name = "*CONSTRAINT"
//!
//!   [[keyword.argument]]
//!   name = "NAME"
//!   required = true
//!
//!   [[keyword.argument]]
//!   name = "TYPE"
//!   values = "DISTRIBUTING|COUPLING"
//! ```
//!
//! Arguments are leaves by default; `kind = "group"` makes an optional bundle
//! and `kind = "or"` a set of alternatives, both holding their own nested
//! `argument` arrays.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::errors::GrammarError;
use crate::tree::*;
use crate::util::{normalise_name, ValueList};

/// The grammar bundled with the library, covering common CalculiX keywords.
const BUILTIN_GRAMMAR: &str = include_str!("../grammar/ccx.toml");

/// The sigil used when a grammar doesn't declare one.
fn default_sigil() -> String {
  return String::from("*");
}

/// A grammar source, as written.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGrammar {
  /// The character that starts every keyword line.
  #[serde(default = "default_sigil")]
  sigil: String,
  /// The keywords, in definition order.
  #[serde(default, rename = "keyword")]
  keywords: Vec<RawKeyword>
}

/// A keyword, as written.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKeyword {
  /// Name, sigil included.
  name: String,
  /// Optional explanation.
  #[serde(default)]
  comment: Option<String>,
  /// First-level arguments.
  #[serde(default, rename = "argument")]
  arguments: Vec<RawNode>
}

/// The node kinds, as written.
#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
  /// A value slot.
  #[default]
  Leaf,
  /// An optional bundle.
  Group,
  /// A set of alternatives.
  Or
}

/// An argument node, as written. Which fields matter depends on the kind.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNode {
  /// Node kind.
  #[serde(default)]
  kind: RawKind,
  /// Label; `|`-joined for mutually exclusive leaf names.
  #[serde(default)]
  name: String,
  /// Optional explanation.
  #[serde(default)]
  comment: Option<String>,
  /// Leaves only.
  #[serde(default)]
  required: bool,
  /// Leaves only.
  #[serde(default)]
  readonly: bool,
  /// Whether the node starts a new line.
  #[serde(default)]
  newline: bool,
  /// Groups only; defaults to true.
  #[serde(default)]
  optional: Option<bool>,
  /// Groups only: write the group's name as a flag while it's switched on.
  #[serde(default)]
  flag: bool,
  /// Leaves only.
  #[serde(default)]
  form: Option<LeafForm>,
  /// Leaves only: the fixed value list.
  #[serde(default)]
  values: Option<ValueList>,
  /// Leaves only: the starting value.
  #[serde(default)]
  default: Option<String>,
  /// Leaves only: the keyword whose implementations are the legal values.
  #[serde(default, rename = "use", alias = "cross_reference")]
  cross_reference: Option<String>,
  /// Nested arguments of groups.
  #[serde(default, rename = "argument")]
  arguments: Vec<RawNode>
}

/// Builds one keyword's arena in document order.
struct TreeBuilder<'a> {
  /// Name of the keyword being built, for error messages.
  keyword: &'a str,
  /// The keyword's ordinal, stamped into every node ID.
  ordinal: u32,
  /// Canonical keyword names by normalised name, to resolve references.
  known: &'a HashMap<String, String>,
  /// The arena so far.
  nodes: Vec<Node>
}

impl<'a> TreeBuilder<'a> {
  /// Appends a node to the arena and returns its ID.
  fn push(
    &mut self,
    parent: Option<NodeId>,
    kind: NodeKind
  ) -> Result<NodeId, GrammarError> {
    let id = NodeId::new(self.ordinal, self.nodes.len())
      .ok_or_else(|| GrammarError::TooManyNodes {
        keyword: self.keyword.to_string()
      })?;
    self.nodes.push(Node { id, parent, kind });
    return Ok(id);
  }

  /// Shorthand for a data block error in the keyword being built.
  fn bad_data_block(&self, reason: &'static str) -> GrammarError {
    return GrammarError::BadDataBlock {
      keyword: self.keyword.to_string(),
      reason
    };
  }

  /// Checks that nothing is written after a data block, since its lines run
  /// until the end of the keyword block.
  fn check_data_block_is_last(&self) -> Result<(), GrammarError> {
    let is_text = |n: &Node| n.as_leaf()
      .is_some_and(|l| l.form == LeafForm::Text);
    let Some(pos) = self.nodes.iter().position(is_text) else {
      return Ok(());
    };
    let writes_something = |n: &Node| match n.kind {
      NodeKind::Leaf(_) => true,
      NodeKind::Sequential(ref g) => g.flag,
      NodeKind::Exclusive(_) => false
    };
    if self.nodes[pos + 1..].iter().any(writes_something) {
      return Err(self.bad_data_block("must be the last argument"));
    }
    return Ok(());
  }

  /// Sets the children of a group pushed earlier.
  fn set_children(&mut self, id: NodeId, ids: Vec<NodeId>) {
    match self.nodes[id.index()].kind {
      NodeKind::Sequential(ref mut g) => g.children = ids,
      NodeKind::Exclusive(ref mut g) => g.children = ids,
      NodeKind::Leaf(_) => {}
    }
  }

  /// Builds a list of sibling nodes under a parent.
  fn build_all(
    &mut self,
    parent: NodeId,
    raws: Vec<RawNode>
  ) -> Result<Vec<NodeId>, GrammarError> {
    return raws.into_iter().map(|r| self.build(parent, r)).collect();
  }

  /// Builds a node and everything below it.
  fn build(
    &mut self,
    parent: NodeId,
    raw: RawNode
  ) -> Result<NodeId, GrammarError> {
    match raw.kind {
      RawKind::Group => {
        let name = Some(raw.name).filter(|s| !s.is_empty());
        if raw.flag && name.is_none() {
          return Err(GrammarError::UnnamedFlagGroup {
            keyword: self.keyword.to_string()
          });
        }
        let group = SequentialGroup {
          name,
          comment: raw.comment,
          newline: raw.newline,
          optional: raw.optional.unwrap_or(true),
          flag: raw.flag,
          children: Vec::new()
        };
        let id = self.push(Some(parent), group.into())?;
        let children = self.build_all(id, raw.arguments)?;
        self.set_children(id, children);
        return Ok(id);
      },
      RawKind::Or => {
        if raw.arguments.is_empty() {
          return Err(GrammarError::EmptyExclusiveGroup {
            keyword: self.keyword.to_string()
          });
        }
        let group = ExclusiveGroup {
          newline: raw.newline,
          children: Vec::new()
        };
        let id = self.push(Some(parent), group.into())?;
        let children = self.build_all(id, raw.arguments)?;
        self.set_children(id, children);
        return Ok(id);
      },
      RawKind::Leaf => return self.build_leaf(parent, raw)
    }
  }

  /// Builds a leaf. A `|`-joined name becomes an exclusive group with one
  /// leaf per label.
  fn build_leaf(
    &mut self,
    parent: NodeId,
    raw: RawNode
  ) -> Result<NodeId, GrammarError> {
    if !raw.arguments.is_empty() {
      return Err(GrammarError::LeafWithChildren {
        keyword: self.keyword.to_string(),
        argument: raw.name
      });
    }
    let values = match (raw.values, raw.cross_reference) {
      (Some(_), Some(_)) => return Err(GrammarError::ConflictingValues {
        keyword: self.keyword.to_string(),
        argument: raw.name
      }),
      (Some(list), None) => AllowedValues::List(list.into_iter().collect()),
      (None, Some(target)) => {
        let canonical = self.known.get(&normalise_name(&target))
          .ok_or_else(|| GrammarError::UnknownCrossReference {
            keyword: self.keyword.to_string(),
            argument: raw.name.clone(),
            target: target.clone()
          })?;
        AllowedValues::CrossReference(canonical.clone())
      },
      (None, None) => AllowedValues::FreeText
    };
    let form = raw.form.unwrap_or(match values {
      AllowedValues::FreeText => LeafForm::Line,
      _ => LeafForm::Combo
    });
    // data blocks are read back as whole lines, never as tokens.
    if form == LeafForm::Text {
      if !raw.name.trim().is_empty() {
        return Err(self.bad_data_block("must be unnamed"));
      }
      if !raw.newline {
        return Err(self.bad_data_block("must start on a new line"));
      }
    }
    let labels = raw.name.split('|')
      .map(str::trim)
      .map(String::from)
      .collect::<Vec<_>>();
    let make_leaf = |name: String, newline: bool| {
      let default = match (&raw.default, &values) {
        (Some(d), _) => d.clone(),
        _ if form == LeafForm::Bool && raw.required => name.clone(),
        (None, AllowedValues::List(v)) if form != LeafForm::Bool => {
          v.first().cloned().unwrap_or_default()
        },
        _ => String::new()
      };
      return Leaf {
        name,
        comment: raw.comment.clone(),
        required: raw.required,
        readonly: raw.readonly,
        newline,
        form,
        values: values.clone(),
        default
      };
    };
    if labels.len() == 1 {
      let leaf = make_leaf(raw.name.clone(), raw.newline);
      return self.push(Some(parent), leaf.into());
    }
    let group = ExclusiveGroup { newline: raw.newline, children: Vec::new() };
    let id = self.push(Some(parent), group.into())?;
    let children = labels.into_iter()
      .map(|label| {
        let leaf = make_leaf(label, false);
        return self.push(Some(id), leaf.into());
      })
      .collect::<Result<Vec<_>, _>>()?;
    self.set_children(id, children);
    return Ok(id);
  }
}

/// The set of all known keywords. Read-only once loaded, so it can be shared
/// freely between sessions and threads.
#[derive(Clone, Debug)]
pub struct Registry {
  /// The character starting every keyword line.
  sigil: char,
  /// Keywords by normalised name, in definition order.
  keywords: IndexMap<String, Arc<Keyword>>
}

impl Registry {
  /// Loads a grammar from its TOML description.
  pub fn load(source: &str) -> Result<Self, GrammarError> {
    let raw: RawGrammar = toml::from_str(source)?;
    let mut chars = raw.sigil.chars();
    let sigil = match (chars.next(), chars.next()) {
      (Some(c), None) => c,
      _ => return Err(GrammarError::BadSigil(raw.sigil))
    };
    // first pass: names, so cross-references can point forwards.
    let mut known: HashMap<String, String> = HashMap::new();
    for kw in raw.keywords.iter() {
      let norm = normalise_name(&kw.name);
      if norm.len() <= sigil.len_utf8() || !norm.starts_with(sigil) {
        return Err(GrammarError::BadKeywordName {
          name: kw.name.clone(),
          sigil
        });
      }
      if known.insert(norm.clone(), norm).is_some() {
        return Err(GrammarError::DuplicateKeyword(kw.name.clone()));
      }
    }
    // second pass: the trees.
    let mut keywords = IndexMap::new();
    for (ordinal, kw) in raw.keywords.into_iter().enumerate() {
      let name = normalise_name(&kw.name);
      let ordinal = u32::try_from(ordinal)
        .map_err(|_| GrammarError::TooManyKeywords)?;
      let mut builder = TreeBuilder {
        keyword: &name,
        ordinal,
        known: &known,
        nodes: Vec::new()
      };
      let root = builder.push(None, SequentialGroup {
        name: None,
        comment: None,
        newline: false,
        optional: false,
        flag: false,
        children: Vec::new()
      }.into())?;
      let children = builder.build_all(root, kw.arguments)?;
      builder.set_children(root, children);
      builder.check_data_block_is_last()?;
      let nodes = builder.nodes;
      debug!("Loaded keyword {} with {} nodes.", name, nodes.len());
      keywords.insert(name.clone(), Arc::new(Keyword {
        name,
        comment: kw.comment,
        ordinal,
        nodes
      }));
    }
    debug!("Grammar has {} keywords.", keywords.len());
    return Ok(Self { sigil, keywords });
  }

  /// Reads and loads a grammar file.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GrammarError> {
    let source = std::fs::read_to_string(path)?;
    return Self::load(&source);
  }

  /// Loads the grammar bundled with the library.
  pub fn builtin() -> Result<Self, GrammarError> {
    return Self::load(BUILTIN_GRAMMAR);
  }

  /// The character starting every keyword line.
  pub fn sigil(&self) -> char {
    return self.sigil;
  }

  /// Finds a keyword by name. Case-insensitive, but the sigil must be there.
  pub fn lookup(&self, name: &str) -> Option<&Arc<Keyword>> {
    return self.keywords.get(&normalise_name(name));
  }

  /// All keywords, in definition order.
  pub fn all_keywords(&self) -> impl Iterator<Item = &Arc<Keyword>> {
    return self.keywords.values();
  }

  /// Number of keywords.
  pub fn len(&self) -> usize {
    return self.keywords.len();
  }

  /// Whether the grammar defines no keywords at all.
  pub fn is_empty(&self) -> bool {
    return self.keywords.is_empty();
  }
}

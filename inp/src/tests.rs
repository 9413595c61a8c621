//! Unit tests for the library, with a small grammar shared between them.

mod deck;
mod index;
mod session;

use crate::prelude::*;

/// A grammar exercising every node kind.
pub(crate) const TEST_GRAMMAR: &str = r#"
[[keyword]]
name = "*CONSTRAINT"

  [[keyword.argument]]
  name = "NAME"
  required = true

  [[keyword.argument]]
  name = "TYPE"
  values = "DISTRIBUTING|COUPLING"

  [[keyword.argument]]
  name = "PENALTY"
  form = "float"
  newline = true

[[keyword]]
name = "*SURFACE"

  [[keyword.argument]]
  name = "NAME"
  required = true

  [[keyword.argument]]
  form = "text"
  newline = true

[[keyword]]
name = "*CONTACT"

  [[keyword.argument]]
  name = "SURFACE"
  use = "*SURFACE"

  [[keyword.argument]]
  kind = "group"
  name = "Options"

    [[keyword.argument.argument]]
    name = "ADJUST"
    required = true

    [[keyword.argument.argument]]
    name = "TOL"

  [[keyword.argument]]
  kind = "or"
  newline = true

    [[keyword.argument.argument]]
    name = "FREQUENCY"

    [[keyword.argument.argument]]
    kind = "group"
    name = "Times"
    optional = false

      [[keyword.argument.argument.argument]]
      name = "START"
      required = true

      [[keyword.argument.argument.argument]]
      name = "END"

  [[keyword.argument]]
  kind = "group"
  name = "Extra"
  newline = true

    [[keyword.argument.argument]]
    comment = "A positional value."

    [[keyword.argument.argument]]
    name = "FLAG"
    form = "bool"
"#;

/// A grammar with a group that's written as a flag.
pub(crate) const STEP_GRAMMAR: &str = r#"
[[keyword]]
name = "*STEP"

  [[keyword.argument]]
  kind = "group"
  name = "NLGEOM"
  flag = true

    [[keyword.argument.argument]]
    name = "INC"

  [[keyword.argument]]
  name = "PERTURBATION"
  form = "bool"
"#;

/// Loads the test grammar.
pub(crate) fn registry() -> Registry {
  return Registry::load(TEST_GRAMMAR).expect("test grammar should load");
}

/// Starts a session for a keyword of a registry.
pub(crate) fn session(registry: &Registry, name: &str) -> Session {
  let kw = registry.lookup(name).expect("keyword should exist");
  return Session::new(kw.clone());
}

/// Finds a node by label in a session's keyword.
pub(crate) fn node(session: &Session, name: &str) -> NodeId {
  return session.keyword().find(name).expect("node should exist");
}

/// The exclusive group of `*CONTACT`.
pub(crate) fn contact_choice(session: &Session) -> NodeId {
  let kw = session.keyword();
  return kw.children(kw.root())[2];
}

/// The positional leaf in the `Extra` group of `*CONTACT`.
pub(crate) fn contact_positional(session: &Session) -> NodeId {
  let kw = session.keyword();
  let extra = kw.find("Extra").expect("group should exist");
  return kw.children(extra)[0];
}

/// Turns a slice of literals into owned lines.
pub(crate) fn lines(v: &[&str]) -> Vec<String> {
  return v.iter().map(|s| s.to_string()).collect();
}

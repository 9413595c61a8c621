//! This module implements utility functions without much need for defining
//! context or not enough of it to warrant them having their own modules.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The separator between arguments on a line.
pub const SEPARATOR: &str = ", ";

/// Normalises a keyword name for lookups: upper case, single spaces.
pub fn normalise_name(name: &str) -> String {
  return name.split_whitespace().join(" ").to_uppercase();
}

/// Returns the leading name token of a keyword line, i.e. everything before
/// the first comma, normalised.
pub fn leading_name(line: &str) -> String {
  let head = line.split(',').next().unwrap_or_default();
  return normalise_name(head);
}

/// A piece of a keyword or data line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
  /// The key of a `KEY=VALUE` token, normalised.
  pub(crate) key: Option<String>,
  /// The value of a `KEY=VALUE` token, or the whole of a bare one.
  pub(crate) value: String,
  /// The token as written, trimmed.
  pub(crate) raw: String
}

impl Token {
  /// Breaks a trimmed piece of text into a token.
  pub(crate) fn new(raw: &str) -> Self {
    let raw = raw.trim();
    if let Some((k, v)) = raw.split_once('=') {
      return Self {
        key: Some(normalise_name(k)),
        value: v.trim().to_string(),
        raw: raw.to_string()
      };
    }
    return Self { key: None, value: raw.to_string(), raw: raw.to_string() };
  }
}

/// Breaks a line down into its comma-separated tokens. Empty tokens (e.g. a
/// trailing comma) are dropped.
pub(crate) fn line_tokens(line: &str) -> Vec<Token> {
  return line.split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(Token::new)
    .collect();
}

/// Either a `|`-joined string or a list of strings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueList {
  /// The grammar's compact form, `A|B|C`.
  Joined(String),
  /// One entry per value.
  Many(Vec<String>)
}

impl IntoIterator for ValueList {
  type Item = String;

  type IntoIter = <Vec<String> as IntoIterator>::IntoIter;

  fn into_iter(self) -> Self::IntoIter {
    return match self {
      Self::Joined(s) => s.split('|')
        .map(String::from)
        .collect::<Vec<_>>()
        .into_iter(),
      Self::Many(v) => v.into_iter()
    };
  }
}

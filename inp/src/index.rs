//! This module implements the implementation index, which maps keyword names to
//! the usages of those keywords that exist so far. Cross-reference leaves use
//! it to list what they can point to.
//!
//! The index is shared between a document and every form looking at it, so it
//! serialises access internally. Usages are held by identity: two textually
//! identical usages are two entries.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use parking_lot::RwLock;

use crate::parser::Implementation;
use crate::util::normalise_name;

/// Keyword name to usages, in insertion order.
#[derive(Debug, Default)]
pub struct ImplementationIndex {
  /// The usages, by normalised keyword name.
  entries: RwLock<IndexMap<String, Vec<Arc<Implementation>>>>
}

impl ImplementationIndex {
  /// Makes an empty index.
  pub fn new() -> Self {
    return Self::default();
  }

  /// Appends a usage to its keyword's list.
  pub fn register(&self, imp: Arc<Implementation>) {
    let key = normalise_name(imp.keyword_name());
    debug!("Registering a usage of {}.", key);
    self.entries.write().entry(key).or_default().push(imp);
  }

  /// Removes a specific usage. Returns whether it was there.
  pub fn unregister(&self, imp: &Arc<Implementation>) -> bool {
    let key = normalise_name(imp.keyword_name());
    let mut entries = self.entries.write();
    let Some(list) = entries.get_mut(&key) else {
      return false;
    };
    let Some(pos) = list.iter().position(|i| Arc::ptr_eq(i, imp)) else {
      return false;
    };
    list.remove(pos);
    if list.is_empty() {
      entries.shift_remove(&key);
    }
    debug!("Unregistered a usage of {}.", key);
    return true;
  }

  /// The usages of a keyword, in the order they were registered. Empty if
  /// there are none yet.
  pub fn usages_of(&self, keyword: &str) -> Vec<Arc<Implementation>> {
    return self.entries.read()
      .get(&normalise_name(keyword))
      .cloned()
      .unwrap_or_default();
  }

  /// The names of a keyword's usages, in order. Unnamed usages are skipped.
  pub fn names_of(&self, keyword: &str) -> Vec<String> {
    return self.usages_of(keyword)
      .iter()
      .filter_map(|i| i.name())
      .collect();
  }

  /// The keywords with at least one usage, in order of first registration.
  pub fn keywords(&self) -> Vec<String> {
    return self.entries.read().keys().cloned().collect();
  }

  /// Total number of usages.
  pub fn len(&self) -> usize {
    return self.entries.read().values().map(Vec::len).sum();
  }

  /// Whether there are no usages at all.
  pub fn is_empty(&self) -> bool {
    return self.entries.read().is_empty();
  }

  /// Forgets everything.
  pub fn clear(&self) {
    self.entries.write().clear();
  }
}

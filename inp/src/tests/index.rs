use std::sync::Arc;

use crate::prelude::*;
use crate::tests::*;

/// Parses a one-line block into a shareable usage.
fn usage(reg: &Registry, line: &str) -> Arc<Implementation> {
  return Arc::new(reg.parse_keyword(&[line]).unwrap());
}

#[test]
fn usages_in_registration_order() {
  let reg = registry();
  let index = ImplementationIndex::new();
  assert!(index.is_empty());
  assert!(index.usages_of("*SURFACE").is_empty());
  index.register(usage(&reg, "*SURFACE, NAME=S2"));
  index.register(usage(&reg, "*CONSTRAINT, NAME=C1"));
  index.register(usage(&reg, "*SURFACE, NAME=S1"));
  assert_eq!(index.len(), 3);
  assert_eq!(index.names_of("*surface"), ["S2", "S1"]);
  assert_eq!(index.keywords(), ["*SURFACE", "*CONSTRAINT"]);
}

#[test]
fn unregister_goes_by_identity() {
  let reg = registry();
  let index = ImplementationIndex::new();
  let a = usage(&reg, "*SURFACE, NAME=S1");
  let b = usage(&reg, "*SURFACE, NAME=S1");
  index.register(a.clone());
  index.register(b.clone());
  assert!(index.unregister(&a));
  let left = index.usages_of("*SURFACE");
  assert_eq!(left.len(), 1);
  assert!(Arc::ptr_eq(&left[0], &b));
  // already gone
  assert!(!index.unregister(&a));
  assert!(index.unregister(&b));
  assert!(index.is_empty());
  assert!(index.keywords().is_empty());
}

#[test]
fn unnamed_usages_are_not_candidates() {
  let reg = registry();
  let index = ImplementationIndex::new();
  index.register(usage(&reg, "*SURFACE"));
  index.register(usage(&reg, "*SURFACE, NAME=S1"));
  assert_eq!(index.usages_of("*SURFACE").len(), 2);
  assert_eq!(index.names_of("*SURFACE"), ["S1"]);
  index.clear();
  assert_eq!(index.len(), 0);
}

#[test]
fn concurrent_registration() {
  let reg = registry();
  let index = ImplementationIndex::new();
  std::thread::scope(|scope| {
    for t in 0..4 {
      let index = &index;
      let reg = &reg;
      scope.spawn(move || {
        for i in 0..25 {
          index.register(usage(reg, &format!("*SURFACE, NAME=S{}_{}", t, i)));
        }
      });
    }
  });
  assert_eq!(index.len(), 100);
  assert_eq!(index.names_of("*SURFACE").len(), 100);
}

use crate::prelude::*;
use crate::tests::*;

#[test]
fn defaults() {
  let reg = registry();
  let s = session(&reg, "*CONTACT");
  // optional, but it holds a required leaf
  assert!(s.is_enabled(node(&s, "Options")));
  // optional and nothing required inside
  assert!(!s.is_enabled(node(&s, "Extra")));
  // layout only
  assert!(s.is_enabled(node(&s, "Times")));
  assert_eq!(s.selected(contact_choice(&s)), Some(0));
  assert_eq!(s.value(node(&s, "SURFACE")), Some(""));
  assert!(s.is_enabled(node(&s, "SURFACE")));

  let s = session(&reg, "*CONSTRAINT");
  assert_eq!(s.value(node(&s, "TYPE")), Some("DISTRIBUTING"));
}

#[test]
fn required_leaves_dont_change_choices() {
  let reg = registry();
  let s = session(&reg, "*CONTACT");
  assert_eq!(s.selected(contact_choice(&s)), Some(0));
  assert!(!s.is_visible(node(&s, "START")));
}

#[test]
fn mutators_on_the_wrong_node_kind() {
  let reg = registry();
  let mut s = session(&reg, "*CONTACT");
  let root = s.keyword().root();
  let choice = contact_choice(&s);
  let options = node(&s, "Options");
  assert!(matches!(
    s.set_value(options, "X"),
    Err(SessionError::WrongNodeKind { .. })
  ));
  assert!(matches!(
    s.set_enabled(root, false),
    Err(SessionError::WrongNodeKind { .. })
  ));
  assert!(matches!(
    s.set_enabled(choice, false),
    Err(SessionError::WrongNodeKind { .. })
  ));
  assert!(matches!(
    s.select(options, 0),
    Err(SessionError::WrongNodeKind { .. })
  ));
  // nothing changed
  assert!(s.is_enabled(root));
  assert!(s.is_enabled(options));
}

#[test]
fn nodes_from_other_keywords_are_rejected() {
  let reg = registry();
  let mut constraint = session(&reg, "*CONSTRAINT");
  let contact = session(&reg, "*CONTACT");
  let foreign = node(&contact, "SURFACE");
  assert_eq!(
    constraint.set_value(foreign, "S1"),
    Err(SessionError::InvalidNode(foreign))
  );
  assert_eq!(constraint.value(foreign), None);
  assert!(!constraint.is_visible(foreign));
}

#[test]
fn select_keeps_exactly_one_alternative() {
  let reg = registry();
  let mut s = session(&reg, "*CONTACT");
  let choice = contact_choice(&s);
  assert_eq!(
    s.select(choice, 2),
    Err(SessionError::IndexOutOfRange { node: choice, index: 2, len: 2 })
  );
  assert_eq!(s.selected(choice), Some(0));
  s.select(choice, 1).unwrap();
  assert_eq!(s.selected(choice), Some(1));
  assert!(!s.is_visible(node(&s, "FREQUENCY")));
  assert!(s.is_visible(node(&s, "START")));
  assert!(s.is_visible(node(&s, "END")));
}

#[test]
fn disabled_groups_hide_their_leaves() {
  let reg = registry();
  let mut s = session(&reg, "*CONTACT");
  let visible = |s: &Session| s.visible_leaves()
    .map(|(_, l)| l.name.clone())
    .collect::<Vec<_>>();
  assert_eq!(visible(&s), ["SURFACE", "ADJUST", "TOL", "FREQUENCY"]);
  s.set_enabled(node(&s, "Options"), false).unwrap();
  s.set_enabled(node(&s, "Extra"), true).unwrap();
  assert_eq!(visible(&s), ["SURFACE", "FREQUENCY", "", "FLAG"]);
  // a leaf's own flag doesn't hide it
  s.set_enabled(node(&s, "FLAG"), false).unwrap();
  assert!(s.is_visible(node(&s, "FLAG")));
  assert_eq!(visible(&s).len(), 4);
}

#[test]
fn visible_leaves_can_be_walked_again() {
  let reg = registry();
  let s = session(&reg, "*CONTACT");
  let first = s.visible_leaves().map(|(id, _)| id).collect::<Vec<_>>();
  let second = s.visible_leaves().map(|(id, _)| id).collect::<Vec<_>>();
  assert_eq!(first, second);
}

#[test]
fn values_survive_hiding() {
  let reg = registry();
  let mut s = session(&reg, "*CONTACT");
  let adjust = node(&s, "ADJUST");
  s.set_value(adjust, "YES").unwrap();
  s.set_enabled(node(&s, "Options"), false).unwrap();
  s.set_enabled(node(&s, "Options"), true).unwrap();
  assert_eq!(s.value(adjust), Some("YES"));
  s.set_enabled(adjust, false).unwrap();
  assert_eq!(s.value(adjust), Some("YES"));
  assert_eq!(s.effective_value(adjust), "");
  s.reset();
  assert_eq!(s.value(adjust), Some(""));
  assert!(s.is_enabled(adjust));
}

#[test]
fn candidates_come_from_the_index() {
  let reg = registry();
  let s = session(&reg, "*CONTACT");
  let surface = node(&s, "SURFACE");
  let index = ImplementationIndex::new();
  assert!(s.candidates(surface, &index).unwrap().is_empty());
  for text in ["*SURFACE, NAME=S1", "*SURFACE, NAME=S2"] {
    index.register(reg.parse_keyword(&[text]).unwrap().into());
  }
  assert_eq!(s.candidates(surface, &index).unwrap(), ["S1", "S2"]);
  // free text offers nothing, lists offer themselves
  assert!(s.candidates(node(&s, "TOL"), &index).unwrap().is_empty());
  let c = session(&reg, "*CONSTRAINT");
  assert_eq!(
    c.candidates(node(&c, "TYPE"), &index).unwrap(),
    ["DISTRIBUTING", "COUPLING"]
  );
}

#[test]
fn sessions_are_independent() {
  let reg = registry();
  let mut a = session(&reg, "*CONSTRAINT");
  let b = session(&reg, "*CONSTRAINT");
  a.set_value(node(&a, "NAME"), "C1").unwrap();
  assert_eq!(b.value(node(&b, "NAME")), Some(""));
  fn assert_send<T: Send>() {}
  assert_send::<Session>();
}

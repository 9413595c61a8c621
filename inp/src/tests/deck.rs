use crate::prelude::*;
use crate::tests::*;

/// A small but complete deck.
const BEAM: &str = "\
** a cantilever
*HEADING
Cantilever beam
*NODE, NSET=NALL
1, 0, 0, 0
2, 1, 0, 0
*MATERIAL, NAME=STEEL
*ELASTIC
210000, 0.3
*SOLID SECTION, ELSET=EALL, MATERIAL=STEEL
*USER ELEMENT, TYPE=U1
1, 2
*STEP
*STATIC
*END STEP
";

#[test]
fn parse_and_write_back() {
  let reg = Registry::builtin().unwrap();
  let deck = Deck::parse(&reg, BEAM);
  assert_eq!(deck.len(), 10);
  assert_eq!(deck.to_text(), BEAM);
  let unknown = deck.unknown_blocks()
    .map(|b| b.text_lines()[0].clone())
    .collect::<Vec<_>>();
  assert_eq!(unknown, ["** a cantilever", "*USER ELEMENT, TYPE=U1"]);
}

#[test]
fn the_index_follows_the_deck() {
  let reg = Registry::builtin().unwrap();
  let mut deck = Deck::parse(&reg, BEAM);
  let index = deck.index().clone();
  assert_eq!(index.names_of("*MATERIAL"), ["STEEL"]);
  assert_eq!(index.names_of("*NSET"), Vec::<String>::new());
  assert_eq!(index.len(), deck.len());

  // a section offers the materials defined so far
  let section = hydrate(&deck.implementations()[5]).unwrap();
  let material = node(&section, "MATERIAL");
  assert_eq!(section.candidates(material, &index).unwrap(), ["STEEL"]);

  let alu = reg.parse_keyword(&["*MATERIAL, NAME=ALU"]).unwrap();
  deck.insert(4, alu);
  assert_eq!(index.names_of("*MATERIAL"), ["STEEL", "ALU"]);
  assert_eq!(section.candidates(material, &index).unwrap(), ["STEEL", "ALU"]);

  let removed = deck.remove(3).unwrap();
  assert_eq!(removed.name().as_deref(), Some("STEEL"));
  assert_eq!(index.names_of("*MATERIAL"), ["ALU"]);
  assert!(deck.remove(100).is_none());
}

#[test]
fn replacing_an_edited_usage() {
  let reg = Registry::builtin().unwrap();
  let mut deck = Deck::parse(&reg, BEAM);
  let mut s = hydrate(&deck.implementations()[3]).unwrap();
  s.set_value(node(&s, "NAME"), "IRON").unwrap();
  let old = deck.replace(3, Implementation::from_session(&s)).unwrap();
  assert_eq!(old.name().as_deref(), Some("STEEL"));
  assert_eq!(deck.implementations()[3].text_lines(), ["*MATERIAL, NAME=IRON"]);
  assert_eq!(deck.index().names_of("*MATERIAL"), ["IRON"]);
  assert_eq!(deck.index().len(), deck.len());
}

#[test]
fn building_a_deck_from_sessions() {
  let reg = registry();
  let mut deck = Deck::new();
  assert!(deck.is_empty());
  let mut surface = session(&reg, "*SURFACE");
  surface.set_value(node(&surface, "NAME"), "S1").unwrap();
  deck.push(Implementation::from_session(&surface));
  let mut contact = session(&reg, "*CONTACT");
  let options = node(&contact, "Options");
  contact.set_enabled(options, false).unwrap();
  let candidates = contact
    .candidates(node(&contact, "SURFACE"), deck.index())
    .unwrap();
  assert_eq!(candidates, ["S1"]);
  contact.set_value(node(&contact, "SURFACE"), &candidates[0]).unwrap();
  deck.push(Implementation::from_session(&contact));
  assert_eq!(deck.to_text(), "*SURFACE, NAME=S1\n*CONTACT, SURFACE=S1\n");
}

#[test]
fn read_from_a_buffer() {
  let reg = Registry::builtin().unwrap();
  let deck = Deck::parse_bufread(&reg, BEAM.as_bytes()).unwrap();
  assert_eq!(deck.len(), 10);
  assert_eq!(deck.filename, None);
}

//! This library implements the keyword object model for the keyword-based
//! input format (`.inp`) of CalculiX-like finite-element solvers.
//!
//! It covers the grammar of the solver's commands (keywords, their arguments,
//! and how arguments nest into optional bundles and sets of alternatives), and
//! the two transforms between that grammar and text: parsing a deck into
//! keyword usages, and generating the canonical text for a usage from the
//! values a user filled in.
//!
//! Rendering forms, drawing meshes and running the solver are left to the
//! programs using this library. They only need `Registry::lookup`,
//! `Session::visible_leaves` and `ImplementationIndex::usages_of` to build a
//! complete form for any keyword.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub mod deck;
pub mod errors;
pub mod generator;
pub mod grammar;
pub mod index;
pub mod parser;
pub mod session;
pub mod tree;
pub mod util;
pub mod validator;

/// Imports the most relevant exports from the library.
pub mod prelude {
  pub use super::deck::*;
  pub use super::errors::*;
  pub use super::generator::generate;
  pub use super::grammar::*;
  pub use super::index::*;
  pub use super::parser::*;
  pub use super::parser::hydrate::{hydrate, hydrate_with_leftovers};
  pub use super::session::*;
  pub use super::tree::*;
  pub use super::validator::*;
}

#[cfg(test)]
mod tests;

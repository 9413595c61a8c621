//! Inspects input decks: lists the keywords a grammar knows, summarises a
//! deck's blocks, checks them for missing fields, or rewrites them in canonical
//! form.

#![allow(clippy::needless_return)] // i'll never forgive rust for this

use std::collections::BTreeMap;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use inp::prelude::*;
use log::{LevelFilter, debug, info, warn, error};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version)]
struct Cli {
  /// Output extra/debug info while parsing.
  #[arg(short, long, global = true)]
  verbose: bool,
  /// Grammar file to use instead of the bundled one.
  #[arg(short, long, global = true)]
  grammar: Option<PathBuf>,
  /// What to do.
  #[command(subcommand)]
  command: Command
}

#[derive(Subcommand)]
enum Command {
  /// List the keywords in the grammar.
  Keywords,
  /// Count the usages of each keyword in a deck.
  Info {
    /// Print the summary as JSON to standard output.
    #[arg(long)]
    json: bool,
    /// File path (set to "-" to read from standard input).
    file: PathBuf
  },
  /// Look for missing required fields and arguments that can't be placed.
  Check {
    /// File path (set to "-" to read from standard input).
    file: PathBuf
  },
  /// Write the deck to standard output with every known block regenerated.
  Fmt {
    /// File path (set to "-" to read from standard input).
    file: PathBuf
  }
}

/// What `info` reports about a deck.
#[derive(Serialize)]
struct Summary {
  /// The file name, if known.
  filename: Option<String>,
  /// Number of blocks, unknown ones included.
  blocks: usize,
  /// Number of usages per keyword.
  usages: BTreeMap<String, usize>,
  /// Names of the usages that have one, per keyword.
  names: BTreeMap<String, Vec<String>>,
  /// First line of each block that matched no keyword.
  unknown: Vec<String>
}

const INDENT: &str = "  ";

/// Loads the grammar, exiting if it's broken.
fn load_registry(path: Option<&Path>) -> Registry {
  let result = match path {
    Some(p) => {
      info!("Loading grammar from {}...", p.display());
      Registry::from_file(p)
    },
    None => Registry::builtin()
  };
  return match result {
    Ok(registry) => {
      debug!("Grammar has {} keywords.", registry.len());
      registry
    },
    Err(e) => {
      error!("Could not load the grammar: {}", e);
      std::process::exit(1);
    }
  };
}

/// Reads a deck from a file, or standard input for "-".
fn load_deck(registry: &Registry, path: &Path) -> io::Result<Deck> {
  if path.as_os_str().eq_ignore_ascii_case("-") {
    let mut deck = Deck::parse_bufread(registry, BufReader::new(io::stdin()))?;
    deck.filename = Some("<stdin>".to_string());
    return Ok(deck);
  }
  if !path.is_file() {
    error!("Provided path either does not exist or is not a file!");
    std::process::exit(1);
  }
  if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
    info!("Parsing {}...", name);
  }
  let deck = Deck::parse_file(registry, path)?;
  info!("Done parsing, found {} blocks.", deck.len());
  return Ok(deck);
}

/// Builds the summary for `info`.
fn summarise(deck: &Deck) -> Summary {
  let mut usages: BTreeMap<String, usize> = BTreeMap::new();
  let mut names: BTreeMap<String, Vec<String>> = BTreeMap::new();
  let mut unknown = Vec::new();
  for block in deck.implementations() {
    if block.is_unknown() {
      let first = block.text_lines().first().cloned().unwrap_or_default();
      unknown.push(first);
      continue;
    }
    let keyword = block.keyword_name().to_string();
    *usages.entry(keyword.clone()).or_default() += 1;
    if let Some(name) = block.name() {
      names.entry(keyword).or_default().push(name);
    }
  }
  return Summary {
    filename: deck.filename.clone(),
    blocks: deck.len(),
    usages,
    names,
    unknown
  };
}

/// Prints the keywords in the grammar.
fn list_keywords(registry: &Registry) {
  info!("The grammar knows {} keywords:", registry.len());
  for kw in registry.all_keywords() {
    match kw.comment() {
      Some(c) => info!("{}- {}: {}", INDENT, kw.name(), c),
      None => info!("{}- {}", INDENT, kw.name())
    }
  }
}

/// Prints the summary of a deck.
fn print_info(deck: &Deck, json: bool) -> io::Result<()> {
  let summary = summarise(deck);
  if json {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &summary)?;
    writeln!(stdout)?;
    return Ok(());
  }
  info!("Usages per keyword:");
  for (keyword, count) in summary.usages.iter() {
    match summary.names.get(keyword) {
      Some(n) => info!("{}- {}: {} ({})", INDENT, keyword, count, n.join(", ")),
      None => info!("{}- {}: {}", INDENT, keyword, count)
    }
  }
  if summary.unknown.is_empty() {
    info!("No unknown blocks were found.");
  } else {
    info!("The following blocks matched no keyword:");
    for line in summary.unknown.iter() {
      info!("{}- \"{}\"", INDENT, line);
    }
  }
  return Ok(());
}

/// Checks every block, returning the number of problems found.
fn check(deck: &Deck) -> usize {
  let mut problems = 0;
  for (i, block) in deck.implementations().iter().enumerate() {
    if block.is_unknown() {
      warn!("Block {} matches no keyword, skipping it.", i);
      continue;
    }
    let (session, leftovers) = match hydrate_with_leftovers(block) {
      Ok(r) => r,
      Err(e) => {
        error!("Block {} ({}): {}", i, block.keyword_name(), e);
        problems += 1;
        continue;
      }
    };
    for token in leftovers.iter() {
      let kw = block.keyword_name();
      error!("Block {} ({}): unknown argument {}", i, kw, token);
    }
    problems += leftovers.len();
    let errors = validate(&session);
    for e in errors.iter() {
      error!("Block {} ({}): {}", i, block.keyword_name(), e);
    }
    problems += errors.len();
  }
  return problems;
}

/// Writes the deck with every known block regenerated. Blocks with arguments
/// that can't be placed, or comments that would be lost, are written as they
/// were.
fn reformat(registry: &Registry, deck: &Deck) -> io::Result<()> {
  let mut stdout = io::stdout().lock();
  for (i, block) in deck.implementations().iter().enumerate() {
    let original = block.text_lines();
    let comments_kept = |out: &[String]| original.iter()
      .filter(|l| registry.is_comment_line(l))
      .all(|l| out.contains(l));
    let lines = match hydrate_with_leftovers(block) {
      Ok((session, leftovers)) if leftovers.is_empty() => {
        let out = generate(&session);
        if comments_kept(&out) {
          out
        } else {
          debug!("Block {} has comments in its arguments, keeping it.", i);
          original.to_vec()
        }
      },
      Ok(_) => {
        warn!("Block {} has arguments that can't be placed, keeping it.", i);
        original.to_vec()
      },
      Err(_) => original.to_vec()
    };
    for line in lines {
      writeln!(stdout, "{}", line)?;
    }
  }
  return Ok(());
}

fn main() -> io::Result<()> {
  // init cli stuff
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  let registry = load_registry(args.grammar.as_deref());
  match args.command {
    Command::Keywords => list_keywords(&registry),
    Command::Info { json, file } => {
      let deck = load_deck(&registry, &file)?;
      print_info(&deck, json)?;
    },
    Command::Check { file } => {
      let deck = load_deck(&registry, &file)?;
      let problems = check(&deck);
      if problems > 0 {
        error!("Found {} problem(s).", problems);
        std::process::exit(1);
      }
      info!("No problems found.");
    },
    Command::Fmt { file } => {
      let deck = load_deck(&registry, &file)?;
      reformat(&registry, &deck)?;
    }
  }
  return Ok(());
}

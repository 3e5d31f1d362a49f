//! Nullability and FIRST computation over a finished set of productions.

use log::debug;
use super::production::{Part, Production};
use super::symbol::{Symbol, SymbolTable};
use super::terminal_set::TerminalSet;

#[derive(Clone, Copy)]
enum Nullable {
  Unknown,
  True,
  False,
}

/// Marks every non-terminal that derives the empty string, then every
/// production whose right-hand side does. Sweeps until a pass stops
/// producing new marks.
pub(super) fn gen_nullable(
  prods: &[Production],
  num_nonterms: usize,
) -> (Vec<bool>, Vec<bool>) {
  let mut nullable = vec![false; num_nonterms];
  let mut known = vec![Nullable::Unknown; prods.len()];

  let mut passes = 0u32;
  loop {
    passes += 1;
    let mut changed = false;
    for (prod_ix, prod) in prods.iter().enumerate() {
      if nullable[prod.lhs().index()] {
        continue;
      }
      if check_nullable(&nullable, &mut known, prod_ix, prod) {
        nullable[prod.lhs().index()] = true;
        changed = true;
      }
    }
    if !changed {
      break;
    }
  }
  debug!("nullability converged after {} passes", passes);

  let prod_nullable = prods.iter()
    .enumerate()
    .map(|(prod_ix, prod)| check_nullable(&nullable, &mut known, prod_ix, prod))
    .collect();

  (nullable, prod_nullable)
}

/// A terminal settles the question for good; a non-nullable non-terminal
/// only blocks it for now, so that outcome is not cached.
fn check_nullable(
  nullable: &[bool],
  known: &mut [Nullable],
  prod_ix: usize,
  prod: &Production,
) -> bool {
  match known[prod_ix] {
    Nullable::True => return true,
    Nullable::False => return false,
    Nullable::Unknown => {}
  }

  for part in prod.rhs() {
    match part.symbol() {
      Some(Symbol::Term(_)) => {
        known[prod_ix] = Nullable::False;
        return false;
      }
      Some(Symbol::Nonterm(id)) => {
        if !nullable[id.index()] {
          return false;
        }
      }
      None => {}
    }
  }

  known[prod_ix] = Nullable::True;
  true
}

/// Computes FIRST per non-terminal to a fixpoint, then derives FIRST of
/// every production's right-hand side from the converged sets.
pub(super) fn gen_first(
  symtab: &SymbolTable,
  prods: &[Production],
  nullable: &[bool],
) -> (Vec<TerminalSet>, Vec<TerminalSet>) {
  let num_terms = symtab.num_terms();
  let mut first = vec![TerminalSet::new(num_terms); symtab.num_nonterms()];
  let mut buf = TerminalSet::new(num_terms);

  let mut passes = 0u32;
  loop {
    passes += 1;
    let mut changed = false;
    for prod in prods {
      buf.clear();
      first_of_parts(&mut buf, &first, nullable, prod.rhs());
      changed |= first[prod.lhs().index()].union_with(&buf);
    }
    if !changed {
      break;
    }
  }
  debug!("FIRST sets converged after {} passes", passes);

  let prod_first = prods.iter()
    .map(|prod| {
      let mut set = TerminalSet::new(num_terms);
      first_of_parts(&mut set, &first, nullable, prod.rhs());
      set
    })
    .collect();

  (first, prod_first)
}

/// FIRST of a symbol sequence: a terminal ends the scan, a non-terminal
/// contributes its set and ends it unless nullable.
fn first_of_parts(
  result: &mut TerminalSet,
  first: &[TerminalSet],
  nullable: &[bool],
  parts: &[Part],
) {
  for part in parts {
    match part.symbol() {
      Some(Symbol::Term(id)) => {
        result.insert(id);
        return;
      }
      Some(Symbol::Nonterm(id)) => {
        result.union_with(&first[id.index()]);
        if !nullable[id.index()] {
          return;
        }
      }
      None => {}
    }
  }
}

//! LR items over a closed grammar.

use std::hash::{Hash, Hasher};
use crate::error::{Error, Result};
use crate::grammar::{Grammar, NontermId, ProdId, Symbol};

/// A production position pair, the core of an LR item. The symbol after
/// the dot and the hash are fixed at construction so the hot paths of
/// state building never go back to the grammar.
#[derive(Debug, Clone)]
pub struct ItemCore {
  prod: ProdId,
  dot: u16,
  at_end: bool,
  after_dot: Option<Symbol>,
  hash: u64,
}

impl ItemCore {
  /// Places the dot at `dot` positions into the production's right-hand
  /// side. The dot may sit just past the last symbol but no further.
  pub fn new(
    grammar: &Grammar,
    prod: ProdId,
    dot: u16,
  ) -> Result<ItemCore> {
    let p = grammar.get_prod(prod).ok_or(Error::UnknownProd(prod.0))?;
    let len = p.rhs().len() as u16;
    if dot > len {
      return Err(Error::DotOutOfRange { dot, len });
    }
    Ok(ItemCore {
      prod,
      dot,
      at_end: dot == len,
      after_dot: p.rhs().get(dot as usize).and_then(|part| part.symbol()),
      hash: 13 * (13 * prod.0 as u64) + dot as u64,
    })
  }

  /// The item with the dot moved one symbol to the right.
  pub fn shift(&self, grammar: &Grammar) -> Result<ItemCore> {
    if self.at_end {
      return Err(Error::ShiftPastEnd);
    }
    ItemCore::new(grammar, self.prod, self.dot + 1)
  }

  pub fn prod(&self) -> ProdId {
    self.prod
  }

  pub fn dot(&self) -> u16 {
    self.dot
  }

  pub fn dot_at_end(&self) -> bool {
    self.at_end
  }

  pub fn symbol_after_dot(&self) -> Option<Symbol> {
    self.after_dot
  }

  /// The non-terminal right after the dot, if any. Closure computation
  /// expands exactly these items.
  pub fn dot_before_nonterm(&self) -> Option<NontermId> {
    match self.after_dot {
      Some(Symbol::Nonterm(id)) => Some(id),
      _ => None,
    }
  }

  pub fn render(&self, grammar: &Grammar) -> String {
    let prod = grammar.prod(self.prod);
    let mut out = String::new();
    out.push_str(grammar.nonterm(prod.lhs()).name());
    out.push_str(" ::=");
    for (i, part) in prod.rhs().iter().enumerate() {
      if i == self.dot as usize {
        out.push_str(" ·");
      }
      if let Some(sym) = part.symbol() {
        out.push(' ');
        out.push_str(grammar.sym_name(sym));
      }
    }
    if self.at_end {
      out.push_str(" ·");
    }
    out
  }
}

impl PartialEq for ItemCore {
  fn eq(&self, other: &ItemCore) -> bool {
    self.prod == other.prod && self.dot == other.dot
  }
}

impl Eq for ItemCore {}

impl Hash for ItemCore {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u64(self.hash);
  }
}

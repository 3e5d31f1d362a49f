//! Grammar assembly and the frozen analysis snapshot.

use log::{debug, warn};
use crate::error::Result;

mod analysis;
mod production;
mod symbol;
mod terminal_set;

pub use production::{
  action, labelled, sym, EmbeddedAction, Part, ProdId, Production,
};
pub use symbol::{
  Assoc, Nonterm, NontermId, Symbol, Term, TermId, DEFAULT_TYPE_TAG,
};
pub use terminal_set::TerminalSet;

use symbol::SymbolTable;

/// Collects symbol declarations and productions, then closes them into a
/// [`Grammar`].
pub struct GrammarBuilder {
  symtab: SymbolTable,
  prods: Vec<Production>,
}

impl GrammarBuilder {
  pub fn new() -> Self {
    GrammarBuilder {
      symtab: SymbolTable::new(),
      prods: vec![],
    }
  }

  pub fn declare_terminal(
    &mut self,
    name: impl Into<String>,
    type_tag: Option<&str>,
    prec: Option<u16>,
    assoc: Assoc,
  ) -> Result<TermId> {
    self.symtab.declare_term(name, type_tag, prec, assoc)
  }

  pub fn declare_nonterm(
    &mut self,
    name: impl Into<String>,
    type_tag: Option<&str>,
  ) -> Result<NontermId> {
    self.symtab.declare_nonterm(name, type_tag)
  }

  /// Overrides precedence and associativity of a declared terminal.
  pub fn set_precedence(
    &mut self,
    term: TermId,
    prec: u16,
    assoc: Assoc,
  ) -> Result<()> {
    self.symtab.set_precedence(term, prec, assoc)
  }

  pub fn add_production(
    &mut self,
    lhs: NontermId,
    rhs: Vec<Part>,
    action: Option<&str>,
    prec: Option<(u16, Assoc)>,
  ) -> Result<ProdId> {
    production::build_production(
      &mut self.symtab,
      &mut self.prods,
      lhs,
      rhs,
      action,
      prec,
    )
  }

  pub fn term_by_name(&self, name: &str) -> Option<TermId> {
    self.symtab.term_by_name(name)
  }

  pub fn nonterm_by_name(&self, name: &str) -> Option<NontermId> {
    self.symtab.nonterm_by_name(name)
  }

  pub fn term(&self, id: TermId) -> &Term {
    self.symtab.term(id)
  }

  pub fn nonterm(&self, id: NontermId) -> &Nonterm {
    self.symtab.nonterm(id)
  }

  pub fn num_terms(&self) -> usize {
    self.symtab.num_terms()
  }

  pub fn num_nonterms(&self) -> usize {
    self.symtab.num_nonterms()
  }

  pub fn terms(&self) -> impl Iterator<Item = (TermId, &Term)> {
    self.symtab.terms()
  }

  pub fn nonterms(&self) -> impl Iterator<Item = (NontermId, &Nonterm)> {
    self.symtab.nonterms()
  }

  /// Drops everything declared so far and starts a fresh session.
  pub fn reset(&mut self) {
    self.symtab.reset();
    self.prods.clear();
  }

  /// Runs nullability and FIRST analysis and freezes the grammar.
  pub fn build(self) -> Grammar {
    let GrammarBuilder { symtab, prods } = self;
    let (nullable, prod_nullable) =
      analysis::gen_nullable(&prods, symtab.num_nonterms());
    let (first, prod_first) = analysis::gen_first(&symtab, &prods, &nullable);
    warn_unused(&symtab);
    debug!(
      "grammar closed with {} terminals, {} non-terminals, {} productions",
      symtab.num_terms(),
      symtab.num_nonterms(),
      prods.len(),
    );
    Grammar {
      symtab,
      prods,
      nullable,
      first,
      prod_nullable,
      prod_first,
    }
  }
}

impl Default for GrammarBuilder {
  fn default() -> Self {
    Self::new()
  }
}

fn warn_unused(symtab: &SymbolTable) {
  for (id, term) in symtab.terms() {
    if term.use_count() == 0 && id != TermId::EOF && id != TermId::ERROR {
      warn!("terminal {} is declared but never used", term.name());
    }
  }
  for (id, nonterm) in symtab.nonterms() {
    if nonterm.use_count() == 0 && id != NontermId::START {
      warn!("non-terminal {} is declared but never used", nonterm.name());
    }
  }
}

/// A closed grammar with its analysis results. Reduction counts are the
/// only thing that can change afterwards.
pub struct Grammar {
  symtab: SymbolTable,
  prods: Vec<Production>,
  nullable: Vec<bool>,
  first: Vec<TerminalSet>,
  prod_nullable: Vec<bool>,
  prod_first: Vec<TerminalSet>,
}

impl Grammar {
  pub fn term(&self, id: TermId) -> &Term {
    self.symtab.term(id)
  }

  pub fn nonterm(&self, id: NontermId) -> &Nonterm {
    self.symtab.nonterm(id)
  }

  pub fn term_by_name(&self, name: &str) -> Option<TermId> {
    self.symtab.term_by_name(name)
  }

  pub fn nonterm_by_name(&self, name: &str) -> Option<NontermId> {
    self.symtab.nonterm_by_name(name)
  }

  pub fn num_terms(&self) -> usize {
    self.symtab.num_terms()
  }

  pub fn num_nonterms(&self) -> usize {
    self.symtab.num_nonterms()
  }

  pub fn terms(&self) -> impl Iterator<Item = (TermId, &Term)> {
    self.symtab.terms()
  }

  pub fn nonterms(&self) -> impl Iterator<Item = (NontermId, &Nonterm)> {
    self.symtab.nonterms()
  }

  pub fn prod(&self, id: ProdId) -> &Production {
    &self.prods[id.index()]
  }

  pub(crate) fn get_prod(&self, id: ProdId) -> Option<&Production> {
    self.prods.get(id.index())
  }

  pub fn num_prods(&self) -> usize {
    self.prods.len()
  }

  pub fn prods(&self) -> impl Iterator<Item = (ProdId, &Production)> {
    self.prods.iter()
      .enumerate()
      .map(|(ix, prod)| (ProdId(ix as u32), prod))
  }

  pub fn nullable(&self, id: NontermId) -> bool {
    self.nullable[id.index()]
  }

  pub fn first(&self, id: NontermId) -> &TerminalSet {
    &self.first[id.index()]
  }

  pub fn prod_nullable(&self, id: ProdId) -> bool {
    self.prod_nullable[id.index()]
  }

  pub fn prod_first(&self, id: ProdId) -> &TerminalSet {
    &self.prod_first[id.index()]
  }

  /// Ticks the reduction counter of a production.
  pub fn note_reduction(&mut self, id: ProdId) {
    self.prods[id.index()].reductions += 1;
  }

  pub fn sym_name(&self, sym: Symbol) -> &str {
    match sym {
      Symbol::Term(id) => self.symtab.term(id).name(),
      Symbol::Nonterm(id) => self.symtab.nonterm(id).name(),
    }
  }

  pub fn render_term_set(&self, set: &TerminalSet) -> String {
    set.render(&self.symtab)
  }

  /// Renders a production as `LHS ::= sym sym ...`.
  pub fn render_prod(&self, id: ProdId) -> String {
    let prod = &self.prods[id.index()];
    let mut out = String::new();
    out.push_str(self.symtab.nonterm(prod.lhs()).name());
    out.push_str(" ::=");
    for part in prod.rhs() {
      if let Some(sym) = part.symbol() {
        out.push(' ');
        out.push_str(self.sym_name(sym));
      }
    }
    out
  }
}

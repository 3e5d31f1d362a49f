use indexmap::IndexMap;
use crate::error::{Error, Result};
use super::production::ProdId;

/// Stack-value type used for symbols declared without one.
pub const DEFAULT_TYPE_TAG: &str = "Value";

#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash)]
pub struct TermId(pub(crate) u32);

#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash)]
pub struct NontermId(pub(crate) u32);

impl TermId {
  /// End-of-input terminal, present in every session.
  pub const EOF: TermId = TermId(0);
  /// Error-recovery terminal, present in every session.
  pub const ERROR: TermId = TermId(1);

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl NontermId {
  /// The `$START` non-terminal, present in every session.
  pub const START: NontermId = NontermId(0);

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// A reference to a declared symbol of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash)]
pub enum Symbol {
  Term(TermId),
  Nonterm(NontermId),
}

impl From<TermId> for Symbol {
  fn from(id: TermId) -> Symbol {
    Symbol::Term(id)
  }
}

impl From<NontermId> for Symbol {
  fn from(id: NontermId) -> Symbol {
    Symbol::Nonterm(id)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
  Unknown,
  Left,
  Right,
  NonAssoc,
}

#[derive(Debug, Clone)]
pub struct Term {
  pub(crate) name: String,
  pub(crate) type_tag: String,
  pub(crate) prec: Option<u16>,
  pub(crate) assoc: Assoc,
  pub(crate) uses: u32,
}

impl Term {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn type_tag(&self) -> &str {
    &self.type_tag
  }

  pub fn prec(&self) -> Option<u16> {
    self.prec
  }

  pub fn assoc(&self) -> Assoc {
    self.assoc
  }

  /// How many times the terminal appears in production right-hand sides.
  pub fn use_count(&self) -> u32 {
    self.uses
  }
}

#[derive(Debug, Clone)]
pub struct Nonterm {
  pub(crate) name: String,
  pub(crate) type_tag: String,
  pub(crate) uses: u32,
  pub(crate) embedded_action: bool,
  /// productions with this non-terminal on the left-hand side
  pub(crate) prods: Vec<ProdId>,
}

impl Nonterm {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn type_tag(&self) -> &str {
    &self.type_tag
  }

  pub fn use_count(&self) -> u32 {
    self.uses
  }

  /// Whether this non-terminal was minted to carry a factored-out action.
  pub fn is_embedded_action(&self) -> bool {
    self.embedded_action
  }

  pub fn prods(&self) -> &[ProdId] {
    &self.prods
  }
}

/// Registry of all symbols of one grammar. Indices are dense per kind and
/// never reused; the two name spaces are independent.
pub(crate) struct SymbolTable {
  terms: Vec<Term>,
  nonterms: Vec<Nonterm>,
  term_names: IndexMap<String, TermId>,
  nonterm_names: IndexMap<String, NontermId>,
  next_hidden: u32,
}

impl SymbolTable {
  pub(crate) fn new() -> Self {
    let mut table = SymbolTable {
      terms: vec![],
      nonterms: vec![],
      term_names: IndexMap::new(),
      nonterm_names: IndexMap::new(),
      next_hidden: 0,
    };
    table.register_fixed();
    table
  }

  /// `EOF`, `error` and `$START` exist in every session, at fixed indices.
  fn register_fixed(&mut self) {
    self.push_term("EOF".to_owned(), None, None, Assoc::Unknown);
    self.push_term("error".to_owned(), None, None, Assoc::Unknown);
    self.push_nonterm("$START".to_owned(), None, false);
  }

  pub(crate) fn reset(&mut self) {
    self.terms.clear();
    self.nonterms.clear();
    self.term_names.clear();
    self.nonterm_names.clear();
    self.next_hidden = 0;
    self.register_fixed();
  }

  fn push_term(
    &mut self,
    name: String,
    type_tag: Option<&str>,
    prec: Option<u16>,
    assoc: Assoc,
  ) -> TermId {
    let id = TermId(self.terms.len() as u32);
    self.term_names.insert(name.clone(), id);
    self.terms.push(Term {
      name,
      type_tag: type_tag.unwrap_or(DEFAULT_TYPE_TAG).to_owned(),
      prec,
      assoc,
      uses: 0,
    });
    id
  }

  fn push_nonterm(
    &mut self,
    name: String,
    type_tag: Option<&str>,
    embedded_action: bool,
  ) -> NontermId {
    let id = NontermId(self.nonterms.len() as u32);
    self.nonterm_names.insert(name.clone(), id);
    self.nonterms.push(Nonterm {
      name,
      type_tag: type_tag.unwrap_or(DEFAULT_TYPE_TAG).to_owned(),
      uses: 0,
      embedded_action,
      prods: vec![],
    });
    id
  }

  pub(crate) fn declare_term(
    &mut self,
    name: impl Into<String>,
    type_tag: Option<&str>,
    prec: Option<u16>,
    assoc: Assoc,
  ) -> Result<TermId> {
    let name = name.into();
    if self.term_names.contains_key(&name) {
      return Err(Error::DuplicateTerm(name));
    }
    Ok(self.push_term(name, type_tag, prec, assoc))
  }

  pub(crate) fn declare_nonterm(
    &mut self,
    name: impl Into<String>,
    type_tag: Option<&str>,
  ) -> Result<NontermId> {
    let name = name.into();
    if self.nonterm_names.contains_key(&name) {
      return Err(Error::DuplicateNonterm(name));
    }
    Ok(self.push_nonterm(name, type_tag, false))
  }

  /// Mints a uniquely named non-terminal to carry a factored-out action.
  pub(crate) fn create_embedded_nonterm(
    &mut self,
    type_tag: &str,
  ) -> Result<NontermId> {
    self.next_hidden += 1;
    let name = format!("NT${}", self.next_hidden);
    if self.nonterm_names.contains_key(&name) {
      return Err(Error::HiddenNameTaken(name));
    }
    Ok(self.push_nonterm(name, Some(type_tag), true))
  }

  pub(crate) fn set_precedence(
    &mut self,
    id: TermId,
    prec: u16,
    assoc: Assoc,
  ) -> Result<()> {
    let term = self.terms.get_mut(id.0 as usize)
      .ok_or(Error::UnknownTerm(id.0))?;
    term.prec = Some(prec);
    term.assoc = assoc;
    Ok(())
  }

  pub(crate) fn term(&self, id: TermId) -> &Term {
    &self.terms[id.0 as usize]
  }

  pub(crate) fn nonterm(&self, id: NontermId) -> &Nonterm {
    &self.nonterms[id.0 as usize]
  }

  pub(crate) fn get_term(&self, id: TermId) -> Option<&Term> {
    self.terms.get(id.0 as usize)
  }

  pub(crate) fn get_nonterm(&self, id: NontermId) -> Option<&Nonterm> {
    self.nonterms.get(id.0 as usize)
  }

  pub(crate) fn term_by_name(&self, name: &str) -> Option<TermId> {
    self.term_names.get(name).copied()
  }

  pub(crate) fn nonterm_by_name(&self, name: &str) -> Option<NontermId> {
    self.nonterm_names.get(name).copied()
  }

  pub(crate) fn num_terms(&self) -> usize {
    self.terms.len()
  }

  pub(crate) fn num_nonterms(&self) -> usize {
    self.nonterms.len()
  }

  pub(crate) fn terms(&self) -> impl Iterator<Item = (TermId, &Term)> {
    self.terms.iter()
      .enumerate()
      .map(|(i, term)| (TermId(i as u32), term))
  }

  pub(crate) fn nonterms(&self) -> impl Iterator<Item = (NontermId, &Nonterm)> {
    self.nonterms.iter()
      .enumerate()
      .map(|(i, nonterm)| (NontermId(i as u32), nonterm))
  }

  pub(crate) fn note_term_use(&mut self, id: TermId) {
    self.terms[id.0 as usize].uses += 1;
  }

  pub(crate) fn note_nonterm_use(&mut self, id: NontermId) {
    self.nonterms[id.0 as usize].uses += 1;
  }

  pub(crate) fn add_lhs_prod(&mut self, lhs: NontermId, prod: ProdId) {
    self.nonterms[lhs.0 as usize].prods.push(prod);
  }
}

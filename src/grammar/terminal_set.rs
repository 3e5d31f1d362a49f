use std::fmt::{self, Debug, Formatter};
use super::symbol::{SymbolTable, TermId};

type BitBlock = u64;

const BLOCK_NBITS: usize = std::mem::size_of::<BitBlock>() * 8;

/// A set of terminals over a fixed universe. The universe is sized at
/// creation and never grows; all binary operations expect both sets to
/// share it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TerminalSet {
  slice: Box<[BitBlock]>,
}

impl TerminalSet {
  pub fn new(num_terms: usize) -> Self {
    let len = (num_terms + BLOCK_NBITS - 1) / BLOCK_NBITS;
    Self {
      slice: vec![0; len].into_boxed_slice(),
    }
  }

  pub fn from_term(num_terms: usize, term: TermId) -> Self {
    let mut s = Self::new(num_terms);
    s.insert(term);
    s
  }

  pub fn clear(&mut self) {
    for x in self.slice.iter_mut() {
      *x = 0;
    }
  }

  pub fn is_empty(&self) -> bool {
    self.slice.iter().all(|&x| x == 0)
  }

  pub fn contains(&self, term: TermId) -> bool {
    self.contains_index(term.0 as usize)
  }

  pub fn contains_index(&self, index: usize) -> bool {
    self.slice[index / BLOCK_NBITS]
      & (1 << (index as u64 % BLOCK_NBITS as u64)) != 0
  }

  /// Returns whether the terminal was newly added.
  pub fn insert(&mut self, term: TermId) -> bool {
    let block = term.0 as usize / BLOCK_NBITS;
    let mask = 1 << (term.0 as u64 % BLOCK_NBITS as u64);
    let old = self.slice[block];
    self.slice[block] |= mask;
    old & mask == 0
  }

  /// Returns whether the terminal was present.
  pub fn remove(&mut self, term: TermId) -> bool {
    let block = term.0 as usize / BLOCK_NBITS;
    let mask = 1 << (term.0 as u64 % BLOCK_NBITS as u64);
    let old = self.slice[block];
    self.slice[block] &= !mask;
    old & mask != 0
  }

  /// Returns whether the set has changed.
  pub fn union_with(&mut self, other: &TerminalSet) -> bool {
    let mut changed = false;
    for i in 0..self.slice.len() {
      let old = self.slice[i];
      self.slice[i] |= other.slice[i];
      changed |= old != self.slice[i];
    }
    changed
  }

  pub fn is_subset_of(&self, other: &TerminalSet) -> bool {
    self.slice.iter()
      .zip(other.slice.iter())
      .all(|(x, y)| x & !y == 0)
  }

  pub fn is_superset_of(&self, other: &TerminalSet) -> bool {
    other.is_subset_of(self)
  }

  pub fn intersects(&self, other: &TerminalSet) -> bool {
    self.slice.iter()
      .zip(other.slice.iter())
      .any(|(x, y)| x & y != 0)
  }

  pub fn iter(&self) -> Iter {
    Iter {
      slice: &*self.slice,
      bit: 0,
      index: 0,
    }
  }

  /// Lists the member terminal names in index order.
  pub(crate) fn render(&self, symtab: &SymbolTable) -> String {
    let mut out = String::from("{");
    for (i, term) in self.iter().enumerate() {
      if i > 0 {
        out.push_str(", ");
      }
      out.push_str(symtab.term(term).name());
    }
    out.push('}');
    out
  }
}

pub struct Iter<'a> {
  slice: &'a [BitBlock],
  bit: usize,
  index: usize,
}

impl<'a> Iterator for Iter<'a> {
  type Item = TermId;

  fn next(&mut self) -> Option<TermId> {
    while self.index < self.slice.len() {
      if self.bit < BLOCK_NBITS {
        let bit = (self.slice[self.index] & !((1 << self.bit) - 1))
          .trailing_zeros() as usize;
        if bit < BLOCK_NBITS {
          self.bit = bit + 1;
          return Some(TermId((self.index * BLOCK_NBITS + bit) as u32));
        }
      }

      self.index += 1;
      self.bit = 0;
    }
    None
  }
}

impl Debug for TerminalSet {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter().map(|term| term.0)).finish()
  }
}

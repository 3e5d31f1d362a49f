use log::debug;
use crate::error::{Error, Result};
use super::symbol::{Assoc, NontermId, Symbol, SymbolTable};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash)]
pub struct ProdId(pub(crate) u32);

impl ProdId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// One element of a right-hand side as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
  /// A declared symbol, optionally labelled so action code can refer to
  /// its semantic value.
  Symbol {
    sym: Symbol,
    label: Option<String>,
  },
  /// Opaque action code embedded in the right-hand side.
  Action {
    code: String,
  },
}

impl Part {
  pub fn is_action(&self) -> bool {
    match self {
      Part::Action { .. } => true,
      Part::Symbol { .. } => false,
    }
  }

  pub fn symbol(&self) -> Option<Symbol> {
    match self {
      Part::Symbol { sym, .. } => Some(*sym),
      Part::Action { .. } => None,
    }
  }

  pub fn label(&self) -> Option<&str> {
    match self {
      Part::Symbol { label, .. } => label.as_deref(),
      Part::Action { .. } => None,
    }
  }
}

pub fn sym(sym: impl Into<Symbol>) -> Part {
  Part::Symbol {
    sym: sym.into(),
    label: None,
  }
}

pub fn labelled(
  sym: impl Into<Symbol>,
  label: impl Into<String>,
) -> Part {
  Part::Symbol {
    sym: sym.into(),
    label: Some(label.into()),
  }
}

pub fn action(code: impl Into<String>) -> Part {
  Part::Action {
    code: code.into(),
  }
}

/// Bookkeeping for a production minted by factoring out an embedded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedAction {
  pub(crate) base: ProdId,
  pub(crate) index_of_intermediate_result: Option<u16>,
}

impl EmbeddedAction {
  /// The production this action was factored out of.
  pub fn base(&self) -> ProdId {
    self.base
  }

  /// Distance back to the previous factored action of the base production,
  /// `None` for the first one.
  pub fn index_of_intermediate_result(&self) -> Option<u16> {
    self.index_of_intermediate_result
  }
}

#[derive(Debug, Clone)]
pub struct Production {
  pub(crate) lhs: NontermId,
  /// free of `Action` parts once construction completes
  pub(crate) rhs: Vec<Part>,
  pub(crate) action: String,
  pub(crate) prec: Option<u16>,
  pub(crate) assoc: Assoc,
  pub(crate) reductions: u32,
  pub(crate) embedded: Option<EmbeddedAction>,
}

impl Production {
  pub fn lhs(&self) -> NontermId {
    self.lhs
  }

  pub fn rhs(&self) -> &[Part] {
    &self.rhs
  }

  /// The trailing reduce action, empty if the production has none.
  pub fn action(&self) -> &str {
    &self.action
  }

  pub fn prec(&self) -> Option<u16> {
    self.prec
  }

  pub fn assoc(&self) -> Assoc {
    self.assoc
  }

  pub fn reduction_count(&self) -> u32 {
    self.reductions
  }

  pub fn embedded(&self) -> Option<EmbeddedAction> {
    self.embedded
  }
}

/// Builds a production from raw parts: merges adjacent actions, strips a
/// trailing action into the reduce action, counts symbol uses, picks up
/// contextual precedence and factors embedded actions into hidden
/// non-terminals with empty productions of their own.
pub(crate) fn build_production(
  symtab: &mut SymbolTable,
  prods: &mut Vec<Production>,
  lhs: NontermId,
  rhs: Vec<Part>,
  action: Option<&str>,
  prec: Option<(u16, Assoc)>,
) -> Result<ProdId> {
  if symtab.get_nonterm(lhs).is_none() {
    return Err(Error::UnknownNonterm(lhs.0));
  }
  for part in &rhs {
    match part.symbol() {
      Some(Symbol::Term(id)) if symtab.get_term(id).is_none() => {
        return Err(Error::UnknownTerm(id.0));
      }
      Some(Symbol::Nonterm(id)) if symtab.get_nonterm(id).is_none() => {
        return Err(Error::UnknownNonterm(id.0));
      }
      _ => {}
    }
  }

  let mut rhs = merge_adjacent_actions(rhs);

  let tail_code = match rhs.pop() {
    Some(Part::Action { code }) => Some(code),
    Some(part) => {
      rhs.push(part);
      None
    }
    None => None,
  };

  // count uses and pick up the precedence of the last terminal
  let mut rhs_prec = None;
  let mut rhs_assoc = Assoc::Unknown;
  for part in &rhs {
    match part.symbol() {
      Some(Symbol::Term(id)) => {
        symtab.note_term_use(id);
        rhs_prec = symtab.term(id).prec();
        rhs_assoc = symtab.term(id).assoc();
      }
      Some(Symbol::Nonterm(id)) => symtab.note_nonterm_use(id),
      None => {}
    }
  }
  let (prec, assoc) = match prec {
    Some((num, side)) => (Some(num), side),
    None => (rhs_prec, rhs_assoc),
  };

  let mut code = declare_labels(&rhs);
  match (action, tail_code) {
    (Some(act), Some(tail)) => {
      code.push_str(act);
      code.push('\n');
      code.push_str(&tail);
    }
    (Some(act), None) => code.push_str(act),
    (None, Some(tail)) => code.push_str(&tail),
    (None, None) => {}
  }

  // every remaining action is interior and gets factored out; the base
  // production takes its id after the hidden ones it spawns
  let num_actions = rhs.iter().filter(|part| part.is_action()).count();
  let base = ProdId((prods.len() + num_actions) as u32);

  let mut last_loc = None;
  for act_loc in 0..rhs.len() {
    if !rhs[act_loc].is_action() {
      continue;
    }

    let type_tag = symtab.nonterm(lhs).type_tag().to_owned();
    let hidden = symtab.create_embedded_nonterm(&type_tag)?;
    debug!(
      "embedded action in {} at {} factored into {}",
      symtab.nonterm(lhs).name(),
      act_loc,
      symtab.nonterm(hidden).name(),
    );

    let mut act_code = declare_labels(&rhs[..act_loc]);
    let part = std::mem::replace(
      &mut rhs[act_loc],
      Part::Symbol {
        sym: Symbol::Nonterm(hidden),
        label: None,
      },
    );
    if let Part::Action { code } = part {
      act_code.push_str(&code);
    }

    register(symtab, prods, Production {
      lhs: hidden,
      rhs: vec![],
      action: act_code,
      prec: None,
      assoc: Assoc::Unknown,
      reductions: 0,
      embedded: Some(EmbeddedAction {
        base,
        index_of_intermediate_result: last_loc
          .map(|last| (act_loc - last) as u16),
      }),
    });
    last_loc = Some(act_loc);
  }

  Ok(register(symtab, prods, Production {
    lhs,
    rhs,
    action: code,
    prec,
    assoc,
    reductions: 0,
    embedded: None,
  }))
}

fn register(
  symtab: &mut SymbolTable,
  prods: &mut Vec<Production>,
  prod: Production,
) -> ProdId {
  let id = ProdId(prods.len() as u32);
  symtab.note_nonterm_use(prod.lhs);
  symtab.add_lhs_prod(prod.lhs, id);
  prods.push(prod);
  id
}

fn merge_adjacent_actions(rhs: Vec<Part>) -> Vec<Part> {
  let mut merged: Vec<Part> = Vec::with_capacity(rhs.len());
  for part in rhs {
    match (merged.last_mut(), part) {
      (Some(Part::Action { code }), Part::Action { code: next }) => {
        code.push_str(&next);
      }
      (_, part) => merged.push(part),
    }
  }
  merged
}

/// One binding line per labelled position. Depths count back from the top
/// of the parse stack, so `parts` must have the length the stack will have
/// when the action runs.
fn declare_labels(parts: &[Part]) -> String {
  let mut code = String::new();
  for (i, part) in parts.iter().enumerate() {
    if let Some(label) = part.label() {
      code.push_str(&format!(
        "let {} = __stack.peek({});\n",
        label,
        parts.len() - 1 - i,
      ));
    }
  }
  code
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::symbol::TermId;
  use pretty_assertions::assert_eq;

  fn tab_with(
    terms: &[&str],
    nonterms: &[&str],
  ) -> (SymbolTable, Vec<TermId>, Vec<NontermId>) {
    let mut tab = SymbolTable::new();
    let terms = terms.iter()
      .map(|name| tab.declare_term(*name, None, None, Assoc::Unknown).unwrap())
      .collect();
    let nonterms = nonterms.iter()
      .map(|name| tab.declare_nonterm(*name, None).unwrap())
      .collect();
    (tab, terms, nonterms)
  }

  #[test]
  fn trailing_action_becomes_the_reduce_action() {
    let (mut tab, terms, nts) = tab_with(&["x"], &["A"]);
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![sym(terms[0]), action("go()")],
      None,
      None,
    ).unwrap();

    assert_eq!(prods.len(), 1);
    let prod = &prods[id.index()];
    assert_eq!(prod.rhs().len(), 1);
    assert_eq!(prod.action(), "go()");
    assert_eq!(prod.embedded(), None);
  }

  #[test]
  fn adjacent_actions_merge_in_order() {
    let (mut tab, terms, nts) = tab_with(&["x"], &["A"]);
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![sym(terms[0]), action("a"), action("b")],
      None,
      None,
    ).unwrap();

    // the merged action is trailing, so nothing is factored
    assert_eq!(prods.len(), 1);
    assert_eq!(prods[id.index()].action(), "ab");
    assert_eq!(prods[id.index()].rhs().len(), 1);
  }

  #[test]
  fn interior_adjacent_actions_merge_before_factoring() {
    let (mut tab, terms, nts) = tab_with(&["x", "y"], &["A"]);
    let mut prods = vec![];

    let base = build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![sym(terms[0]), action("a"), action("b"), sym(terms[1])],
      None,
      None,
    ).unwrap();

    // one hidden production carries the merged code
    assert_eq!(prods.len(), 2);
    assert_eq!(prods[0].action(), "ab");
    assert!(prods[0].rhs().is_empty());
    assert_eq!(tab.nonterm_by_name("NT$2"), None);
    assert_eq!(prods[base.index()].rhs().len(), 3);
  }

  #[test]
  fn lone_action_is_the_reduce_action() {
    let (mut tab, _, nts) = tab_with(&[], &["A"]);
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![action("done()")],
      None,
      None,
    ).unwrap();

    assert_eq!(prods.len(), 1);
    assert!(prods[id.index()].rhs().is_empty());
    assert_eq!(prods[id.index()].action(), "done()");
  }

  #[test]
  fn embedded_actions_factor_into_hidden_productions() {
    let (mut tab, terms, nts) = tab_with(&["b", "c", "d"], &["A"]);
    let mut prods = vec![];

    let base = build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![
        sym(terms[0]),
        action("a1"),
        sym(terms[1]),
        action("a2"),
        sym(terms[2]),
      ],
      None,
      None,
    ).unwrap();

    assert_eq!(prods.len(), 3);
    assert_eq!(base, ProdId(2));

    let nt1 = tab.nonterm_by_name("NT$1").unwrap();
    let nt2 = tab.nonterm_by_name("NT$2").unwrap();
    assert!(tab.nonterm(nt1).is_embedded_action());
    assert!(tab.nonterm(nt2).is_embedded_action());
    assert_eq!(tab.nonterm(nt1).prods(), &[ProdId(0)]);
    assert_eq!(tab.nonterm(nt2).prods(), &[ProdId(1)]);

    // the hidden symbols replace the actions in place
    let syms = prods[base.index()].rhs().iter()
      .map(|part| part.symbol())
      .collect::<Vec<_>>();
    assert_eq!(syms, vec![
      Some(Symbol::Term(terms[0])),
      Some(Symbol::Nonterm(nt1)),
      Some(Symbol::Term(terms[1])),
      Some(Symbol::Nonterm(nt2)),
      Some(Symbol::Term(terms[2])),
    ]);

    let first = &prods[0];
    assert_eq!(first.lhs(), nt1);
    assert!(first.rhs().is_empty());
    assert_eq!(first.action(), "a1");
    let embedded = first.embedded().unwrap();
    assert_eq!(embedded.base(), base);
    assert_eq!(embedded.index_of_intermediate_result(), None);

    let second = &prods[1];
    assert_eq!(second.lhs(), nt2);
    assert_eq!(second.action(), "a2");
    assert_eq!(
      second.embedded().unwrap().index_of_intermediate_result(),
      Some(2),
    );
  }

  #[test]
  fn symbol_only_rhs_is_left_untouched() {
    let (mut tab, terms, nts) = tab_with(&["x", "y"], &["A"]);
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![sym(terms[0]), sym(terms[1])],
      None,
      None,
    ).unwrap();

    assert_eq!(prods.len(), 1);
    assert_eq!(prods[id.index()].rhs().len(), 2);
    assert_eq!(prods[id.index()].action(), "");
  }

  #[test]
  fn precedence_of_the_last_terminal_is_inherited() {
    let mut tab = SymbolTable::new();
    let plus = tab.declare_term("PLUS", None, Some(5), Assoc::Left).unwrap();
    let e = tab.declare_nonterm("E", None).unwrap();
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      e,
      vec![sym(e), sym(plus), sym(e)],
      None,
      None,
    ).unwrap();

    assert_eq!(prods[id.index()].prec(), Some(5));
    assert_eq!(prods[id.index()].assoc(), Assoc::Left);
  }

  #[test]
  fn a_later_terminal_wins_even_without_precedence() {
    let mut tab = SymbolTable::new();
    let plus = tab.declare_term("PLUS", None, Some(5), Assoc::Left).unwrap();
    let x = tab.declare_term("x", None, None, Assoc::Unknown).unwrap();
    let e = tab.declare_nonterm("E", None).unwrap();
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      e,
      vec![sym(e), sym(plus), sym(x)],
      None,
      None,
    ).unwrap();

    assert_eq!(prods[id.index()].prec(), None);
    assert_eq!(prods[id.index()].assoc(), Assoc::Unknown);
  }

  #[test]
  fn contextual_precedence_overrides_inference() {
    let mut tab = SymbolTable::new();
    let plus = tab.declare_term("PLUS", None, Some(5), Assoc::Left).unwrap();
    let e = tab.declare_nonterm("E", None).unwrap();
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      e,
      vec![sym(e), sym(plus), sym(e)],
      None,
      Some((9, Assoc::Right)),
    ).unwrap();

    assert_eq!(prods[id.index()].prec(), Some(9));
    assert_eq!(prods[id.index()].assoc(), Assoc::Right);
  }

  #[test]
  fn label_prologue_binds_stack_slots() {
    let (mut tab, terms, nts) = tab_with(&["x", "y"], &["A"]);
    let mut prods = vec![];

    let id = build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![
        labelled(terms[0], "l"),
        sym(terms[1]),
        labelled(nts[0], "r"),
      ],
      Some("build(l, r)"),
      None,
    ).unwrap();

    assert_eq!(
      prods[id.index()].action(),
      "let l = __stack.peek(2);\nlet r = __stack.peek(0);\nbuild(l, r)",
    );
  }

  #[test]
  fn embedded_action_sees_labels_to_its_left() {
    let (mut tab, terms, nts) = tab_with(&["b", "c"], &["A"]);
    let mut prods = vec![];

    build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![
        labelled(terms[0], "left"),
        action("use(left)"),
        sym(terms[1]),
      ],
      None,
      None,
    ).unwrap();

    assert_eq!(prods[0].action(), "let left = __stack.peek(0);\nuse(left)");
  }

  #[test]
  fn use_counts_tick_per_reference() {
    let (mut tab, terms, nts) = tab_with(&["x"], &["A", "B"]);
    let mut prods = vec![];

    build_production(
      &mut tab,
      &mut prods,
      nts[0],
      vec![sym(terms[0]), sym(nts[1]), sym(terms[0])],
      None,
      None,
    ).unwrap();

    assert_eq!(tab.term(terms[0]).use_count(), 2);
    assert_eq!(tab.nonterm(nts[1]).use_count(), 1);
    // the left-hand side counts as a use too
    assert_eq!(tab.nonterm(nts[0]).use_count(), 1);
  }

  #[test]
  fn unknown_ids_are_rejected() {
    let mut tab = SymbolTable::new();
    let mut prods = vec![];

    assert_eq!(
      build_production(&mut tab, &mut prods, NontermId(7), vec![], None, None),
      Err(Error::UnknownNonterm(7)),
    );

    let a = tab.declare_nonterm("A", None).unwrap();
    assert_eq!(
      build_production(
        &mut tab,
        &mut prods,
        a,
        vec![sym(TermId(42))],
        None,
        None,
      ),
      Err(Error::UnknownTerm(42)),
    );
    assert!(prods.is_empty());
  }
}

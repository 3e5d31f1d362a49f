//! Grammar construction and analysis for an LALR parser generator.
//!
//! A [`GrammarBuilder`] collects symbol declarations and productions,
//! factors embedded semantic actions into hidden non-terminals and
//! closes everything into an immutable [`Grammar`] with nullability and
//! FIRST sets precomputed. [`ItemCore`] is the dotted-production piece
//! that LR state construction is built from.

pub mod error;
pub mod grammar;
pub mod item;

pub use error::{Error, Result};
pub use grammar::{Grammar, GrammarBuilder};
pub use item::ItemCore;

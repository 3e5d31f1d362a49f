use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// An invariant violation in the grammar core.
///
/// None of these are recoverable: an `Err` means the declaration contract
/// was broken upstream or the core itself has a defect, and the generator
/// run around it is expected to abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("duplicate terminal `{0}`")]
  DuplicateTerm(String),
  #[error("duplicate non-terminal `{0}`")]
  DuplicateNonterm(String),
  #[error("unknown terminal id {0}")]
  UnknownTerm(u32),
  #[error("unknown non-terminal id {0}")]
  UnknownNonterm(u32),
  #[error("unknown production id {0}")]
  UnknownProd(u32),
  #[error("hidden non-terminal name `{0}` is already declared")]
  HiddenNameTaken(String),
  #[error("dot position {dot} outside a right-hand side of length {len}")]
  DotOutOfRange { dot: u16, len: u16 },
  #[error("attempt to shift past the end of an item")]
  ShiftPastEnd,
}

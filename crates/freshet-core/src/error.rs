//! Error types for `freshet-core`.

use std::fmt;

use thiserror::Error;

/// The class of shared entity a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
  Device,
  Persona,
  Profile,
  Vegetation,
}

impl fmt::Display for RefKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      RefKind::Device => "device",
      RefKind::Persona => "persona",
      RefKind::Profile => "profile",
      RefKind::Vegetation => "vegetation",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// A cross-reference names an id that is absent from the submission's own
  /// entity lists. Fatal: the whole submission is rolled back.
  #[error("cross-reference names {kind} {id}, which is not in the submission")]
  UnresolvedReference { kind: RefKind, id: i64 },

  /// A natural key lost its conditional insert to a concurrent writer and
  /// the follow-up lookup still found no row.
  #[error("could not resolve {kind} by natural key {key:?} after an insert conflict")]
  ResolveConflict { kind: RefKind, key: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

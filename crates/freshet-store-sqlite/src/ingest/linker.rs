//! Graph linker: junction rows tying shared entities to this submission.
//!
//! Every link target is a checked lookup against the submission's own lists
//! via the resolved maps. A link naming an id the submission never listed is
//! an error, never a silent dereference, and aborts the whole transaction.

use freshet_core::{
  error::RefKind,
  submission::{Submission, VegetationContext},
};
use rusqlite::{Transaction, params};

use super::{resolver::Resolved, writer::EnvelopeIds};
use crate::Result;

/// How many junction rows of each kind were written.
pub(super) struct LinkCounts {
  pub devices:    usize,
  pub personas:   usize,
  pub vegetation: usize,
}

pub(super) fn link(
  tx: &Transaction<'_>,
  s: &Submission,
  envelope: &EnvelopeIds,
  resolved: &Resolved,
) -> Result<LinkCounts> {
  for link in &s.device_links {
    let device_id = resolved.device(link.device_id).ok_or(
      freshet_core::Error::UnresolvedReference {
        kind: RefKind::Device,
        id:   link.device_id,
      },
    )?;
    tx.execute(
      "INSERT INTO device_record_metadata (device_id, record_metadata_id, category)
       VALUES (?1, ?2, ?3)",
      params![device_id, envelope.record_metadata_id, link.category],
    )?;
  }

  for link in &s.persona_links {
    let persona_id = resolved.persona(link.persona_id).ok_or(
      freshet_core::Error::UnresolvedReference {
        kind: RefKind::Persona,
        id:   link.persona_id,
      },
    )?;
    tx.execute(
      "INSERT INTO persona_record_metadata (persona_id, record_metadata_id, role)
       VALUES (?1, ?2, ?3)",
      params![persona_id, envelope.record_metadata_id, link.role],
    )?;
  }

  for link in &s.vegetation_links {
    // The link carries a submission-local vegetation id; the entry it names
    // decides which junction table the row belongs in.
    let entry = s.vegetation_entry(link.vegetation_id).ok_or(
      freshet_core::Error::UnresolvedReference {
        kind: RefKind::Vegetation,
        id:   link.vegetation_id,
      },
    )?;
    let vegetation_id = resolved.vegetation(entry.context, &entry.name).ok_or(
      freshet_core::Error::UnresolvedReference {
        kind: RefKind::Vegetation,
        id:   link.vegetation_id,
      },
    )?;

    match entry.context {
      VegetationContext::Shore => tx.execute(
        "INSERT INTO river_shore_vegetation (river_metadata_id, shore_vegetation_id)
         VALUES (?1, ?2)",
        params![envelope.river_metadata_id, vegetation_id],
      )?,
      VegetationContext::Water => tx.execute(
        "INSERT INTO river_water_vegetation (river_metadata_id, water_vegetation_id)
         VALUES (?1, ?2)",
        params![envelope.river_metadata_id, vegetation_id],
      )?,
    };
  }

  Ok(LinkCounts {
    devices:    s.device_links.len(),
    personas:   s.persona_links.len(),
    vegetation: s.vegetation_links.len(),
  })
}

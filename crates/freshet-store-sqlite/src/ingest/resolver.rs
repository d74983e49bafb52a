//! Reference resolver: find-or-create for shared entities by natural key.
//!
//! Policy, uniform across all kinds: look the natural key up; a hit returns
//! the existing id untouched (first write wins, attributes are never
//! updated); a miss issues a conditional insert. When the conditional insert
//! changes no rows — a concurrent connection inserted the same key between
//! our lookup and our insert — the key is looked up once more, and only a
//! second miss is an error.
//!
//! Results are memoised per transaction, so a key listed repeatedly in one
//! submission resolves exactly once and always to the same id.

use std::collections::HashMap;

use freshet_core::{
  error::RefKind,
  submission::{
    DeviceRef, PersonaRef, ProfileRef, Submission, VegetationContext,
    VegetationRef,
  },
};
use rusqlite::{OptionalExtension as _, Transaction, params};

use crate::Result;

// ─── Resolved map ────────────────────────────────────────────────────────────

/// Natural-key → row-id maps for everything the submission references.
#[derive(Default)]
pub(super) struct Resolved {
  devices:  HashMap<i64, i64>,
  personas: HashMap<i64, i64>,
  profiles: HashMap<i64, i64>,
  shore:    HashMap<String, i64>,
  water:    HashMap<String, i64>,

  pub created: usize,
  pub reused:  usize,
}

impl Resolved {
  pub fn device(&self, id: i64) -> Option<i64> {
    self.devices.get(&id).copied()
  }

  pub fn persona(&self, id: i64) -> Option<i64> {
    self.personas.get(&id).copied()
  }

  pub fn profile(&self, id: i64) -> Option<i64> {
    self.profiles.get(&id).copied()
  }

  pub fn vegetation(
    &self,
    context: VegetationContext,
    name: &str,
  ) -> Option<i64> {
    match context {
      VegetationContext::Shore => self.shore.get(name).copied(),
      VegetationContext::Water => self.water.get(name).copied(),
    }
  }

  fn tally(&mut self, created: bool) {
    if created {
      self.created += 1;
    } else {
      self.reused += 1;
    }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Resolve every distinct natural key the submission references.
pub(super) fn resolve_all(
  tx: &Transaction<'_>,
  s: &Submission,
) -> Result<Resolved> {
  let mut out = Resolved::default();

  for device in &s.devices {
    if out.devices.contains_key(&device.id) {
      continue; // same key listed twice; first occurrence wins
    }
    let (id, created) = resolve_device(tx, device)?;
    out.devices.insert(device.id, id);
    out.tally(created);
  }

  for persona in &s.personas {
    if out.personas.contains_key(&persona.id) {
      continue;
    }
    let (id, created) = resolve_persona(tx, persona)?;
    out.personas.insert(persona.id, id);
    out.tally(created);
  }

  for profile in &s.profiles {
    if out.profiles.contains_key(&profile.id) {
      continue;
    }
    let (id, created) = resolve_profile(tx, profile)?;
    out.profiles.insert(profile.id, id);
    out.tally(created);
  }

  for vegetation in &s.vegetation {
    let memo = match vegetation.context {
      VegetationContext::Shore => &out.shore,
      VegetationContext::Water => &out.water,
    };
    if memo.contains_key(&vegetation.name) {
      continue;
    }
    let (id, created) = resolve_vegetation(tx, vegetation)?;
    match vegetation.context {
      VegetationContext::Shore => out.shore.insert(vegetation.name.clone(), id),
      VegetationContext::Water => out.water.insert(vegetation.name.clone(), id),
    };
    out.tally(created);
  }

  Ok(out)
}

// ─── Per-kind resolution ─────────────────────────────────────────────────────

fn resolve_device(
  tx: &Transaction<'_>,
  device: &DeviceRef,
) -> Result<(i64, bool)> {
  find_or_create(
    tx,
    RefKind::Device,
    &device.id.to_string(),
    |tx| {
      tx.query_row(
        "SELECT id FROM device WHERE id = ?1",
        params![device.id],
        |r| r.get(0),
      )
      .optional()
    },
    |tx| {
      tx.execute(
        "INSERT INTO device (id, make, model, owner) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO NOTHING",
        params![device.id, device.make, device.model, device.owner],
      )
    },
  )
}

fn resolve_persona(
  tx: &Transaction<'_>,
  persona: &PersonaRef,
) -> Result<(i64, bool)> {
  find_or_create(
    tx,
    RefKind::Persona,
    &persona.id.to_string(),
    |tx| {
      tx.query_row(
        "SELECT id FROM persona WHERE id = ?1",
        params![persona.id],
        |r| r.get(0),
      )
      .optional()
    },
    |tx| {
      tx.execute(
        "INSERT INTO persona (id, first_name, last_name, id_document, affiliation)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO NOTHING",
        params![
          persona.id,
          persona.first_name,
          persona.last_name,
          persona.id_document,
          persona.affiliation,
        ],
      )
    },
  )
}

fn resolve_profile(
  tx: &Transaction<'_>,
  profile: &ProfileRef,
) -> Result<(i64, bool)> {
  find_or_create(
    tx,
    RefKind::Profile,
    &profile.id.to_string(),
    |tx| {
      tx.query_row(
        "SELECT id FROM profile WHERE id = ?1",
        params![profile.id],
        |r| r.get(0),
      )
      .optional()
    },
    |tx| {
      tx.execute(
        "INSERT INTO profile
           (id, site_id, code, mix_criteria, mix_notes,
            stratification_criteria, stratification_notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO NOTHING",
        params![
          profile.id,
          profile.site_id,
          profile.code,
          profile.mix_criteria,
          profile.mix_notes,
          profile.stratification_criteria,
          profile.stratification_notes,
        ],
      )
    },
  )
}

fn resolve_vegetation(
  tx: &Transaction<'_>,
  vegetation: &VegetationRef,
) -> Result<(i64, bool)> {
  let table = match vegetation.context {
    VegetationContext::Shore => "shore_vegetation",
    VegetationContext::Water => "water_vegetation",
  };
  let lookup_sql = format!("SELECT id FROM {table} WHERE name = ?1");
  let insert_sql =
    format!("INSERT INTO {table} (name) VALUES (?1) ON CONFLICT(name) DO NOTHING");

  find_or_create(
    tx,
    RefKind::Vegetation,
    &vegetation.name,
    |tx| {
      tx.query_row(&lookup_sql, params![vegetation.name], |r| r.get(0))
        .optional()
    },
    |tx| tx.execute(&insert_sql, params![vegetation.name]),
  )
}

// ─── Find-or-create ──────────────────────────────────────────────────────────

/// Returns `(row_id, created)`. At most one re-lookup after a lost insert.
fn find_or_create<L, I>(
  tx: &Transaction<'_>,
  kind: RefKind,
  key: &str,
  lookup: L,
  insert: I,
) -> Result<(i64, bool)>
where
  L: Fn(&Transaction<'_>) -> rusqlite::Result<Option<i64>>,
  I: Fn(&Transaction<'_>) -> rusqlite::Result<usize>,
{
  if let Some(id) = lookup(tx)? {
    return Ok((id, false));
  }

  if insert(tx)? == 1 {
    return Ok((tx.last_insert_rowid(), true));
  }

  // Zero rows changed: another connection claimed the key first. The row
  // must be visible now; a second miss means the store broke its own
  // uniqueness contract.
  tracing::warn!(%kind, key, "conditional insert lost a natural-key race, re-resolving");
  match lookup(tx)? {
    Some(id) => Ok((id, false)),
    None => Err(
      freshet_core::Error::ResolveConflict { kind, key: key.to_owned() }.into(),
    ),
  }
}

//! The ingestion transaction: one submission in, one committed graph out.
//!
//! Everything in this module is synchronous rusqlite code. The store runs
//! [`run`] inside a single `tokio_rusqlite` connection call, so the whole
//! submission executes on one IMMEDIATE transaction: either every staged row
//! commits or the drop of the uncommitted [`rusqlite::Transaction`] rolls all
//! of them back.
//!
//! Write order is fixed by foreign-key direction:
//!
//! 1. envelope chain (weather → visit → record_metadata → gauge → river)
//! 2. shared-entity resolution (devices, personas, profiles, vegetation)
//! 3. records and samples (samples reference resolved profiles)
//! 4. junction rows

mod linker;
mod resolver;
mod writer;

use freshet_core::{store::IngestReceipt, submission::Submission};
use rusqlite::{Connection, TransactionBehavior};

use crate::Result;

/// Transaction lifecycle, as reported in trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  Pending,
  Writing,
  Committed,
  Aborted,
}

/// Ingest one submission on its own transaction.
pub(crate) fn run(
  conn: &mut Connection,
  submission: &Submission,
) -> Result<IngestReceipt> {
  tracing::debug!(phase = ?Phase::Pending, site_id = submission.site_id, "ingest start");

  // IMMEDIATE takes the write lock up front, so the transaction cannot fail
  // on a lock upgrade halfway through the write sequence.
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  tracing::debug!(phase = ?Phase::Writing, "transaction open");

  match stage(&tx, submission) {
    Ok(receipt) => {
      tx.commit()?;
      tracing::debug!(
        phase = ?Phase::Committed,
        record_metadata_id = receipt.record_metadata_id,
        records = receipt.records,
        samples = receipt.samples,
        "ingest committed"
      );
      Ok(receipt)
    }
    Err(e) => {
      // Dropping an uncommitted transaction rolls back every staged write.
      drop(tx);
      tracing::warn!(phase = ?Phase::Aborted, error = %e, "ingest aborted");
      Err(e)
    }
  }
}

/// Run every write stage against the open transaction. No commit here; that
/// is [`run`]'s call.
fn stage(
  tx: &rusqlite::Transaction<'_>,
  submission: &Submission,
) -> Result<IngestReceipt> {
  let envelope = writer::write_envelope(tx, submission)?;
  let resolved = resolver::resolve_all(tx, submission)?;
  let (records, samples) =
    writer::write_sample_groups(tx, submission, &envelope, &resolved)?;
  let links = linker::link(tx, submission, &envelope, &resolved)?;

  Ok(IngestReceipt {
    record_metadata_id: envelope.record_metadata_id,
    river_metadata_id:  envelope.river_metadata_id,
    records,
    samples,
    device_links:       links.devices,
    persona_links:      links.personas,
    vegetation_links:   links.vegetation,
    created_refs:       resolved.created,
    reused_refs:        resolved.reused,
  })
}

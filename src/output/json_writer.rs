//! JSON rendering of the output tables.

use crate::core::LineageError;
use serde::Serialize;
use std::io::Write;

/// Write `records` as one pretty-printed JSON array.
pub fn write_records_json<W: Write, T: Serialize>(
    mut out: W,
    records: &[T],
) -> Result<(), LineageError> {
    serde_json::to_writer_pretty(&mut out, records)?;
    out.write_all(b"\n")?;
    Ok(())
}

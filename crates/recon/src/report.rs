use std::io::Write;

use crate::error::ReconError;
use crate::model::{ReportRow, VarfieldHit};

/// Flatten per-label hits and keep those whose field carries at least
/// `min_identifier_subfields` identifier subfields.
///
/// Nothing kept means no header can be derived; that fails the run.
pub fn assemble(
    per_label: Vec<Vec<VarfieldHit>>,
    min_identifier_subfields: usize,
) -> Result<Vec<ReportRow>, ReconError> {
    let all: Vec<VarfieldHit> = per_label.into_iter().flatten().collect();
    let hits = all.len();
    let rows: Vec<ReportRow> = all
        .into_iter()
        .filter(|hit| hit.identifier_subfields >= min_identifier_subfields)
        .collect();

    if rows.is_empty() {
        return Err(ReconError::EmptyReport { hits });
    }
    Ok(rows)
}

/// Write the header (derived from the row type's fields) and one record
/// per row.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), ReconError> {
    if rows.is_empty() {
        return Err(ReconError::EmptyReport { hits: 0 });
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| ReconError::Io(format!("CSV write error: {e}")))?;
    }

    csv_writer
        .flush()
        .map_err(|e| ReconError::Io(format!("CSV flush error: {e}")))
}

//! Batch export of raw rate records.
//!
//! The degenerate run mode: instead of publishing a formatted report, the
//! run's `(key, apr)` records are appended to a CSV file. The file is an
//! append-only stream of one record type - `<key>,<apr>` per line, no
//! header row - so successive runs accumulate rather than overwrite.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::info;

/// Appends one `<key>,<apr>` line per record to the export file,
/// creating it on first use.
///
/// # Errors
///
/// Returns [`RatewireError::Io`](crate::RatewireError::Io) if the file
/// cannot be opened or written.
pub fn append_records(path: &Path, records: &[(String, Decimal)]) -> crate::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            crate::RatewireError::Io(format!("failed to open {}: {e}", path.display()))
        })?;

    for (key, apr) in records {
        writeln!(file, "{key},{apr}").map_err(|e| {
            crate::RatewireError::Io(format!("failed to append to {}: {e}", path.display()))
        })?;
    }

    info!(records = records.len(), path = %path.display(), "Appended export records");
    Ok(())
}

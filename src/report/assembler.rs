//! Report text assembly.
//!
//! Walks the selected terms in order, reads each tranche's pool state,
//! derives the fixed APR, and builds the final feed text. Assembly is
//! all-or-nothing: any read or calculation failure aborts the run so a
//! partial report is never handed to the publisher.

use rust_decimal::Decimal;
use tracing::debug;

use super::display_name;
use crate::chain::InstrumentReader;
use crate::manifest::DeploymentManifest;
use crate::rates::{RateCalculator, days_remaining, round_apr};

/// First line of every report.
const REPORT_HEADER: &str = "Today's Fixed Rate Report 🌤";

/// Legend explaining the per-term line format.
const REPORT_LEGEND: &str = "Asset APR (Days Remaining)";

/// Closing pointer to the live rates page.
const REPORT_LINK: &str = "Rates currently available at https://app.ratewire.xyz";

/// Assembles the report text for the selected terms.
///
/// One line per term, in selection order: the term's display name, a
/// colon, and a comma-separated contribution per tranche with a positive
/// rounded APR - `"<apr>% (<days>d)"`. Tranches whose rounded APR is zero
/// or negative (including anything at or past expiry) are dropped from
/// the line; a term whose tranches all drop still gets its header-only
/// line. The whole text is header + blank line, term lines, then the
/// legend and link footer.
///
/// # Errors
///
/// Fails fast - aborting the entire report - if a selected key has no
/// tranche list or display name, or if any reading cannot be obtained.
pub async fn assemble_report<R: InstrumentReader, C: RateCalculator>(
    selected: &[String],
    manifest: &DeploymentManifest,
    reader: &R,
    calc: &C,
    now: i64,
) -> crate::Result<String> {
    let mut lines = Vec::with_capacity(selected.len());

    for key in selected {
        let tranches = manifest.tranches.get(key).ok_or_else(|| {
            crate::RatewireError::Config(format!("no tranche list for term {key:?}"))
        })?;
        let name = display_name(key)?;

        let mut contributions = Vec::with_capacity(tranches.len());
        for tranche in tranches {
            let reading = reader.reading(key, tranche, now).await?;
            let apr = round_apr(calc.fixed_apr(&reading));
            if apr <= Decimal::ZERO {
                debug!(term = %key, tranche = %tranche.address, %apr, "Dropped non-positive rate");
                continue;
            }
            let days = days_remaining(reading.seconds_remaining);
            contributions.push(format!("{apr}% ({days}d)"));
        }

        let mut line = format!("{name}:");
        if !contributions.is_empty() {
            line.push(' ');
            line.push_str(&contributions.join(", "));
        }
        lines.push(line);
    }

    let mut report = format!("{REPORT_HEADER}\n\n");
    for line in &lines {
        report.push_str(line);
        report.push('\n');
    }
    report.push_str(REPORT_LEGEND);
    report.push_str("\n\n");
    report.push_str(REPORT_LINK);

    Ok(report)
}

/// Collects raw `(key, apr)` records for batch export.
///
/// Same traversal as [`assemble_report`] - selection order, then tranche
/// order - but with no inclusion filter and no formatting: one record per
/// tranche, keyed by its term, APR rounded to two digits.
///
/// # Errors
///
/// Fails fast on the same conditions as [`assemble_report`].
pub async fn collect_rates<R: InstrumentReader, C: RateCalculator>(
    selected: &[String],
    manifest: &DeploymentManifest,
    reader: &R,
    calc: &C,
    now: i64,
) -> crate::Result<Vec<(String, Decimal)>> {
    let mut records = Vec::new();

    for key in selected {
        let tranches = manifest.tranches.get(key).ok_or_else(|| {
            crate::RatewireError::Config(format!("no tranche list for term {key:?}"))
        })?;
        for tranche in tranches {
            let reading = reader.reading(key, tranche, now).await?;
            records.push((key.clone(), round_apr(calc.fixed_apr(&reading))));
        }
    }

    Ok(records)
}

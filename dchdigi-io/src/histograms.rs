//! Debug histogram output.

use crate::Result;
use dchdigi_algorithms::DebugHistograms;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes debug histograms as CSV.
///
/// Each histogram contributes one row per bin plus an underflow and an
/// overflow row (open bounds left empty). A final row holds the number of
/// clamped calibration lookups.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_debug_histograms<P: AsRef<Path>>(path: P, histograms: &DebugHistograms) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "histogram,bin,low_cm,high_cm,count")?;

    for h in histograms.histograms() {
        let nbins = h.counts.len();
        writeln!(writer, "{},underflow,,{},{}", h.name, h.edges[0], h.underflow)?;
        for (i, count) in h.counts.iter().enumerate() {
            writeln!(writer, "{},{i},{},{},{count}", h.name, h.edges[i], h.edges[i + 1])?;
        }
        writeln!(writer, "{},overflow,{},,{}", h.name, h.edges[nbins], h.overflow)?;
        log::debug!(
            "{}: {} entries, mean {:.4e} cm, std {:.4e} cm",
            h.name,
            h.entries(),
            h.mean(),
            h.std_dev()
        );
    }
    writeln!(writer, "clamped_lookups,,,,{}", histograms.clamped_lookups)?;
    writer.flush()?;

    log::info!("debug histograms written to {}", path.display());
    Ok(())
}

//! Partition consolidation
//!
//! Concatenates every partition in ascending page order into a single CSV
//! with the same columns and delimiter, ready for the downstream dataset.

use crate::output::partition::{PartitionRow, PartitionWriter, DELIMITER};
use crate::HarvestError;
use std::fs;
use std::path::Path;

/// What a merge produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Partitions read
    pub partitions: usize,

    /// Rows written to the merged file
    pub records: usize,
}

/// Merges all partitions known to `writer` into `destination`
///
/// # Arguments
///
/// * `writer` - Locates the partitions
/// * `destination` - Merged CSV path; overwritten if present
///
/// # Returns
///
/// * `Ok(MergeSummary)` - Counts of partitions and rows merged
/// * `Err(HarvestError)` - A partition could not be read or the output written
pub fn merge_partitions(
    writer: &PartitionWriter,
    destination: &Path,
) -> Result<MergeSummary, HarvestError> {
    let pages = writer.list_pages()?;
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut output = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(destination)?;
    let mut summary = MergeSummary::default();

    for page in pages {
        let path = writer.partition_path(page);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .from_path(&path)?;

        let mut rows = 0;
        for row in reader.deserialize::<PartitionRow>() {
            output.serialize(row?)?;
            rows += 1;
        }
        tracing::debug!("Merged {} rows from {}", rows, path.display());

        summary.partitions += 1;
        summary.records += rows;
    }

    output.flush()?;
    tracing::info!(
        "Merged {} partitions ({} records) into {}",
        summary.partitions,
        summary.records,
        destination.display()
    );
    Ok(summary)
}

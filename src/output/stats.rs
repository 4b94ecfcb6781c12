//! Statistics over the partitions on disk
//!
//! This module provides functionality for summarizing what previous runs
//! have persisted, without touching the network.

use crate::output::partition::PartitionWriter;
use crate::HarvestError;
use std::collections::{BTreeMap, HashSet};

/// Partition statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStatistics {
    /// Record count per persisted page, keyed by page number
    pub records_per_page: BTreeMap<u32, usize>,

    /// Total number of records across all partitions
    pub total_records: usize,

    /// Number of distinct listing URLs across all partitions
    pub distinct_urls: usize,

    /// Pages between the first and last partition that have none
    pub missing_pages: Vec<u32>,
}

impl PartitionStatistics {
    pub fn partition_count(&self) -> usize {
        self.records_per_page.len()
    }

    /// Records per partition, 0.0 when there are none
    pub fn average_records(&self) -> f64 {
        if self.records_per_page.is_empty() {
            0.0
        } else {
            self.total_records as f64 / self.records_per_page.len() as f64
        }
    }
}

/// Loads statistics from the partition directory
///
/// # Arguments
///
/// * `writer` - Locates the partitions
///
/// # Returns
///
/// * `Ok(PartitionStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - A partition could not be read
pub fn load_statistics(writer: &PartitionWriter) -> Result<PartitionStatistics, HarvestError> {
    let pages = writer.list_pages()?;
    let mut stats = PartitionStatistics::default();
    let mut urls = HashSet::new();

    for &page in &pages {
        let records = writer.read(page)?;
        stats.total_records += records.len();
        stats.records_per_page.insert(page, records.len());
        urls.extend(records.into_iter().map(|r| r.url));
    }
    stats.distinct_urls = urls.len();

    if let (Some(&first), Some(&last)) = (pages.first(), pages.last()) {
        stats.missing_pages = (first..=last)
            .filter(|p| !stats.records_per_page.contains_key(p))
            .collect();
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &PartitionStatistics) {
    println!("=== Partition Statistics ===\n");

    println!("Overview:");
    println!("  Partitions: {}", stats.partition_count());
    println!("  Total records: {}", stats.total_records);
    println!("  Distinct listing URLs: {}", stats.distinct_urls);
    println!("  Average records per page: {:.1}", stats.average_records());
    println!();

    if let (Some(first), Some(last)) = (
        stats.records_per_page.keys().next(),
        stats.records_per_page.keys().next_back(),
    ) {
        println!("Page range: {}..={}", first, last);
    }

    if !stats.missing_pages.is_empty() {
        println!("Missing Pages ({}):", stats.missing_pages.len());
        for page in &stats.missing_pages {
            println!("  - {}", page);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ListingRecord;
    use tempfile::TempDir;

    fn records(ids: &[&str]) -> Vec<ListingRecord> {
        ids.iter()
            .map(|id| ListingRecord::new(format!("https://www.otomoto.pl/oferta/{}", id), "Opis"))
            .collect()
    }

    #[test]
    fn test_statistics_over_partitions() {
        let dir = TempDir::new().unwrap();
        let writer = PartitionWriter::new(dir.path(), "page");
        writer.write(1, &records(&["a", "b"])).unwrap();
        writer.write(4, &records(&["b", "c", "d"])).unwrap();

        let stats = load_statistics(&writer).unwrap();

        assert_eq!(stats.partition_count(), 2);
        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.distinct_urls, 4);
        assert_eq!(stats.missing_pages, vec![2, 3]);
        assert_eq!(stats.records_per_page.get(&4), Some(&3));
        assert!((stats.average_records() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_statistics_without_partitions() {
        let dir = TempDir::new().unwrap();
        let writer = PartitionWriter::new(dir.path().join("nothing-yet"), "page");

        let stats = load_statistics(&writer).unwrap();
        assert_eq!(stats, PartitionStatistics::default());
        assert_eq!(stats.average_records(), 0.0);
    }
}

//! Output module for persisting and reporting crawl results
//!
//! This module handles:
//! - Writing one CSV partition per index page
//! - Merging partitions into a single dataset file
//! - Statistics over the partitions on disk
//! - The end-of-run report

mod merge;
mod partition;
pub mod stats;
mod summary;

pub use merge::{merge_partitions, MergeSummary};
pub use partition::{read_partition, PartitionWriter, DELIMITER, PAGE_DIGITS};
pub use stats::{load_statistics, print_statistics, PartitionStatistics};
pub use summary::{format_report, print_report};

//! Page partitions on disk
//!
//! Every index page that produced at least one record is persisted as one
//! self-contained CSV file named after its page number. The existence of that
//! file is the only resume state: a page with a partition is never fetched
//! again.

use crate::config::OutputConfig;
use crate::record::ListingRecord;
use crate::HarvestError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Zero-padded width of the page number in partition file names
pub const PAGE_DIGITS: usize = 3;

/// Field delimiter of partition files
pub const DELIMITER: u8 = b';';

const EXTENSION: &str = "csv";

/// One CSV row; column names follow the downstream dataset
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PartitionRow {
    brand: Option<String>,
    model: Option<String>,
    color: Option<String>,
    #[serde(rename = "seats")]
    seat_count: Option<String>,
    year: Option<String>,
    #[serde(rename = "fuel")]
    fuel_type: Option<String>,
    #[serde(rename = "capacity")]
    engine_capacity: Option<String>,
    #[serde(rename = "power")]
    engine_power: Option<String>,
    body_type: Option<String>,
    #[serde(rename = "gearbox")]
    gearbox_type: Option<String>,
    mileage: Option<String>,
    condition: Option<String>,
    accident_free: Option<String>,
    country_of_origin: Option<String>,
    title: Option<String>,
    price: Option<String>,
    price_net_info: Option<String>,
    location: Option<String>,
    /// JSON array of equipment entries
    equipment: String,
    posted_date: Option<String>,
    description: String,
    url: String,
}

impl PartitionRow {
    pub(crate) fn from_record(record: &ListingRecord) -> Result<Self, HarvestError> {
        Ok(Self {
            brand: record.brand.clone(),
            model: record.model.clone(),
            color: record.color.clone(),
            seat_count: record.seat_count.clone(),
            year: record.year.clone(),
            fuel_type: record.fuel_type.clone(),
            engine_capacity: record.engine_capacity.clone(),
            engine_power: record.engine_power.clone(),
            body_type: record.body_type.clone(),
            gearbox_type: record.gearbox_type.clone(),
            mileage: record.mileage.clone(),
            condition: record.condition.clone(),
            accident_free: record.accident_free.clone(),
            country_of_origin: record.country_of_origin.clone(),
            title: record.title.clone(),
            price: record.price.clone(),
            price_net_info: record.price_net_info.clone(),
            location: record.location.clone(),
            equipment: serde_json::to_string(&record.equipment)?,
            posted_date: record.posted_date.clone(),
            description: record.description.clone(),
            url: record.url.clone(),
        })
    }

    pub(crate) fn into_record(self) -> Result<ListingRecord, HarvestError> {
        let equipment = if self.equipment.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.equipment)?
        };

        Ok(ListingRecord {
            brand: self.brand,
            model: self.model,
            color: self.color,
            seat_count: self.seat_count,
            year: self.year,
            fuel_type: self.fuel_type,
            engine_capacity: self.engine_capacity,
            engine_power: self.engine_power,
            body_type: self.body_type,
            gearbox_type: self.gearbox_type,
            mileage: self.mileage,
            condition: self.condition,
            accident_free: self.accident_free,
            country_of_origin: self.country_of_origin,
            title: self.title,
            price: self.price,
            price_net_info: self.price_net_info,
            location: self.location,
            equipment,
            posted_date: self.posted_date,
            description: self.description,
            url: self.url,
        })
    }
}

/// Writes and inspects page partitions under one output directory
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    directory: PathBuf,
    prefix: String,
}

impl PartitionWriter {
    /// Creates a writer for `directory`; nothing is created on disk yet
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.directory, &config.file_prefix)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Deterministic file name for `page`, e.g. `page_007.csv`
    pub fn file_name(&self, page: u32) -> String {
        format!(
            "{}_{:0width$}.{}",
            self.prefix,
            page,
            EXTENSION,
            width = PAGE_DIGITS
        )
    }

    pub fn partition_path(&self, page: u32) -> PathBuf {
        self.directory.join(self.file_name(page))
    }

    /// Returns true if a complete partition exists for `page`
    pub fn exists(&self, page: u32) -> bool {
        self.partition_path(page).is_file()
    }

    /// Persists one page's records
    ///
    /// Does nothing for an empty slice. The file is written under a hidden
    /// temporary name and renamed into place, so an interrupted write never
    /// leaves a partition that passes `exists`. A failed write removes its
    /// temporary file.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - The partition that was written
    /// * `Ok(None)` - `records` was empty
    pub fn write(
        &self,
        page: u32,
        records: &[ListingRecord],
    ) -> Result<Option<PathBuf>, HarvestError> {
        if records.is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(&self.directory)?;

        let final_path = self.partition_path(page);
        // Removed on drop unless persisted
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", self.file_name(page)))
            .suffix(".tmp")
            .tempfile_in(&self.directory)?;

        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(DELIMITER)
                .from_writer(temp.as_file_mut());
            for record in records {
                writer.serialize(PartitionRow::from_record(record)?)?;
            }
            writer.flush()?;
        }

        temp.persist(&final_path).map_err(|e| e.error)?;
        tracing::debug!(
            "Wrote {} records for page {} to {}",
            records.len(),
            page,
            final_path.display()
        );

        Ok(Some(final_path))
    }

    /// Reads the partition of `page` back into records
    pub fn read(&self, page: u32) -> Result<Vec<ListingRecord>, HarvestError> {
        read_partition(&self.partition_path(page))
    }

    /// Page numbers of all partitions present, ascending
    ///
    /// A missing output directory simply has no partitions.
    pub fn list_pages(&self) -> Result<Vec<u32>, HarvestError> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(page) = entry.file_name().to_str().and_then(|n| self.page_of(n)) {
                pages.push(page);
            }
        }

        pages.sort_unstable();
        Ok(pages)
    }

    /// Parses the page number out of a partition file name
    fn page_of(&self, file_name: &str) -> Option<u32> {
        let digits = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('_')?
            .strip_suffix(EXTENSION)?
            .strip_suffix('.')?;

        if digits.len() < PAGE_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// Reads a single partition file
pub fn read_partition(path: &Path) -> Result<Vec<ListingRecord>, HarvestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)?;

    reader
        .deserialize::<PartitionRow>()
        .map(|row| row?.into_record())
        .collect()
}

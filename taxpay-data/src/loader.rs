use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use taxpay_core::calculations::{ScheduleBook, ScheduleError};
use taxpay_core::{TaxBracket, TaxType, UnknownTaxType};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading tax bracket schedules.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("Failed to read schedule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: {source}")]
    UnknownTaxType {
        row: usize,
        #[source]
        source: UnknownTaxType,
    },

    #[error("Invalid {tax_type} schedule: {source}")]
    InvalidSchedule {
        tax_type: TaxType,
        #[source]
        source: ScheduleError,
    },
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the tax schedules CSV file.
///
/// - `tax_type`: wire code (`PAYE`, `PIT`, `CIT`, `CGT`, `VAT`)
/// - `min_income`: lower bound of the band
/// - `max_income`: upper bound of the band (empty for unlimited)
/// - `rate`: marginal rate as a decimal (e.g. 0.075 for 7.5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_type: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket schedules kept in CSV files.
///
/// Tax types present in the file replace the built-in table for that type;
/// every other type keeps its statutory schedule.
pub struct TaxScheduleLoader;

impl TaxScheduleLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build a [`ScheduleBook`] from parsed records.
    ///
    /// Records are grouped by tax type and ordered by `min_income` before
    /// validation, so rows for one type need not be adjacent in the file.
    pub fn build(records: &[TaxBracketRecord]) -> Result<ScheduleBook, ScheduleLoaderError> {
        let mut groups: BTreeMap<TaxType, Vec<TaxBracket>> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let tax_type = record
                .tax_type
                .parse::<TaxType>()
                .map_err(|source| ScheduleLoaderError::UnknownTaxType {
                    // header is row 1
                    row: index + 2,
                    source,
                })?;

            groups.entry(tax_type).or_default().push(TaxBracket::new(
                record.min_income,
                record.max_income,
                record.rate,
            ));
        }

        let mut book = ScheduleBook::statutory();
        for (tax_type, mut brackets) in groups {
            brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            debug!(%tax_type, bands = brackets.len(), "installing schedule");
            book.insert(tax_type, brackets)
                .map_err(|source| ScheduleLoaderError::InvalidSchedule { tax_type, source })?;
        }

        Ok(book)
    }

    /// Parse and build in one go.
    pub fn load<R: Read>(reader: R) -> Result<ScheduleBook, ScheduleLoaderError> {
        let records = Self::parse(reader)?;
        Self::build(&records)
    }

    pub fn load_path(path: &Path) -> Result<ScheduleBook, ScheduleLoaderError> {
        let file = File::open(path)?;
        let book = Self::load(file)?;
        info!(path = %path.display(), "loaded tax schedules");
        Ok(book)
    }
}

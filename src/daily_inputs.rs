// Daily rainfall input read from a CSV table
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{BalanceError, Result};

pub const DEFAULT_RAIN_COLUMN: &str = "rain_mm";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RainfallSeries {
    pub rainfall: Vec<f64>, // Daily rainfall in row order [mm/day]
}

impl RainfallSeries {
    pub fn new(rainfall: Vec<f64>) -> Result<Self> {
        validate_rainfall(&rainfall)?;
        Ok(RainfallSeries { rainfall })
    }

    // Load the named column from a CSV file with a header row
    pub fn from_csv_path(path: &Path, column: &str) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BalanceError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => BalanceError::Io(e),
        })?;
        let series = Self::from_reader(BufReader::new(file), column)?;
        debug!(
            path = %path.display(),
            days = series.len(),
            "loaded rainfall series"
        );
        Ok(series)
    }

    pub fn from_reader<R: Read>(reader: R, column: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?;
        let idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(column.trim()))
            .ok_or_else(|| BalanceError::MissingColumn(column.to_string()))?;

        let mut rainfall = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let cell = record.get(idx).unwrap_or("");
            let value: f64 = cell.parse().map_err(|_| BalanceError::InvalidRainfall {
                row: row_idx + 1,
                value: cell.to_string(),
            })?;
            rainfall.push(value);
        }

        if rainfall.is_empty() {
            warn!(column = column, "rainfall table has no data rows");
        }
        Self::new(rainfall)
    }

    pub fn len(&self) -> usize {
        self.rainfall.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rainfall.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.rainfall
    }
}

// Every day must carry a finite, non-negative amount
pub(crate) fn validate_rainfall(rainfall: &[f64]) -> Result<()> {
    match rainfall
        .iter()
        .enumerate()
        .find(|(_, rain)| !rain.is_finite() || **rain < 0.0)
    {
        Some((i, &value)) => Err(BalanceError::RainfallOutOfDomain { day: i + 1, value }),
        None => Ok(()),
    }
}

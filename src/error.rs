// Error types for loading inputs, configuring soils and running the balance
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BalanceError>;

#[derive(Error, Debug)]
pub enum BalanceError {
    // Soil tag is not one of the configured profiles
    #[error("invalid soil type '{0}': choose 'deep' or 'shallow'")]
    InvalidSoilType(String),

    // Soil or runoff parameters outside their physical range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("rainfall file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("column '{0}' not found in rainfall data")]
    MissingColumn(String),

    // Cell that does not parse as a number, row is 1-based after the header
    #[error("invalid rainfall value '{value}' at row {row}")]
    InvalidRainfall { row: usize, value: String },

    // Rainfall outside the non-negative domain, day is 1-based (0 for a bare lookup)
    #[error("rainfall must be a finite, non-negative amount, got {value} on day {day}")]
    RainfallOutOfDomain { day: usize, value: f64 },

    // Carried-in storage outside [0, field capacity]
    #[error("soil moisture must lie in [0, {capacity}] mm, got {value}")]
    SoilMoistureOutOfRange { value: f64, capacity: f64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

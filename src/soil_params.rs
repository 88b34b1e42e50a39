use std::fmt;
use std::str::FromStr;

use crate::error::{BalanceError, Result};

// Soil profiles known to the bucket model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilType {
    Deep,
    Shallow,
}

impl SoilType {
    pub const ALL: [SoilType; 2] = [SoilType::Deep, SoilType::Shallow];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Deep => "deep",
            SoilType::Shallow => "shallow",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = BalanceError;

    // Tags are trimmed and matched case-insensitively, anything else is rejected
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deep" => Ok(SoilType::Deep),
            "shallow" => Ok(SoilType::Shallow),
            _ => Err(BalanceError::InvalidSoilType(s.trim().to_string())),
        }
    }
}

// Bucket parameters for a single soil profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilParams {
    pub(crate) field_capacity: f64, // Maximum storage [mm]
    pub(crate) gw_fraction: f64,    // Share of post-uptake moisture lost to groundwater [-]
}

impl SoilParams {
    pub fn new(field_capacity: f64, gw_fraction: f64) -> Result<Self> {
        if !field_capacity.is_finite() || field_capacity <= 0.0 {
            return Err(BalanceError::InvalidConfig(format!(
                "field capacity must be a positive number of mm, got {}",
                field_capacity
            )));
        }
        if !(0.0..=1.0).contains(&gw_fraction) {
            return Err(BalanceError::InvalidConfig(format!(
                "groundwater fraction must lie in [0, 1], got {}",
                gw_fraction
            )));
        }
        Ok(SoilParams {
            field_capacity,
            gw_fraction,
        })
    }

    pub fn field_capacity(&self) -> f64 {
        self.field_capacity
    }

    pub fn gw_fraction(&self) -> f64 {
        self.gw_fraction
    }

    // Split storage into (overflow above capacity, clamped storage)
    pub fn clamp_to_capacity(&self, sm: f64) -> (f64, f64) {
        let excess = (sm - self.field_capacity).max(0.0);
        (excess, sm.min(self.field_capacity))
    }

    // Percolation to groundwater from the moisture left after uptake
    pub fn percolate(&self, sm: f64) -> (f64, f64) {
        let percolation = self.gw_fraction * sm;
        (sm - percolation, percolation)
    }
}

// One parameter set per soil type
#[derive(Debug, Clone, PartialEq)]
pub struct SoilTable {
    pub deep: SoilParams,
    pub shallow: SoilParams,
}

impl SoilTable {
    pub fn reference() -> Self {
        SoilTable {
            deep: SoilParams {
                field_capacity: 100.0,
                gw_fraction: 0.2,
            },
            shallow: SoilParams {
                field_capacity: 42.0,
                gw_fraction: 0.4,
            },
        }
    }

    pub fn get(&self, soil: SoilType) -> &SoilParams {
        match soil {
            SoilType::Deep => &self.deep,
            SoilType::Shallow => &self.shallow,
        }
    }

    pub fn lookup(&self, tag: &str) -> Result<&SoilParams> {
        Ok(self.get(tag.parse()?))
    }
}

impl Default for SoilTable {
    fn default() -> Self {
        Self::reference()
    }
}

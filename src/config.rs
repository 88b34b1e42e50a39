// Model configuration loaded from a TOML file, every key falling back to the reference tables
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::crop_uptake::CROP_UPTAKE;
use crate::error::{BalanceError, Result};
use crate::runoff::{RunoffBand, RunoffTable};
use crate::soil_params::{SoilParams, SoilTable};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    crop_uptake: Option<f64>,
    #[serde(default)]
    soils: RawSoils,
    runoff: Option<Vec<RawBand>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSoils {
    deep: Option<RawSoil>,
    shallow: Option<RawSoil>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSoil {
    field_capacity: Option<f64>, // [mm]
    gw_fraction: Option<f64>,    // [-]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBand {
    low: f64,
    high: Option<f64>, // absent for the unbounded top band
    coefficient: f64,
}

impl RawSoil {
    fn resolve(self, fallback: SoilParams) -> Result<SoilParams> {
        SoilParams::new(
            self.field_capacity.unwrap_or(fallback.field_capacity),
            self.gw_fraction.unwrap_or(fallback.gw_fraction),
        )
    }
}

// Validated model configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceConfig {
    pub soils: SoilTable,
    pub runoff: RunoffTable,
    pub crop_uptake: f64, // Daily crop demand [mm/day]
}

impl Default for BalanceConfig {
    fn default() -> Self {
        BalanceConfig {
            soils: SoilTable::reference(),
            runoff: RunoffTable::reference(),
            crop_uptake: CROP_UPTAKE,
        }
    }
}

impl BalanceConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(toml_str)?;
        let reference = SoilTable::reference();

        let soils = SoilTable {
            deep: raw
                .soils
                .deep
                .unwrap_or_default()
                .resolve(reference.deep)?,
            shallow: raw
                .soils
                .shallow
                .unwrap_or_default()
                .resolve(reference.shallow)?,
        };

        let runoff = match raw.runoff {
            Some(bands) => RunoffTable::new(
                bands
                    .into_iter()
                    .map(|b| RunoffBand::new(b.low, b.high.unwrap_or(f64::INFINITY), b.coefficient))
                    .collect(),
            )?,
            None => RunoffTable::reference(),
        };

        let crop_uptake = raw.crop_uptake.unwrap_or(CROP_UPTAKE);
        if !crop_uptake.is_finite() || crop_uptake < 0.0 {
            return Err(BalanceError::InvalidConfig(format!(
                "crop uptake must be a non-negative number of mm/day, got {}",
                crop_uptake
            )));
        }

        Ok(BalanceConfig {
            soils,
            runoff,
            crop_uptake,
        })
    }

    // A missing file is an error here, callers without a file use `default()`
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let toml_str = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BalanceError::InvalidConfig(format!(
                "config file {} not found",
                path.display()
            )),
            _ => BalanceError::Io(e),
        })?;
        let config = Self::from_toml_str(&toml_str)?;
        debug!(path = %path.display(), "loaded model configuration");
        Ok(config)
    }
}

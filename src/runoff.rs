// Module for looking up the rainfall-dependent runoff coefficient and daily runoff.
//
// Runoff is a fixed share of the day's rainfall, where the share depends on which
// rainfall band the amount falls in. Bands are half-open `[low, high)` intervals
// covering `[0, inf)` without gaps, so every non-negative amount has exactly one
// coefficient. Units are in millimeters.
use crate::error::{BalanceError, Result};

// One rainfall band and its runoff coefficient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunoffBand {
    pub low: f64,         // Inclusive lower bound [mm]
    pub high: f64,        // Exclusive upper bound [mm], infinite for the top band
    pub coefficient: f64, // Runoff share [-]
}

impl RunoffBand {
    pub const fn new(low: f64, high: f64, coefficient: f64) -> Self {
        RunoffBand {
            low,
            high,
            coefficient,
        }
    }

    fn contains(&self, rain: f64) -> bool {
        self.low <= rain && rain < self.high
    }
}

const REFERENCE_BANDS: [RunoffBand; 5] = [
    RunoffBand::new(0.0, 25.0, 0.2),
    RunoffBand::new(25.0, 50.0, 0.3),
    RunoffBand::new(50.0, 75.0, 0.4),
    RunoffBand::new(75.0, 100.0, 0.5),
    RunoffBand::new(100.0, f64::INFINITY, 0.7),
];

// Ordered, gap-free set of runoff bands
#[derive(Debug, Clone, PartialEq)]
pub struct RunoffTable {
    bands: Vec<RunoffBand>,
}

impl RunoffTable {
    pub fn reference() -> Self {
        RunoffTable {
            bands: REFERENCE_BANDS.to_vec(),
        }
    }

    /**
    Builds a table from bands in increasing order.

    # Errors
    If the bands do not start at 0, leave a gap or overlap, are empty or reversed,
    end below infinity, or carry a coefficient outside `[0, 1]`.
    */
    pub fn new(bands: Vec<RunoffBand>) -> Result<Self> {
        let invalid = |msg: String| Err(BalanceError::InvalidConfig(msg));

        let Some(first) = bands.first() else {
            return invalid("runoff table has no bands".to_string());
        };
        if first.low != 0.0 {
            return invalid(format!("first runoff band must start at 0, got {}", first.low));
        }
        for (i, band) in bands.iter().enumerate() {
            if band.low.is_nan() || band.high.is_nan() || band.low >= band.high {
                return invalid(format!(
                    "runoff band {} has low {} not below high {}",
                    i + 1,
                    band.low,
                    band.high
                ));
            }
            if !(0.0..=1.0).contains(&band.coefficient) {
                return invalid(format!(
                    "runoff coefficient {} of band {} is outside [0, 1]",
                    band.coefficient,
                    i + 1
                ));
            }
            if let Some(next) = bands.get(i + 1) {
                if next.low != band.high {
                    return invalid(format!(
                        "runoff band {} starts at {} but band {} ends at {}",
                        i + 2,
                        next.low,
                        i + 1,
                        band.high
                    ));
                }
            } else if band.high != f64::INFINITY {
                return invalid(format!(
                    "last runoff band must be unbounded, ends at {}",
                    band.high
                ));
            }
        }
        Ok(RunoffTable { bands })
    }

    pub fn bands(&self) -> &[RunoffBand] {
        &self.bands
    }

    /**
    Returns the runoff coefficient of the band containing `rain`.

    Band bounds are lower-inclusive, so a boundary amount such as 25 mm takes the
    coefficient of the band above it.

    # Errors
    `RainfallOutOfDomain` for negative or NaN amounts.
    */
    pub fn coefficient(&self, rain: f64) -> Result<f64> {
        if rain.is_nan() || rain < 0.0 {
            return Err(BalanceError::RainfallOutOfDomain { day: 0, value: rain });
        }
        // Bands are sorted and contiguous, so the first band whose upper bound lies
        // above `rain` is the one containing it
        let idx = self.bands.partition_point(|band| band.high <= rain);
        match self.bands.get(idx) {
            Some(band) if band.contains(rain) => Ok(band.coefficient),
            // +inf sits past every band, it belongs to the unbounded top one
            _ => Ok(self.bands[self.bands.len() - 1].coefficient),
        }
    }

    /**
    Calculates the daily runoff depth.

    # Arguments
    - `rain` - Rainfall in mm for the day.

    # Returns
    The runoff depth in mm.
    */
    pub fn runoff(&self, rain: f64) -> Result<f64> {
        Ok(self.coefficient(rain)? * rain)
    }
}

impl Default for RunoffTable {
    fn default() -> Self {
        Self::reference()
    }
}

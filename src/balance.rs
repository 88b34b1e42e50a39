use tracing::{debug, trace};

use crate::config::BalanceConfig;
use crate::crop_uptake::{CROP_UPTAKE, crop_uptake};
use crate::daily_inputs::validate_rainfall;
use crate::error::{BalanceError, Result};
use crate::outputs::{DayRecord, Summary};
use crate::runoff::RunoffTable;
use crate::soil_params::{SoilParams, SoilTable, SoilType};

// Water fluxes for one day [mm]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayFluxes {
    pub rainfall: f64,
    pub runoff: f64,
    pub excess: f64, // Overflow above field capacity
    pub crop_uptake: f64,
    pub percolation: f64,
    pub soil_moisture: f64, // Storage carried to the next day
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceOutput {
    pub records: Vec<DayRecord>,
    pub summary: Summary,
}

// Single-bucket daily soil water balance for one soil profile
#[derive(Debug, Clone)]
pub struct WaterBalance {
    soil: SoilParams,
    runoff: RunoffTable,
    max_uptake: f64, // Daily crop demand [mm/day]
}

impl WaterBalance {
    pub fn new(soil: SoilParams, runoff: RunoffTable, max_uptake: f64) -> Self {
        WaterBalance {
            soil,
            runoff,
            max_uptake,
        }
    }

    // Reference runoff table and crop demand
    pub fn with_soil(soil: SoilParams) -> Self {
        Self::new(soil, RunoffTable::reference(), CROP_UPTAKE)
    }

    pub fn from_config(config: &BalanceConfig, soil: SoilType) -> Self {
        Self::new(*config.soils.get(soil), config.runoff.clone(), config.crop_uptake)
    }

    pub fn soil(&self) -> &SoilParams {
        &self.soil
    }

    /**
    Advance storage `sm` by one day of `rain`.

    Runoff leaves first, the rest infiltrates. Storage above field capacity
    spills as excess, the crop takes its share of what is held, and a fixed
    fraction of the remainder percolates to groundwater. What is left after
    percolation is carried into the next day.

    # Errors
    - `RainfallOutOfDomain` if `rain` is negative or not finite.
    - `SoilMoistureOutOfRange` if `sm` lies outside `[0, field capacity]`.
    */
    pub fn step(&self, sm: f64, rain: f64) -> Result<DayFluxes> {
        if !rain.is_finite() || rain < 0.0 {
            return Err(BalanceError::RainfallOutOfDomain { day: 0, value: rain });
        }
        if !(0.0..=self.soil.field_capacity).contains(&sm) {
            return Err(BalanceError::SoilMoistureOutOfRange {
                value: sm,
                capacity: self.soil.field_capacity,
            });
        }
        let runoff = self.runoff.runoff(rain)?;
        let infiltration = rain - runoff;

        let (excess, sm) = self.soil.clamp_to_capacity(sm + infiltration);
        let (sm, uptake) = crop_uptake(sm, self.max_uptake);
        let (sm, percolation) = self.soil.percolate(sm);

        Ok(DayFluxes {
            rainfall: rain,
            runoff,
            excess,
            crop_uptake: uptake,
            percolation,
            soil_moisture: sm,
        })
    }

    /**
    Run the balance over a daily rainfall series, starting from dry soil.

    The series is checked up front, so a negative or non-finite day fails the
    run before any record is produced.
    */
    pub fn run(&self, rainfall: &[f64]) -> Result<BalanceOutput> {
        validate_rainfall(rainfall)?;
        debug!(
            days = rainfall.len(),
            field_capacity = self.soil.field_capacity,
            gw_fraction = self.soil.gw_fraction,
            "starting water balance"
        );

        let mut sm = 0.0;
        let mut records = Vec::with_capacity(rainfall.len());
        for (i, &rain) in rainfall.iter().enumerate() {
            let day = i + 1;
            let fluxes = self.step(sm, rain)?;
            sm = fluxes.soil_moisture;
            trace!(day = day, rain = rain, sm = sm, "day complete");

            records.push(DayRecord {
                day,
                rainfall: fluxes.rainfall,
                runoff_excess: fluxes.runoff + fluxes.excess,
                crop_uptake: fluxes.crop_uptake,
                soil_moisture: fluxes.soil_moisture,
                percolation: fluxes.percolation,
            });
        }

        let summary = Summary::from_records(&records);
        debug!(
            final_soil_moisture = summary.final_soil_moisture,
            "water balance complete"
        );
        Ok(BalanceOutput { records, summary })
    }
}

/**
Run the reference model for a soil tag such as `"deep"`.

An unknown tag fails before any simulation work is done.
*/
pub fn simulate(soil_type: &str, rainfall: &[f64]) -> Result<BalanceOutput> {
    let soil = *SoilTable::reference().lookup(soil_type)?;
    WaterBalance::with_soil(soil).run(rainfall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const TOL: f64 = 1e-9;

    fn deep() -> WaterBalance {
        WaterBalance::with_soil(*SoilTable::reference().get(SoilType::Deep))
    }

    fn shallow() -> WaterBalance {
        WaterBalance::with_soil(*SoilTable::reference().get(SoilType::Shallow))
    }

    #[test]
    fn single_day_on_deep_soil() {
        let out = simulate("deep", &[10.0]).unwrap();
        assert_eq!(out.records.len(), 1);
        let r = out.records[0];
        assert_eq!(r.day, 1);
        assert_relative_eq!(r.rainfall, 10.0, epsilon = TOL);
        assert_relative_eq!(r.runoff_excess, 2.0, epsilon = TOL);
        assert_relative_eq!(r.crop_uptake, 4.0, epsilon = TOL);
        assert_relative_eq!(r.soil_moisture, 3.2, epsilon = TOL);
        assert_relative_eq!(r.percolation, 0.8, epsilon = TOL);
        assert_relative_eq!(out.summary.final_soil_moisture, 3.2, epsilon = TOL);
    }

    #[test]
    fn storage_carries_over() {
        let out = simulate("deep", &[10.0, 0.0]).unwrap();
        // day 2: sm = 3.2, uptake 3.2, nothing left to percolate
        let r = out.records[1];
        assert_relative_eq!(r.crop_uptake, 3.2, epsilon = TOL);
        assert_relative_eq!(r.soil_moisture, 0.0, epsilon = TOL);
        assert_relative_eq!(r.percolation, 0.0, epsilon = TOL);
        assert_eq!(r.day, 2);
    }

    #[test]
    fn overflow_joins_runoff() {
        // 120 mm on shallow soil: runoff 84, infiltration 36, fits under 42
        // then 200 mm: runoff 140, infiltration 60 on top of the carry-over
        let bal = shallow();
        let day1 = bal.step(0.0, 120.0).unwrap();
        assert_relative_eq!(day1.runoff, 84.0, epsilon = TOL);
        assert_eq!(day1.excess, 0.0);
        // (36 - 4) * 0.6
        assert_relative_eq!(day1.soil_moisture, 19.2, epsilon = TOL);

        let day2 = bal.step(day1.soil_moisture, 200.0).unwrap();
        assert_relative_eq!(day2.excess, 19.2 + 60.0 - 42.0, epsilon = TOL);
        assert_relative_eq!(day2.crop_uptake, 4.0, epsilon = TOL);
        assert_relative_eq!(day2.percolation, 0.4 * 38.0, epsilon = TOL);
        assert_relative_eq!(day2.soil_moisture, 0.6 * 38.0, epsilon = TOL);
    }

    #[test]
    fn empty_series() {
        let out = simulate("shallow", &[]).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.summary, Summary::default());
        assert_eq!(out.summary.final_soil_moisture, 0.0);
    }

    #[test]
    fn invalid_soil_type() {
        let err = simulate("medium", &[10.0]).unwrap_err();
        assert!(matches!(err, BalanceError::InvalidSoilType(_)));
    }

    #[test]
    fn soil_tag_is_trimmed_and_case_insensitive() {
        assert_eq!(
            simulate(" DEEP ", &[10.0, 30.0]).unwrap(),
            simulate("deep", &[10.0, 30.0]).unwrap()
        );
    }

    #[test]
    fn negative_rain_fails_without_records() {
        let err = deep().run(&[5.0, 12.0, -1.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            BalanceError::RainfallOutOfDomain { day: 3, value } if value == -1.0
        ));
        assert!(deep().run(&[f64::NAN]).is_err());
    }

    #[test]
    fn step_rejects_negative_rain() {
        assert!(deep().step(10.0, -2.0).is_err());
    }

    #[test]
    fn step_rejects_non_finite_rain() {
        for rain in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = deep().step(0.0, rain).unwrap_err();
            assert!(matches!(err, BalanceError::RainfallOutOfDomain { day: 0, .. }));
        }
    }

    #[test]
    fn step_rejects_storage_outside_capacity() {
        let err = deep().step(-10.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            BalanceError::SoilMoistureOutOfRange { value, capacity }
                if value == -10.0 && capacity == 100.0
        ));
        assert!(shallow().step(42.5, 5.0).is_err());
        assert!(shallow().step(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn step_accepts_storage_bounds() {
        let empty = shallow().step(0.0, 0.0).unwrap();
        assert_eq!(empty.crop_uptake, 0.0);
        let full = shallow().step(42.0, 0.0).unwrap();
        assert_relative_eq!(full.crop_uptake, 4.0, epsilon = TOL);
        assert_relative_eq!(full.soil_moisture, 0.6 * 38.0, epsilon = TOL);
    }

    #[test]
    fn custom_crop_demand() {
        let bal = WaterBalance::new(
            SoilParams::new(100.0, 0.0).unwrap(),
            RunoffTable::reference(),
            10.0,
        );
        let f = bal.step(0.0, 20.0).unwrap();
        // 16 mm infiltrates, 10 taken by the crop, nothing percolates
        assert_relative_eq!(f.crop_uptake, 10.0, epsilon = TOL);
        assert_relative_eq!(f.soil_moisture, 6.0, epsilon = TOL);
        assert_eq!(f.percolation, 0.0);
    }

    #[test]
    fn from_config_uses_configured_soil() {
        let config = BalanceConfig::default();
        let bal = WaterBalance::from_config(&config, SoilType::Shallow);
        assert_relative_eq!(bal.soil().field_capacity(), 42.0);
    }

    fn rain_series() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(
            prop_oneof![Just(0.0), Just(25.0), Just(100.0), 0.0f64..250.0],
            0..120,
        )
    }

    proptest! {
        #[test]
        fn storage_stays_within_capacity(rain in rain_series(), deep_soil in any::<bool>()) {
            let bal = if deep_soil { deep() } else { shallow() };
            let cap = bal.soil().field_capacity();
            let mut sm = 0.0;
            for &r in &rain {
                // storage right after the clamp is what uptake and percolation drew from
                let f = bal.step(sm, r).unwrap();
                let clamped = f.soil_moisture + f.crop_uptake + f.percolation;
                prop_assert!(clamped >= 0.0);
                prop_assert!(clamped <= cap + TOL);
                prop_assert!(f.soil_moisture >= 0.0 && f.soil_moisture <= cap);
                sm = f.soil_moisture;
            }
        }

        #[test]
        fn daily_mass_balance(rain in rain_series(), deep_soil in any::<bool>()) {
            let soil = if deep_soil { "deep" } else { "shallow" };
            let out = simulate(soil, &rain).unwrap();
            let mut prev = 0.0;
            for r in &out.records {
                let outflow = r.runoff_excess + r.crop_uptake + r.percolation;
                let storage_change = r.soil_moisture - prev;
                prop_assert!((r.rainfall - outflow - storage_change).abs() < 1e-7);
                prev = r.soil_moisture;
            }
        }

        #[test]
        fn summary_equals_column_sums(rain in rain_series()) {
            let out = simulate("deep", &rain).unwrap();
            let sum = |f: fn(&DayRecord) -> f64| out.records.iter().map(f).fold(0.0, |a, v| a + v);
            prop_assert_eq!(out.summary.total_rainfall, sum(|r| r.rainfall));
            prop_assert_eq!(out.summary.total_runoff_excess, sum(|r| r.runoff_excess));
            prop_assert_eq!(out.summary.total_crop_uptake, sum(|r| r.crop_uptake));
            prop_assert_eq!(out.summary.total_percolation, sum(|r| r.percolation));
            let last = out.records.last().map(|r| r.soil_moisture).unwrap_or(0.0);
            prop_assert_eq!(out.summary.final_soil_moisture, last);
            prop_assert_eq!(out.records.len(), rain.len());
        }

        #[test]
        fn days_are_sequential(rain in rain_series()) {
            let out = simulate("shallow", &rain).unwrap();
            for (i, r) in out.records.iter().enumerate() {
                prop_assert_eq!(r.day, i + 1);
            }
        }
    }
}

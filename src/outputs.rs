// Per-day records, run totals and the CSV writer.
//
// A `DayRecord` is one row of the output table. `Summary` holds the column totals
// over the whole run plus the moisture left in the soil at the end.
use std::fmt;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::soil_params::SoilType;

// One simulated day, serialized with the output table headers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayRecord {
    #[serde(rename = "Day")]
    pub day: usize, // 1-based day index
    #[serde(rename = "Rainfall (mm)")]
    pub rainfall: f64,
    #[serde(rename = "Runoff + Excess (mm)")]
    pub runoff_excess: f64, // Runoff plus overflow above field capacity
    #[serde(rename = "Crop Water Uptake (mm)")]
    pub crop_uptake: f64,
    #[serde(rename = "Soil Moisture (mm)")]
    pub soil_moisture: f64, // Carried over to the next day
    #[serde(rename = "Percolation to Groundwater (mm)")]
    pub percolation: f64,
}

// Totals over a run [mm]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub total_rainfall: f64,
    pub total_runoff_excess: f64,
    pub total_crop_uptake: f64,
    pub total_percolation: f64,
    pub final_soil_moisture: f64,
}

impl Summary {
    /**
    Column sums of `records`, added in day order.

    The final moisture is the last day's carry-over, 0 for an empty run.
    */
    pub fn from_records(records: &[DayRecord]) -> Self {
        let column = |f: fn(&DayRecord) -> f64| records.iter().map(f).fold(0.0, |acc, v| acc + v);
        Summary {
            total_rainfall: column(|r| r.rainfall),
            total_runoff_excess: column(|r| r.runoff_excess),
            total_crop_uptake: column(|r| r.crop_uptake),
            total_percolation: column(|r| r.percolation),
            final_soil_moisture: records.last().map(|r| r.soil_moisture).unwrap_or(0.0),
        }
    }

    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Total Rainfall", self.total_rainfall),
            ("Total Runoff + Excess", self.total_runoff_excess),
            ("Total Crop Uptake", self.total_crop_uptake),
            ("Total Groundwater Percolation", self.total_percolation),
            ("Final Soil Moisture", self.final_soil_moisture),
        ]
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.entries() {
            writeln!(f, "{}: {:.2} mm", label, value)?;
        }
        Ok(())
    }
}

pub fn output_file_name(soil: SoilType) -> String {
    format!("soil_water_balance_{}.csv", soil)
}

// Header row plus one row per day, no index column
pub fn write_records_to<W: Write>(writer: W, records: &[DayRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        // serde only emits headers alongside the first row
        wtr.write_record(DAY_RECORD_HEADERS)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_records(path: &Path, records: &[DayRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_records_to(std::io::BufWriter::new(file), records)
}

pub const DAY_RECORD_HEADERS: [&str; 6] = [
    "Day",
    "Rainfall (mm)",
    "Runoff + Excess (mm)",
    "Crop Water Uptake (mm)",
    "Soil Moisture (mm)",
    "Percolation to Groundwater (mm)",
];

pub mod balance;
pub mod config;
pub mod crop_uptake;
pub mod daily_inputs;
pub mod error;
pub mod outputs;
pub mod runoff;
pub mod soil_params;

pub use balance::{BalanceOutput, DayFluxes, WaterBalance, simulate};
pub use config::BalanceConfig;
pub use daily_inputs::RainfallSeries;
pub use error::{BalanceError, Result};
pub use outputs::{DayRecord, Summary};
pub use soil_params::{SoilParams, SoilTable, SoilType};

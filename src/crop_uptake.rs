// Default daily crop water demand [mm/day]
pub const CROP_UPTAKE: f64 = 4.0;

// Crop water uptake, capped at the daily demand and at what the soil holds.
// Returns (moisture left [mm], uptake [mm])
pub fn crop_uptake(sm: f64, max_uptake: f64) -> (f64, f64) {
    let uptake = max_uptake.min(sm);
    (sm - uptake, uptake)
}

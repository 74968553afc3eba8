//! Gain/power scaler
//!
//! Rescales a dB value calibrated for a reference antenna area to another
//! area, assuming gain and radiated power grow linearly with aperture:
//!
//! ```text
//! scaled_db = reference_db + 10*log10(new_area / reference_area)
//! ```

use crate::error::{LinkError, LinkResult};

/// Scale a reference gain or power (dB) from `reference_area_m2` to `new_area_m2`.
pub fn scale(reference_db: f64, reference_area_m2: f64, new_area_m2: f64) -> LinkResult<f64> {
    check_area(reference_area_m2)?;
    check_area(new_area_m2)?;
    Ok(reference_db + area_ratio_db(reference_area_m2, new_area_m2))
}

/// Area ratio `new / reference` expressed in dB. Callers validate both areas.
fn area_ratio_db(reference_area_m2: f64, new_area_m2: f64) -> f64 {
    10.0 * (new_area_m2 / reference_area_m2).log10()
}

fn check_area(area_m2: f64) -> LinkResult<()> {
    if area_m2 > 0.0 && area_m2.is_finite() {
        Ok(())
    } else {
        Err(LinkError::InvalidArea { area_m2 })
    }
}

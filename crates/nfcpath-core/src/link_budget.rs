//! Link Budget Calculator - NFC antenna placement
//!
//! Estimates free-space path loss and received power for an antenna drawn as
//! a normalized box on the phone's PCB. The antenna is treated as an
//! isotropic radiator at normal incidence to a receiver line that runs along
//! the phone's width, `receiver_offset_m` from its top edge.
//!
//! ```text
//! box ─► geometry ─► area ─┬─► tx gain  ─┐
//!                          └─► tx power  │
//!            center_y ─► distance ─► Friis path loss ─► received power
//!                         rx gain (once) ┘
//! ```
//!
//! Path loss uses the Friis transmission equation with a `4π` divisor:
//!
//! ```text
//! PL = 20*log10(d) + 20*log10(f) - 20*log10(c / 4π) - Gt - Gr
//! Pr = Pt - PL
//! ```
//!
//! ## Example
//!
//! ```rust
//! use nfcpath_core::config::{DeviceGeometryConstants, LinkBudgetReferences};
//! use nfcpath_core::link_budget::LinkBudgetCalculator;
//! use nfcpath_core::types::NormalizedBox;
//!
//! let calc = LinkBudgetCalculator::new(
//!     LinkBudgetReferences::default(),
//!     DeviceGeometryConstants::default(),
//! )
//! .unwrap();
//!
//! let result = calc.compute(&NormalizedBox::new(0.3, 0.0, 0.7, 0.1)).unwrap();
//! assert!(result.path_loss_db.is_finite());
//! assert!(result.received_power_db.is_finite());
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::{DeviceGeometryConstants, GainModel, LinkBudgetReferences};
use crate::error::{LinkError, LinkResult};
use crate::geometry;
use crate::scaling::scale;
use crate::types::{NormalizedBox, PhysicalGeometry};

/// Speed of light (m/s).
pub const SPEED_OF_LIGHT_MPS: f64 = 2.998e8;

/// Link budget of one antenna placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkBudgetResult {
    /// Physical antenna extent
    pub geometry: PhysicalGeometry,
    /// Antenna area (m²)
    pub antenna_area_m2: f64,
    /// Transmit gain after scaling (dB)
    pub tx_gain_db: f64,
    /// Receive gain after scaling (dB)
    pub rx_gain_db: f64,
    /// Transmit power after scaling (dB)
    pub tx_power_db: f64,
    /// Distance from antenna center to the receiver line (m)
    pub distance_m: f64,
    /// Free-space path loss (dB)
    pub path_loss_db: f64,
    /// Received power (dB)
    pub received_power_db: f64,
}

/// Per-dataset link-budget calculator.
///
/// Holds the immutable configuration and the receive gain, which depends only
/// on the fixed receiver area and is therefore computed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBudgetCalculator {
    references: LinkBudgetReferences,
    constants: DeviceGeometryConstants,
    rx_gain_db: f64,
}

impl LinkBudgetCalculator {
    /// Build a calculator, scaling the receive gain for the configured receiver area.
    ///
    /// A carrier frequency that is not positive and finite yields
    /// [`LinkError::InvalidFrequency`]; bad reference or receiver areas yield
    /// [`LinkError::InvalidArea`].
    pub fn new(
        references: LinkBudgetReferences,
        constants: DeviceGeometryConstants,
    ) -> LinkResult<Self> {
        if !(references.frequency_hz.is_finite() && references.frequency_hz > 0.0) {
            return Err(LinkError::InvalidFrequency {
                frequency_hz: references.frequency_hz,
            });
        }

        let rx_gain_db = match references.gain_model {
            GainModel::AreaScaled => scale(
                references.reference_rx_gain_db,
                references.reference_area_m2,
                constants.effective_receiver_area_m2(),
            )?,
            GainModel::Reference => references.reference_rx_gain_db,
        };

        Ok(Self {
            references,
            constants,
            rx_gain_db,
        })
    }

    /// Receive gain shared by every record (dB).
    pub fn rx_gain_db(&self) -> f64 {
        self.rx_gain_db
    }

    /// Compute path loss and received power for one antenna box.
    pub fn compute(&self, bbox: &NormalizedBox) -> LinkResult<LinkBudgetResult> {
        let refs = &self.references;
        let geometry = geometry::resolve(bbox, &self.constants)?;
        let antenna_area_m2 = geometry.area_m2();

        let tx_gain_db = match refs.gain_model {
            GainModel::AreaScaled => scale(
                refs.reference_tx_gain_db,
                refs.reference_area_m2,
                antenna_area_m2,
            )?,
            GainModel::Reference => refs.reference_tx_gain_db,
        };

        let tx_power_db = scale(
            refs.reference_power_db,
            refs.reference_area_m2,
            antenna_area_m2 * refs.tx_power_aperture_efficiency,
        )?;

        let distance_m = (geometry.center_y_m - self.constants.receiver_offset_m).abs();
        let path_loss_db =
            friis_path_loss_db(distance_m, refs.frequency_hz, tx_gain_db, self.rx_gain_db)?;
        let received_power_db = tx_power_db - path_loss_db;

        Ok(LinkBudgetResult {
            geometry,
            antenna_area_m2,
            tx_gain_db,
            rx_gain_db: self.rx_gain_db,
            tx_power_db,
            distance_m,
            path_loss_db,
            received_power_db,
        })
    }
}

/// Compute the link budget of one box without reusing a calculator.
pub fn compute(
    bbox: &NormalizedBox,
    references: &LinkBudgetReferences,
    constants: &DeviceGeometryConstants,
) -> LinkResult<LinkBudgetResult> {
    LinkBudgetCalculator::new(*references, *constants)?.compute(bbox)
}

/// Friis free-space path loss in dB.
///
/// PL = 20*log10(d) + 20*log10(f) - 20*log10(c/(4*pi)) - Gt - Gr
///
/// A zero distance has no defined loss and yields [`LinkError::DegenerateDistance`].
pub fn friis_path_loss_db(
    distance_m: f64,
    freq_hz: f64,
    tx_gain_db: f64,
    rx_gain_db: f64,
) -> LinkResult<f64> {
    if distance_m == 0.0 {
        return Err(LinkError::DegenerateDistance);
    }
    Ok(20.0 * distance_m.log10() + 20.0 * freq_hz.log10()
        - 20.0 * (SPEED_OF_LIGHT_MPS / (4.0 * PI)).log10()
        - tx_gain_db
        - rx_gain_db)
}

//! # NFC Link-Budget Core
//!
//! Estimates free-space path loss and received power for an NFC antenna
//! mounted inside a mobile phone, as a function of where the antenna sits on
//! the PCB and how large it is. Used to compare candidate placements across a
//! population of phone models.
//!
//! ## Pipeline
//!
//! ```text
//! dataset ─► placements ─► geometry::resolve ─► scaling::scale ─► link_budget ─► aggregate ─► report
//!                          (normalized → m)     (area ratio, dB)   (Friis)       (min/max/mean)
//! ```
//!
//! Everything between loading and writing the dataset is pure: configuration
//! is passed explicitly and records are independent, so they are processed
//! on a rayon pool without shared mutable state.
//!
//! ## Example
//!
//! ```rust
//! use nfcpath_core::prelude::*;
//!
//! let config = NfcPathConfig::default();
//! let records = vec![
//!     AntennaPlacement::new("Phone A", NormalizedBox::new(0.3, 0.0, 0.7, 0.1)),
//!     AntennaPlacement::new("Phone B", NormalizedBox::new(0.2, 0.6, 0.8, 0.8)),
//! ];
//!
//! let run = aggregate::run(
//!     records,
//!     &config.references,
//!     &config.device,
//!     ExecutionMode::from(&config.processing),
//! );
//!
//! let summary = run.summary.expect("both records are valid");
//! assert!(summary.avg_path_loss().is_finite());
//! ```

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod link_budget;
pub mod observe;
pub mod report;
pub mod scaling;
pub mod types;

pub use aggregate::{DatasetRun, DatasetSummary, ExecutionMode, Stats};
pub use config::{DeviceGeometryConstants, GainModel, LinkBudgetReferences, NfcPathConfig};
pub use dataset::Dataset;
pub use error::{DatasetError, LinkError, RecordError};
pub use link_budget::{LinkBudgetCalculator, LinkBudgetResult};
pub use types::{AntennaPlacement, NormalizedBox, PhysicalGeometry};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregate::{self, DatasetRun, DatasetSummary, ExecutionMode, Stats};
    pub use crate::config::{
        DeviceGeometryConstants, GainModel, LinkBudgetReferences, NfcPathConfig,
    };
    pub use crate::dataset::Dataset;
    pub use crate::error::{DatasetError, LinkError, RecordError};
    pub use crate::link_budget::{LinkBudgetCalculator, LinkBudgetResult};
    pub use crate::report::SummaryReport;
    pub use crate::types::{AntennaPlacement, NormalizedBox};
}

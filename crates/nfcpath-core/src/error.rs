//! Error types
//!
//! Two tiers: [`LinkError`] and [`RecordError`] describe a single record that
//! could not be estimated and never abort a dataset run. [`DatasetError`] is a
//! fatal failure of the dataset boundary (unreadable or unparsable file).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for per-record link-budget operations
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors raised while estimating the link budget of one placement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    /// Malformed bounding box or non-positive physical extent
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// Area passed to gain/power scaling is not a positive finite number
    #[error("Invalid area: {area_m2} m² (must be positive and finite)")]
    InvalidArea { area_m2: f64 },

    /// Carrier frequency is not a positive finite number
    #[error("Invalid frequency: {frequency_hz} Hz (must be positive and finite)")]
    InvalidFrequency { frequency_hz: f64 },

    /// Antenna center lies exactly on the receiver line
    #[error("Degenerate distance: antenna center lies on the receiver line")]
    DegenerateDistance,

    /// Input record is missing required fields or has the wrong shape
    #[error("Invalid record: {reason}")]
    InvalidRecord { reason: String },
}

impl LinkError {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        LinkError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

/// A [`LinkError`] tagged with the record it belongs to
#[derive(Error, Debug, Clone, PartialEq)]
#[error("record {index}{}: {source}", label_suffix(.label))]
pub struct RecordError {
    /// Position of the record in the input dataset
    pub index: usize,
    /// Record label when it could be read
    pub label: Option<String>,
    /// Underlying failure
    #[source]
    pub source: LinkError,
}

fn label_suffix(label: &Option<String>) -> String {
    label
        .as_deref()
        .map(|l| format!(" ({l})"))
        .unwrap_or_default()
}

/// Fatal errors at the dataset boundary
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Dataset file could not be read or written
    #[error("Dataset I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Dataset content is not valid JSON (or could not be serialized)
    #[error("Dataset JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Top-level JSON value is not an array of records
    #[error("Dataset must be a JSON array of records, found {0}")]
    NotAnArray(&'static str),
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}

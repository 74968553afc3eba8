//! Core data types for antenna placements
//!
//! Field names on the wire follow the input dataset (`marketingName`,
//! `nfcPos`) and the annotated output (`path_loss`, `received_power`).
//! Fields a record carries beyond those are kept and written back untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{LinkError, LinkResult};

/// Antenna bounding box in normalized device coordinates.
///
/// `y` grows from the top edge of the device (0) toward the bottom (1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl NormalizedBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Check that every coordinate lies in `[0, 1]` and the box has positive extent.
    pub fn validate(&self) -> LinkResult<()> {
        let coords = [("x0", self.x0), ("y0", self.y0), ("x1", self.x1), ("y1", self.y1)];
        for (name, value) in coords {
            if !value.is_finite() {
                return Err(LinkError::geometry(format!("{name} is not finite ({value})")));
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(LinkError::geometry(format!(
                    "{name} = {value} lies outside [0, 1]"
                )));
            }
        }
        if self.x0 >= self.x1 {
            return Err(LinkError::geometry(format!(
                "x0 ({}) must be less than x1 ({})",
                self.x0, self.x1
            )));
        }
        if self.y0 >= self.y1 {
            return Err(LinkError::geometry(format!(
                "y0 ({}) must be less than y1 ({})",
                self.y0, self.y1
            )));
        }
        Ok(())
    }

    /// Normalized width (`x1 - x0`).
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Normalized height (`y1 - y0`).
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Physical antenna extent derived from a [`NormalizedBox`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalGeometry {
    /// Antenna width (m)
    pub width_m: f64,
    /// Antenna height (m)
    pub height_m: f64,
    /// Vertical center of the antenna, measured from the top of the device (m)
    pub center_y_m: f64,
}

impl PhysicalGeometry {
    /// Antenna area (m²).
    pub fn area_m2(&self) -> f64 {
        self.width_m * self.height_m
    }
}

/// One record of the placement dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntennaPlacement {
    /// Device model name
    #[serde(rename = "marketingName")]
    pub label: String,
    /// Antenna bounding box
    #[serde(rename = "nfcPos")]
    pub bbox: NormalizedBox,
    /// Free-space path loss (dB), set once the record has been estimated
    #[serde(
        rename = "path_loss",
        default,
        deserialize_with = "number_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub path_loss_db: Option<f64>,
    /// Received power (dB), set once the record has been estimated
    #[serde(
        rename = "received_power",
        default,
        deserialize_with = "number_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub received_power_db: Option<f64>,
    /// Any other fields of the input record
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AntennaPlacement {
    pub fn new(label: impl Into<String>, bbox: NormalizedBox) -> Self {
        Self {
            label: label.into(),
            bbox,
            path_loss_db: None,
            received_power_db: None,
            extra: Map::new(),
        }
    }

    /// Read a placement from one JSON record of the input dataset.
    ///
    /// Missing or mistyped `marketingName` / `nfcPos` fields yield
    /// [`LinkError::InvalidRecord`]. The box itself is not validated here.
    pub fn from_value(value: &Value) -> LinkResult<Self> {
        let object = value.as_object().ok_or_else(|| LinkError::InvalidRecord {
            reason: format!("expected a JSON object, found {}", json_kind(value)),
        })?;
        for field in ["marketingName", "nfcPos"] {
            if !object.contains_key(field) {
                return Err(LinkError::InvalidRecord {
                    reason: format!("missing required field `{field}`"),
                });
            }
        }
        Self::deserialize(value).map_err(|e| LinkError::InvalidRecord {
            reason: e.to_string(),
        })
    }

    /// Whether both derived fields have been set.
    pub fn is_annotated(&self) -> bool {
        self.path_loss_db.is_some() && self.received_power_db.is_some()
    }
}

/// Reads a previously computed field; anything but a number counts as unset.
fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_box_validation() {
        assert!(NormalizedBox::new(0.3, 0.0, 0.7, 0.1).validate().is_ok());
        assert!(NormalizedBox::new(0.0, 0.0, 1.0, 1.0).validate().is_ok());

        let inverted = NormalizedBox::new(0.7, 0.0, 0.3, 0.1);
        assert!(matches!(
            inverted.validate(),
            Err(LinkError::InvalidGeometry { .. })
        ));

        let flat = NormalizedBox::new(0.3, 0.2, 0.7, 0.2);
        assert!(flat.validate().is_err());

        let outside = NormalizedBox::new(0.3, -0.1, 0.7, 0.1);
        assert!(outside.validate().is_err());

        let nan = NormalizedBox::new(f64::NAN, 0.0, 0.7, 0.1);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_placement_from_value_keeps_extra_fields() {
        let value = json!({
            "marketingName": "Galaxy S23",
            "nfcPos": { "x0": 0.3, "y0": 0.0, "x1": 0.7, "y1": 0.1 },
            "manufacturer": "Samsung"
        });
        let placement = AntennaPlacement::from_value(&value).unwrap();
        assert_eq!(placement.label, "Galaxy S23");
        assert_eq!(placement.bbox, NormalizedBox::new(0.3, 0.0, 0.7, 0.1));
        assert_eq!(placement.extra.get("manufacturer"), Some(&json!("Samsung")));
        assert!(!placement.is_annotated());

        let back = serde_json::to_value(&placement).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_placement_from_value_missing_fields() {
        let no_pos = json!({ "marketingName": "Pixel 8" });
        match AntennaPlacement::from_value(&no_pos) {
            Err(LinkError::InvalidRecord { reason }) => assert!(reason.contains("nfcPos")),
            other => panic!("expected InvalidRecord, got {other:?}"),
        }

        let bad_coord = json!({
            "marketingName": "Pixel 8",
            "nfcPos": { "x0": 0.1, "y0": 0.0, "x1": "wide" , "y1": 0.1 }
        });
        assert!(matches!(
            AntennaPlacement::from_value(&bad_coord),
            Err(LinkError::InvalidRecord { .. })
        ));

        assert!(matches!(
            AntennaPlacement::from_value(&json!([1, 2])),
            Err(LinkError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_stale_non_numeric_results_are_ignored() {
        let value = json!({
            "marketingName": "Pixel 8",
            "nfcPos": { "x0": 0.3, "y0": 0.0, "x1": 0.7, "y1": 0.1 },
            "path_loss": "n/a",
            "received_power": null
        });
        let placement = AntennaPlacement::from_value(&value).unwrap();
        assert_eq!(placement.path_loss_db, None);
        assert_eq!(placement.received_power_db, None);
        assert!(placement.extra.is_empty());

        let numeric = json!({
            "marketingName": "Pixel 8",
            "nfcPos": { "x0": 0.3, "y0": 0.0, "x1": 0.7, "y1": 0.1 },
            "path_loss": -29.5
        });
        let placement = AntennaPlacement::from_value(&numeric).unwrap();
        assert_eq!(placement.path_loss_db, Some(-29.5));
    }

    #[test]
    fn test_annotated_fields_serialize_under_output_names() {
        let mut placement = AntennaPlacement::new("Test", NormalizedBox::new(0.1, 0.1, 0.2, 0.2));
        placement.path_loss_db = Some(-29.5);
        placement.received_power_db = Some(-27.0);
        let value = serde_json::to_value(&placement).unwrap();
        assert_eq!(value["path_loss"], json!(-29.5));
        assert_eq!(value["received_power"], json!(-27.0));
        assert!(placement.is_annotated());
    }
}

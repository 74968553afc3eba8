//! Dataset boundary
//!
//! Reads the placement dataset (a JSON array of records) and writes the
//! annotated copy back. Each file is opened, read or written fully, and
//! released in one call before or after the computation phase.
//!
//! The raw JSON of every record is retained so that records which could not
//! be parsed are written back unchanged apart from an `"error"` field. A
//! failed record that is not a JSON object is nested under `"record"`.

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::aggregate::{DatasetRun, Stats};
use crate::error::{DatasetError, LinkError, RecordError};
use crate::types::{json_kind, AntennaPlacement};

/// Field added to output records that could not be estimated.
pub const ERROR_FIELD: &str = "error";

/// Field holding the original value of a failed record that is not an object.
pub const RECORD_FIELD: &str = "record";

/// Placement dataset as loaded from disk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<Value>,
}

impl Dataset {
    /// Load a dataset file.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        let dataset = Self::from_value(value)?;
        tracing::info!(path = %path.display(), records = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    /// Parse a dataset from a JSON string.
    pub fn parse(json: &str) -> Result<Self, DatasetError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Wrap an already-parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        match value {
            Value::Array(records) => Ok(Self { records }),
            other => Err(DatasetError::NotAnArray(json_kind(&other))),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Typed placements, one slot per record; unreadable records become `InvalidRecord`.
    pub fn placements(&self) -> Vec<Result<AntennaPlacement, RecordError>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, value)| {
                AntennaPlacement::from_value(value).map_err(|source| RecordError {
                    index,
                    label: value
                        .get("marketingName")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                    source,
                })
            })
            .collect()
    }

    /// Output records for a run over this dataset, in input order.
    ///
    /// Successful records carry `path_loss` and `received_power` and lose any
    /// [`ERROR_FIELD`] left by an earlier run. Failed ones keep their original
    /// fields plus [`ERROR_FIELD`].
    pub fn annotated_values(&self, run: &DatasetRun) -> Result<Vec<Value>, DatasetError> {
        run.records
            .iter()
            .enumerate()
            .map(|(index, record)| match record {
                Ok(placement) => {
                    let mut value = serde_json::to_value(placement)?;
                    if let Value::Object(object) = &mut value {
                        object.remove(ERROR_FIELD);
                    }
                    Ok(value)
                }
                Err(error) => {
                    let original = self.records.get(index).cloned().unwrap_or(Value::Null);
                    Ok(failed_value(original, &error.source))
                }
            })
            .collect()
    }

    /// Write the annotated dataset as pretty-printed JSON.
    pub fn write_annotated(&self, run: &DatasetRun, path: &Path) -> Result<(), DatasetError> {
        let values = self.annotated_values(run)?;
        let file = File::create(path).map_err(|e| DatasetError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &values)?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| DatasetError::io(path, e))?;
        tracing::info!(path = %path.display(), records = values.len(), "wrote annotated dataset");
        Ok(())
    }

    /// Statistics of a dataset that was annotated earlier.
    ///
    /// Path loss and received power are summarized independently over the
    /// records that carry each numeric field.
    pub fn summary_of_annotated(&self) -> AnnotatedSummary {
        let field = |name: &'static str| {
            Stats::from_values(
                self.records
                    .iter()
                    .filter_map(move |r| r.get(name).and_then(Value::as_f64)),
            )
        };
        AnnotatedSummary {
            path_loss: field("path_loss"),
            received_power: field("received_power"),
        }
    }
}

fn failed_value(original: Value, error: &LinkError) -> Value {
    let mut object = match original {
        Value::Object(mut object) => {
            object.remove("path_loss");
            object.remove("received_power");
            object
        }
        other => {
            let mut object = Map::new();
            object.insert(RECORD_FIELD.to_string(), other);
            object
        }
    };
    object.insert(ERROR_FIELD.to_string(), Value::String(error.to_string()));
    Value::Object(object)
}

/// Per-field statistics of a previously annotated dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedSummary {
    pub path_loss: Option<Stats>,
    pub received_power: Option<Stats>,
}

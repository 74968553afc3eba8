//! Dataset Aggregator
//!
//! Runs the link-budget calculator over every record of a dataset, annotates
//! successful records in place, and summarizes path loss and received power
//! across them.
//!
//! Records are independent, so they can be processed on a rayon pool. Indexed
//! parallel iterators collect in input order, so the output order never
//! depends on scheduling.
//!
//! A failing record is kept in its slot as a [`RecordError`] and excluded from
//! the [`DatasetSummary`]; it never aborts the run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DeviceGeometryConstants, LinkBudgetReferences, ProcessingConfig};
use crate::error::{LinkError, RecordError};
use crate::link_budget::LinkBudgetCalculator;
use crate::types::AntennaPlacement;

/// How records are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One record after another on the calling thread
    Sequential,
    /// Rayon pool; `threads == 0` uses the global pool
    Parallel { threads: usize },
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Parallel { threads: 0 }
    }
}

impl From<&ProcessingConfig> for ExecutionMode {
    fn from(config: &ProcessingConfig) -> Self {
        if config.parallel {
            ExecutionMode::Parallel {
                threads: config.threads,
            }
        } else {
            ExecutionMode::Sequential
        }
    }
}

/// Minimum, maximum and arithmetic mean of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl Stats {
    /// Statistics over `values`, or `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            min,
            max,
            mean: sum / count as f64,
            count,
        })
    }
}

/// Path-loss and received-power statistics over the annotated records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub path_loss: Stats,
    pub received_power: Stats,
}

impl DatasetSummary {
    /// Summarize every placement carrying both computed fields.
    ///
    /// Returns `None` ("no data") when no placement is annotated.
    pub fn from_placements<'a, I>(placements: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a AntennaPlacement>,
    {
        let (path_losses, received): (Vec<f64>, Vec<f64>) = placements
            .into_iter()
            .filter_map(|p| Some((p.path_loss_db?, p.received_power_db?)))
            .unzip();

        Some(Self {
            path_loss: Stats::from_values(path_losses)?,
            received_power: Stats::from_values(received)?,
        })
    }

    pub fn min_path_loss(&self) -> f64 {
        self.path_loss.min
    }

    pub fn max_path_loss(&self) -> f64 {
        self.path_loss.max
    }

    pub fn avg_path_loss(&self) -> f64 {
        self.path_loss.mean
    }

    pub fn min_received_power(&self) -> f64 {
        self.received_power.min
    }

    pub fn max_received_power(&self) -> f64 {
        self.received_power.max
    }

    pub fn avg_received_power(&self) -> f64 {
        self.received_power.mean
    }
}

/// Output of a dataset run, one slot per input record in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRun {
    pub records: Vec<Result<AntennaPlacement, RecordError>>,
    /// `None` when no record succeeded
    pub summary: Option<DatasetSummary>,
}

impl DatasetRun {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Successfully annotated placements with their input index.
    pub fn succeeded(&self) -> impl Iterator<Item = (usize, &AntennaPlacement)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().ok().map(|p| (i, p)))
    }

    /// Failed records.
    pub fn failures(&self) -> impl Iterator<Item = &RecordError> {
        self.records.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn success_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }
}

/// Annotate well-formed placements.
///
/// Builds the calculator once. If the configuration itself cannot produce a
/// receive gain, every record carries that error.
pub fn run(
    records: Vec<AntennaPlacement>,
    references: &LinkBudgetReferences,
    constants: &DeviceGeometryConstants,
    mode: ExecutionMode,
) -> DatasetRun {
    let inputs = records.into_iter().map(Ok).collect();
    match LinkBudgetCalculator::new(*references, *constants) {
        Ok(calc) => run_with(inputs, &calc, mode),
        Err(error) => {
            tracing::warn!(
                %error,
                "link budget configuration rejected, no record can be estimated"
            );
            fail_all(inputs, error)
        }
    }
}

/// Annotate a dataset whose records may already have failed to load.
///
/// Records that arrive as `Err` keep their error and are not computed.
pub fn run_with(
    inputs: Vec<Result<AntennaPlacement, RecordError>>,
    calc: &LinkBudgetCalculator,
    mode: ExecutionMode,
) -> DatasetRun {
    let total = inputs.len();
    let records = match mode {
        ExecutionMode::Sequential => process_sequential(inputs, calc),
        ExecutionMode::Parallel { threads: 0 } => process_parallel(inputs, calc),
        ExecutionMode::Parallel { threads } => {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("nfcpath-worker-{i}"))
                .build()
            {
                Ok(pool) => pool.install(|| process_parallel(inputs, calc)),
                Err(error) => {
                    tracing::warn!(
                        %error,
                        threads,
                        "failed to build worker pool, running sequentially"
                    );
                    process_sequential(inputs, calc)
                }
            }
        }
    };

    let summary = DatasetSummary::from_placements(records.iter().filter_map(|r| r.as_ref().ok()));
    let succeeded = records.iter().filter(|r| r.is_ok()).count();
    tracing::info!(
        total,
        succeeded,
        failed = total - succeeded,
        "dataset annotated"
    );

    DatasetRun { records, summary }
}

fn process_sequential(
    inputs: Vec<Result<AntennaPlacement, RecordError>>,
    calc: &LinkBudgetCalculator,
) -> Vec<Result<AntennaPlacement, RecordError>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| process_record(index, input, calc))
        .collect()
}

fn process_parallel(
    inputs: Vec<Result<AntennaPlacement, RecordError>>,
    calc: &LinkBudgetCalculator,
) -> Vec<Result<AntennaPlacement, RecordError>> {
    inputs
        .into_par_iter()
        .enumerate()
        .map(|(index, input)| process_record(index, input, calc))
        .collect()
}

fn process_record(
    index: usize,
    input: Result<AntennaPlacement, RecordError>,
    calc: &LinkBudgetCalculator,
) -> Result<AntennaPlacement, RecordError> {
    let mut placement = match input {
        Ok(placement) => placement,
        Err(error) => {
            tracing::warn!(index, %error, "skipping unreadable record");
            return Err(error);
        }
    };

    match calc.compute(&placement.bbox) {
        Ok(result) => {
            placement.path_loss_db = Some(result.path_loss_db);
            placement.received_power_db = Some(result.received_power_db);
            tracing::debug!(
                index,
                label = %placement.label,
                path_loss_db = result.path_loss_db,
                received_power_db = result.received_power_db,
                "estimated link budget"
            );
            Ok(placement)
        }
        Err(source) => {
            tracing::warn!(index, label = %placement.label, error = %source, "record failed");
            Err(RecordError {
                index,
                label: Some(placement.label),
                source,
            })
        }
    }
}

fn fail_all(inputs: Vec<Result<AntennaPlacement, RecordError>>, error: LinkError) -> DatasetRun {
    let records = inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| match input {
            Ok(placement) => Err(RecordError {
                index,
                label: Some(placement.label),
                source: error.clone(),
            }),
            Err(existing) => Err(existing),
        })
        .collect();
    DatasetRun {
        records,
        summary: None,
    }
}

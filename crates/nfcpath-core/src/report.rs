//! Run reports
//!
//! Text and JSON renderings of a dataset run: summary statistics, failure
//! counts, and the placements with the strongest received signal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregate::{DatasetRun, Stats};
use crate::dataset::AnnotatedSummary;

/// One placement in the received-power ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlacement {
    /// Position in the input dataset
    pub index: usize,
    pub label: String,
    pub path_loss_db: f64,
    pub received_power_db: f64,
}

/// The `n` successful placements with the highest received power.
///
/// Ties keep input order.
pub fn rank_by_received_power(run: &DatasetRun, n: usize) -> Vec<RankedPlacement> {
    let mut ranked: Vec<RankedPlacement> = run
        .succeeded()
        .filter_map(|(index, p)| {
            Some(RankedPlacement {
                index,
                label: p.label.clone(),
                path_loss_db: p.path_loss_db?,
                received_power_db: p.received_power_db?,
            })
        })
        .collect();
    // Stable sort, descending
    ranked.sort_by(|a, b| b.received_power_db.total_cmp(&a.received_power_db));
    ranked.truncate(n);
    ranked
}

/// Summary of a run, printable as text or serializable as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total_records: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub path_loss: Option<Stats>,
    pub received_power: Option<Stats>,
    pub top_placements: Vec<RankedPlacement>,
}

impl SummaryReport {
    /// Build a report for `run`, ranking up to `top` placements.
    pub fn from_run(run: &DatasetRun, top: usize) -> Self {
        let succeeded = run.success_count();
        Self {
            total_records: run.len(),
            succeeded,
            failed: run.len() - succeeded,
            path_loss: run.summary.map(|s| s.path_loss),
            received_power: run.summary.map(|s| s.received_power),
            top_placements: rank_by_received_power(run, top),
        }
    }

    /// Build a report for a dataset annotated by an earlier run.
    pub fn from_annotated(total_records: usize, summary: &AnnotatedSummary) -> Self {
        let succeeded = summary.path_loss.map_or(0, |s| s.count);
        Self {
            total_records,
            succeeded,
            failed: total_records.saturating_sub(succeeded),
            path_loss: summary.path_loss,
            received_power: summary.received_power,
            top_placements: Vec::new(),
        }
    }
}

fn write_stats(f: &mut fmt::Formatter<'_>, name: &str, stats: Option<&Stats>) -> fmt::Result {
    match stats {
        Some(s) => {
            writeln!(f, "Minimum {name}: {:.2} dB", s.min)?;
            writeln!(f, "Maximum {name}: {:.2} dB", s.max)?;
            writeln!(f, "Average {name}: {:.2} dB", s.mean)
        }
        None => writeln!(f, "No {} data available.", name.to_lowercase()),
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Records: {} ({} estimated, {} failed)",
            self.total_records, self.succeeded, self.failed
        )?;
        write_stats(f, "Path Loss", self.path_loss.as_ref())?;
        write_stats(f, "Received Power", self.received_power.as_ref())?;

        if !self.top_placements.is_empty() {
            writeln!(f)?;
            writeln!(f, "Strongest placements:")?;
            for (rank, p) in self.top_placements.iter().enumerate() {
                writeln!(
                    f,
                    "{:>3}. {:<32} {:>9.2} dB received  {:>9.2} dB path loss  (record {})",
                    rank + 1,
                    p.label,
                    p.received_power_db,
                    p.path_loss_db,
                    p.index
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{run, ExecutionMode};
    use crate::config::{DeviceGeometryConstants, LinkBudgetReferences};
    use crate::types::{AntennaPlacement, NormalizedBox};

    fn sample_run() -> DatasetRun {
        let records = vec![
            AntennaPlacement::new("Small", NormalizedBox::new(0.45, 0.1, 0.55, 0.15)),
            AntennaPlacement::new("Broken", NormalizedBox::new(0.5, 0.1, 0.4, 0.2)),
            AntennaPlacement::new("Large", NormalizedBox::new(0.1, 0.0, 0.9, 0.3)),
            AntennaPlacement::new("Medium", NormalizedBox::new(0.3, 0.0, 0.7, 0.1)),
        ];
        run(
            records,
            &LinkBudgetReferences::default(),
            &DeviceGeometryConstants::default(),
            ExecutionMode::Sequential,
        )
    }

    #[test]
    fn test_ranking_orders_by_received_power() {
        let run = sample_run();
        let ranked = rank_by_received_power(&run, 10);
        let labels: Vec<&str> = ranked.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["Large", "Medium", "Small"]);
        assert_eq!(ranked[0].index, 2);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].received_power_db >= w[1].received_power_db));

        assert_eq!(rank_by_received_power(&run, 1).len(), 1);
        assert!(rank_by_received_power(&run, 0).is_empty());
    }

    #[test]
    fn test_report_text() {
        let report = SummaryReport::from_run(&sample_run(), 2);
        assert_eq!(report.total_records, 4);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 1);

        let text = report.to_string();
        assert!(text.contains("Minimum Path Loss:"));
        assert!(text.contains("Average Received Power:"));
        assert!(text.contains("Strongest placements:"));
        assert!(text.contains("Large"));
        assert!(!text.contains("Small"));
    }

    #[test]
    fn test_report_without_data() {
        let summary = AnnotatedSummary {
            path_loss: None,
            received_power: None,
        };
        let text = SummaryReport::from_annotated(0, &summary).to_string();
        assert!(text.contains("No path loss data available."));
        assert!(text.contains("No received power data available."));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = SummaryReport::from_run(&sample_run(), 3);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["succeeded"], 3);
        assert_eq!(value["top_placements"].as_array().unwrap().len(), 3);
        assert!(value["path_loss"]["mean"].is_f64());
    }
}

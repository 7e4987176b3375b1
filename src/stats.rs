//! Statistics aggregation and export for sweeps.
//!
//! Each simulation run reduces the per-vehicle outcomes into one
//! [`SweepRow`]; a [`SweepReport`] collects the rows of a sweep and exports
//! them as JSON or CSV.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::node::NodeOutcome;

/// Summary of one simulation run with a given number of microclouds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    /// Number of active microclouds
    pub num_clouds: usize,

    /// Mean blocks received per vehicle, as a fraction of the catalog
    pub block_completion_fraction: f64,

    /// 5th percentile of blocks received per vehicle
    pub p5_blocks_received: f64,

    /// Vehicles that received every block
    pub fully_downloaded: usize,

    /// Mean latency over vehicles that completed; `None` if none did
    pub average_latency: Option<f64>,
}

/// Reduces the outcomes of one run into a summary row.
///
/// The reduction is order independent. `total_blocks` must be non-zero.
pub fn summarize(num_clouds: usize, outcomes: &[NodeOutcome], total_blocks: usize) -> SweepRow {
    let received: Vec<f64> = outcomes
        .iter()
        .map(|o| o.blocks_downloaded as f64)
        .collect();
    let latencies: Vec<f64> = outcomes.iter().filter_map(|o| o.latency).collect();

    let average_latency = if latencies.is_empty() {
        None
    } else {
        Some(mean(&latencies))
    };

    SweepRow {
        num_clouds,
        block_completion_fraction: mean(&received) / total_blocks as f64,
        p5_blocks_received: percentile(&received, 5.0),
        fully_downloaded: outcomes
            .iter()
            .filter(|o| o.blocks_downloaded == total_blocks)
            .count(),
        average_latency,
    }
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentile `p` (0..=100) with linear interpolation between closest ranks.
///
/// Returns NaN for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Rows of a sweep plus timing information.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SweepReport {
    /// Number of vehicles simulated per configuration
    pub vehicles: usize,

    /// Size of the block catalog
    pub total_blocks: usize,

    /// One row per configuration, in increasing microcloud count
    pub rows: Vec<SweepRow>,

    /// Total wall-clock time in milliseconds
    pub total_wall_time_ms: f64,
}

impl SweepReport {
    /// Creates an empty report.
    pub fn new(vehicles: usize, total_blocks: usize) -> Self {
        Self {
            vehicles,
            total_blocks,
            ..Self::default()
        }
    }

    /// Exports the report to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports the report to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports the rows to CSV. Undefined latencies become empty cells.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("num_clouds,block_percentage,p5_blocks_received,files_downloaded,average_latency\n");

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                row.num_clouds,
                row.block_completion_fraction,
                row.p5_blocks_received,
                row.fully_downloaded,
                row.average_latency.map(|v| v.to_string()).unwrap_or_default(),
            ));
        }

        csv
    }

    /// Exports the rows to a CSV file.
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_csv())
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Microcloud Sweep ===")?;
        writeln!(w, "Vehicles: {}", self.vehicles)?;
        writeln!(w, "Blocks per file: {}", self.total_blocks)?;
        writeln!(w, "Wall time: {:.2} ms", self.total_wall_time_ms)?;
        writeln!(w)?;

        writeln!(
            w,
            "{:>6} {:>10} {:>8} {:>10} {:>12}",
            "clouds", "completion", "p5", "complete", "avg latency"
        )?;
        for row in &self.rows {
            let latency = row
                .average_latency
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                w,
                "{:>6} {:>9.1}% {:>8.2} {:>10} {:>12}",
                row.num_clouds,
                row.block_completion_fraction * 100.0,
                row.p5_blocks_received,
                row.fully_downloaded,
                latency
            )?;
        }

        Ok(())
    }

    /// Returns a summary string.
    pub fn summary(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec<u8> cannot fail.
        let _ = self.write_summary(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// A simple timer for measuring wall-clock time.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

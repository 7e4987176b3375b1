//! Configuration system for the microcloud simulator.
//!
//! This module provides YAML/JSON configuration file support for describing
//! a deployment and its download parameters declaratively.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   range: 100.0
//!   bandwidth: 1.0
//!   block_size: 5.0
//!   total_blocks: 12
//!   blocks_per_microcloud: 3
//!   workers: 8
//!   step: 1
//!   log_level: info
//!
//! microclouds:
//!   - [120.5, 40.0]
//!   - [880.0, 310.2]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::types::Coordinate;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Download and deployment parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Radio range of every microcloud
    #[serde(default = "default_range")]
    pub range: f64,

    /// Progress a microcloud delivers per tick
    #[serde(default = "default_bandwidth")]
    pub bandwidth: f64,

    /// Size of every block
    #[serde(default = "default_block_size")]
    pub block_size: f64,

    /// Number of blocks in the file
    #[serde(default = "default_total_blocks")]
    pub total_blocks: usize,

    /// Number of blocks each microcloud serves
    #[serde(default = "default_blocks_per_microcloud")]
    pub blocks_per_microcloud: usize,

    /// Worker pool width
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Increment in microcloud count between sweep configurations
    #[serde(default = "default_step")]
    pub step: usize,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_range() -> f64 {
    100.0
}

fn default_bandwidth() -> f64 {
    1.0
}

fn default_block_size() -> f64 {
    5.0
}

fn default_total_blocks() -> usize {
    12
}

fn default_blocks_per_microcloud() -> usize {
    3
}

fn default_workers() -> usize {
    8
}

fn default_step() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            range: default_range(),
            bandwidth: default_bandwidth(),
            block_size: default_block_size(),
            total_blocks: default_total_blocks(),
            blocks_per_microcloud: default_blocks_per_microcloud(),
            workers: default_workers(),
            step: default_step(),
            log_level: default_log_level(),
        }
    }
}

impl SimulationParams {
    /// Checks the preconditions the simulator relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.range >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "range must be non-negative, got {}",
                self.range
            )));
        }
        if !(self.bandwidth >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "bandwidth must be non-negative, got {}",
                self.bandwidth
            )));
        }
        if !(self.block_size >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "block_size must be non-negative, got {}",
                self.block_size
            )));
        }
        if self.total_blocks == 0 {
            return Err(ConfigError::Validation(
                "total_blocks must be at least 1".to_string(),
            ));
        }
        if self.blocks_per_microcloud == 0 {
            return Err(ConfigError::Validation(
                "blocks_per_microcloud must be at least 1".to_string(),
            ));
        }
        if self.blocks_per_microcloud > self.total_blocks {
            tracing::warn!(
                "blocks_per_microcloud ({}) exceeds total_blocks ({}); catalogs will wrap",
                self.blocks_per_microcloud,
                self.total_blocks
            );
        }
        if self.workers == 0 {
            return Err(ConfigError::Validation(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.step == 0 {
            return Err(ConfigError::Validation(
                "step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete simulator configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Download and deployment parameters
    #[serde(default)]
    pub simulation: SimulationParams,

    /// Microcloud positions, in deployment order
    #[serde(default)]
    pub microclouds: Vec<Coordinate>,
}

impl SimConfig {
    /// Creates a configuration with default parameters and no microclouds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()?;

        for (i, &(x, y)) in self.microclouds.iter().enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "Microcloud {} has a non-finite position ({}, {})",
                    i, x, y
                )));
            }
        }

        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the number of deployed microclouds.
    pub fn microcloud_count(&self) -> usize {
        self.microclouds.len()
    }
}

/// Builder for creating SimConfig programmatically.
#[derive(Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the microcloud radio range.
    pub fn range(mut self, range: f64) -> Self {
        self.config.simulation.range = range;
        self
    }

    /// Sets the per-tick bandwidth.
    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.config.simulation.bandwidth = bandwidth;
        self
    }

    /// Sets the block size.
    pub fn block_size(mut self, size: f64) -> Self {
        self.config.simulation.block_size = size;
        self
    }

    /// Sets the number of blocks in the file.
    pub fn total_blocks(mut self, total: usize) -> Self {
        self.config.simulation.total_blocks = total;
        self
    }

    /// Sets how many blocks each microcloud serves.
    pub fn blocks_per_microcloud(mut self, count: usize) -> Self {
        self.config.simulation.blocks_per_microcloud = count;
        self
    }

    /// Sets the worker pool width.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.simulation.workers = workers;
        self
    }

    /// Sets the sweep step.
    pub fn step(mut self, step: usize) -> Self {
        self.config.simulation.step = step;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Appends a microcloud position.
    pub fn add_microcloud(mut self, x: f64, y: f64) -> Self {
        self.config.microclouds.push((x, y));
        self
    }

    /// Appends several microcloud positions.
    pub fn microclouds(mut self, coords: impl IntoIterator<Item = Coordinate>) -> Self {
        self.config.microclouds.extend(coords);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

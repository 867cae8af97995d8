//! # Configuration Module
//!
//! Simulator configuration with file loading, environment variable
//! overrides, and validation.
//!
//! Configuration can come from three places, applied in order:
//! 1. defaults (one worker, scale threshold 50.0, loads drawn from `[1, 11)`)
//! 2. a YAML or JSON file
//! 3. `LOADSIM_*` environment variables

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DispatchError, DispatchResult};
use crate::observability::LogConfig;

/// Average load above which the pool grows by one worker.
pub const DEFAULT_SCALE_THRESHOLD: f64 = 50.0;
/// Lower bound (inclusive) of generated connection loads.
pub const DEFAULT_LOAD_MIN: f64 = 1.0;
/// Upper bound (exclusive) of generated connection loads.
pub const DEFAULT_LOAD_MAX: f64 = 11.0;

/// Top-level simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Workers present at construction. The pool is never allowed to be
    /// empty, so this must be at least 1.
    pub initial_workers: usize,

    /// Average load above which the pool grows by one worker after an
    /// admission. Strictly greater-than; an average exactly at the
    /// threshold does not grow the pool.
    pub scale_threshold: f64,

    /// Lower bound (inclusive) of the half-open load range.
    pub load_min: f64,

    /// Upper bound (exclusive) of the half-open load range.
    pub load_max: f64,

    /// Seed for the traffic model's RNG. `None` seeds from OS entropy;
    /// setting a value makes a run reproducible.
    pub seed: Option<u64>,

    /// Logging configuration.
    pub logging: LogConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_workers: 1,
            scale_threshold: DEFAULT_SCALE_THRESHOLD,
            load_min: DEFAULT_LOAD_MIN,
            load_max: DEFAULT_LOAD_MAX,
            seed: None,
            logging: LogConfig::default(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> DispatchResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DispatchError::configuration(format!("failed to read config file: {e}")))?;

        let mut config: SimulatorConfig = serde_yaml::from_str(&content)
            .map_err(|e| DispatchError::configuration(format!("failed to parse config: {e}")))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, then apply environment
    /// overrides and validate.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> DispatchResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DispatchError::configuration(format!("failed to read config file: {e}")))?;

        let mut config: SimulatorConfig = serde_json::from_str(&content)
            .map_err(|e| DispatchError::configuration(format!("failed to parse JSON config: {e}")))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to this configuration.
    ///
    /// Variables follow the pattern `LOADSIM_<FIELD>`, for example
    /// `LOADSIM_SCALE_THRESHOLD=75.0`.
    pub fn apply_env_overrides(&mut self) -> DispatchResult<()> {
        if let Ok(count) = env::var("LOADSIM_INITIAL_WORKERS") {
            self.initial_workers = count.parse().map_err(|e| {
                DispatchError::configuration(format!("invalid LOADSIM_INITIAL_WORKERS: {e}"))
            })?;
        }

        if let Ok(threshold) = env::var("LOADSIM_SCALE_THRESHOLD") {
            self.scale_threshold = threshold.parse().map_err(|e| {
                DispatchError::configuration(format!("invalid LOADSIM_SCALE_THRESHOLD: {e}"))
            })?;
        }

        if let Ok(min) = env::var("LOADSIM_LOAD_MIN") {
            self.load_min = min.parse().map_err(|e| {
                DispatchError::configuration(format!("invalid LOADSIM_LOAD_MIN: {e}"))
            })?;
        }

        if let Ok(max) = env::var("LOADSIM_LOAD_MAX") {
            self.load_max = max.parse().map_err(|e| {
                DispatchError::configuration(format!("invalid LOADSIM_LOAD_MAX: {e}"))
            })?;
        }

        if let Ok(seed) = env::var("LOADSIM_SEED") {
            self.seed = Some(seed.parse().map_err(|e| {
                DispatchError::configuration(format!("invalid LOADSIM_SEED: {e}"))
            })?);
        }

        if let Ok(level) = env::var("LOADSIM_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = env::var("LOADSIM_LOG_FORMAT") {
            self.logging.format = format.parse().map_err(|e: String| {
                DispatchError::configuration(format!("invalid LOADSIM_LOG_FORMAT: {e}"))
            })?;
        }

        Ok(())
    }

    /// Check the configuration for internally inconsistent values.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.initial_workers == 0 {
            return Err(DispatchError::configuration(
                "initial_workers must be at least 1",
            ));
        }

        if !self.scale_threshold.is_finite() || self.scale_threshold <= 0.0 {
            return Err(DispatchError::configuration(format!(
                "scale_threshold must be a positive number, got {}",
                self.scale_threshold
            )));
        }

        if !self.load_min.is_finite() || self.load_min <= 0.0 {
            return Err(DispatchError::configuration(format!(
                "load_min must be a positive number, got {}",
                self.load_min
            )));
        }

        if !self.load_max.is_finite() || self.load_max <= self.load_min {
            return Err(DispatchError::configuration(format!(
                "load_max must be greater than load_min, got [{}, {})",
                self.load_min, self.load_max
            )));
        }

        Ok(())
    }
}

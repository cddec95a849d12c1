//! Configuration System
//!
//! Loads run and model parameters from naming.toml so experiments can be
//! adjusted without recompiling. Every field is optional; missing values take
//! the defaults below.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ModelError;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "naming.toml";

/// Errors raised while reading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
    pub advanced: AdvancedParams,
    pub minimal: MinimalParams,
}

/// Run control shared by both variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    /// Upper bound on steps per run
    pub steps: u64,
    /// Steps to run before a consensus may end the run
    pub min_steps: u64,
    /// End the run once consensus holds
    pub stop_on_consensus: bool,
    pub output_dir: PathBuf,
    /// Also write the per-interaction event log
    pub write_events: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 1000,
            min_steps: 100,
            stop_on_consensus: false,
            output_dir: PathBuf::from("output"),
            write_events: false,
        }
    }
}

/// Advanced model parameters, also inserted as a world resource
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedParams {
    /// Population size
    pub n: u32,
    /// Share of committed minority agents
    pub fraction: f64,
    /// Propensity to adopt a word once a group agrees
    pub beta: f64,
    pub width: u32,
    pub height: u32,
    /// Largest interacting group, speaker included
    pub groups_size: usize,
}

impl Default for AdvancedParams {
    fn default() -> Self {
        Self {
            n: 327,
            fraction: 0.003,
            beta: 0.336,
            width: 50,
            height: 50,
            groups_size: 5,
        }
    }
}

impl AdvancedParams {
    /// Agents allowed per cell
    pub const CELL_CAPACITY: usize = 1;

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_population(self.n, self.width, self.height, Self::CELL_CAPACITY)?;
        validate_unit("fraction", self.fraction)?;
        validate_unit("beta", self.beta)?;
        if self.groups_size < 2 {
            return Err(ModelError::invalid(
                "groups_size",
                format!("must be at least 2, got {}", self.groups_size),
            ));
        }
        Ok(())
    }
}

/// Minimal model parameters, also inserted as a world resource
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimalParams {
    /// Population size
    pub n: u32,
    pub width: u32,
    pub height: u32,
    /// Pick partners uniformly from the population instead of the cell
    pub random_interactions: bool,
    /// Word file with one token per line; synthetic tokens when unset
    pub dictionary: Option<PathBuf>,
    pub synthetic_dictionary_size: usize,
}

impl Default for MinimalParams {
    fn default() -> Self {
        Self {
            n: 400,
            width: 30,
            height: 30,
            random_interactions: false,
            dictionary: None,
            synthetic_dictionary_size: 10_000,
        }
    }
}

impl MinimalParams {
    /// Agents allowed per cell
    pub const CELL_CAPACITY: usize = 2;

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_population(self.n, self.width, self.height, Self::CELL_CAPACITY)?;
        if self.dictionary.is_none() && self.synthetic_dictionary_size == 0 {
            return Err(ModelError::invalid(
                "synthetic_dictionary_size",
                "must be positive when no dictionary file is given",
            ));
        }
        Ok(())
    }
}

fn validate_unit(name: &'static str, value: f64) -> Result<(), ModelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::invalid(name, format!("must lie in [0, 1], got {value}")))
    }
}

fn validate_population(n: u32, width: u32, height: u32, per_cell: usize) -> Result<(), ModelError> {
    if n == 0 {
        return Err(ModelError::invalid("n", "population must be positive"));
    }
    if width == 0 {
        return Err(ModelError::invalid("width", "must be positive"));
    }
    if height == 0 {
        return Err(ModelError::invalid("height", "must be positive"));
    }
    let capacity = width as u64 * height as u64 * per_cell as u64;
    if capacity < n as u64 {
        return Err(ModelError::InsufficientCapacity {
            width,
            height,
            per_cell,
            population: n,
        });
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("could not load {DEFAULT_CONFIG_PATH}: {e}; using defaults");
            Self::default()
        })
    }

    /// Check both model sections
    pub fn validate(&self) -> Result<(), ModelError> {
        self.advanced.validate()?;
        self.minimal.validate()
    }
}

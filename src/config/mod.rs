// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Experiment configuration
//!
//! Loaded from `.cellrun.yaml`. Every field is optional and the defaults
//! reproduce the stock layout: `./test_data/specimen_<cell>` with the three
//! Python collaborator scripts in the working directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::CellrunError;

/// Project-level configuration file name
pub const CONFIG_FILE_NAME: &str = ".cellrun.yaml";

/// Experiment configuration from .cellrun.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Directory holding one sub-directory per cell
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Prefix of each cell directory name
    #[serde(default = "default_specimen_prefix")]
    pub specimen_prefix: String,

    /// Input generator command prefix
    #[serde(default = "ToolCommand::default_generator")]
    pub generator: ToolCommand,

    /// Pipeline runner command prefix
    #[serde(default = "ToolCommand::default_runner")]
    pub runner: ToolCommand,

    /// Validator command prefix
    #[serde(default = "ToolCommand::default_validator")]
    pub validator: ToolCommand,

    /// Extra environment variables for every collaborator
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("./test_data")
}

fn default_specimen_prefix() -> String {
    "specimen_".to_string()
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            specimen_prefix: default_specimen_prefix(),
            generator: ToolCommand::default_generator(),
            runner: ToolCommand::default_runner(),
            validator: ToolCommand::default_validator(),
            env: HashMap::new(),
        }
    }
}

/// Program plus leading arguments; step arguments are appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Program to execute, resolved through PATH
    pub program: String,

    /// Arguments placed before the step's own arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    fn python(script: &str) -> Self {
        Self {
            program: "python".to_string(),
            args: vec![script.to_string()],
        }
    }

    fn default_generator() -> Self {
        Self::python("generate_pipeline_input.py")
    }

    fn default_runner() -> Self {
        Self::python("run_pipeline.py")
    }

    fn default_validator() -> Self {
        Self::python("validate_experiment.py")
    }
}

impl ExperimentConfig {
    /// Load from file
    pub fn load(path: &Path) -> Result<Self, CellrunError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CellrunError::ConfigNotFound {
                path: path.to_path_buf(),
            },
            _ => CellrunError::Io {
                message: format!("{}: {}", path.display(), e),
            },
        })?;

        Self::from_yaml(&content).map_err(|e| CellrunError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, CellrunError> {
        // An empty file means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Resolve the configuration for a run
    ///
    /// An explicit path must exist. Otherwise `.cellrun.yaml` in
    /// `project_root` is used, then `config.yaml` in the user config
    /// directory, then the built-in defaults.
    pub fn resolve(explicit: Option<&Path>, project_root: &Path) -> Result<Self, CellrunError> {
        if let Some(path) = explicit {
            debug!("Loading configuration from {}", path.display());
            return Self::load(path);
        }

        let candidates = std::iter::once(project_root.join(CONFIG_FILE_NAME))
            .chain(user_config_path());

        for path in candidates {
            if path.is_file() {
                debug!("Loading configuration from {}", path.display());
                return Self::load(&path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    fn check(&self) -> Result<(), CellrunError> {
        for (name, tool) in [
            ("generator", &self.generator),
            ("runner", &self.runner),
            ("validator", &self.validator),
        ] {
            if tool.program.trim().is_empty() {
                return Err(CellrunError::Yaml {
                    message: format!("{}.program must not be empty", name),
                });
            }
        }

        if self.specimen_prefix.contains(['/', '\\']) {
            return Err(CellrunError::Yaml {
                message: "specimen_prefix must not contain a path separator".to_string(),
            });
        }

        Ok(())
    }
}

/// `config.yaml` in the per-user configuration directory, if there is one
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cellrun")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

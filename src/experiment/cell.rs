// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Cell identifiers and the paths derived from them

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::ExperimentConfig;
use crate::errors::CellrunError;

/// File written by the input generator
pub const INPUT_FILE_NAME: &str = "pipeline_input.json";

/// File written by the pipeline runner
pub const OUTPUT_FILE_NAME: &str = "pipeline_output.json";

/// Identifier of one experiment instance
///
/// Always a single non-empty path component, so joining it onto the data
/// root can never escape that root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    /// Validate and wrap a cell identifier
    pub fn new(cell: impl Into<String>) -> Result<Self, CellrunError> {
        let cell = cell.into();

        let reason = if cell.is_empty() {
            Some("identifier is empty")
        } else if cell == "." || cell == ".." {
            Some("identifier refers to a relative directory")
        } else if cell.contains(['/', '\\']) {
            Some("identifier contains a path separator")
        } else if cell.contains('\0') {
            Some("identifier contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CellrunError::InvalidCell {
                cell,
                reason: reason.to_string(),
            }),
            None => Ok(Self(cell)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CellId {
    type Err = CellrunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cell-scoped directory and artifact paths shared by all collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLayout {
    /// `<data_root>/<prefix><cell>`
    pub dir: PathBuf,
    /// `<dir>/pipeline_input.json`
    pub input_json: PathBuf,
    /// `<dir>/pipeline_output.json`
    pub output_json: PathBuf,
}

impl CellLayout {
    /// Derive the layout for a cell below `data_root`
    pub fn new(data_root: &Path, prefix: &str, cell: &CellId) -> Self {
        let dir = data_root.join(format!("{}{}", prefix, cell));

        Self {
            input_json: dir.join(INPUT_FILE_NAME),
            output_json: dir.join(OUTPUT_FILE_NAME),
            dir,
        }
    }

    /// Derive the layout using the configured data root and prefix
    pub fn from_config(config: &ExperimentConfig, cell: &CellId) -> Self {
        Self::new(&config.data_root, &config.specimen_prefix, cell)
    }

    /// Create the cell directory and any missing parents
    ///
    /// Relative layouts are resolved against `working_dir`. Succeeds when
    /// the directory already exists.
    pub fn ensure_dir(&self, working_dir: &Path) -> Result<(), CellrunError> {
        std::fs::create_dir_all(working_dir.join(&self.dir))
            .map_err(|e| CellrunError::create_dir(self.dir.clone(), e))
    }
}

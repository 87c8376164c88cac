//! JSON exporter for estimate runs.

use crate::error::SimError;
use crate::runner::RunResult;
use cascade_core::SpreadabilitySearch;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Everything one CLI invocation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateExport {
    /// Network label
    pub network: String,

    /// Base seed used
    pub seed: u64,

    /// Estimate runs
    pub runs: Vec<RunResult>,

    /// Minimum probability per seed prefix, if requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_minimums: Option<Vec<f64>>,

    /// Spreadability scan, if requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadability: Option<SpreadabilitySearch>,
}

impl EstimateExport {
    /// Creates a new export container.
    pub fn new(network: &str, seed: u64) -> Self {
        Self {
            network: network.to_string(),
            seed,
            runs: Vec::new(),
            prefix_minimums: None,
            spreadability: None,
        }
    }

    /// Adds a run.
    pub fn add_run(&mut self, run: RunResult) {
        self.runs.push(run);
    }

    pub fn set_prefix_minimums(&mut self, minimums: Vec<f64>) {
        self.prefix_minimums = Some(minimums);
    }

    pub fn set_spreadability(&mut self, search: SpreadabilitySearch) {
        self.spreadability = Some(search);
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

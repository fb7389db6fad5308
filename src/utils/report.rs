use std::{fs, path::Path};

use serde::Serialize;

use super::{
    error::{ProvisionError, Result},
    locate::Resolution,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneOutcome {
    Cloned,
    AlreadyPresent,
}

/// Summary of one provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub drake_version: String,
    pub drake_build: String,
    pub commit: String,
    pub head: String,
    pub target_path: String,
    pub working_copy: CloneOutcome,
    pub resolution: Resolution,
    /// install failures that were let through
    pub warnings: Vec<String>,
}

impl Report {
    pub fn write_json(&self, file: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            ProvisionError::io("failed to serialize report", std::io::Error::from(e))
        })?;
        fs::write(file, json)
            .map_err(|e| ProvisionError::io(format!("cannot write '{}'", file.display()), e))?;
        info!("report written to '{}'", file.display());
        Ok(())
    }
}

//! Construction parameters for a classifier instance

use readsieve_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Query window handed to the engine, in events
pub const DEFAULT_QUERY_SIZE: usize = 250;

/// Reference budget (template + reverse strand) for live runs
pub const LIVE_REFERENCE_SIZE: usize = 400_000;

/// Reference budget for interactive/offline runs
pub const INTERACTIVE_REFERENCE_SIZE: usize = 200_000;

/// Everything needed to build one classifier instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Number of scouts in the extension step
    #[serde(default = "default_scouts")]
    pub num_scouts: usize,

    /// Number of packs in the seeding step
    #[serde(default = "default_packs")]
    pub num_packs: usize,

    /// Target reference sequence (FASTA)
    #[serde(default = "default_reference")]
    pub reference_path: PathBuf,

    /// k-mer model used to turn the reference into an expected signal
    #[serde(default = "default_model")]
    pub model_path: PathBuf,

    /// Trained threshold table
    #[serde(default = "default_params")]
    pub param_path: PathBuf,

    /// Chunking power used when re-chunking events
    #[serde(default = "default_power")]
    pub power: u32,

    /// Fixed query window size
    #[serde(default = "default_query_size")]
    pub query_size: usize,

    /// Total reference size budget (template + reverse strand)
    #[serde(default = "default_reference_size")]
    pub reference_size: usize,
}

impl ClassifierSettings {
    /// Defaults for interactive runs, which use the smaller reference budget
    pub fn interactive() -> Self {
        Self {
            reference_size: INTERACTIVE_REFERENCE_SIZE,
            ..Self::default()
        }
    }

    /// Check scalar parameters
    pub fn validate(&self) -> Result<()> {
        if self.num_scouts == 0 || self.num_packs == 0 {
            return Err(Error::config("num_scouts and num_packs must be non-zero"));
        }
        if self.query_size == 0 {
            return Err(Error::config("query_size must be non-zero"));
        }
        if self.reference_size == 0 {
            return Err(Error::config("reference_size must be non-zero"));
        }
        Ok(())
    }

    /// Check that the reference, model and parameter files are present
    pub fn check_inputs(&self) -> Result<()> {
        for (label, path) in [
            ("reference", &self.reference_path),
            ("model", &self.model_path),
            ("parameter", &self.param_path),
        ] {
            if !Path::new(path).is_file() {
                return Err(Error::classifier(format!(
                    "{} file {} does not exist",
                    label,
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            num_scouts: default_scouts(),
            num_packs: default_packs(),
            reference_path: default_reference(),
            model_path: default_model(),
            param_path: default_params(),
            power: default_power(),
            query_size: default_query_size(),
            reference_size: default_reference_size(),
        }
    }
}

fn default_scouts() -> usize {
    14
}

fn default_packs() -> usize {
    3
}

fn default_reference() -> PathBuf {
    PathBuf::from("./data/reference.fa")
}

fn default_model() -> PathBuf {
    PathBuf::from("./data/template_r9.4.model")
}

fn default_params() -> PathBuf {
    PathBuf::from("./data/parameters.csv")
}

fn default_power() -> u32 {
    9
}

fn default_query_size() -> usize {
    DEFAULT_QUERY_SIZE
}

fn default_reference_size() -> usize {
    LIVE_REFERENCE_SIZE
}

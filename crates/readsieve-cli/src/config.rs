use crate::cli::Cli;
use crate::mock::InstrumentSettings;
use readsieve_classifiers::config::INTERACTIVE_REFERENCE_SIZE;
use readsieve_classifiers::ClassifierSettings;
use readsieve_core::ControlGroup;
use readsieve_engine::LoopConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub classifier: ClassifierSettings,

    #[serde(default)]
    pub engine: LoopConfig,

    #[serde(default)]
    pub instrument: InstrumentSettings,
}

impl RunConfig {
    /// Load from file (or defaults when the file is absent), apply CLI
    /// overrides, then validate
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(cli)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) -> anyhow::Result<()> {
        if let Some(batch_size) = cli.batch_size {
            self.engine.batch_size = batch_size;
        }
        if let Some(divisor) = cli.control_group {
            self.engine.control_group = ControlGroup::new(divisor)?;
        }
        if let Some(throttle_ms) = cli.throttle_ms {
            self.engine.throttle_ms = throttle_ms;
        }
        if let Some(run_time) = cli.run_time {
            self.instrument.run_time_secs = run_time;
        }
        if let Some(min_chunk_size) = cli.min_chunk_size {
            self.instrument.min_chunk_size = min_chunk_size;
        }
        if let Some(reference) = &cli.reference {
            self.classifier.reference_path = reference.clone();
        }
        if let Some(model) = &cli.model {
            self.classifier.model_path = model.clone();
        }
        if let Some(params) = &cli.params {
            self.classifier.param_path = params.clone();
        }
        if cli.interactive {
            self.classifier.reference_size = INTERACTIVE_REFERENCE_SIZE;
        }
        Ok(())
    }

    /// Check every section
    pub fn validate(&self) -> readsieve_core::Result<()> {
        self.classifier.validate()?;
        self.engine.validate()?;
        self.instrument.validate()
    }
}

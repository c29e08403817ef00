//! Conversion options
//!
//! Options are built once per invocation (defaults, then an optional YAML
//! options file, then command-line flags) and passed by reference through
//! the pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Agent implementation family written into the experiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// palaestrAI placeholder brain and muscle, no parameters
    #[default]
    Dummy,
    /// PPO brain and muscle backed by per-role checkpoints
    Ppo,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Dummy => "dummy",
            Profile::Ppo => "ppo",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dummy" => Ok(Profile::Dummy),
            "ppo" => Ok(Profile::Ppo),
            other => Err(format!(
                "Unknown profile '{}': expected one of dummy, ppo",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    pub max_ticks: u64,
    pub episodes: u64,
    pub seed: u64,
    pub environment_uid: String,
    pub experiment_uid_prefix: String,
    pub profile: Profile,
    pub attacker_budget: f64,
    pub defender_budget: f64,
    /// Directory the PPO checkpoints (`attacker.pt`, `defender.pt`) live in
    pub checkpoint_dir: PathBuf,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_ticks: 365,
            episodes: 1,
            seed: 42,
            environment_uid: "provider_env".to_string(),
            experiment_uid_prefix: "provider".to_string(),
            profile: Profile::Dummy,
            attacker_budget: 0.8,
            defender_budget: 0.4,
            checkpoint_dir: PathBuf::from("checkpoints"),
        }
    }
}

impl ConvertOptions {
    /// Load options from a YAML file. Fields left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConvertError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&content).map_err(|source| ConvertError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_environment_uid(mut self, environment_uid: impl Into<String>) -> Self {
        self.environment_uid = environment_uid.into();
        self
    }

    pub fn with_checkpoint_dir(mut self, checkpoint_dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = checkpoint_dir.into();
        self
    }
}

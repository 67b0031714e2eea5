use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the GraphRAG output tables live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub input_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./output"),
        }
    }
}

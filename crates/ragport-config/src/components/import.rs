use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// What to do when the relationship table repeats an id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Log the duplicates and import anyway; later rows update the same edge.
    #[default]
    Warn,
    /// Fail the relationship stage before sending any batch.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub batch_size: usize,
    /// Refuse to run a stage whose prerequisite nodes are missing.
    pub check_preconditions: bool,
    pub duplicate_relationships: DuplicatePolicy,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            check_preconditions: true,
            duplicate_relationships: DuplicatePolicy::Warn,
        }
    }
}

impl ImportSettings {
    pub(crate) fn validate(&self) -> ConfigResult<()> {
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("import.batch_size", "must be at least 1"));
        }
        Ok(())
    }
}

//! Constrained-execution configuration from TOML (`[constraints]` section)

use serde::{Deserialize, Serialize};
use taskforce_domain::{ConstraintConfig, ConstraintError};

/// Raw constraint parameters; validated by [`Self::to_constraints`]
///
/// ```toml
/// [constraints]
/// error_type = "timeout"
/// query_num = 2
/// trial_num = 1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConstraintsConfig {
    pub input_type: Option<String>,
    pub error_type: Option<String>,
    pub query_num: Option<i64>,
    pub trial_num: Option<i64>,
}

impl FileConstraintsConfig {
    pub fn to_constraints(&self) -> Result<ConstraintConfig, ConstraintError> {
        ConstraintConfig::parse(
            self.input_type.as_deref(),
            self.error_type.as_deref(),
            self.query_num,
            self.trial_num,
        )
    }
}

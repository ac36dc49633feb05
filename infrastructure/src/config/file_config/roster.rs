//! Roster configuration from TOML (`[roster]` section)

use serde::{Deserialize, Serialize};

/// Which optional agents join the team
///
/// ```toml
/// [roster]
/// hil_mode = false
/// web_surfer = false
/// video_surfer = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRosterConfig {
    /// Add a human proxy agent
    pub hil_mode: bool,
    pub web_surfer: bool,
    pub video_surfer: bool,
}

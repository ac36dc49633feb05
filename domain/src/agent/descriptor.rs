//! Agent descriptors: the immutable identity of each roster member.
//!
//! The roster is a closed set of variants ([`AgentKind`]). Each variant has
//! a default name, a fixed capability set and a description the coordinator
//! shows to its reasoning client when it picks the next speaker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name the coordinator uses when it speaks on the conversation.
pub const ORCHESTRATOR_NAME: &str = "Orchestrator";

/// Name used for the task message that opens every run.
pub const USER_TASK_SENDER: &str = "user";

/// Something an agent can do for the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Plans,
    Browses,
    ReadsFiles,
    WritesCode,
    ExecutesCode,
    HumanInput,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Plans => "plans",
            Capability::Browses => "browses",
            Capability::ReadsFiles => "reads-files",
            Capability::WritesCode => "writes-code",
            Capability::ExecutesCode => "executes-code",
            Capability::HumanInput => "human-input",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The closed set of agent variants a roster can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    FileInspector,
    WebNavigator,
    VideoInspector,
    CodeAuthor,
    CodeExecutor,
    HumanProxy,
}

impl AgentKind {
    /// Kinds every roster must contain.
    pub const REQUIRED: [AgentKind; 3] = [
        AgentKind::FileInspector,
        AgentKind::CodeAuthor,
        AgentKind::CodeExecutor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::FileInspector => "file_inspector",
            AgentKind::WebNavigator => "web_navigator",
            AgentKind::VideoInspector => "video_inspector",
            AgentKind::CodeAuthor => "code_author",
            AgentKind::CodeExecutor => "code_executor",
            AgentKind::HumanProxy => "human_proxy",
        }
    }

    /// Name the variant gets when the roster builder creates it.
    pub fn default_name(&self) -> &'static str {
        match self {
            AgentKind::FileInspector => "FileSurfer",
            AgentKind::WebNavigator => "WebSurfer",
            AgentKind::VideoInspector => "VideoSurfer",
            AgentKind::CodeAuthor => "Coder",
            AgentKind::CodeExecutor => "Executor",
            AgentKind::HumanProxy => "User",
        }
    }

    pub fn capabilities(&self) -> BTreeSet<Capability> {
        let caps: &[Capability] = match self {
            AgentKind::FileInspector => &[Capability::ReadsFiles],
            AgentKind::WebNavigator => &[Capability::Browses, Capability::ReadsFiles],
            AgentKind::VideoInspector => &[Capability::Browses],
            AgentKind::CodeAuthor => &[Capability::WritesCode, Capability::Plans],
            AgentKind::CodeExecutor => &[Capability::ExecutesCode],
            AgentKind::HumanProxy => &[Capability::HumanInput],
        };
        caps.iter().copied().collect()
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            AgentKind::FileInspector => {
                "An agent that can handle local files: it lists directories, \
                 opens documents and reports their contents."
            }
            AgentKind::WebNavigator => {
                "A helpful assistant with access to a web browser. Ask it to perform \
                 web searches, open pages, and interact with content."
            }
            AgentKind::VideoInspector => {
                "An agent that can answer questions about a local video by \
                 inspecting its frames and transcript."
            }
            AgentKind::CodeAuthor => {
                "A helpful and general-purpose AI assistant with strong language, \
                 Python and Linux command-line skills. It writes code in fenced \
                 blocks for the Executor to run."
            }
            AgentKind::CodeExecutor => {
                "A computer terminal that runs code blocks from the conversation \
                 and reports exit code and output. It does not write code."
            }
            AgentKind::HumanProxy => "A human user who can answer questions and approve actions.",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable identity of a roster member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique within a run
    pub name: String,
    pub kind: AgentKind,
    pub capabilities: BTreeSet<Capability>,
    pub description: String,
}

impl AgentDescriptor {
    /// Descriptor with the variant's default name, capabilities and description
    pub fn for_kind(kind: AgentKind) -> Self {
        Self::named(kind.default_name(), kind)
    }

    /// Descriptor with a custom name but the variant's defaults otherwise
    pub fn named(name: impl Into<String>, kind: AgentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            capabilities: kind.capabilities(),
            description: kind.default_description().to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// One-line summary shown to the reasoning client: `Name: description`
    pub fn team_line(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }

    /// Capability list as a comma-separated string
    pub fn capability_summary(&self) -> String {
        self.capabilities
            .iter()
            .map(Capability::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names_match_roster_conventions() {
        assert_eq!(AgentKind::FileInspector.default_name(), "FileSurfer");
        assert_eq!(AgentKind::CodeAuthor.default_name(), "Coder");
        assert_eq!(AgentKind::CodeExecutor.default_name(), "Executor");
        assert_eq!(AgentKind::HumanProxy.default_name(), "User");
    }

    #[test]
    fn test_descriptor_for_kind_uses_variant_capabilities() {
        let executor = AgentDescriptor::for_kind(AgentKind::CodeExecutor);
        assert!(executor.has_capability(Capability::ExecutesCode));
        assert!(!executor.has_capability(Capability::WritesCode));
        assert_eq!(executor.capability_summary(), "executes-code");
    }

    #[test]
    fn test_team_line_format() {
        let d = AgentDescriptor::named("Helper", AgentKind::CodeAuthor).with_description("writes code");
        assert_eq!(d.team_line(), "Helper: writes code");
    }
}

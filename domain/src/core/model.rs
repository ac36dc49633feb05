//! Model information advertised by a reasoning client.
//!
//! The coordinator does not care which vendor sits behind the gateway, but it
//! does care whether the client can see images, call functions and emit
//! structured JSON. [`ModelInfo`] carries those flags so roster assembly can
//! warn about weaker clients.

use serde::{Deserialize, Serialize};

/// A capability the coordinator expects from its reasoning client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientCapability {
    Vision,
    FunctionCalling,
    JsonOutput,
}

impl ClientCapability {
    /// Capabilities the full roster relies on.
    pub const REQUIRED: [ClientCapability; 3] = [
        ClientCapability::Vision,
        ClientCapability::FunctionCalling,
        ClientCapability::JsonOutput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientCapability::Vision => "vision",
            ClientCapability::FunctionCalling => "function_calling",
            ClientCapability::JsonOutput => "json_output",
        }
    }
}

impl std::fmt::Display for ClientCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability flags for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCapabilities {
    pub vision: bool,
    pub function_calling: bool,
    pub json_output: bool,
}

impl ModelCapabilities {
    /// All capabilities enabled
    pub fn full() -> Self {
        Self {
            vision: true,
            function_calling: true,
            json_output: true,
        }
    }

    pub fn supports(&self, capability: ClientCapability) -> bool {
        match capability {
            ClientCapability::Vision => self.vision,
            ClientCapability::FunctionCalling => self.function_calling,
            ClientCapability::JsonOutput => self.json_output,
        }
    }

    /// Required capabilities this client does not advertise, in canonical order.
    pub fn missing_required(&self) -> Vec<ClientCapability> {
        ClientCapability::REQUIRED
            .into_iter()
            .filter(|cap| !self.supports(*cap))
            .collect()
    }
}

/// Identity and capabilities of the model behind a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier sent to the provider (e.g. "gpt-4o")
    pub name: String,
    /// Provider name (e.g. "openai", "azure", "ollama")
    pub provider: String,
    /// Model family, recorded with experiment results
    pub family: String,
    pub capabilities: ModelCapabilities,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            family: name.clone(),
            name,
            provider: provider.into(),
            capabilities: ModelCapabilities::default(),
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Whether the provider is one the roster is tuned for.
    pub fn is_preferred_provider(&self) -> bool {
        matches!(self.provider.as_str(), "openai" | "azure")
    }
}

impl std::fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.name)
    }
}

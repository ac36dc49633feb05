//! Application layer for taskforce
//!
//! This crate contains the coordinator use case, agent variants, port
//! definitions, and orchestration parameters. It depends only on the domain
//! layer.

pub mod agents;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use agents::{
    CodeExecutorAgent, ConstraintHarness, ExperimentLog, HumanProxyAgent, LlmAgent,
};
pub use config::OrchestratorParams;
pub use ports::{
    agent::{Agent, AgentReply, AgentTurnError},
    code_runner::{CodeExecutionOutput, CodeRunnerError, CodeRunnerPort},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    human_input::{AutoReplyInput, HumanInputError, HumanInputPort},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    run_observer::{NoRunObserver, RunObserver},
    termination::{NoTermination, TerminationCondition, TextMentionTermination},
};
pub use use_cases::assemble_roster::{Roster, RosterBuilder, validate_client};
pub use use_cases::run_orchestrator::{
    ChannelObserver, ConfigurationError, Coordinator, RunError, RunEvent, RunOutput,
};

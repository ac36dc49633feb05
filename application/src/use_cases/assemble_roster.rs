//! Roster assembly and capability validation.
//!
//! [`RosterBuilder`] creates the standard roster in a fixed order:
//!
//! ```text
//! FileSurfer, Coder, Executor (harness-wrapped), [WebSurfer], [VideoSurfer], [User]
//! ```
//!
//! [`Roster::from_agents`] validates any list of agents (unique names,
//! required kinds, human proxy iff `hil_mode`), so tests and embedders can
//! bring their own agents.

use crate::agents::{
    CodeExecutorAgent, ConstraintHarness, ExperimentLog, HumanProxyAgent, LlmAgent,
};
use crate::ports::agent::Agent;
use crate::ports::code_runner::CodeRunnerPort;
use crate::ports::human_input::HumanInputPort;
use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::run_orchestrator::ConfigurationError;
use crate::use_cases::run_orchestrator::ledger::team_text;
use std::collections::HashSet;
use std::sync::Arc;
use taskforce_domain::{
    AgentDescriptor, AgentKind, ConstraintConfig, Diagnostic, DiagnosticCode, ModelInfo,
};
use tracing::{info, warn};

/// Capability diagnostics for the reasoning client.
///
/// Each missing required capability is one warning; a provider other than
/// OpenAI or Azure OpenAI adds a "non-preferred client" warning.
pub fn validate_client(model: &ModelInfo) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = model
        .capabilities
        .missing_required()
        .into_iter()
        .map(|cap| {
            Diagnostic::warning(
                DiagnosticCode::MissingClientCapability(cap),
                format!(
                    "Client {} does not advertise {}; the roster expects vision, function calling, and json output.",
                    model, cap
                ),
            )
        })
        .collect();

    if !model.is_preferred_provider() {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::NonPreferredClient,
            format!(
                "Client {} is not served by OpenAI or Azure OpenAI; the roster performs best with GPT-4o.",
                model
            ),
        ));
    }

    diagnostics
}

/// A validated, immutable set of agents for one run.
pub struct Roster {
    agents: Vec<Arc<dyn Agent>>,
    diagnostics: Vec<Diagnostic>,
    experiment_log: ExperimentLog,
}

impl Roster {
    /// Validate `agents` as a roster.
    pub fn from_agents(
        agents: Vec<Arc<dyn Agent>>,
        hil_mode: bool,
    ) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name().to_string()) {
                return Err(ConfigurationError::DuplicateAgent(agent.name().to_string()));
            }
        }

        for required in AgentKind::REQUIRED {
            if !agents.iter().any(|a| a.descriptor().kind == required) {
                return Err(ConfigurationError::MissingRequiredAgent(required));
            }
        }

        let has_proxy = agents
            .iter()
            .any(|a| a.descriptor().kind == AgentKind::HumanProxy);
        match (hil_mode, has_proxy) {
            (true, false) => return Err(ConfigurationError::MissingHumanProxy),
            (false, true) => return Err(ConfigurationError::UnexpectedHumanProxy),
            _ => {}
        }

        Ok(Self {
            agents,
            diagnostics: Vec::new(),
            experiment_log: ExperimentLog::new(),
        })
    }

    /// Attach assembly-time diagnostics (returned with every run).
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Share the log the executor's constraint harness writes to.
    pub fn with_experiment_log(mut self, log: ExperimentLog) -> Self {
        self.experiment_log = log;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.iter().find(|a| a.name() == name)
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    pub fn descriptors(&self) -> Vec<AgentDescriptor> {
        self.agents.iter().map(|a| a.descriptor().clone()).collect()
    }

    /// `Name: description` lines for prompts and ledger messages
    pub fn team_description(&self) -> String {
        team_text(&self.descriptors())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn experiment_log(&self) -> &ExperimentLog {
        &self.experiment_log
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Builder for the standard roster
pub struct RosterBuilder {
    gateway: Arc<dyn LlmGateway>,
    code_runner: Arc<dyn CodeRunnerPort>,
    human_input: Option<Arc<dyn HumanInputPort>>,
    hil_mode: bool,
    include_web_surfer: bool,
    include_video_surfer: bool,
    constraints: ConstraintConfig,
}

impl RosterBuilder {
    pub fn new(gateway: Arc<dyn LlmGateway>, code_runner: Arc<dyn CodeRunnerPort>) -> Self {
        Self {
            gateway,
            code_runner,
            human_input: None,
            hil_mode: false,
            include_web_surfer: false,
            include_video_surfer: false,
            constraints: ConstraintConfig::default(),
        }
    }

    pub fn with_human_input(mut self, input: Arc<dyn HumanInputPort>) -> Self {
        self.human_input = Some(input);
        self
    }

    pub fn hil_mode(mut self, enabled: bool) -> Self {
        self.hil_mode = enabled;
        self
    }

    pub fn include_web_surfer(mut self, include: bool) -> Self {
        self.include_web_surfer = include;
        self
    }

    pub fn include_video_surfer(mut self, include: bool) -> Self {
        self.include_video_surfer = include;
        self
    }

    pub fn with_constraints(mut self, constraints: ConstraintConfig) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn build(self) -> Result<Roster, ConfigurationError> {
        let model = self.gateway.model_info().clone();
        let diagnostics = validate_client(&model);
        for d in &diagnostics {
            warn!("{}", d);
        }

        let log = ExperimentLog::new();
        let executor: Arc<dyn Agent> = Arc::new(CodeExecutorAgent::new(self.code_runner.clone()));
        let harness: Arc<dyn Agent> = Arc::new(ConstraintHarness::new(
            executor,
            self.constraints,
            model.family.clone(),
            log.clone(),
        ));

        let mut agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(LlmAgent::for_kind(AgentKind::FileInspector, self.gateway.clone())),
            Arc::new(LlmAgent::for_kind(AgentKind::CodeAuthor, self.gateway.clone())),
            harness,
        ];
        if self.include_web_surfer {
            agents.push(Arc::new(LlmAgent::for_kind(
                AgentKind::WebNavigator,
                self.gateway.clone(),
            )));
        }
        if self.include_video_surfer {
            agents.push(Arc::new(LlmAgent::for_kind(
                AgentKind::VideoInspector,
                self.gateway.clone(),
            )));
        }
        if self.hil_mode {
            let input = self
                .human_input
                .clone()
                .ok_or(ConfigurationError::MissingHumanInput)?;
            agents.push(Arc::new(HumanProxyAgent::new(input)));
        }

        let roster = Roster::from_agents(agents, self.hil_mode)?
            .with_diagnostics(diagnostics)
            .with_experiment_log(log);
        info!("Agents: {:?}", roster.names());
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent::{AgentReply, AgentTurnError};
    use crate::ports::code_runner::{CodeExecutionOutput, CodeRunnerError};
    use crate::ports::human_input::AutoReplyInput;
    use crate::ports::llm_gateway::{GatewayError, LlmSession};
    use async_trait::async_trait;
    use taskforce_domain::{ClientCapability, CodeBlock, Message, ModelCapabilities};
    use tokio_util::sync::CancellationToken;

    struct NullGateway {
        info: ModelInfo,
    }

    #[async_trait]
    impl LlmGateway for NullGateway {
        fn model_info(&self) -> &ModelInfo {
            &self.info
        }

        async fn create_session(&self) -> Result<Box<dyn LlmSession>, GatewayError> {
            Err(GatewayError::Other("not used".into()))
        }

        async fn create_session_with_system_prompt(
            &self,
            _system_prompt: &str,
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            Err(GatewayError::Other("not used".into()))
        }
    }

    struct NullRunner;

    #[async_trait]
    impl CodeRunnerPort for NullRunner {
        async fn run(
            &self,
            _blocks: &[CodeBlock],
            _cancellation: &CancellationToken,
        ) -> Result<CodeExecutionOutput, CodeRunnerError> {
            Err(CodeRunnerError::Cancelled)
        }
    }

    fn builder(info: ModelInfo) -> RosterBuilder {
        RosterBuilder::new(Arc::new(NullGateway { info }), Arc::new(NullRunner))
    }

    fn full_model() -> ModelInfo {
        ModelInfo::new("gpt-4o", "openai").with_capabilities(ModelCapabilities::full())
    }

    struct NamedAgent {
        descriptor: AgentDescriptor,
    }

    #[async_trait]
    impl Agent for NamedAgent {
        fn descriptor(&self) -> &AgentDescriptor {
            &self.descriptor
        }

        async fn handle_turn(
            &self,
            _history: &[Message],
            _instruction: &str,
            _cancellation: &CancellationToken,
        ) -> Result<AgentReply, AgentTurnError> {
            Ok(AgentReply::text("ok"))
        }
    }

    fn named(name: &str, kind: AgentKind) -> Arc<dyn Agent> {
        Arc::new(NamedAgent {
            descriptor: AgentDescriptor::named(name, kind),
        })
    }

    #[test]
    fn test_default_roster_order() {
        let roster = builder(full_model()).build().unwrap();
        assert_eq!(roster.names(), vec!["FileSurfer", "Coder", "Executor"]);
        assert!(roster.diagnostics().is_empty());
    }

    #[test]
    fn test_optional_agents_are_appended_in_order() {
        let roster = builder(full_model())
            .include_web_surfer(true)
            .include_video_surfer(true)
            .hil_mode(true)
            .with_human_input(Arc::new(AutoReplyInput::default()))
            .build()
            .unwrap();
        assert_eq!(
            roster.names(),
            vec!["FileSurfer", "Coder", "Executor", "WebSurfer", "VideoSurfer", "User"]
        );
    }

    #[test]
    fn test_hil_mode_without_input_is_config_error() {
        let result = builder(full_model()).hil_mode(true).build();
        assert!(matches!(result, Err(ConfigurationError::MissingHumanInput)));
    }

    #[test]
    fn test_capability_warnings_are_returned_as_diagnostics() {
        let weak = ModelInfo::new("llama3", "ollama").with_capabilities(ModelCapabilities {
            vision: false,
            function_calling: true,
            json_output: false,
        });
        let roster = builder(weak).build().unwrap();
        let codes: Vec<_> = roster.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::MissingClientCapability(ClientCapability::Vision),
                DiagnosticCode::MissingClientCapability(ClientCapability::JsonOutput),
                DiagnosticCode::NonPreferredClient,
            ]
        );
        assert!(!Diagnostic::has_errors(roster.diagnostics()));
    }

    #[test]
    fn test_from_agents_rejects_duplicates() {
        let agents = vec![
            named("FileSurfer", AgentKind::FileInspector),
            named("Coder", AgentKind::CodeAuthor),
            named("Executor", AgentKind::CodeExecutor),
            named("Coder", AgentKind::WebNavigator),
        ];
        assert_eq!(
            Roster::from_agents(agents, false).err(),
            Some(ConfigurationError::DuplicateAgent("Coder".to_string()))
        );
    }

    #[test]
    fn test_from_agents_requires_core_kinds() {
        let agents = vec![
            named("FileSurfer", AgentKind::FileInspector),
            named("Coder", AgentKind::CodeAuthor),
        ];
        assert_eq!(
            Roster::from_agents(agents, false).err(),
            Some(ConfigurationError::MissingRequiredAgent(
                AgentKind::CodeExecutor
            ))
        );
    }

    #[test]
    fn test_human_proxy_must_match_hil_mode() {
        let base = || {
            vec![
                named("FileSurfer", AgentKind::FileInspector),
                named("Coder", AgentKind::CodeAuthor),
                named("Executor", AgentKind::CodeExecutor),
            ]
        };
        assert_eq!(
            Roster::from_agents(base(), true).err(),
            Some(ConfigurationError::MissingHumanProxy)
        );
        let mut with_user = base();
        with_user.push(named("User", AgentKind::HumanProxy));
        assert_eq!(
            Roster::from_agents(with_user, false).err(),
            Some(ConfigurationError::UnexpectedHumanProxy)
        );
    }
}

//! Role prompts for LLM-backed roster agents.

use crate::agent::AgentKind;
use crate::conversation::Message;

/// Templates for agent system prompts and per-turn requests
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// System prompt for an agent of the given kind
    pub fn system(kind: AgentKind) -> String {
        let role = match kind {
            AgentKind::FileInspector => {
                "You inspect local files for the team. Describe directory listings \
                 and file contents accurately and say plainly when a file cannot be read."
            }
            AgentKind::WebNavigator => {
                "You browse the web for the team. Report what you searched for, \
                 which pages you visited and what they contained."
            }
            AgentKind::VideoInspector => {
                "You answer questions about local videos. Describe the relevant \
                 frames and transcript segments that support your answer."
            }
            AgentKind::CodeAuthor => {
                "You are a general-purpose assistant who solves tasks with your \
                 language and coding skills. When code must run, write a complete \
                 program in a single fenced block (```python or ```sh) for the \
                 Executor; do not ask others to edit it. Check the Executor's output \
                 and fix errors. Reply TERMINATE when the whole task is done."
            }
            AgentKind::CodeExecutor => {
                "You run code blocks and report exit codes and output."
            }
            AgentKind::HumanProxy => "You relay questions to a human user.",
        };
        format!(
            "You are {} on a team led by an orchestrator.\n\n{}",
            kind.default_name(),
            role
        )
    }

    /// One turn's request: the unseen conversation followed by the instruction.
    pub fn turn(unseen: &[Message], instruction: &str) -> String {
        if unseen.is_empty() {
            return instruction.to_string();
        }
        let context = unseen
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "## New messages\n\n{}\n\n## Your instruction\n\n{}",
            context, instruction
        )
    }
}

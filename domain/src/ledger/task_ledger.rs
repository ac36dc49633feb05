//! Task ledger: what the coordinator knows and what it intends to do.

use serde::{Deserialize, Serialize};

/// Ledger content before a version is assigned.
///
/// Produced by the ledger parser; turned into a [`TaskLedger`] by
/// [`TaskLedger::initial`] or [`TaskLedger::succeed`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskLedgerDraft {
    pub facts: Vec<String>,
    pub guesses: Vec<String>,
    pub plan: Vec<String>,
}

/// The coordinator's facts, educated guesses and step-by-step plan.
///
/// Replaced wholesale on replanning, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLedger {
    facts: Vec<String>,
    guesses: Vec<String>,
    plan: Vec<String>,
    version: u32,
}

impl TaskLedger {
    /// First ledger of a run (version 1)
    pub fn initial(draft: TaskLedgerDraft) -> Self {
        Self::with_version(draft, 1)
    }

    /// Replacement ledger after replanning (version + 1)
    pub fn succeed(&self, draft: TaskLedgerDraft) -> Self {
        Self::with_version(draft, self.version + 1)
    }

    fn with_version(draft: TaskLedgerDraft, version: u32) -> Self {
        Self {
            facts: draft.facts,
            guesses: draft.guesses,
            plan: draft.plan,
            version,
        }
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    pub fn plan(&self) -> &[String] {
        &self.plan
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Facts rendered as a bullet list, used as the basis for replanning
    pub fn facts_text(&self) -> String {
        bullet_list(&self.facts)
    }

    /// Human-readable rendering posted on the conversation as the ledger message
    pub fn render(&self, task: &str, team: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "We are working to address the following user request:\n\n{}\n\n",
            task
        ));
        out.push_str(&format!(
            "To answer this request we have assembled the following team:\n\n{}\n\n",
            team
        ));
        out.push_str("Here is an initial fact sheet to consider:\n\n");
        out.push_str(&bullet_list(&self.facts));
        if !self.guesses.is_empty() {
            out.push_str("\n\nEducated guesses:\n\n");
            out.push_str(&bullet_list(&self.guesses));
        }
        out.push_str(&format!(
            "\n\nHere is the plan to follow as best as possible (plan v{}):\n\n",
            self.version
        ));
        out.push_str(&bullet_list(&self.plan));
        out
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

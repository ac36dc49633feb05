//! Prompt templates used by the coordinator's reasoning client.

use crate::conversation::{Message, MessageKind, since_last, transcript};
use crate::ledger::TaskLedger;

/// Templates for ledger building, progress evaluation and final answers
pub struct OrchestratorPromptTemplate;

impl OrchestratorPromptTemplate {
    /// System prompt for the coordinator session
    pub fn system() -> &'static str {
        "You are the lead orchestrator of a team of agents. You plan how to \
         address a request, direct one team member at a time, track progress \
         and revise the plan when the team gets stuck. When asked for JSON, \
         output only JSON."
    }

    /// Initial task ledger: gather facts, guesses and a plan in one JSON object.
    pub fn task_ledger(task: &str, team: &str) -> String {
        format!(
            r#"Below I will present you a request. Before we begin addressing the request, please prepare a short pre-survey and a plan.

## Request

{task}

## Team

{team}

## Instructions

1. List the GIVEN or VERIFIED FACTS in the request (specific names, numbers, paths).
2. List EDUCATED GUESSES: hunches or recalled knowledge that may help.
3. Write a short bullet-point plan for addressing the request. Only include steps that involve the team members above; not every member needs to be involved.

Output a single JSON object with this schema and nothing else:

```json
{{
  "facts": ["string", ...],
  "guesses": ["string", ...],
  "plan": ["string", ...]
}}
```"#,
            task = task,
            team = team
        )
    }

    /// Replanning: keep prior facts as a basis, update them from the
    /// conversation, then produce a new plan that avoids the earlier stall.
    pub fn replan(task: &str, team: &str, prior: &TaskLedger, history: &[Message]) -> String {
        format!(
            r#"We are working on the following request and have been unable to make forward progress.

## Request

{task}

## Team

{team}

## Fact sheet so far

{facts}

## Conversation so far

{conversation}

## Instructions

1. Update the fact sheet with anything learned in the conversation. Move educated guesses that have been verified into facts, and add new guesses where useful.
2. Explain briefly what went wrong, then write a new plan that avoids repeating the same mistakes.

Output a single JSON object with this schema and nothing else:

```json
{{
  "facts": ["string", ...],
  "guesses": ["string", ...],
  "plan": ["string", ...]
}}
```"#,
            task = task,
            team = team,
            facts = prior.facts_text(),
            conversation = transcript(history)
        )
    }

    /// Progress ledger: the five questions the coordinator answers every cycle.
    ///
    /// Only the current ledger is shown. Messages up to and including the
    /// latest ledger message are left out, so a superseded plan never
    /// reaches the prompt after a replan.
    pub fn progress_ledger(
        task: &str,
        team: &str,
        names: &[&str],
        ledger: &TaskLedger,
        history: &[Message],
    ) -> String {
        format!(
            r#"## Current task ledger

{ledger}

## Conversation since the ledger was posted

{conversation}

Recall we are working on the following request:

{task}

And we have assembled the following team:

{team}

To make progress on the request, please answer the following questions, including necessary reasoning:

- Is the request fully satisfied? (True if complete, or False if the original request has yet to be SUCCESSFULLY and FULLY addressed)
- Are we in a loop where we are repeating the same requests and/or getting the same responses as before? Loops can span multiple turns.
- Are we making forward progress? (True if just starting, or recent messages are adding value. False if recent messages show evidence of being stuck or of significant barriers to success)
- Who should speak next? (select from: {names})
- What instruction or question would you give this team member? (Phrase as if speaking directly to them, and include any specific information they may need)

Please output an answer in pure JSON format according to the following schema. The JSON object must be parsable as-is. DO NOT OUTPUT ANYTHING OTHER THAN JSON:

{{
  "is_request_satisfied": {{ "reason": string, "answer": boolean }},
  "is_in_loop": {{ "reason": string, "answer": boolean }},
  "is_progress_being_made": {{ "reason": string, "answer": boolean }},
  "next_speaker": {{ "reason": string, "answer": string (select from: {names}) }},
  "instruction_or_question": {{ "reason": string, "answer": string }}
}}"#,
            ledger = ledger.render(task, team),
            conversation = transcript(since_last(history, MessageKind::Ledger)),
            task = task,
            team = team,
            names = names.join(", ")
        )
    }

    /// Final answer synthesized from the conversation against the task.
    pub fn final_answer(task: &str, history: &[Message]) -> String {
        format!(
            r#"{conversation}

We are working on the following task:
{task}

We have completed the task.

The above messages contain the conversation that took place to complete the task.

Based on the information gathered, provide the final answer to the original request.
The answer should be phrased as if you were speaking to the user."#,
            conversation = transcript(history),
            task = task
        )
    }
}

//! Persona templates for the three endpoints.
//!
//! Each template is fixed text with one substitution point. None of the
//! constraints stated inside a template are enforced by the server; the
//! prompt text is the whole contract.

use crate::session::{ChatTurn, Role};

/// System instruction for the tutoring endpoint's stateful conversation.
pub const FEEDBACK_PERSONA: &str = "\
You are a friendly speaking coach helping someone practice explaining \
ideas out loud. For each voice note they record, give short, encouraging \
feedback: name one thing they did well and one concrete thing to improve. \
Keep it under four sentences, speak directly to them, and never repeat \
their note back verbatim.";

/// Deterministic substitute used when reply generation fails on the
/// tutoring endpoint. The request still succeeds with this text.
pub fn fallback_feedback(transcript: &str) -> String {
    format!("I heard: '{}'. Keep practicing!", transcript)
}

/// Wraps a caller-supplied conversation in the stress-support persona as a
/// single stateless prompt. The caller owns the history; the server keeps
/// nothing.
pub fn stress_chat_prompt(messages: &[ChatTurn]) -> String {
    format!(
        "You are a calm, supportive companion for someone feeling stressed or \
overwhelmed while studying. Validate how they feel, then offer one small, \
practical suggestion. Be warm and plain-spoken; no clinical language, no \
bullet lists. Keep your reply to a few sentences.\n\n\
Here is the conversation so far:\n{}\n\nReply to the last message.",
        serialize_conversation(messages)
    )
}

/// Wraps a free-text goal in the decomposition persona. The output shape
/// (five bullets, verb-led, word-bounded) is advisory prompt text only.
pub fn task_breakdown_prompt(goal: &str) -> String {
    format!(
        "Break the goal below into exactly five bullet actions. Each bullet \
starts with a verb and is at most twelve words. Output only the five \
bullets, one per line, each starting with '- '. No headings, no numbering, \
no commentary before or after.\n\nGoal: {}",
        goal
    )
}

/// Serializes role-tagged turns into the plain text block the stress-chat
/// template embeds.
fn serialize_conversation(messages: &[ChatTurn]) -> String {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            format!("{}: {}", role, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

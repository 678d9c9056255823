//! The turn controller — the orchestrating state machine.
//!
//! One call to [`TurnController::handle`] runs a full turn:
//! `AWAIT_INPUT → BUILD_CONTEXT → MODEL_CALL → {CAPABILITY_DISPATCH →
//! MODEL_CALL}* → DONE`, with a `RESET` terminal for reset commands.
//!
//! The canonical history lives in the session store and is only replaced at
//! DONE with the full working copy. A model fault anywhere before that
//! discards the working copy, so an aborted turn leaves the session exactly
//! as it was and the caller may retry the same input.

use std::collections::HashSet;
use std::sync::Arc;

use docfox_core::capability::CapabilityRegistry;
use docfox_core::error::{CapabilityError, Error};
use docfox_core::message::{Message, Role, SessionId, SessionState};
use docfox_core::model::{ModelClient, ModelRequest, Summarizer};
use docfox_core::session::SessionStore;
use tracing::{debug, info, warn};

use crate::{intent, summarizer, window};

/// The fixed policy message injected at position 0 of every working copy.
pub const SYS_POLICY: &str = "You are a grounded study assistant with four capabilities:\n\
\n\
1. web_search — official documentation search. Use it when the question needs \
up-to-date or official information (concepts, syntax, APIs, parameters). Cite the \
result URLs in your answer.\n\
2. doc_retrieval — local document search. Use it when the question is about \
examples, code, or project material covered by the local corpus. Cite the returned \
sources.\n\
3. save_text — persist the final answer to a .txt file. When the user asks to \
save, put the complete final response in `content`, call save_text exactly once, \
then briefly acknowledge the returned filename. Never call save_text twice in one \
turn.\n\
4. notify_chat — post a message to the team chat when the user asks for it.\n\
\n\
When a question needs both concepts and examples, use web_search first, then \
doc_retrieval, and blend the results, attributing each source.";

/// Prefix of the dedicated rolling-summary system message.
pub const SUMMARY_PREFIX: &str = "Conversation summary so far:\n";

/// Hint messages, one per capability family.
pub const HINT_SEARCH: &str = "(The question above needs up-to-date or official \
documentation. Use the web_search capability first, then answer.)";
pub const HINT_RETRIEVAL: &str = "(The question above looks covered by the local \
documents. Use the doc_retrieval capability first, then answer.)";
pub const HINT_PERSIST: &str = "(The user asked to save the answer. After composing \
the final response, call save_text exactly once with the full text.)";

/// Injected when the persistence capability has just produced a result.
pub const ALREADY_SAVED_INSTRUCTION: &str = "(The answer has already been saved. \
Acknowledge the saved file briefly and stop; do not call save_text again.)";

/// Acknowledgement returned from the RESET terminal.
pub const RESET_ACK: &str = "Session cleared. Starting fresh.";

/// Reset commands, matched case-insensitively as literals.
const RESET_COMMANDS: &[&str] = &["exit", "quit", "q", "종료"];

/// The capability restricted to one successful invocation per turn.
const PERSIST_CAPABILITY: &str = "save_text";

/// Answer used when the capability loop exhausts its iteration limit.
const MAX_ITERATIONS_ANSWER: &str = "I've reached the capability iteration limit for \
this turn. Please rephrase or split up the request.";

/// Answer used when the model produced no attributable answer this turn.
const NO_ANSWER_FALLBACK: &str = "I could not produce an answer this turn.";

/// The outcome of one processed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The terminal answer shown to the user.
    pub answer: String,

    /// File reference produced by a successful persistence this turn.
    pub saved_file: Option<String>,

    /// True when the turn was a session reset (no model call occurred).
    pub reset: bool,
}

/// The orchestrating core: assembles model input, interprets responses,
/// dispatches capabilities, and commits history.
pub struct TurnController {
    model: Arc<dyn ModelClient>,
    summarizer: Arc<dyn Summarizer>,
    capabilities: Arc<CapabilityRegistry>,
    store: Arc<dyn SessionStore>,

    model_name: String,
    temperature: f32,
    max_tokens: Option<u32>,

    /// Retention bound in turns for the context window.
    max_turns: usize,

    /// Maximum model-call iterations per turn.
    max_iterations: u32,
}

impl TurnController {
    pub fn new(
        model: Arc<dyn ModelClient>,
        summarizer: Arc<dyn Summarizer>,
        capabilities: Arc<CapabilityRegistry>,
        store: Arc<dyn SessionStore>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            model,
            summarizer,
            capabilities,
            store,
            model_name: model_name.into(),
            temperature: 0.7,
            max_tokens: None,
            max_turns: 6,
            max_iterations: 8,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-response token cap.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the context retention bound in turns.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set the maximum model-call iterations per turn.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Process one turn for a session.
    ///
    /// Model and session faults propagate as errors with the session left
    /// untouched; capability faults are folded into the conversation and do
    /// not abort the turn.
    pub async fn handle(
        &self,
        session_id: &SessionId,
        user_text: &str,
    ) -> Result<TurnOutcome, Error> {
        let input = user_text.trim();

        // ── RESET terminal ──
        if is_reset_command(input) {
            info!(session = %session_id, "Session reset requested");
            self.store.reset(session_id).await?;
            return Ok(TurnOutcome {
                answer: RESET_ACK.into(),
                saved_file: None,
                reset: true,
            });
        }

        // ── BUILD_CONTEXT ──
        let state = self.store.get(session_id).await?;
        info!(
            session = %session_id,
            messages = state.history.len(),
            "Processing turn"
        );

        let mut summary = state.summary.clone();

        // Split the leading system block (policy + summary) from the
        // conversational tail; the window never trims the block.
        let block_len = leading_system_len(&state.history);
        let mut tail: Vec<Message> = state.history[block_len..].to_vec();
        tail.push(Message::user(input));

        // Window management + compression on the tail only. The delta is
        // appended to the session summary immediately so the rebuilt summary
        // message below already reflects it.
        if !window::excess_prefix(&tail, self.max_turns).is_empty() {
            let (kept, delta) =
                summarizer::maybe_compress(tail, self.max_turns, self.summarizer.as_ref()).await;
            tail = kept;
            if let Some(delta) = delta {
                summary.append(delta);
            }
        }

        // Policy at position 0; reuse the stored message so unchanged turns
        // extend history instead of rewriting it.
        let system_block = &state.history[..block_len];
        let policy_msg = system_block
            .first()
            .cloned()
            .unwrap_or_else(|| Message::system(SYS_POLICY));

        let summary_msg = if summary.is_empty() {
            None
        } else {
            let rendered = format!("{SUMMARY_PREFIX}{}", summary.render());
            let existing = system_block
                .iter()
                .skip(1)
                .find(|m| m.content == rendered)
                .cloned();
            Some(existing.unwrap_or_else(|| Message::system(rendered)))
        };

        let mut working: Vec<Message> = Vec::with_capacity(tail.len() + 4);
        working.push(policy_msg);
        working.extend(summary_msg);
        working.append(&mut tail);

        // Intent hints from the latest user message of the trimmed tail
        // (trimming never removes the just-added user message).
        let latest_user = working
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let hints = intent::detect(&latest_user);
        for (fired, hint) in [
            (hints.needs_search, HINT_SEARCH),
            (hints.needs_retrieval, HINT_RETRIEVAL),
            (hints.needs_persist, HINT_PERSIST),
        ] {
            if fired && !hint_present_this_turn(&working, hint) {
                debug!(hint, "Intent hint injected");
                working.push(Message::system(hint));
            }
        }

        // ── MODEL_CALL / CAPABILITY_DISPATCH loop ──
        let definitions = self.capabilities.definitions();
        let mut once_successes: HashSet<String> = HashSet::new();
        let mut already_saved_injected = false;
        let mut iterations = 0u32;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                warn!(
                    session = %session_id,
                    iterations,
                    "Capability iteration limit reached, forcing text answer"
                );
                working.push(Message::assistant(MAX_ITERATIONS_ANSWER));
                break;
            }

            // Prompt-level at-most-once enforcement: after a persistence
            // result, tell the model to acknowledge and stop.
            if !already_saved_injected && last_is_persist_result(&working) {
                working.push(Message::system(ALREADY_SAVED_INSTRUCTION));
                already_saved_injected = true;
            }

            debug!(session = %session_id, iteration = iterations, "Model call");
            let request = ModelRequest {
                model: self.model_name.clone(),
                messages: working.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                capabilities: definitions.clone(),
            };

            // A model fault aborts the turn: the working copy is dropped and
            // canonical history stays untouched.
            let response = self.model.complete(request).await?;

            let calls = response.message.capability_calls.clone();
            working.push(response.message);

            if calls.is_empty() {
                break;
            }

            // Dispatch in the order the model emitted the calls; result
            // ordering is an observable contract.
            for call in &calls {
                match self.capabilities.resolve_spec(&call.name) {
                    Err(e) => {
                        // Routing fault — recovered into the conversation.
                        warn!(capability = %call.name, "Unknown capability requested");
                        working.push(Message::capability_result(
                            &call.name,
                            &call.id,
                            format!("Error: {e}"),
                        ));
                    }
                    Ok(spec) => {
                        if spec.once_per_turn && once_successes.contains(&call.name) {
                            warn!(
                                capability = %call.name,
                                "Blocked repeat invocation of once-per-turn capability"
                            );
                            working.push(Message::capability_result(
                                &call.name,
                                &call.id,
                                format!(
                                    "Error: {}",
                                    CapabilityError::AlreadyInvoked(call.name.clone())
                                ),
                            ));
                            continue;
                        }

                        match self.capabilities.invoke(call).await {
                            Ok(output) => {
                                if spec.once_per_turn && output.success {
                                    once_successes.insert(call.name.clone());
                                }
                                working.push(Message::capability_result(
                                    &call.name,
                                    &call.id,
                                    output.output,
                                ));
                            }
                            Err(e) => {
                                // Capability fault — the model sees the error
                                // and may recover within the turn.
                                warn!(capability = %call.name, error = %e, "Capability failed");
                                working.push(Message::capability_result(
                                    &call.name,
                                    &call.id,
                                    format!("Error: {e}"),
                                ));
                            }
                        }
                    }
                }
            }
            // No window re-trim inside the loop; the full accumulated copy
            // goes back to the model.
        }

        // ── DONE: commit and extract ──
        let answer = extract_answer(&working)
            .unwrap_or(NO_ANSWER_FALLBACK)
            .to_string();
        let saved_file = extract_saved_file(&working);

        self.store
            .put(session_id, SessionState {
                history: working,
                summary,
            })
            .await?;

        info!(session = %session_id, saved = saved_file.is_some(), "Turn committed");
        Ok(TurnOutcome {
            answer,
            saved_file,
            reset: false,
        })
    }
}

/// Case-insensitive literal match against the fixed reset command set.
fn is_reset_command(input: &str) -> bool {
    let lowered = input.to_lowercase();
    RESET_COMMANDS.iter().any(|c| *c == lowered)
}

/// Length of the leading run of system messages (policy + summary block).
fn leading_system_len(history: &[Message]) -> usize {
    history
        .iter()
        .take_while(|m| matches!(m.role, Role::System))
        .count()
}

/// Whether an equivalent hint was already injected after the current user
/// message (per-turn idempotence; cross-turn re-triggering is intended).
fn hint_present_this_turn(working: &[Message], hint: &str) -> bool {
    for msg in working.iter().rev() {
        match msg.role {
            Role::User => return false,
            Role::System => {
                if msg.content == hint {
                    return true;
                }
            }
            Role::Assistant | Role::CapabilityResult => {}
        }
    }
    false
}

/// Whether the most recent message is a capability-result from the
/// persistence capability (success or blocked repeat).
fn last_is_persist_result(working: &[Message]) -> bool {
    working.last().is_some_and(|m| {
        matches!(m.role, Role::CapabilityResult)
            && m.capability_name.as_deref() == Some(PERSIST_CAPABILITY)
    })
}

/// Extract the terminal answer: the last assistant message with non-empty
/// content, scanning backward and stopping at the most recent user message
/// so an answer is never attributed to a prior turn.
pub fn extract_answer(messages: &[Message]) -> Option<&str> {
    for msg in messages.iter().rev() {
        match msg.role {
            Role::User => break,
            Role::Assistant => {
                if !msg.content.is_empty() {
                    return Some(msg.content.as_str());
                }
            }
            Role::System | Role::CapabilityResult => {}
        }
    }
    None
}

/// Extract the file reference of the most recent successful persistence this
/// turn, bounded by the same most-recent-user-message boundary as
/// [`extract_answer`].
pub fn extract_saved_file(messages: &[Message]) -> Option<String> {
    for msg in messages.iter().rev() {
        match msg.role {
            Role::User => break,
            Role::CapabilityResult => {
                if msg.capability_name.as_deref() == Some(PERSIST_CAPABILITY)
                    && let Some(path) = parse_saved_path(&msg.content)
                {
                    return Some(path);
                }
            }
            Role::System | Role::Assistant => {}
        }
    }
    None
}

/// Successful persistence results carry a JSON payload with `file_path`;
/// error results ("Error: ...") don't parse and are skipped.
fn parse_saved_path(content: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    value.get("file_path")?.as_str().map(str::to_string)
}

//! The docfox turn-processing core.
//!
//! One turn runs the state machine:
//!
//! 1. **Receive** a user message (reset commands short-circuit here)
//! 2. **Build context** — working copy of history + policy + rolling
//!    summary + intent hints, with window trimming and compression
//! 3. **Call the model** via the configured client
//! 4. **If capability calls**: dispatch them in order, append results,
//!    loop back to step 3
//! 5. **Commit** — the working copy becomes the canonical history and the
//!    final answer is extracted
//!
//! The canonical history is only mutated at commit; a model fault anywhere
//! in between discards the working copy and leaves the session untouched.

pub mod intent;
pub mod summarizer;
pub mod turn;
pub mod window;

pub use intent::{IntentHints, detect};
pub use summarizer::{COMPRESSION_INSTRUCTION, ModelSummarizer, maybe_compress};
pub use turn::{TurnController, TurnOutcome};
pub use window::{excess_prefix, trim, window_bound};

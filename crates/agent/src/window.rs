//! Context window manager — bounds the history the model sees.
//!
//! The bound is a deliberately simple length heuristic, not token-accurate:
//! `2 * max_turns + 2` raw messages (two messages per turn, plus slack for
//! the policy injection and one buffer message). The turn controller applies
//! it to the conversational tail only, so the leading policy/summary system
//! block is never trimmed away.
//!
//! These are pure functions: the input sequence is never mutated, and an
//! in-bound input comes back unchanged.

use docfox_core::message::Message;

/// Maximum number of raw messages retained for `max_turns` turns.
pub fn window_bound(max_turns: usize) -> usize {
    2 * max_turns + 2
}

/// The most recent messages that fit the window. Identity when the input is
/// already within bound.
pub fn trim(messages: &[Message], max_turns: usize) -> &[Message] {
    let bound = window_bound(max_turns);
    if messages.len() <= bound {
        messages
    } else {
        &messages[messages.len() - bound..]
    }
}

/// The prefix `trim` would drop. Empty when the input is within bound.
pub fn excess_prefix(messages: &[Message], max_turns: usize) -> &[Message] {
    let bound = window_bound(max_turns);
    if messages.len() <= bound {
        &[]
    } else {
        &messages[..messages.len() - bound]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(len: usize) -> Vec<Message> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("question {i}"))
                } else {
                    Message::assistant(format!("answer {i}"))
                }
            })
            .collect()
    }

    #[test]
    fn bound_formula() {
        assert_eq!(window_bound(6), 14);
        assert_eq!(window_bound(0), 2);
    }

    #[test]
    fn short_history_returned_unchanged() {
        let h = history(5);
        let trimmed = trim(&h, 6);
        assert_eq!(trimmed.len(), 5);
        assert_eq!(trimmed[0].content, h[0].content);
        assert!(excess_prefix(&h, 6).is_empty());
    }

    #[test]
    fn exactly_at_bound_is_identity() {
        let h = history(14);
        assert_eq!(trim(&h, 6).len(), 14);
        assert!(excess_prefix(&h, 6).is_empty());
    }

    #[test]
    fn over_bound_keeps_most_recent() {
        let h = history(20);
        let trimmed = trim(&h, 6);
        assert_eq!(trimmed.len(), 14);
        assert_eq!(trimmed[0].content, "question 6");
        assert_eq!(trimmed.last().unwrap().content, "answer 19");
    }

    #[test]
    fn excess_prefix_is_the_dropped_part() {
        let h = history(20);
        let prefix = excess_prefix(&h, 6);
        let suffix = trim(&h, 6);
        assert_eq!(prefix.len(), 6);
        assert_eq!(prefix.len() + suffix.len(), h.len());
        assert_eq!(prefix.last().unwrap().content, "answer 5");
    }

    #[test]
    fn input_never_mutated() {
        let h = history(20);
        let before: Vec<String> = h.iter().map(|m| m.content.clone()).collect();
        let _ = trim(&h, 2);
        let _ = excess_prefix(&h, 2);
        let after: Vec<String> = h.iter().map(|m| m.content.clone()).collect();
        assert_eq!(before, after);
    }
}

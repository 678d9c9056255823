//! Intent detector — pattern-based capability hints.
//!
//! Three independent boolean predicates over fixed bilingual
//! (English/Korean) keyword patterns, evaluated against the literal text of
//! the most recent user message only. Deterministic: the same text always
//! yields the same hint set. This is a heuristic, not a guarantee — false
//! positives and negatives are tolerated by contract; the state machine
//! works the same either way.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Capability hints fired for a user message. Multiple hints may fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentHints {
    /// Up-to-date / official documentation is likely needed
    pub needs_search: bool,
    /// Local examples / project material is likely relevant
    pub needs_retrieval: bool,
    /// The user asked to persist the answer
    pub needs_persist: bool,
}

impl IntentHints {
    pub fn any(&self) -> bool {
        self.needs_search || self.needs_retrieval || self.needs_persist
    }
}

static SEARCH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(latest|official|docs?|documentation|reference|api|syntax|parameter|manual)\b",
        r"(최신|공식|문서|레퍼런스|함수|매개변수|사용법|방법|API)",
    ])
});

static RETRIEVAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(example|sample|notebook|project|code|implementation|practice)\b",
        r"(이전|노트북|예제|코드|실습|프로젝트|데이터셋|baseline|결과)",
    ])
});

static PERSIST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(save|export|txt)\b",
        r"(저장|내보내|텍스트|txt로|파일로)",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("fixed intent pattern must compile"))
        .collect()
}

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// Evaluate all hint predicates against the given user text.
pub fn detect(text: &str) -> IntentHints {
    IntentHints {
        needs_search: matches_any(&SEARCH_PATTERNS, text),
        needs_retrieval: matches_any(&RETRIEVAL_PATTERNS, text),
        needs_persist: matches_any(&PERSIST_PATTERNS, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_question_fires_nothing() {
        let hints = detect("What is a Python class?");
        assert!(!hints.any());
    }

    #[test]
    fn official_docs_question_fires_search() {
        let hints = detect("Show me the latest official docs for tokio");
        assert!(hints.needs_search);
        assert!(!hints.needs_persist);
    }

    #[test]
    fn korean_search_keywords_fire_search() {
        let hints = detect("최신 pandas 공식 문서 기준으로 merge 사용법 알려줘");
        assert!(hints.needs_search);
    }

    #[test]
    fn example_question_fires_retrieval() {
        let hints = detect("Is there a notebook example for this in our project?");
        assert!(hints.needs_retrieval);
    }

    #[test]
    fn korean_save_request_fires_persist() {
        let hints = detect("이 답변을 txt로 저장해줘");
        assert!(hints.needs_persist);
    }

    #[test]
    fn multiple_hints_can_fire_together() {
        let hints = detect("Find the official API reference and save the code example as txt");
        assert!(hints.needs_search);
        assert!(hints.needs_retrieval);
        assert!(hints.needs_persist);
    }

    #[test]
    fn case_insensitive_english_patterns() {
        assert!(detect("SAVE this please").needs_persist);
        assert!(detect("check the OFFICIAL DOCS").needs_search);
    }

    #[test]
    fn detection_is_deterministic() {
        let text = "최신 공식 문서와 예제 코드를 txt로 저장";
        assert_eq!(detect(text), detect(text));
    }

    #[test]
    fn substring_words_do_not_match_english_patterns() {
        // \b keeps "apis" in "therapists" from matching, etc.
        assert!(!detect("the therapists were helpful").needs_search);
        assert!(!detect("he exported nothing").needs_persist);
    }
}

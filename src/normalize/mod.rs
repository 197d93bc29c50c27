use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ApiError;
use crate::schema::Contract;
use crate::wire::{BlockKind, PuzzleLevel};

/// ========================================
/// Response normalizers
/// ========================================
///
/// The model's raw text is untrusted. Parsing is strict-then-salvage: try the
/// whole content as JSON, then the first `{...}` object embedded in it. A
/// response that yields no JSON object at all is an upstream contract
/// violation and surfaces as an error; a response that parses but comes up
/// short is merged leniently (missing lists become empty lists) and never
/// fails.

/// Parse raw model output into a typed value, or fail with a contract
/// violation. Never retried; one attempt per user action.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, ApiError> {
    match serde_json::from_str::<T>(raw) {
        Ok(v) => Ok(v),
        Err(_) => {
            if let Some(obj) = extract_first_json_object(raw) {
                if let Ok(v) = serde_json::from_str::<T>(&obj) {
                    return Ok(v);
                }
            }
            Err(ApiError::ContractViolation(format!(
                "model did not return a usable JSON object: {}",
                truncate(raw, 200)
            )))
        }
    }
}

/// Parse and type raw output, auditing it against the feature's contract.
/// Deviations are returned as messages for logging; they do not fail the
/// request as long as the value still deserializes.
pub fn normalize<T: DeserializeOwned>(
    raw: &str,
    contract: &Contract,
) -> Result<(T, Vec<String>), ApiError> {
    let value: Value = parse_json(raw)?;
    let problems = contract.audit(&value);
    let typed = serde_json::from_value(value).map_err(|e| {
        ApiError::ContractViolation(format!("response shape is structurally unusable: {e}"))
    })?;
    Ok((typed, problems))
}

/// Extracts the first top-level JSON object substring from a string.
/// Handles nested braces; returns None if not found.
fn extract_first_json_object(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut start = None;
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'{' {
            if start.is_none() {
                start = Some(i);
            }
            depth += 1;
        } else if b == b'}' {
            if depth > 0 {
                depth -= 1;
                if depth == 0 {
                    if let Some(st) = start {
                        return Some(s[st..=i].to_string());
                    }
                }
            }
        }
    }
    None
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.trim().to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}…", cut.trim())
    }
}

/// Repair a generated puzzle level so its correct blocks are always
/// resolvable game choices.
///
/// For each block type in [subject, action, location]: take the first
/// available block of that type whose text occurs inside `prompt_kr`, or the
/// first available block of that type when none matches. When all three types
/// yield a pick, `correct_blocks` is overwritten with the three texts in type
/// order. When any type has no usable block the level is left untouched; the
/// caller decides whether to log the degraded state.
///
/// Returns false for the untouched pass-through case.
pub fn repair_level(level: &mut PuzzleLevel) -> bool {
    let mut picked = Vec::with_capacity(3);
    for kind in [BlockKind::Subject, BlockKind::Action, BlockKind::Location] {
        let mut first = None;
        let mut matched = None;
        for block in level.available_blocks.iter() {
            if block.kind != kind || block.text.is_empty() {
                continue;
            }
            if first.is_none() {
                first = Some(block.text.as_str());
            }
            if matched.is_none() && level.prompt_kr.contains(block.text.as_str()) {
                matched = Some(block.text.as_str());
            }
        }
        match matched.or(first) {
            Some(text) => picked.push(text.to_string()),
            None => return false,
        }
    }
    level.correct_blocks = picked;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::wire::{HintResponse, PuzzleBlock, SuggestionResponse};

    fn block(text: &str, kind: BlockKind) -> PuzzleBlock {
        PuzzleBlock { text: text.into(), kind }
    }

    fn level(prompt_kr: &str, blocks: Vec<PuzzleBlock>, correct: Vec<&str>) -> PuzzleLevel {
        PuzzleLevel {
            theme: "숲".into(),
            prompt_kr: prompt_kr.into(),
            available_blocks: blocks,
            correct_blocks: correct.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn parse_json_accepts_a_clean_object() {
        let parsed: SuggestionResponse =
            parse_json(r#"{"adjectives":["a"],"verbs":[],"locations":[]}"#).unwrap();
        assert_eq!(parsed.adjectives, vec!["a"]);
    }

    #[test]
    fn parse_json_salvages_an_object_wrapped_in_prose() {
        let raw = "Sure! Here is the JSON you asked for:\n```json\n{\"adjectives\":[\"귀여운\"]}\n``` hope it helps";
        let parsed: SuggestionResponse = parse_json(raw).unwrap();
        assert_eq!(parsed.adjectives, vec!["귀여운"]);
    }

    #[test]
    fn parse_json_rejects_plain_prose() {
        let err = parse_json::<SuggestionResponse>("I'm sorry, I can't do that.").unwrap_err();
        assert!(matches!(err, ApiError::ContractViolation(_)));
    }

    #[test]
    fn normalize_is_lenient_about_missing_and_short_lists() {
        let (hints, problems) =
            normalize::<HintResponse>(r#"{"adjectives":["a","b"]}"#, &schema::HINTS).unwrap();
        assert_eq!(hints.adjectives.len(), 2);
        assert!(hints.verbs.is_empty());
        assert!(hints.styles.is_empty());
        // short list + two missing keys
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn normalize_rejects_structurally_unusable_shapes() {
        let err = normalize::<HintResponse>(r#"{"adjectives": "not a list"}"#, &schema::HINTS)
            .unwrap_err();
        assert!(matches!(err, ApiError::ContractViolation(_)));
    }

    #[test]
    fn repair_overwrites_fabricated_correct_blocks() {
        let mut lvl = level(
            "숲속의 토끼가 뛰고 있다",
            vec![
                block("거북이", BlockKind::Subject),
                block("토끼", BlockKind::Subject),
                block("뛰고 있다", BlockKind::Action),
                block("잠자고 있다", BlockKind::Action),
                block("바닷가", BlockKind::Location),
                block("숲속", BlockKind::Location),
            ],
            vec!["용", "날고 있다", "하늘"],
        );
        assert!(repair_level(&mut lvl));
        assert_eq!(lvl.correct_blocks, vec!["토끼", "뛰고 있다", "숲속"]);
    }

    #[test]
    fn repair_output_is_drawn_verbatim_from_available_blocks_in_type_order() {
        let mut lvl = level(
            "아무 문장",
            vec![
                block("고양이", BlockKind::Subject),
                block("노래한다", BlockKind::Action),
                block("지붕 위", BlockKind::Location),
                block("마당", BlockKind::Location),
            ],
            vec![],
        );
        assert!(repair_level(&mut lvl));
        assert_eq!(lvl.correct_blocks.len(), 3);
        for (text, kind) in lvl.correct_blocks.iter().zip([
            BlockKind::Subject,
            BlockKind::Action,
            BlockKind::Location,
        ]) {
            assert!(lvl
                .available_blocks
                .iter()
                .any(|b| b.kind == kind && &b.text == text));
        }
    }

    #[test]
    fn repair_prefers_substring_matches_over_first_blocks() {
        let mut lvl = level(
            "마당에서 강아지가 노래한다",
            vec![
                block("고양이", BlockKind::Subject),
                block("강아지", BlockKind::Subject),
                block("노래한다", BlockKind::Action),
                block("지붕 위", BlockKind::Location),
                block("마당", BlockKind::Location),
            ],
            vec![],
        );
        assert!(repair_level(&mut lvl));
        assert_eq!(lvl.correct_blocks, vec!["강아지", "노래한다", "마당"]);
    }

    #[test]
    fn repair_falls_back_to_first_block_without_substring_match() {
        let mut lvl = level(
            "전혀 다른 문장",
            vec![
                block("강아지", BlockKind::Subject),
                block("고양이", BlockKind::Subject),
                block("달린다", BlockKind::Action),
                block("공원", BlockKind::Location),
            ],
            vec![],
        );
        assert!(repair_level(&mut lvl));
        assert_eq!(lvl.correct_blocks, vec!["강아지", "달린다", "공원"]);
    }

    #[test]
    fn repair_leaves_correct_blocks_untouched_when_a_type_is_missing() {
        let mut lvl = level(
            "숲속의 토끼가 뛰고 있다",
            vec![
                block("토끼", BlockKind::Subject),
                block("뛰고 있다", BlockKind::Action),
            ],
            vec!["모델이", "지어낸", "정답"],
        );
        assert!(!repair_level(&mut lvl));
        assert_eq!(lvl.correct_blocks, vec!["모델이", "지어낸", "정답"]);
    }

    #[test]
    fn extract_handles_nested_braces() {
        let raw = r#"noise {"a": {"b": 1}, "c": [2]} trailing"#;
        assert_eq!(
            extract_first_json_object(raw).unwrap(),
            r#"{"a": {"b": 1}, "c": [2]}"#
        );
        assert!(extract_first_json_object("no braces here").is_none());
    }
}

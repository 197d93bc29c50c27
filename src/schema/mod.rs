use serde_json::Value;

use crate::wire::QuizQuestion;

/// ========================================
/// Contract schemas
/// ========================================
///
/// Each feature declares, independent of any particular model call, the exact
/// JSON shape its response must have. The same table is rendered into the
/// system prompt (so the instruction states the contract in natural language)
/// and consulted by the normalizer when auditing what actually came back.

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A single string value.
    Text,
    /// A list with this exact number of entries.
    List(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub key: &'static str,
    pub kind: FieldKind,
    /// What the value holds, e.g. "Korean adjectives". Used verbatim in the
    /// rendered contract clause.
    pub describes: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Contract {
    pub fields: &'static [Field],
}

pub const BLOCKS_PER_TYPE: usize = 2;
pub const QUIZ_QUESTIONS: usize = 3;
pub const QUIZ_OPTIONS: usize = 4;

pub const KEYWORDS: Contract = Contract {
    fields: &[
        Field { key: "adjectives", kind: FieldKind::List(8), describes: "Korean descriptive words" },
        Field { key: "verbs", kind: FieldKind::List(8), describes: "Korean action phrases" },
        Field { key: "locations", kind: FieldKind::List(8), describes: "Korean place names" },
    ],
};

pub const ADJECTIVES: Contract = Contract {
    fields: &[Field {
        key: "adjectives",
        kind: FieldKind::List(8),
        describes: "Korean descriptive words",
    }],
};

pub const MOOD_STYLE: Contract = Contract {
    fields: &[
        Field { key: "moods", kind: FieldKind::List(6), describes: "Korean mood words" },
        Field { key: "styles", kind: FieldKind::List(6), describes: "Korean art style names" },
    ],
};

pub const HINTS: Contract = Contract {
    fields: &[
        Field { key: "adjectives", kind: FieldKind::List(5), describes: "Korean adjectives" },
        Field { key: "verbs", kind: FieldKind::List(5), describes: "Korean action phrases" },
        Field { key: "styles", kind: FieldKind::List(5), describes: "Korean style or mood phrases" },
    ],
};

pub const COMPOSE: Contract = Contract {
    fields: &[
        Field { key: "dalle_prompt", kind: FieldKind::Text, describes: "the final English DALL-E prompt" },
        Field {
            key: "korean_description",
            kind: FieldKind::Text,
            describes: "a natural Korean sentence describing the final image",
        },
    ],
};

pub const QUIZ: Contract = Contract {
    fields: &[Field {
        key: "questions",
        kind: FieldKind::List(QUIZ_QUESTIONS),
        describes: "question objects",
    }],
};

impl Contract {
    /// Render the contract as a natural-language clause for a system prompt.
    pub fn clause(&self) -> String {
        let keys = self
            .fields
            .iter()
            .map(|f| format!("\"{}\"", f.key))
            .collect::<Vec<_>>()
            .join(", ");
        let mut out = format!(
            "Your response MUST be a valid JSON object with exactly these keys: {keys}."
        );
        for f in self.fields {
            match f.kind {
                FieldKind::Text => {
                    out.push_str(&format!(" \"{}\" must be a string: {}.", f.key, f.describes));
                }
                FieldKind::List(n) => {
                    out.push_str(&format!(
                        " \"{}\" must be a list (array) of exactly {} {}.",
                        f.key, n, f.describes
                    ));
                }
            }
        }
        out
    }

    /// Compare a parsed response against the contract. Returns one message per
    /// deviation; deviations are logged, not fatal (normalization is lenient).
    pub fn audit(&self, value: &Value) -> Vec<String> {
        let mut problems = Vec::new();
        for f in self.fields {
            match (f.kind, value.get(f.key)) {
                (_, None) => problems.push(format!("missing key \"{}\"", f.key)),
                (FieldKind::Text, Some(v)) => {
                    if !v.is_string() {
                        problems.push(format!("key \"{}\" is not a string", f.key));
                    }
                }
                (FieldKind::List(n), Some(v)) => match v.as_array() {
                    Some(arr) if arr.len() != n => {
                        problems.push(format!(
                            "key \"{}\" has {} entries, contract expects {}",
                            f.key,
                            arr.len(),
                            n
                        ));
                    }
                    Some(_) => {}
                    None => problems.push(format!("key \"{}\" is not a list", f.key)),
                },
            }
        }
        problems
    }
}

/// Nested contract of the quiz feature: each question needs four options and
/// a correct index that actually points into them. Like `audit`, deviations
/// are reported for logging, not rejected.
pub fn audit_quiz_questions(questions: &[QuizQuestion]) -> Vec<String> {
    let mut problems = Vec::new();
    for (i, q) in questions.iter().enumerate() {
        if q.options.len() != QUIZ_OPTIONS {
            problems.push(format!(
                "question {i} has {} options, contract expects {QUIZ_OPTIONS}",
                q.options.len()
            ));
        }
        if q.correct_index >= q.options.len() {
            problems.push(format!(
                "question {i} correctIndex {} is out of range for {} options",
                q.correct_index,
                q.options.len()
            ));
        }
    }
    problems
}

//! Response sanitizer for generator output.
//!
//! Output is cleaned by an ordered table of rules, each a pattern that
//! deletes a "theatrical" or formatting artifact, followed by whitespace
//! normalization. The whole pass repeats until nothing changes. Every rule
//! only ever deletes characters, so the loop terminates and
//! `sanitize(sanitize(x)) == sanitize(x)` holds for every input.
//!
//! Stage directions are only removed when they start with a verb from
//! [`ACTION_VERBS`]; other emphasis keeps its text and loses its markers, and
//! ordinary parentheses are left untouched.

use once_cell::sync::Lazy;
use regex::Regex;

/// Vocabulary of theatrical action verbs recognised in stage directions.
pub const ACTION_VERBS: &[&str] = &[
    "nods?", "nodding", "smiles?", "smiling", "pauses?", "pausing", "laughs?", "laughing",
    "chuckles?", "chuckling", "leans?", "leaning", "sighs?", "sighing", "grins?", "grinning",
    "tilts?", "tilting", "frowns?", "frowning", "winks?", "winking", "beams?", "beaming",
    "shrugs?", "shrugging", "gestures?", "gesturing", "clears throat",
];

/// A single deletion rule.
pub struct SanitizeRule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl SanitizeRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("sanitizer pattern is valid"),
            replacement,
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

static RULES: Lazy<Vec<SanitizeRule>> = Lazy::new(|| {
    let verbs = ACTION_VERBS.join("|");
    vec![
        SanitizeRule::new(
            "injection_marker",
            r"(?i)<\|[a-z_]+\|>|\[/?INST\]|<</?SYS>>",
            "",
        ),
        SanitizeRule::new(
            "horizontal_rule",
            r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*$",
            "",
        ),
        SanitizeRule::new("header_marker", r"(?m)^[ \t]*#{1,6}[ \t]+", ""),
        SanitizeRule::new(
            "asterisk_stage_direction",
            &format!(r"(?i)[ \t]?\*{{1,2}}[ \t]*(?:{verbs})\b[^*\n]*\*{{1,2}}"),
            "",
        ),
        SanitizeRule::new(
            "underscore_stage_direction",
            &format!(r"(?i)[ \t]?_[ \t]*(?:{verbs})(?:[ \t][^_\n]*)?_"),
            "",
        ),
        SanitizeRule::new(
            "parenthetical_action",
            &format!(r"(?i)[ \t]?[(\[][ \t]*(?:{verbs})\b[^)\]\n]*[)\]]"),
            "",
        ),
        SanitizeRule::new(
            "strong_emphasis",
            r"(?m)(^|[^\w*])\*\*([^\s*](?:[^*\n]*[^\s*])?)\*\*",
            "${1}${2}",
        ),
        SanitizeRule::new(
            "emphasis",
            r"(?m)(^|[^\w*])\*([^\s*](?:[^*\n]*[^\s*])?)\*",
            "${1}${2}",
        ),
    ]
});

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space pattern is valid"));

/// Returns the rule table in application order.
pub fn rules() -> &'static [SanitizeRule] {
    &RULES
}

/// Cleans generator output for display and persistence.
pub fn sanitize(raw: &str) -> String {
    let mut current = strip_controls(raw);
    loop {
        let next = single_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.len() != raw.len() {
        tracing::debug!(
            raw_chars = raw.len(),
            clean_chars = current.len(),
            "Sanitizer removed content"
        );
    }
    current
}

fn single_pass(text: &str) -> String {
    let stripped = RULES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc));
    normalize_whitespace(&stripped)
}

/// Normalizes line endings and tabs, then drops other control characters.
fn strip_controls(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '\r' => '\n',
            '\t' => ' ',
            other => other,
        })
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

/// Trims each line, collapses space runs, and keeps at most one blank line
/// between paragraphs.
fn normalize_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = false;
    for line in text.lines() {
        let collapsed = SPACE_RUN.replace_all(line.trim(), " ").into_owned();
        let blank = collapsed.is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        lines.push(collapsed);
    }
    lines.join("\n").trim().to_string()
}

//! YAML codec for the persisted hints document.
//!
//! The document is a sequence of single-key mappings, each keyed by an item
//! id. A record body is tried as a question first, then as an answer; a body
//! matching neither shape is skipped and reported, never fatal. Encoding
//! sorts records by item id and fixes the output styles the rest of the
//! platform's tooling expects: `question_options` renders flow-style on one
//! line, every other sequence block-style, and multi-line content as a
//! literal block scalar. Decoding an encoded state and re-encoding it yields
//! an identical document.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_yaml::Value;

use crate::graph::model::{Entry, EntryKind};
use crate::graph::state::GraphState;

// ---------------------------------------------------------------------------
// Record shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct QuestionRecord {
    question_id: String,
    #[serde(default)]
    following_answer_id: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct AnswerRecord {
    answer_id: String,
    #[serde(default)]
    question_options: Vec<String>,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Record {
    Question(QuestionRecord),
    Answer(AnswerRecord),
}

/// Entries recovered from a document, in file order, plus one diagnostic per
/// record that could not be used.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodedHints {
    pub questions: Vec<Entry>,
    pub answers: Vec<Entry>,
    pub skipped: Vec<String>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a hints document. Empty and null documents decode to nothing;
/// individual unusable records are reported in `skipped` while the rest of
/// the document loads.
pub fn decode(raw: &str) -> Result<DecodedHints> {
    let mut out = DecodedHints::default();
    if raw.trim().is_empty() {
        return Ok(out);
    }

    let document: Value = serde_yaml::from_str(raw).context("hints file is not valid YAML")?;
    if document.is_null() {
        return Ok(out);
    }
    let Value::Sequence(records) = document else {
        bail!("hints file must be a sequence of records");
    };

    for (idx, record) in records.into_iter().enumerate() {
        if record.is_null() {
            continue;
        }
        let Value::Mapping(mapping) = record else {
            out.skipped.push(format!("record {}: not a mapping", idx + 1));
            continue;
        };
        for (key, fields) in mapping {
            let Some(item_id) = key.as_str() else {
                out.skipped
                    .push(format!("record {}: item id is not a string", idx + 1));
                continue;
            };
            match entry_from_fields(item_id, fields) {
                Some(entry) if entry.kind == EntryKind::Question => out.questions.push(entry),
                Some(entry) => out.answers.push(entry),
                None => out
                    .skipped
                    .push(format!("record '{item_id}': unrecognized shape")),
            }
        }
    }

    Ok(out)
}

/// Build an entry from a record body. Question takes precedence over answer
/// when a body happens to satisfy both shapes.
fn entry_from_fields(item_id: &str, fields: Value) -> Option<Entry> {
    if let Ok(record) = serde_yaml::from_value::<QuestionRecord>(fields.clone()) {
        let mut entry = Entry::new(EntryKind::Question, item_id, record.question_id);
        if !record.following_answer_id.is_empty() {
            entry.next_entries.push(record.following_answer_id);
        }
        entry.content = strip_trailing_newline(record.content);
        return Some(entry);
    }
    if let Ok(record) = serde_yaml::from_value::<AnswerRecord>(fields) {
        let mut entry = Entry::new(EntryKind::Answer, item_id, record.answer_id);
        entry.next_entries = record.question_options;
        entry.content = strip_trailing_newline(record.content);
        return Some(entry);
    }
    None
}

fn strip_trailing_newline(mut content: String) -> String {
    if content.ends_with('\n') {
        content.pop();
    }
    content
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode the full state: serialized questions, then answers, stably sorted
/// by item id.
pub fn encode(state: &GraphState) -> String {
    let mut records: Vec<(&str, Record)> = state
        .entries(EntryKind::Question)
        .map(record_for)
        .chain(state.entries(EntryKind::Answer).map(record_for))
        .collect();
    records.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (item_id, record) in &records {
        emit_record(&mut out, item_id, record);
    }
    out
}

fn record_for(entry: &Entry) -> (&str, Record) {
    let record = match entry.kind {
        EntryKind::Question => Record::Question(QuestionRecord {
            question_id: entry.entry_id.clone(),
            following_answer_id: match entry.next_entries.as_slice() {
                [only] => only.clone(),
                _ => String::new(),
            },
            content: entry.content.clone(),
        }),
        EntryKind::Answer => Record::Answer(AnswerRecord {
            answer_id: entry.entry_id.clone(),
            question_options: entry.next_entries.clone(),
            content: entry.content.clone(),
        }),
    };
    (entry.item_id.as_str(), record)
}

const FIELD_INDENT: &str = "    ";
const BLOCK_INDENT: &str = "      ";

fn emit_record(out: &mut String, item_id: &str, record: &Record) {
    out.push_str("- ");
    out.push_str(&scalar(item_id));
    out.push_str(":\n");
    match record {
        Record::Question(q) => {
            emit_field(out, "question_id", &q.question_id);
            emit_field(out, "following_answer_id", &q.following_answer_id);
            emit_field(out, "content", &q.content);
        }
        Record::Answer(a) => {
            emit_field(out, "answer_id", &a.answer_id);
            emit_flow_list(out, "question_options", &a.question_options);
            emit_field(out, "content", &a.content);
        }
    }
}

fn emit_field(out: &mut String, key: &str, value: &str) {
    if value.contains('\n') && literal_block_safe(value) {
        emit_literal_block(out, key, value);
    } else {
        out.push_str(FIELD_INDENT);
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&scalar(value));
        out.push('\n');
    }
}

fn emit_flow_list(out: &mut String, key: &str, values: &[String]) {
    let rendered: Vec<String> = values.iter().map(|value| scalar(value)).collect();
    out.push_str(FIELD_INDENT);
    out.push_str(key);
    out.push_str(": [");
    out.push_str(&rendered.join(", "));
    out.push_str("]\n");
}

/// A literal block takes its indentation from the first content line, so a
/// value whose first line starts with whitespace (or that carries carriage
/// returns) must be quoted instead.
fn literal_block_safe(value: &str) -> bool {
    if value.contains('\r') {
        return false;
    }
    !value
        .lines()
        .next()
        .is_some_and(|first| first.starts_with([' ', '\t']))
}

fn emit_literal_block(out: &mut String, key: &str, value: &str) {
    let chomping = if value.ends_with("\n\n") {
        "|+"
    } else if value.ends_with('\n') {
        "|"
    } else {
        "|-"
    };
    out.push_str(FIELD_INDENT);
    out.push_str(key);
    out.push_str(": ");
    out.push_str(chomping);
    out.push('\n');
    for line in value.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(BLOCK_INDENT);
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Render a single-line value as a plain, single-quoted, or double-quoted
/// scalar — whichever is the simplest form YAML accepts for it.
fn scalar(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value.chars().any(|c| c.is_control()) {
        double_quoted(value)
    } else if plain_safe(value) {
        value.to_string()
    } else {
        single_quoted(value)
    }
}

fn plain_safe(value: &str) -> bool {
    if value.trim() != value {
        return false;
    }
    if looks_like_non_string(value) {
        return false;
    }
    let first = value.chars().next().expect("checked non-empty");
    if !(first.is_alphanumeric() || first == '_' || first == '/') {
        return false;
    }
    !value.contains(": ")
        && !value.ends_with(':')
        && !value.contains(" #")
        && !value.contains(['[', ']', '{', '}', ','])
}

/// Values YAML would read back as something other than a string.
fn looks_like_non_string(value: &str) -> bool {
    matches!(
        value,
        "~" | "null" | "Null" | "NULL"
            | "true" | "True" | "TRUE"
            | "false" | "False" | "FALSE"
            | "yes" | "Yes" | "YES"
            | "no" | "No" | "NO"
            | "on" | "On" | "ON"
            | "off" | "Off" | "OFF"
    ) || value.parse::<f64>().is_ok()
}

fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

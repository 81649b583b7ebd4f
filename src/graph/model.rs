//! Entry records: questions and answers, plus their outgoing references.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;

/// Which of the two record kinds an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Question,
    Answer,
}

impl EntryKind {
    /// The other kind — the one an entry's references point into.
    pub fn opposite(self) -> Self {
        match self {
            Self::Question => Self::Answer,
            Self::Answer => Self::Question,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "question" => Ok(Self::Question),
            "answer" => Ok(Self::Answer),
            other => bail!("unrecognized entry kind '{other}'"),
        }
    }
}

/// A single question or answer record.
///
/// `item_id` is unique across both kinds and never changes; `entry_id` is
/// unique within the entry's own kind and is what other entries reference.
/// `next_entries` holds entry ids of the *opposite* kind: at most one for a
/// question, any number (in meaningful order) for an answer. Referenced ids
/// need not exist locally — cross-file references stay as raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub item_id: String,
    pub entry_id: String,
    pub kind: EntryKind,
    pub content: String,
    pub next_entries: Vec<String>,
}

impl Entry {
    pub fn new(kind: EntryKind, item_id: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            entry_id: entry_id.into(),
            kind,
            content: String::new(),
            next_entries: Vec::new(),
        }
    }

    /// Add an outgoing reference. A question holds at most one, so adding
    /// replaces it; an answer appends (duplicates allowed).
    pub fn add_next(&mut self, id: impl Into<String>) {
        match self.kind {
            EntryKind::Question => self.next_entries = vec![id.into()],
            EntryKind::Answer => self.next_entries.push(id.into()),
        }
    }

    /// Remove and return the reference at `idx`, or `None` when out of range.
    pub fn pop_next_at(&mut self, idx: usize) -> Option<String> {
        if idx < self.next_entries.len() {
            Some(self.next_entries.remove(idx))
        } else {
            None
        }
    }

    /// Remove the first reference equal to `id`. Returns whether one existed.
    pub fn remove_next(&mut self, id: &str) -> bool {
        match self.next_entries.iter().position(|next| next == id) {
            Some(idx) => {
                self.next_entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Swap the references at `i` and `j`; a no-op unless both are in range.
    pub fn swap_next(&mut self, i: usize, j: usize) {
        if i < self.next_entries.len() && j < self.next_entries.len() {
            self.next_entries.swap(i, j);
        }
    }

    /// Replace the content verbatim — no trimming, no validation.
    pub fn update_content(&mut self, text: &str) {
        self.content = text.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_both_labels() {
        assert_eq!("question".parse::<EntryKind>().unwrap(), EntryKind::Question);
        assert_eq!("answer".parse::<EntryKind>().unwrap(), EntryKind::Answer);
    }

    #[test]
    fn kind_rejects_unknown_label() {
        assert!("hint".parse::<EntryKind>().is_err());
    }

    #[test]
    fn opposite_flips_kind() {
        assert_eq!(EntryKind::Question.opposite(), EntryKind::Answer);
        assert_eq!(EntryKind::Answer.opposite(), EntryKind::Question);
    }

    #[test]
    fn question_add_next_replaces() {
        let mut q = Entry::new(EntryKind::Question, "item001", "q001");
        q.add_next("a001");
        q.add_next("a002");
        assert_eq!(q.next_entries, vec!["a002"]);
    }

    #[test]
    fn answer_add_next_appends_with_duplicates() {
        let mut a = Entry::new(EntryKind::Answer, "item002", "a001");
        a.add_next("q001");
        a.add_next("q002");
        a.add_next("q001");
        assert_eq!(a.next_entries, vec!["q001", "q002", "q001"]);
    }

    #[test]
    fn pop_next_at_out_of_range_is_none() {
        let mut a = Entry::new(EntryKind::Answer, "item002", "a001");
        a.add_next("q001");
        assert_eq!(a.pop_next_at(1), None);
        assert_eq!(a.pop_next_at(0), Some("q001".to_string()));
        assert!(a.next_entries.is_empty());
    }

    #[test]
    fn remove_next_takes_first_occurrence_only() {
        let mut a = Entry::new(EntryKind::Answer, "item002", "a001");
        a.next_entries = vec!["q001".into(), "q002".into(), "q001".into()];
        assert!(a.remove_next("q001"));
        assert_eq!(a.next_entries, vec!["q002", "q001"]);
        assert!(!a.remove_next("q009"));
    }

    #[test]
    fn swap_next_ignores_out_of_range() {
        let mut a = Entry::new(EntryKind::Answer, "item002", "a001");
        a.next_entries = vec!["q001".into(), "q002".into()];
        a.swap_next(0, 2);
        assert_eq!(a.next_entries, vec!["q001", "q002"]);
        a.swap_next(0, 1);
        assert_eq!(a.next_entries, vec!["q002", "q001"]);
    }

    #[test]
    fn update_content_is_verbatim() {
        let mut q = Entry::new(EntryKind::Question, "item001", "q001");
        q.update_content("  spaced \n");
        assert_eq!(q.content, "  spaced \n");
    }
}

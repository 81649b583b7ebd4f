//! Mutable editing state: both collections, the selection, and the backing file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::codec;
use crate::graph::collection::{EntryCollection, ResolvedRef};
use crate::graph::idgen;
use crate::graph::model::{Entry, EntryKind};
use crate::store;

/// Non-owning handle to the selected entry, resolved on demand against the
/// owning collection so it can never dangle after a removal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    kind: EntryKind,
    entry_id: String,
}

/// Outcome of loading a hints file into the state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// One message per record that was skipped (unrecognized shape or an id
    /// colliding with an entry already present).
    pub skipped: Vec<String>,
}

/// The full editing state for one hints document.
#[derive(Debug)]
pub struct GraphState {
    questions: EntryCollection,
    answers: EntryCollection,
    selection: Option<Selection>,
    path: PathBuf,
}

impl GraphState {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            questions: EntryCollection::new(EntryKind::Question),
            answers: EntryCollection::new(EntryKind::Answer),
            selection: None,
            path: store::resolve_path(path),
        }
    }

    /// Discard everything: both collections empty, no selection, default path.
    pub fn reset(&mut self) {
        *self = Self::new(None);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collection(&self, kind: EntryKind) -> &EntryCollection {
        match kind {
            EntryKind::Question => &self.questions,
            EntryKind::Answer => &self.answers,
        }
    }

    fn collection_mut(&mut self, kind: EntryKind) -> &mut EntryCollection {
        match kind {
            EntryKind::Question => &mut self.questions,
            EntryKind::Answer => &mut self.answers,
        }
    }

    /// Split borrow: the collection for `kind` together with its opposite.
    fn collection_pair_mut(
        &mut self,
        kind: EntryKind,
    ) -> (&mut EntryCollection, &mut EntryCollection) {
        match kind {
            EntryKind::Question => (&mut self.questions, &mut self.answers),
            EntryKind::Answer => (&mut self.answers, &mut self.questions),
        }
    }

    /// Entries of one kind in display order.
    pub fn entries(&self, kind: EntryKind) -> impl Iterator<Item = &Entry> {
        self.collection(kind).ordered()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select the entry at `position` within the named kind's collection.
    pub fn select(&mut self, position: usize, kind: EntryKind) -> Result<()> {
        let entry_id = self
            .collection(kind)
            .by_position(position)
            .with_context(|| format!("{kind} position {position} out of range"))?
            .entry_id
            .clone();
        self.selection = Some(Selection { kind, entry_id });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selected(&self) -> Option<&Entry> {
        let sel = self.selection.as_ref()?;
        self.collection(sel.kind).by_id(&sel.entry_id)
    }

    fn selected_mut(&mut self) -> Option<&mut Entry> {
        let sel = self.selection.clone()?;
        self.collection_mut(sel.kind).by_id_mut(&sel.entry_id)
    }

    /// Kind of the selected entry; `None` when nothing is selected.
    pub fn selected_kind(&self) -> Option<EntryKind> {
        self.selection.as_ref().map(|sel| sel.kind)
    }

    /// Kind opposite the selection; `None` when nothing is selected.
    pub fn opposite_kind(&self) -> Option<EntryKind> {
        self.selected_kind().map(EntryKind::opposite)
    }

    // -----------------------------------------------------------------------
    // Next-entry references of the selection
    // -----------------------------------------------------------------------

    /// The selected entry's references, resolved against the opposite
    /// collection. Empty when nothing is selected.
    pub fn next_of_selected(&self) -> Vec<ResolvedRef<'_>> {
        let Some(kind) = self.selected_kind() else {
            return Vec::new();
        };
        let Some(entry) = self.selected() else {
            return Vec::new();
        };
        self.collection(kind.opposite()).resolve(&entry.next_entries)
    }

    /// Add a reference to the selected entry. The id may name an entry of the
    /// opposite kind or be an arbitrary string that resolves later
    /// (forward/cross-file reference).
    pub fn add_next_to_selected(&mut self, id: &str) -> Result<()> {
        let entry = self.selected_mut().context("no entry selected")?;
        entry.add_next(id);
        Ok(())
    }

    /// Remove the selected entry's reference at `position`. Returns the
    /// removed id, or `None` when out of range or nothing is selected.
    pub fn remove_next_from_selected(&mut self, position: usize) -> Option<String> {
        self.selected_mut()?.pop_next_at(position)
    }

    /// Swap the selected entry's references at `i` and `j`. Only answers hold
    /// a reorderable list; any other selection is rejected.
    pub fn reorder_next_of_selected(&mut self, i: usize, j: usize) -> Result<()> {
        match self.selected_kind() {
            Some(EntryKind::Answer) => {}
            Some(EntryKind::Question) => bail!("questions hold at most one next entry"),
            None => bail!("no entry selected"),
        }
        if let Some(entry) = self.selected_mut() {
            entry.swap_next(i, j);
        }
        Ok(())
    }

    /// Reconcile the selected entry's links against the full desired set of
    /// opposite-collection positions, as reported by a multi-select UI.
    ///
    /// Computes the symmetric difference between the currently linked
    /// positions (unresolved references excluded) and `desired`, then applies
    /// exactly one change: unlink a position that was linked, or link one
    /// that was not (replacing a question's sole link). When more than one
    /// position differs, the smallest is taken and the rest are ignored —
    /// selection UIs report one toggle per event, so a larger difference only
    /// arises from out-of-sync callers.
    pub fn replace_next_selection(&mut self, desired: &[usize]) -> Result<()> {
        let kind = self.selected_kind().context("no entry selected")?;

        let current: BTreeSet<usize> = self
            .next_of_selected()
            .iter()
            .filter_map(ResolvedRef::position)
            .collect();
        let desired: BTreeSet<usize> = desired.iter().copied().collect();

        let Some(&position) = current.symmetric_difference(&desired).next() else {
            return Ok(());
        };

        let entry_id = self
            .collection(kind.opposite())
            .by_position(position)
            .with_context(|| format!("{} position {position} out of range", kind.opposite()))?
            .entry_id
            .clone();

        let entry = self.selected_mut().context("no entry selected")?;
        if current.contains(&position) {
            entry.remove_next(&entry_id);
        } else {
            if kind == EntryKind::Question {
                entry.pop_next_at(0);
            }
            entry.add_next(entry_id);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Entry lifecycle
    // -----------------------------------------------------------------------

    /// Create an entry of `kind` with freshly allocated ids.
    ///
    /// The item id is allocated over the item ids of *both* collections with
    /// `"item" + prefix`; the entry id over the target kind's own id list
    /// with `prefix`. The new entry is not auto-selected.
    pub fn create_entry(
        &mut self,
        prefix: &str,
        digits: usize,
        kind: EntryKind,
    ) -> Result<&Entry> {
        let item_prefix = format!("item{prefix}");
        let item_id = idgen::next_id(
            self.questions
                .ordered()
                .chain(self.answers.ordered())
                .map(|entry| entry.item_id.as_str()),
            &item_prefix,
            digits,
        );
        let entry_id = idgen::next_id(
            self.collection(kind).entry_ids().iter().map(String::as_str),
            prefix,
            digits,
        );
        self.collection_mut(kind).create(item_id, entry_id)
    }

    /// Remove an entry of the selected kind: the one at `position`, or the
    /// selected entry itself when `position` is `None`. Clears the selection.
    pub fn remove_entry(&mut self, position: Option<usize>) -> Result<()> {
        let sel = self.selection.clone().context("no entry selected")?;
        let position = match position {
            Some(position) => position,
            None => self
                .collection(sel.kind)
                .position_of(&sel.entry_id)
                .context("selected entry is gone from its collection")?,
        };
        let (own, opposite) = self.collection_pair_mut(sel.kind);
        own.remove_at(position, opposite)?;
        self.selection = None;
        Ok(())
    }

    /// Update the selected entry's content verbatim.
    pub fn update_selected_content(&mut self, text: &str) -> Result<()> {
        let entry = self.selected_mut().context("no entry selected")?;
        entry.update_content(text);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load the hints at `path` (or the current path) into the state.
    ///
    /// The document is decoded in full before anything is committed, so a
    /// read or parse failure leaves the state untouched. Records with an
    /// unrecognized shape, and records whose ids collide with entries already
    /// present, are skipped and reported. Clears the selection.
    pub fn load_from_file(&mut self, path: Option<&Path>) -> Result<LoadReport> {
        if let Some(path) = path {
            self.path = path.to_path_buf();
        }
        let raw = store::read(&self.path)?;
        let decoded = codec::decode(&raw)?;
        let report = self.merge_decoded(decoded);
        self.selection = None;
        Ok(report)
    }

    /// Commit decoded entries into the collections, skipping any whose ids
    /// collide with entries already present.
    pub(crate) fn merge_decoded(&mut self, decoded: codec::DecodedHints) -> LoadReport {
        let mut report = LoadReport {
            loaded: 0,
            skipped: decoded.skipped,
        };
        for entry in decoded.questions.into_iter().chain(decoded.answers) {
            let label = format!("{} '{}'", entry.kind, entry.entry_id);
            if self.item_id_in_use(&entry.item_id) {
                report.skipped.push(format!(
                    "skipped {label}: item id '{}' already in use",
                    entry.item_id
                ));
                continue;
            }
            match self.collection_mut(entry.kind).insert(entry) {
                Ok(()) => report.loaded += 1,
                Err(err) => report.skipped.push(format!("skipped {label}: {err}")),
            }
        }
        report
    }

    /// Encode the state and write it out, to `path` when given, otherwise to
    /// the current path. Falls back to the recovery file when the destination
    /// is unwritable. Returns the path actually written.
    pub fn save_to_file(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = path {
            self.path = path.to_path_buf();
        }
        let document = codec::encode(self);
        store::write(&self.path, &document)
    }

    fn item_id_in_use(&self, item_id: &str) -> bool {
        self.questions
            .ordered()
            .chain(self.answers.ordered())
            .any(|entry| entry.item_id == item_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The canonical fixture: four questions and three answers.
    ///
    /// Questions (order): q `prefix001`..`prefix004` with item ids
    /// itemprefix001/002/003/007; answers `prefix001`..`prefix003` with item
    /// ids itemprefix004/005/006. Answer `prefix002` links three questions.
    pub(crate) fn fixture() -> GraphState {
        let mut state = GraphState::new(None);
        let questions = [
            ("itemprefix001", "prefix001", "Question1", vec!["prefix001"]),
            ("itemprefix002", "prefix002", "Question2", vec!["prefix002"]),
            ("itemprefix003", "prefix003", "Question3", vec![]),
            ("itemprefix007", "prefix004", "Question4", vec![]),
        ];
        for (item_id, entry_id, content, next) in questions {
            let mut entry = Entry::new(EntryKind::Question, item_id, entry_id);
            entry.content = content.to_string();
            entry.next_entries = next.into_iter().map(String::from).collect();
            state.questions.insert(entry).unwrap();
        }
        let answers = [
            ("itemprefix004", "prefix001", "Answer1", vec!["prefix002"]),
            (
                "itemprefix005",
                "prefix002",
                "Answer2",
                vec!["prefix001", "prefix003", "prefix004"],
            ),
            ("itemprefix006", "prefix003", "Answer3", vec![]),
        ];
        for (item_id, entry_id, content, next) in answers {
            let mut entry = Entry::new(EntryKind::Answer, item_id, entry_id);
            entry.content = content.to_string();
            entry.next_entries = next.into_iter().map(String::from).collect();
            state.answers.insert(entry).unwrap();
        }
        state
    }

    fn assert_sizes(state: &GraphState, questions: usize, answers: usize) {
        assert_eq!(state.collection(EntryKind::Question).len(), questions);
        assert_eq!(state.collection(EntryKind::Answer).len(), answers);
    }

    #[test]
    fn select_question_exposes_kind_and_entry() {
        let mut state = fixture();
        state.select(0, EntryKind::Question).unwrap();
        assert_eq!(state.selected_kind(), Some(EntryKind::Question));
        assert_eq!(state.opposite_kind(), Some(EntryKind::Answer));
        let entry = state.selected().unwrap();
        assert_eq!(entry.item_id, "itemprefix001");
        assert_eq!(entry.entry_id, "prefix001");
        assert_eq!(entry.content, "Question1");
        assert_eq!(entry.next_entries, vec!["prefix001"]);
    }

    #[test]
    fn select_answer_exposes_kind_and_entry() {
        let mut state = fixture();
        state.select(0, EntryKind::Answer).unwrap();
        assert_eq!(state.selected_kind(), Some(EntryKind::Answer));
        let entry = state.selected().unwrap();
        assert_eq!(entry.item_id, "itemprefix004");
        assert_eq!(entry.entry_id, "prefix001");
    }

    #[test]
    fn select_out_of_range_errors_and_keeps_selection_clear() {
        let mut state = fixture();
        assert!(state.select(4, EntryKind::Question).is_err());
        assert!(state.selected().is_none());
        assert_eq!(state.selected_kind(), None);
    }

    #[test]
    fn item_ids_unique_across_both_collections() {
        let state = fixture();
        let mut seen = BTreeSet::new();
        for entry in state
            .entries(EntryKind::Question)
            .chain(state.entries(EntryKind::Answer))
        {
            assert!(seen.insert(entry.item_id.clone()), "duplicate {}", entry.item_id);
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn create_question_allocates_both_ids_independently() {
        let mut state = fixture();
        let entry = state
            .create_entry("prefix", 3, EntryKind::Question)
            .unwrap();
        assert_eq!(entry.item_id, "itemprefix008");
        assert_eq!(entry.entry_id, "prefix005");
        assert_eq!(entry.content, "");
        assert!(entry.next_entries.is_empty());
        assert_sizes(&state, 5, 3);
        // Not auto-selected.
        assert!(state.selected().is_none());
    }

    #[test]
    fn create_answer_allocates_both_ids_independently() {
        let mut state = fixture();
        let entry = state.create_entry("prefix", 3, EntryKind::Answer).unwrap();
        assert_eq!(entry.item_id, "itemprefix008");
        assert_eq!(entry.entry_id, "prefix004");
        assert_sizes(&state, 4, 4);
    }

    #[test]
    fn remove_selected_question_purges_inbound_references() {
        let mut state = fixture();
        state.select(1, EntryKind::Question).unwrap();
        state.remove_entry(None).unwrap();
        assert_sizes(&state, 3, 3);
        assert!(state.selected().is_none());
        // Answer itemprefix004 referenced the removed question prefix002.
        let answer = state.collection(EntryKind::Answer).by_id("prefix001").unwrap();
        assert!(answer.next_entries.is_empty());
    }

    #[test]
    fn remove_selected_answer_purges_inbound_references() {
        let mut state = fixture();
        state.select(1, EntryKind::Answer).unwrap();
        state.remove_entry(None).unwrap();
        assert_sizes(&state, 4, 2);
        // Question prefix002 referenced the removed answer prefix002.
        let question = state
            .collection(EntryKind::Question)
            .by_id("prefix002")
            .unwrap();
        assert!(question.next_entries.is_empty());
    }

    #[test]
    fn remove_entry_at_explicit_position() {
        let mut state = fixture();
        state.select(0, EntryKind::Question).unwrap();
        state.remove_entry(Some(1)).unwrap();
        assert_sizes(&state, 3, 3);
        assert!(state.collection(EntryKind::Question).by_id("prefix002").is_none());
    }

    #[test]
    fn remove_entry_without_selection_errors() {
        let mut state = fixture();
        assert!(state.remove_entry(None).is_err());
        assert_sizes(&state, 4, 3);
    }

    #[test]
    fn next_of_selected_resolves_against_opposite_collection() {
        let mut state = fixture();
        state.select(1, EntryKind::Answer).unwrap();
        let next = state.next_of_selected();
        let positions: Vec<Option<usize>> = next.iter().map(ResolvedRef::position).collect();
        assert_eq!(positions, vec![Some(0), Some(2), Some(3)]);
    }

    #[test]
    fn next_of_selected_keeps_dangling_references() {
        let mut state = fixture();
        state.select(0, EntryKind::Question).unwrap();
        state.add_next_to_selected("otherfile123").unwrap();
        let next = state.next_of_selected();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0], ResolvedRef::Unknown("otherfile123"));
    }

    #[test]
    fn reorder_swaps_answer_references() {
        let mut state = fixture();
        state.select(1, EntryKind::Answer).unwrap();
        state.reorder_next_of_selected(0, 1).unwrap();
        assert_sizes(&state, 4, 3);
        let entry = state.selected().unwrap();
        assert_eq!(entry.next_entries, vec!["prefix003", "prefix001", "prefix004"]);
    }

    #[test]
    fn reorder_two_element_list() {
        let mut state = GraphState::new(None);
        let mut answer = Entry::new(EntryKind::Answer, "itemprefix001", "prefix001");
        answer.next_entries = vec!["prefix001".into(), "prefix003".into()];
        state.answers.insert(answer).unwrap();
        state.select(0, EntryKind::Answer).unwrap();
        state.reorder_next_of_selected(0, 1).unwrap();
        assert_eq!(
            state.selected().unwrap().next_entries,
            vec!["prefix003", "prefix001"]
        );
    }

    #[test]
    fn reorder_rejected_for_questions() {
        let mut state = fixture();
        state.select(0, EntryKind::Question).unwrap();
        assert!(state.reorder_next_of_selected(0, 1).is_err());
    }

    #[test]
    fn question_cardinality_holds_after_every_add() {
        let mut state = fixture();
        state.select(2, EntryKind::Question).unwrap();
        state.add_next_to_selected("prefix001").unwrap();
        state.add_next_to_selected("prefix003").unwrap();
        for question in state.entries(EntryKind::Question) {
            assert!(question.next_entries.len() <= 1);
        }
    }

    #[test]
    fn replace_next_selection_empty_unlinks_question() {
        let mut state = fixture();
        state.select(1, EntryKind::Question).unwrap();
        state.replace_next_selection(&[]).unwrap();
        assert!(state.selected().unwrap().next_entries.is_empty());
    }

    #[test]
    fn replace_next_selection_swaps_question_link() {
        let mut state = fixture();
        state.select(1, EntryKind::Question).unwrap();
        assert_eq!(state.selected().unwrap().next_entries, vec!["prefix002"]);
        // Currently linked answer sits at position 1; position 0 differs too,
        // and the smallest differing position wins: link answer prefix001.
        state.replace_next_selection(&[0]).unwrap();
        let entry = state.selected().unwrap();
        assert_eq!(entry.next_entries, vec!["prefix001"]);
    }

    #[test]
    fn replace_next_selection_unlinks_answer_option() {
        let mut state = fixture();
        state.select(1, EntryKind::Answer).unwrap();
        assert_eq!(state.selected().unwrap().next_entries.len(), 3);
        state.replace_next_selection(&[2, 3]).unwrap();
        let entry = state.selected().unwrap();
        assert_eq!(entry.next_entries, vec!["prefix003", "prefix004"]);
    }

    #[test]
    fn replace_next_selection_links_answer_option() {
        let mut state = fixture();
        state.select(1, EntryKind::Answer).unwrap();
        state.replace_next_selection(&[0, 1, 2, 3]).unwrap();
        let entry = state.selected().unwrap();
        assert_eq!(entry.next_entries.len(), 4);
        assert_eq!(entry.next_entries[3], "prefix002");
    }

    #[test]
    fn replace_next_selection_no_difference_is_a_no_op() {
        let mut state = fixture();
        state.select(1, EntryKind::Answer).unwrap();
        state.replace_next_selection(&[0, 2, 3]).unwrap();
        assert_eq!(
            state.selected().unwrap().next_entries,
            vec!["prefix001", "prefix003", "prefix004"]
        );
    }

    #[test]
    fn replace_next_selection_ignores_dangling_references() {
        let mut state = fixture();
        state.select(1, EntryKind::Answer).unwrap();
        state.add_next_to_selected("otherfile123").unwrap();
        // The dangling reference contributes no position; desired matches the
        // three resolved links, so nothing changes.
        state.replace_next_selection(&[0, 2, 3]).unwrap();
        assert_eq!(state.selected().unwrap().next_entries.len(), 4);
    }

    #[test]
    fn save_then_load_round_trips_through_a_file() {
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hints.yml");
        let mut original = fixture();
        let written = original.save_to_file(Some(&path)).unwrap();
        assert_eq!(written, path);

        let mut loaded = GraphState::new(Some(path));
        let report = loaded.load_from_file(None).unwrap();
        assert_eq!(report.loaded, 7);
        assert!(report.skipped.is_empty());
        assert_sizes(&loaded, 4, 3);
        let answer = loaded.collection(EntryKind::Answer).by_id("prefix002").unwrap();
        assert_eq!(
            answer.next_entries,
            vec!["prefix001", "prefix003", "prefix004"]
        );
    }

    #[test]
    fn load_reports_colliding_ids_without_corrupting_state() {
        use std::fs;

        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hints.yml");
        let mut state = fixture();
        state.save_to_file(Some(&path)).unwrap();

        // Loading the same file again merges nothing: every id collides.
        let report = state.load_from_file(None).unwrap();
        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped.len(), 7);
        assert_sizes(&state, 4, 3);

        // A fresh read of the file still decodes cleanly.
        let raw = fs::read_to_string(&path).unwrap();
        assert!(codec::decode(&raw).unwrap().skipped.is_empty());
    }

    #[test]
    fn failed_load_leaves_state_untouched() {
        let mut state = fixture();
        assert!(state.load_from_file(Some(Path::new("no/such/file.yml"))).is_err());
        assert_sizes(&state, 4, 3);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = fixture();
        state.select(0, EntryKind::Question).unwrap();
        state.reset();
        assert_sizes(&state, 0, 0);
        assert!(state.selected().is_none());
        assert_eq!(state.path(), Path::new(store::DEFAULT_FILE));
    }
}

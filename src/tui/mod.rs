//! Interactive editor: panes for both entry lists, the content editor, and
//! the next-entry links, all driving `GraphState`.

pub mod input;
pub mod render;
pub mod settings;

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};

use crate::config::Config;
use crate::graph::collection::ResolvedRef;
use crate::graph::model::EntryKind;
use crate::graph::state::GraphState;
use crate::tui::input::{Action, Direction, InputMode};
use crate::tui::render::{EntryRow, LinkRow, Pane, PromptView, RefRow, RenderData};
use crate::tui::settings::{SettingsEvent, SettingsPanelState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    AddReference,
    OpenFile,
    SaveAs,
}

#[derive(Debug, Clone)]
struct PendingPrompt {
    title: String,
    buffer: String,
    kind: PromptKind,
}

struct App {
    state: GraphState,
    config: Config,
    focus: Pane,
    question_cursor: usize,
    answer_cursor: usize,
    next_cursor: usize,
    link_cursor: usize,
    editing_content: bool,
    content_lines: Vec<String>,
    content_cursor: (usize, usize),
    show_help: bool,
    show_settings: bool,
    settings_state: SettingsPanelState,
    prompt: Option<PendingPrompt>,
    message: Option<String>,
}

impl App {
    fn new(state: GraphState, config: Config) -> Self {
        Self {
            state,
            config,
            focus: Pane::Questions,
            question_cursor: 0,
            answer_cursor: 0,
            next_cursor: 0,
            link_cursor: 0,
            editing_content: false,
            content_lines: Vec::new(),
            content_cursor: (0, 0),
            show_help: false,
            show_settings: false,
            settings_state: SettingsPanelState::default(),
            prompt: None,
            message: None,
        }
    }

    // -----------------------------------------------------------------------
    // Key handling
    // -----------------------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.show_settings {
            match settings::handle_key(key, &mut self.settings_state, &mut self.config) {
                SettingsEvent::Close => self.show_settings = false,
                SettingsEvent::Changed | SettingsEvent::None => {}
            }
            return Ok(false);
        }
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return Ok(false);
        }
        if self.editing_content {
            self.handle_content_key(key);
            return Ok(false);
        }
        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match input::action_for_key(key, InputMode::Normal) {
            Action::Quit => return Ok(true),
            Action::FocusNext => self.focus = self.focus.next(),
            Action::FocusPrev => self.focus = self.focus.prev(),
            Action::Move(direction) => self.move_cursor(direction),
            Action::Activate => self.activate(),
            Action::AddEntry => self.add_entry(),
            Action::RemoveEntry => self.remove_entry(),
            Action::AddReference => self.open_reference_prompt(),
            Action::RemoveReference => self.remove_reference(),
            Action::MoveReferenceUp => self.move_reference(true),
            Action::MoveReferenceDown => self.move_reference(false),
            Action::Save => self.save(None),
            Action::SaveAs => self.open_path_prompt(PromptKind::SaveAs, "Save as"),
            Action::Open => self.open_path_prompt(PromptKind::OpenFile, "Open hints file"),
            Action::New => self.new_document(),
            Action::OpenSettings => self.show_settings = true,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Cancel => {
                if self.show_help {
                    self.show_help = false;
                } else if self.state.selected().is_some() {
                    self.state.clear_selection();
                    self.sync_content_from_selection();
                } else {
                    self.message = None;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match input::action_for_key(key, InputMode::TextPrompt) {
            Action::Cancel => self.prompt = None,
            Action::Backspace => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.buffer.pop();
                }
            }
            Action::InputChar(c) => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.buffer.push(c);
                }
            }
            Action::SubmitText => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
            _ => {}
        }
    }

    fn handle_content_key(&mut self, key: KeyEvent) {
        match input::action_for_key(key, InputMode::ContentEdit) {
            Action::Cancel => self.editing_content = false,
            Action::NewLine => {
                let (line, col) = self.content_cursor;
                let byte = byte_index(&self.content_lines[line], col);
                let rest = self.content_lines[line].split_off(byte);
                self.content_lines.insert(line + 1, rest);
                self.content_cursor = (line + 1, 0);
                self.commit_content();
            }
            Action::Backspace => {
                let (line, col) = self.content_cursor;
                if col > 0 {
                    let byte = byte_index(&self.content_lines[line], col - 1);
                    self.content_lines[line].remove(byte);
                    self.content_cursor = (line, col - 1);
                    self.commit_content();
                } else if line > 0 {
                    let removed = self.content_lines.remove(line);
                    let previous = &mut self.content_lines[line - 1];
                    let col = previous.chars().count();
                    previous.push_str(&removed);
                    self.content_cursor = (line - 1, col);
                    self.commit_content();
                }
            }
            Action::InputChar(c) => {
                let (line, col) = self.content_cursor;
                let byte = byte_index(&self.content_lines[line], col);
                self.content_lines[line].insert(byte, c);
                self.content_cursor = (line, col + 1);
                self.commit_content();
            }
            Action::Move(direction) => self.move_content_cursor(direction),
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Pane actions
    // -----------------------------------------------------------------------

    fn move_cursor(&mut self, direction: Direction) {
        let delta: isize = match direction {
            Direction::Up => -1,
            Direction::Down => 1,
            Direction::Left | Direction::Right => return,
        };
        let len = match self.focus {
            Pane::Questions => self.state.collection(EntryKind::Question).len(),
            Pane::Answers => self.state.collection(EntryKind::Answer).len(),
            Pane::NextOrder => self.state.next_of_selected().len(),
            Pane::Linking => self.link_target_count(),
            Pane::Content => return,
        };
        let cursor = match self.focus {
            Pane::Questions => &mut self.question_cursor,
            Pane::Answers => &mut self.answer_cursor,
            Pane::NextOrder => &mut self.next_cursor,
            Pane::Linking => &mut self.link_cursor,
            Pane::Content => return,
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = cursor
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    fn activate(&mut self) {
        match self.focus {
            Pane::Questions => self.select_entry(EntryKind::Question),
            Pane::Answers => self.select_entry(EntryKind::Answer),
            Pane::Content => {
                if self.state.selected().is_some() {
                    self.sync_content_from_selection();
                    self.editing_content = true;
                } else {
                    self.message = Some("select an entry first".to_string());
                }
            }
            Pane::NextOrder => {}
            Pane::Linking => self.toggle_link(),
        }
    }

    fn select_entry(&mut self, kind: EntryKind) {
        let cursor = match kind {
            EntryKind::Question => self.question_cursor,
            EntryKind::Answer => self.answer_cursor,
        };
        if self.state.collection(kind).is_empty() {
            return;
        }
        match self.state.select(cursor, kind) {
            Ok(()) => {
                self.next_cursor = 0;
                self.link_cursor = 0;
                self.sync_content_from_selection();
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn add_entry(&mut self) {
        let kind = match self.focus {
            Pane::Questions => EntryKind::Question,
            Pane::Answers => EntryKind::Answer,
            _ => return,
        };
        let prefix = self.config.prefix.clone();
        let created = match self
            .state
            .create_entry(&prefix, self.config.id_digits, kind)
        {
            Ok(entry) => format!("created {} {}", kind, entry.entry_id),
            Err(err) => {
                self.message = Some(err.to_string());
                return;
            }
        };
        let position = self.state.collection(kind).len() - 1;
        match kind {
            EntryKind::Question => self.question_cursor = position,
            EntryKind::Answer => self.answer_cursor = position,
        }
        if let Err(err) = self.state.select(position, kind) {
            self.message = Some(err.to_string());
            return;
        }
        self.sync_content_from_selection();
        self.next_cursor = 0;
        self.link_cursor = 0;
        self.message = Some(created);
    }

    fn remove_entry(&mut self) {
        let (kind, cursor) = match self.focus {
            Pane::Questions => (EntryKind::Question, self.question_cursor),
            Pane::Answers => (EntryKind::Answer, self.answer_cursor),
            _ => return,
        };
        if self.state.collection(kind).is_empty() {
            return;
        }
        if self.state.selected_kind() != Some(kind) {
            self.message = Some(format!("select a {kind} to remove one"));
            return;
        }
        match self.state.remove_entry(Some(cursor)) {
            Ok(()) => {
                self.message = Some(format!("removed {kind}"));
                self.sync_content_from_selection();
                self.clamp_cursors();
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn remove_reference(&mut self) {
        if self.focus != Pane::NextOrder {
            return;
        }
        match self.state.remove_next_from_selected(self.next_cursor) {
            Some(id) => {
                self.message = Some(format!("unlinked {id}"));
                self.clamp_cursors();
            }
            None => self.message = Some("nothing to remove here".to_string()),
        }
    }

    fn move_reference(&mut self, up: bool) {
        if self.focus != Pane::NextOrder {
            return;
        }
        let len = self.state.next_of_selected().len();
        if len < 2 {
            return;
        }
        let i = self.next_cursor;
        let j = if up {
            let Some(j) = i.checked_sub(1) else { return };
            j
        } else {
            if i + 1 >= len {
                return;
            }
            i + 1
        };
        match self.state.reorder_next_of_selected(i, j) {
            Ok(()) => self.next_cursor = j,
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn toggle_link(&mut self) {
        let Some(kind) = self.state.selected_kind() else {
            self.message = Some("select an entry first".to_string());
            return;
        };
        if self.link_cursor >= self.link_target_count() {
            return;
        }
        let desired: Vec<usize> = match kind {
            // A question reports a single-selection list.
            EntryKind::Question => vec![self.link_cursor],
            // An answer reports the full multi-selection with one toggle.
            EntryKind::Answer => {
                let mut positions = self.current_link_positions();
                if !positions.remove(&self.link_cursor) {
                    positions.insert(self.link_cursor);
                }
                positions.into_iter().collect()
            }
        };
        if let Err(err) = self.state.replace_next_selection(&desired) {
            self.message = Some(err.to_string());
        }
        self.clamp_cursors();
    }

    fn open_reference_prompt(&mut self) {
        if self.state.selected().is_none() {
            self.message = Some("select an entry first".to_string());
            return;
        }
        self.prompt = Some(PendingPrompt {
            title: "Next entry id (may be a cross-file id)".to_string(),
            buffer: String::new(),
            kind: PromptKind::AddReference,
        });
    }

    fn open_path_prompt(&mut self, kind: PromptKind, title: &str) {
        self.prompt = Some(PendingPrompt {
            title: title.to_string(),
            buffer: self.state.path().display().to_string(),
            kind,
        });
    }

    fn submit_prompt(&mut self, prompt: PendingPrompt) {
        let text = prompt.buffer.trim().to_string();
        if text.is_empty() {
            return;
        }
        match prompt.kind {
            PromptKind::AddReference => match self.state.add_next_to_selected(&text) {
                Ok(()) => self.message = Some(format!("linked {text}")),
                Err(err) => self.message = Some(err.to_string()),
            },
            PromptKind::OpenFile => {
                match self.state.load_from_file(Some(&PathBuf::from(&text))) {
                    Ok(report) => {
                        self.message = Some(if report.skipped.is_empty() {
                            format!("loaded {} entries", report.loaded)
                        } else {
                            format!(
                                "loaded {} entries, skipped {}",
                                report.loaded,
                                report.skipped.len()
                            )
                        });
                    }
                    Err(err) => self.message = Some(err.to_string()),
                }
                self.sync_content_from_selection();
                self.clamp_cursors();
            }
            PromptKind::SaveAs => self.save(Some(PathBuf::from(&text))),
        }
    }

    fn save(&mut self, path: Option<PathBuf>) {
        match self.state.save_to_file(path.as_deref()) {
            Ok(written) => self.message = Some(format!("saved {}", written.display())),
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn new_document(&mut self) {
        if self.config.autosave
            && let Err(err) = self.state.save_to_file(None)
        {
            self.message = Some(format!("autosave failed: {err}"));
            return;
        }
        self.state.reset();
        self.question_cursor = 0;
        self.answer_cursor = 0;
        self.next_cursor = 0;
        self.link_cursor = 0;
        self.sync_content_from_selection();
        self.message = Some("new document".to_string());
    }

    // -----------------------------------------------------------------------
    // Content buffer
    // -----------------------------------------------------------------------

    fn sync_content_from_selection(&mut self) {
        self.editing_content = false;
        self.content_cursor = (0, 0);
        self.content_lines = match self.state.selected() {
            Some(entry) => entry.content.split('\n').map(String::from).collect(),
            None => Vec::new(),
        };
    }

    fn commit_content(&mut self) {
        let text = self.content_lines.join("\n");
        if self.state.update_selected_content(&text).is_err() {
            self.editing_content = false;
        }
    }

    fn move_content_cursor(&mut self, direction: Direction) {
        let (line, col) = self.content_cursor;
        let clamped_col = |line: usize, col: usize| col.min(self.content_lines[line].chars().count());
        self.content_cursor = match direction {
            Direction::Up if line > 0 => (line - 1, clamped_col(line - 1, col)),
            Direction::Down if line + 1 < self.content_lines.len() => {
                (line + 1, clamped_col(line + 1, col))
            }
            Direction::Left if col > 0 => (line, col - 1),
            Direction::Right => (line, clamped_col(line, col + 1)),
            _ => (line, col),
        };
    }

    // -----------------------------------------------------------------------
    // Derived view state
    // -----------------------------------------------------------------------

    fn link_target_count(&self) -> usize {
        match self.state.opposite_kind() {
            Some(kind) => self.state.collection(kind).len(),
            None => 0,
        }
    }

    fn current_link_positions(&self) -> BTreeSet<usize> {
        self.state
            .next_of_selected()
            .iter()
            .filter_map(ResolvedRef::position)
            .collect()
    }

    fn clamp_cursors(&mut self) {
        let questions = self.state.collection(EntryKind::Question).len();
        let answers = self.state.collection(EntryKind::Answer).len();
        self.question_cursor = self.question_cursor.min(questions.saturating_sub(1));
        self.answer_cursor = self.answer_cursor.min(answers.saturating_sub(1));
        self.next_cursor = self
            .next_cursor
            .min(self.state.next_of_selected().len().saturating_sub(1));
        self.link_cursor = self.link_cursor.min(self.link_target_count().saturating_sub(1));
    }

    fn draw(&self, frame: &mut Frame) {
        let data = self.render_data();
        let prompt = self.prompt.as_ref().map(|prompt| PromptView {
            title: prompt.title.clone(),
            buffer: prompt.buffer.clone(),
        });
        render::draw(frame, &data, prompt.as_ref());
        if self.show_settings {
            settings::draw(frame, &self.settings_state, &self.config);
        }
    }

    fn render_data(&self) -> RenderData {
        let selected_id = self.state.selected().map(|entry| entry.entry_id.clone());
        let selected_kind = self.state.selected_kind();

        let entry_rows = |kind: EntryKind| -> Vec<EntryRow> {
            self.state
                .entries(kind)
                .map(|entry| EntryRow {
                    entry_id: entry.entry_id.clone(),
                    summary: first_line(&entry.content),
                    selected: selected_kind == Some(kind)
                        && selected_id.as_deref() == Some(entry.entry_id.as_str()),
                })
                .collect()
        };

        let next_refs = self
            .state
            .next_of_selected()
            .iter()
            .map(|reference| match reference {
                ResolvedRef::Known { entry, .. } => RefRow {
                    label: if entry.content.is_empty() {
                        entry.entry_id.clone()
                    } else {
                        first_line(&entry.content)
                    },
                    resolved: true,
                },
                ResolvedRef::Unknown(raw) => RefRow {
                    label: raw.to_string(),
                    resolved: false,
                },
            })
            .collect();

        let linked = self.current_link_positions();
        let links = match self.state.opposite_kind() {
            Some(kind) => self
                .state
                .entries(kind)
                .enumerate()
                .map(|(position, entry)| LinkRow {
                    entry_id: entry.entry_id.clone(),
                    summary: first_line(&entry.content),
                    linked: linked.contains(&position),
                })
                .collect(),
            None => Vec::new(),
        };

        let selected_label = self.state.selected().map(|entry| {
            format!("{} {}", entry.kind, entry.entry_id)
        });

        RenderData {
            questions: entry_rows(EntryKind::Question),
            answers: entry_rows(EntryKind::Answer),
            content: self.content_lines.clone(),
            content_cursor: self.content_cursor,
            editing_content: self.editing_content,
            next_refs,
            links,
            focus: self.focus,
            question_cursor: self.question_cursor,
            answer_cursor: self.answer_cursor,
            next_cursor: self.next_cursor,
            link_cursor: self.link_cursor,
            selected_label,
            path: self.state.path().display().to_string(),
            autosave: self.config.autosave,
            prefix: self.config.prefix.clone(),
            id_digits: self.config.id_digits,
            message: self.message.clone(),
            show_help: self.show_help,
        }
    }
}

fn first_line(content: &str) -> String {
    content.lines().next().unwrap_or("").to_string()
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

pub fn run(state: GraphState, config: Config) -> Result<()> {
    let mut app = App::new(state, config);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                continue;
            }
            if app.config.autosave
                && let Err(err) = app.state.save_to_file(None)
            {
                app.message = Some(format!("autosave failed: {err}"));
            }
            if app.handle_key(key)? {
                break;
            }
        }
    }

    if app.config.autosave {
        app.state.save_to_file(None)?;
    }
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

//! Pane layout and drawing for the editor screen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Questions,
    Answers,
    Content,
    NextOrder,
    Linking,
}

impl Pane {
    pub fn next(self) -> Self {
        match self {
            Self::Questions => Self::Answers,
            Self::Answers => Self::Content,
            Self::Content => Self::NextOrder,
            Self::NextOrder => Self::Linking,
            Self::Linking => Self::Questions,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Questions => Self::Linking,
            Self::Answers => Self::Questions,
            Self::Content => Self::Answers,
            Self::NextOrder => Self::Content,
            Self::Linking => Self::NextOrder,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Questions => "Questions",
            Self::Answers => "Answers",
            Self::Content => "Content",
            Self::NextOrder => "Next entries",
            Self::Linking => "Link targets",
        }
    }
}

/// One row in the question or answer list.
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub entry_id: String,
    pub summary: String,
    pub selected: bool,
}

/// One row in the next-entry order list.
#[derive(Debug, Clone)]
pub struct RefRow {
    pub label: String,
    pub resolved: bool,
}

/// One row in the linking list of opposite-kind entries.
#[derive(Debug, Clone)]
pub struct LinkRow {
    pub entry_id: String,
    pub summary: String,
    pub linked: bool,
}

#[derive(Debug, Clone)]
pub struct PromptView {
    pub title: String,
    pub buffer: String,
}

/// Everything the screen needs for one frame.
#[derive(Debug, Clone)]
pub struct RenderData {
    pub questions: Vec<EntryRow>,
    pub answers: Vec<EntryRow>,
    pub content: Vec<String>,
    pub content_cursor: (usize, usize),
    pub editing_content: bool,
    pub next_refs: Vec<RefRow>,
    pub links: Vec<LinkRow>,
    pub focus: Pane,
    pub question_cursor: usize,
    pub answer_cursor: usize,
    pub next_cursor: usize,
    pub link_cursor: usize,
    pub selected_label: Option<String>,
    pub path: String,
    pub autosave: bool,
    pub prefix: String,
    pub id_digits: usize,
    pub message: Option<String>,
    pub show_help: bool,
}

pub fn draw(frame: &mut Frame, data: &RenderData, prompt: Option<&PromptView>) {
    let [main, status] =
        Layout::vertical([Constraint::Min(6), Constraint::Length(2)]).areas(frame.area());
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(42), Constraint::Percentage(58)]).areas(main);
    let [questions_area, answers_area] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(left);
    let [content_area, next_area, link_area] = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Percentage(26),
        Constraint::Percentage(34),
    ])
    .areas(right);

    draw_entry_list(
        frame,
        questions_area,
        Pane::Questions,
        data,
        &data.questions,
        data.question_cursor,
    );
    draw_entry_list(
        frame,
        answers_area,
        Pane::Answers,
        data,
        &data.answers,
        data.answer_cursor,
    );
    draw_content(frame, content_area, data);
    draw_next_refs(frame, next_area, data);
    draw_links(frame, link_area, data);
    draw_status(frame, status, data);

    if data.show_help {
        draw_help(frame);
    }
    if let Some(prompt) = prompt {
        draw_prompt(frame, prompt);
    }
}

fn pane_block(pane: Pane, data: &RenderData) -> Block<'static> {
    let focused = data.focus == pane;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Block::default()
        .title(Span::styled(pane.title(), title_style))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .padding(Padding::horizontal(1))
}

fn draw_entry_list(
    frame: &mut Frame,
    area: Rect,
    pane: Pane,
    data: &RenderData,
    rows: &[EntryRow],
    cursor: usize,
) {
    let focused = data.focus == pane;
    let height = area.height.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    for (idx, row) in windowed(rows, cursor, height) {
        let marker = if row.selected { "*" } else { " " };
        let mut id_style = Style::default().fg(Color::DarkGray);
        let mut text_style = if row.selected {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        if focused && idx == cursor {
            id_style = id_style.bg(Color::DarkGray).fg(Color::White);
            text_style = text_style.bg(Color::DarkGray).fg(Color::White);
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<12} ", row.entry_id), id_style),
            Span::styled(row.summary.clone(), text_style),
        ]));
    }
    if rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "(empty — press 'a' to add)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(lines).block(pane_block(pane, data)), area);
}

fn draw_content(frame: &mut Frame, area: Rect, data: &RenderData) {
    let mut lines: Vec<Line> = Vec::new();
    if data.selected_label.is_none() {
        lines.push(Line::from(Span::styled(
            "Select an entry to edit its content.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        let (cur_line, cur_col) = data.content_cursor;
        for (idx, text) in data.content.iter().enumerate() {
            if data.editing_content && idx == cur_line {
                lines.push(line_with_cursor(text, cur_col));
            } else {
                lines.push(Line::from(Span::raw(text.clone())));
            }
        }
    }

    let mut block = pane_block(Pane::Content, data);
    if let Some(label) = &data.selected_label {
        let suffix = if data.editing_content {
            "  [editing — Esc done]"
        } else {
            "  [Enter to edit]"
        };
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {label}{suffix} "),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn line_with_cursor(text: &str, col: usize) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    let col = col.min(chars.len());
    let before: String = chars[..col].iter().collect();
    let caret_style = Style::default().add_modifier(Modifier::REVERSED);
    if col == chars.len() {
        return Line::from(vec![
            Span::raw(before),
            Span::styled(" ".to_string(), caret_style),
        ]);
    }
    let at: String = chars[col].to_string();
    let after: String = chars[col + 1..].iter().collect();
    Line::from(vec![
        Span::raw(before),
        Span::styled(at, caret_style),
        Span::raw(after),
    ])
}

fn draw_next_refs(frame: &mut Frame, area: Rect, data: &RenderData) {
    let focused = data.focus == Pane::NextOrder;
    let height = area.height.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    for (idx, row) in windowed(&data.next_refs, data.next_cursor, height) {
        let mut style = if row.resolved {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        if focused && idx == data.next_cursor {
            style = style.bg(Color::DarkGray).fg(Color::White);
        }
        let tag = if row.resolved { "  " } else { "? " };
        lines.push(Line::from(Span::styled(
            format!("{:>2}. {tag}{}", idx + 1, row.label),
            style,
        )));
    }
    if data.next_refs.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no next entries)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).block(pane_block(Pane::NextOrder, data)),
        area,
    );
}

fn draw_links(frame: &mut Frame, area: Rect, data: &RenderData) {
    let focused = data.focus == Pane::Linking;
    let height = area.height.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    for (idx, row) in windowed(&data.links, data.link_cursor, height) {
        let marker = if row.linked { "[x]" } else { "[ ]" };
        let mut style = if row.linked {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        if focused && idx == data.link_cursor {
            style = style.bg(Color::DarkGray).fg(Color::White);
        }
        lines.push(Line::from(Span::styled(
            format!("{marker} {:<12} {}", row.entry_id, row.summary),
            style,
        )));
    }
    if data.links.is_empty() {
        lines.push(Line::from(Span::styled(
            "(select an entry to link from)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).block(pane_block(Pane::Linking, data)),
        area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, data: &RenderData) {
    let mut top = vec![
        Span::styled(data.path.clone(), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("  prefix:{}  width:{}", data.prefix, data.id_digits),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if data.autosave {
        top.push(Span::styled(
            "  [autosave]",
            Style::default().fg(Color::Green),
        ));
    }
    if let Some(message) = &data.message {
        top.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let hints = match data.focus {
        Pane::Questions | Pane::Answers => {
            "Enter select · a add · d delete · Tab pane · s save · ? help · q quit"
        }
        Pane::Content => "Enter edit · Tab pane · ? help",
        Pane::NextOrder => "[ / ] reorder · x remove · i add id · Tab pane · ? help",
        Pane::Linking => "Enter toggle link · Tab pane · ? help",
    };

    let lines = vec![
        Line::from(top),
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 60, 70);
    frame.render_widget(Clear, area);
    let rows: [(&str, &str); 13] = [
        ("Tab / Shift-Tab", "cycle panes"),
        ("arrows / jk", "move within a pane"),
        ("Enter", "select entry · edit content · toggle link"),
        ("a", "add a question/answer in the focused list"),
        ("d", "delete the highlighted entry"),
        ("i", "add a next-entry reference by raw id"),
        ("x", "remove the highlighted next entry"),
        ("[ / ]", "move the highlighted next entry up / down"),
        ("s / S", "save / save as"),
        ("o", "open a hints file"),
        ("n", "new document (discard state)"),
        ("p", "preferences (prefix, id width, autosave)"),
        ("q", "quit"),
    ];
    let mut lines = Vec::new();
    for (keys, what) in rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {keys:<16}"),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(what, Style::default().fg(Color::Gray)),
        ]));
    }
    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                "Keys",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(1, 1, 1, 0)),
    );
    frame.render_widget(panel, area);
}

fn draw_prompt(frame: &mut Frame, prompt: &PromptView) {
    let area = centered_rect(frame.area(), 50, 20);
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(Span::styled(
            prompt.title.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(vec![
            Span::raw(prompt.buffer.clone()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]),
        Line::from(Span::styled(
            "Enter confirm · Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(1, 1, 0, 0)),
    );
    frame.render_widget(panel, area);
}

/// The slice of rows to show so the cursor stays visible, with indices.
fn windowed<T>(rows: &[T], cursor: usize, height: usize) -> impl Iterator<Item = (usize, &T)> {
    let start = if height == 0 {
        0
    } else {
        cursor.saturating_sub(height.saturating_sub(1))
    };
    rows.iter().enumerate().skip(start).take(height.max(1))
}

fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(vertical[1])[1]
}

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    None,
    Changed,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPanelState {
    pub selected_row: usize,
}

const SETTINGS_ROW_COUNT: usize = 3;

const ROW_PREFIX: usize = 0;
const ROW_ID_WIDTH: usize = 1;
const ROW_AUTOSAVE: usize = 2;

pub fn handle_key(
    key: KeyEvent,
    state: &mut SettingsPanelState,
    config: &mut Config,
) -> SettingsEvent {
    match key.code {
        KeyCode::Esc => SettingsEvent::Close,
        KeyCode::Up => {
            state.selected_row = state.selected_row.saturating_sub(1);
            SettingsEvent::None
        }
        KeyCode::Down => {
            state.selected_row = (state.selected_row + 1).min(SETTINGS_ROW_COUNT - 1);
            SettingsEvent::None
        }
        KeyCode::Left => adjust(config, state.selected_row, false),
        KeyCode::Right => adjust(config, state.selected_row, true),
        KeyCode::Enter | KeyCode::Char(' ') if state.selected_row == ROW_AUTOSAVE => {
            config.autosave = !config.autosave;
            SettingsEvent::Changed
        }
        KeyCode::Backspace if state.selected_row == ROW_PREFIX => {
            config.prefix.pop();
            SettingsEvent::Changed
        }
        KeyCode::Char(c) if state.selected_row == ROW_PREFIX && !c.is_whitespace() => {
            config.prefix.push(c);
            SettingsEvent::Changed
        }
        _ => SettingsEvent::None,
    }
}

fn adjust(config: &mut Config, selected_row: usize, increase: bool) -> SettingsEvent {
    match selected_row {
        ROW_ID_WIDTH => {
            config.id_digits = if increase {
                (config.id_digits + 1).min(9)
            } else {
                config.id_digits.saturating_sub(1).max(1)
            };
            SettingsEvent::Changed
        }
        ROW_AUTOSAVE => {
            config.autosave = !config.autosave;
            SettingsEvent::Changed
        }
        _ => SettingsEvent::None,
    }
}

pub fn draw(frame: &mut Frame, state: &SettingsPanelState, config: &Config) {
    let area = centered_rect(frame.area(), 52, 40);
    frame.render_widget(Clear, area);

    let title = Line::from(vec![
        Span::styled(
            "Preferences",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[Esc] close", Style::default().fg(Color::Gray)),
    ]);

    let selected_row = state.selected_row.min(SETTINGS_ROW_COUNT - 1);
    let mut lines = vec![
        settings_row(selected_row == ROW_PREFIX, "id prefix", &config.prefix),
        settings_row(
            selected_row == ROW_ID_WIDTH,
            "id number width",
            &config.id_digits.to_string(),
        ),
        settings_row(
            selected_row == ROW_AUTOSAVE,
            "autosave",
            if config.autosave { "[ON]" } else { "[OFF]" },
        ),
        Line::from(""),
    ];
    for text in selected_row_description(selected_row) {
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::new(1, 1, 1, 0)),
    );
    frame.render_widget(panel, area);
}

fn settings_row(selected: bool, key: &str, value: &str) -> Line<'static> {
    let indicator = if selected { ">" } else { " " };
    let base_style = if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let value_style = if selected {
        Style::default()
            .fg(Color::Green)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    Line::from(vec![
        Span::styled(format!("{indicator} {key:<18}"), base_style),
        Span::styled(value.to_string(), value_style),
    ])
}

fn selected_row_description(selected_row: usize) -> [&'static str; 2] {
    match selected_row {
        ROW_PREFIX => [
            "Prefix prepended to newly allocated ids.",
            "Type to extend, Backspace to shorten.",
        ],
        ROW_ID_WIDTH => [
            "Zero-padded width of the numeric id part.",
            "Adjust with Left/Right.",
        ],
        ROW_AUTOSAVE => [
            "Save before every change and again on exit.",
            "Toggle with Enter or Space.",
        ],
        _ => ["", ""],
    }
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

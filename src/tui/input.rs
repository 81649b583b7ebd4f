use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    TextPrompt,
    ContentEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    FocusNext,
    FocusPrev,
    Activate,
    AddEntry,
    RemoveEntry,
    AddReference,
    RemoveReference,
    MoveReferenceUp,
    MoveReferenceDown,
    Save,
    SaveAs,
    Open,
    New,
    OpenSettings,
    ToggleHelp,
    Quit,
    Cancel,
    SubmitText,
    Backspace,
    NewLine,
    InputChar(char),
    Noop,
}

pub fn action_for_key(key: KeyEvent, mode: InputMode) -> Action {
    match mode {
        InputMode::TextPrompt => match key.code {
            KeyCode::Enter => Action::SubmitText,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::Noop,
        },
        InputMode::ContentEdit => match key.code {
            KeyCode::Esc => Action::Cancel,
            KeyCode::Enter => Action::NewLine,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Up => Action::Move(Direction::Up),
            KeyCode::Down => Action::Move(Direction::Down),
            KeyCode::Left => Action::Move(Direction::Left),
            KeyCode::Right => Action::Move(Direction::Right),
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::Noop,
        },
        InputMode::Normal => match key.code {
            KeyCode::Tab => Action::FocusNext,
            KeyCode::BackTab => Action::FocusPrev,
            KeyCode::Up => Action::Move(Direction::Up),
            KeyCode::Down => Action::Move(Direction::Down),
            KeyCode::Left => Action::Move(Direction::Left),
            KeyCode::Right => Action::Move(Direction::Right),
            KeyCode::Enter => Action::Activate,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Char('k') => Action::Move(Direction::Up),
            KeyCode::Char('j') => Action::Move(Direction::Down),
            KeyCode::Char('a') => Action::AddEntry,
            KeyCode::Char('d') => Action::RemoveEntry,
            KeyCode::Char('i') => Action::AddReference,
            KeyCode::Char('x') => Action::RemoveReference,
            KeyCode::Char('[') => Action::MoveReferenceUp,
            KeyCode::Char(']') => Action::MoveReferenceDown,
            KeyCode::Char('s') => Action::Save,
            KeyCode::Char('S') => Action::SaveAs,
            KeyCode::Char('o') => Action::Open,
            KeyCode::Char('n') => Action::New,
            KeyCode::Char('p') => Action::OpenSettings,
            KeyCode::Char('?') => Action::ToggleHelp,
            KeyCode::Char('q') => Action::Quit,
            _ => Action::Noop,
        },
    }
}

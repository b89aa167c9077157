//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::NetworkId;

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Network
    NextNetwork,
    SwitchNetwork(NetworkId),
    RefreshRegistry,

    // Panel navigation
    NextPanel,
    PrevPanel,
    MoveUp,
    MoveDown,
    Activate,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    Newline,
    NextField,

    // Request actions
    SendRequest,

    // Sidebar
    StartSearch,
    NewCollection,
    RenameCollection,
    AddEndpoint,
    EditEndpoint,

    // Headers / environment / sidebar, depending on the focused panel
    AddItem,
    DeleteItem,

    // Environment
    RenameVariable,
    ToggleReveal,

    // Response
    NextResponseTab,
    PrevResponseTab,

    // Dialogs
    DialogChar(char),
    DialogBackspace,
    DialogNextField,
    DialogPrevField,
    DialogLeft,
    DialogRight,
    DialogSubmit,
    DialogCancel,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Focusable panels, in Tab order
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Panel {
    #[default]
    Collections,
    Body,
    Headers,
    Response,
    Environment,
    History,
}

impl Panel {
    pub fn next(&self) -> Panel {
        match self {
            Panel::Collections => Panel::Body,
            Panel::Body => Panel::Headers,
            Panel::Headers => Panel::Response,
            Panel::Response => Panel::Environment,
            Panel::Environment => Panel::History,
            Panel::History => Panel::Collections,
        }
    }

    pub fn prev(&self) -> Panel {
        match self {
            Panel::Collections => Panel::History,
            Panel::Body => Panel::Collections,
            Panel::Headers => Panel::Body,
            Panel::Response => Panel::Headers,
            Panel::Environment => Panel::Response,
            Panel::History => Panel::Environment,
        }
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Which key layout an open dialog uses
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DialogKind {
    Form,
    Confirm,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_panel: Panel,
    input_mode: InputMode,
    show_help: bool,
    dialog: Option<DialogKind>,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    match dialog {
        Some(DialogKind::Confirm) => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Enter => Some(UiEvent::DialogSubmit),
                KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::DialogCancel),
                _ => None,
            };
        }
        Some(DialogKind::Form) => {
            return match key.code {
                KeyCode::Esc => Some(UiEvent::DialogCancel),
                KeyCode::Enter => Some(UiEvent::DialogSubmit),
                KeyCode::Tab | KeyCode::Down => Some(UiEvent::DialogNextField),
                KeyCode::BackTab | KeyCode::Up => Some(UiEvent::DialogPrevField),
                KeyCode::Left => Some(UiEvent::DialogLeft),
                KeyCode::Right => Some(UiEvent::DialogRight),
                KeyCode::Backspace => Some(UiEvent::DialogBackspace),
                KeyCode::Char(c) => Some(UiEvent::DialogChar(c)),
                _ => None,
            };
        }
        None => {}
    }

    match input_mode {
        InputMode::Normal => normal_mode_keys(key, active_panel),
        InputMode::Editing => match key.code {
            KeyCode::Esc => Some(UiEvent::StopEditing),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            KeyCode::Tab if active_panel == Panel::Headers => Some(UiEvent::NextField),
            KeyCode::Enter if active_panel == Panel::Body => Some(UiEvent::Newline),
            KeyCode::Enter => Some(UiEvent::StopEditing),
            _ => None,
        },
    }
}

fn normal_mode_keys(key: KeyEvent, active_panel: Panel) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Tab => Some(UiEvent::NextPanel),
        KeyCode::BackTab => Some(UiEvent::PrevPanel),
        KeyCode::Char('n') => Some(UiEvent::NextNetwork),
        KeyCode::Char('1') => Some(UiEvent::SwitchNetwork(NetworkId::Testnet)),
        KeyCode::Char('2') => Some(UiEvent::SwitchNetwork(NetworkId::Public)),
        KeyCode::Char('3') => Some(UiEvent::SwitchNetwork(NetworkId::Kipaji)),
        KeyCode::Char('s') => Some(UiEvent::SendRequest),
        KeyCode::Char('R') => Some(UiEvent::RefreshRegistry),
        KeyCode::Char('v') => Some(UiEvent::ToggleReveal),
        KeyCode::Up => Some(UiEvent::MoveUp),
        KeyCode::Down => Some(UiEvent::MoveDown),
        KeyCode::Enter => Some(UiEvent::Activate),
        KeyCode::Left if active_panel == Panel::Response => Some(UiEvent::PrevResponseTab),
        KeyCode::Right if active_panel == Panel::Response => Some(UiEvent::NextResponseTab),
        KeyCode::Char('/') if active_panel == Panel::Collections => Some(UiEvent::StartSearch),
        KeyCode::Char('c') if active_panel == Panel::Collections => Some(UiEvent::NewCollection),
        KeyCode::Char('r') if active_panel == Panel::Collections => Some(UiEvent::RenameCollection),
        KeyCode::Char('e') if active_panel == Panel::Collections => Some(UiEvent::EditEndpoint),
        KeyCode::Char('a') if active_panel == Panel::Collections => Some(UiEvent::AddEndpoint),
        KeyCode::Char('k') if active_panel == Panel::Environment => Some(UiEvent::RenameVariable),
        KeyCode::Char('e') => match active_panel {
            Panel::Body | Panel::Headers | Panel::Environment => Some(UiEvent::StartEditing),
            _ => None,
        },
        KeyCode::Char('a') => match active_panel {
            Panel::Headers | Panel::Environment => Some(UiEvent::AddItem),
            _ => None,
        },
        KeyCode::Char('d') => match active_panel {
            Panel::Collections | Panel::Headers | Panel::Environment => Some(UiEvent::DeleteItem),
            _ => None,
        },
        _ => None,
    }
}

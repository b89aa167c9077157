//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::{ConsolePhase, Dialog, HeaderField, Notice, ResponseTab, SidebarRow};
use crate::messages::ui_events::{InputMode, Panel};
use crate::models::{HistoryEntry, NetworkId, PendingRequest, ResponseRecord};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub network: NetworkId,
    pub phase: ConsolePhase,
    /// A registry fetch or mutation is outstanding
    pub is_loading: bool,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub cursor_position: usize,

    // Sidebar
    pub search: String,
    pub editing_search: bool,
    pub sidebar_rows: Vec<SidebarRow>,
    pub sidebar_index: usize,

    // Request
    pub pending: Option<PendingRequest>,
    pub resolved_url: Option<String>,
    pub selected_header: usize,
    pub header_field: HeaderField,

    // Response
    pub response: Option<ResponseRecord>,
    pub response_tab: ResponseTab,
    pub response_scroll: u16,

    // Environment, already masked unless revealed
    pub environment: Vec<(String, String)>,
    pub selected_variable: usize,
    pub reveal_secrets: bool,

    // History, newest first
    pub history: Vec<HistoryEntry>,
    pub selected_history: usize,

    // Popups
    pub dialog: Option<Dialog>,
    pub show_help: bool,
    pub notice: Option<Notice>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            network: NetworkId::default(),
            phase: ConsolePhase::Idle,
            is_loading: false,
            active_panel: Panel::Collections,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            search: String::new(),
            editing_search: false,
            sidebar_rows: Vec::new(),
            sidebar_index: 0,
            pending: None,
            resolved_url: None,
            selected_header: 0,
            header_field: HeaderField::default(),
            response: None,
            response_tab: ResponseTab::default(),
            response_scroll: 0,
            environment: Vec::new(),
            selected_variable: 0,
            reveal_secrets: false,
            history: Vec::new(),
            selected_history: 0,
            dialog: None,
            show_help: false,
            notice: None,
        }
    }
}

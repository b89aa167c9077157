//! Console state - one aggregate owning every store, no I/O logic

use std::collections::{HashMap, HashSet};

use crate::config::ConsoleConfig;
use crate::environment::EnvironmentStore;
use crate::history::HistoryLedger;
use crate::messages::ui_events::{DialogKind, InputMode, Panel};
use crate::messages::RenderState;
use crate::models::{
    CollisionPolicy, EndpointDescriptor, EndpointIdentity, HistoryEntry, NetworkId,
    PendingRequest, ResponseRecord,
};
use crate::registry::{EndpointDraft, RegistryCache};

/// Controller state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsolePhase {
    /// No endpoint selected
    Idle,
    /// Endpoint selected, nothing in flight for it
    Viewing,
    /// The selected endpoint's request is in flight
    Sending,
}

/// Response panel view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResponseTab {
    #[default]
    Pretty,
    Raw,
    Headers,
}

impl ResponseTab {
    pub fn next(&self) -> ResponseTab {
        match self {
            ResponseTab::Pretty => ResponseTab::Raw,
            ResponseTab::Raw => ResponseTab::Headers,
            ResponseTab::Headers => ResponseTab::Pretty,
        }
    }

    pub fn prev(&self) -> ResponseTab {
        match self {
            ResponseTab::Pretty => ResponseTab::Headers,
            ResponseTab::Raw => ResponseTab::Pretty,
            ResponseTab::Headers => ResponseTab::Raw,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ResponseTab::Pretty => 0,
            ResponseTab::Raw => 1,
            ResponseTab::Headers => 2,
        }
    }
}

/// Header editing field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HeaderField {
    Key,
    #[default]
    Value,
}

/// Endpoint form fields, in Tab order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EndpointField {
    #[default]
    Method,
    Path,
    Description,
    Body,
}

impl EndpointField {
    pub fn next(&self) -> EndpointField {
        match self {
            EndpointField::Method => EndpointField::Path,
            EndpointField::Path => EndpointField::Description,
            EndpointField::Description => EndpointField::Body,
            EndpointField::Body => EndpointField::Method,
        }
    }

    pub fn prev(&self) -> EndpointField {
        match self {
            EndpointField::Method => EndpointField::Body,
            EndpointField::Path => EndpointField::Method,
            EndpointField::Description => EndpointField::Path,
            EndpointField::Body => EndpointField::Description,
        }
    }
}

/// New variable form fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VariableField {
    #[default]
    Key,
    Value,
}

/// Modal sub-states; none of them interrupts an in-flight send
#[derive(Clone, Debug, PartialEq)]
pub enum Dialog {
    NewCollection {
        name: String,
    },
    RenameCollection {
        from: String,
        name: String,
    },
    ConfirmDeleteCollection {
        name: String,
    },
    EndpointForm {
        collection: String,
        editing: Option<EndpointIdentity>,
        draft: EndpointDraft,
        field: EndpointField,
    },
    ConfirmDeleteEndpoint {
        collection: String,
        identity: EndpointIdentity,
    },
    NewVariable {
        key: String,
        value: String,
        field: VariableField,
    },
    RenameVariable {
        from: String,
        name: String,
    },
}

impl Dialog {
    pub fn kind(&self) -> DialogKind {
        match self {
            Dialog::ConfirmDeleteCollection { .. } | Dialog::ConfirmDeleteEndpoint { .. } => {
                DialogKind::Confirm
            }
            _ => DialogKind::Form,
        }
    }

    /// Text field under the cursor, if the focused field is textual
    pub fn input(&self) -> Option<&String> {
        match self {
            Dialog::NewCollection { name } | Dialog::RenameCollection { name, .. } => Some(name),
            Dialog::RenameVariable { name, .. } => Some(name),
            Dialog::EndpointForm { draft, field, .. } => match field {
                EndpointField::Method => None,
                EndpointField::Path => Some(&draft.path),
                EndpointField::Description => Some(&draft.description),
                EndpointField::Body => Some(&draft.body_text),
            },
            Dialog::NewVariable { key, value, field } => match field {
                VariableField::Key => Some(key),
                VariableField::Value => Some(value),
            },
            Dialog::ConfirmDeleteCollection { .. } | Dialog::ConfirmDeleteEndpoint { .. } => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut String> {
        match self {
            Dialog::NewCollection { name } | Dialog::RenameCollection { name, .. } => Some(name),
            Dialog::RenameVariable { name, .. } => Some(name),
            Dialog::EndpointForm { draft, field, .. } => match field {
                EndpointField::Method => None,
                EndpointField::Path => Some(&mut draft.path),
                EndpointField::Description => Some(&mut draft.description),
                EndpointField::Body => Some(&mut draft.body_text),
            },
            Dialog::NewVariable { key, value, field } => match field {
                VariableField::Key => Some(key),
                VariableField::Value => Some(value),
            },
            Dialog::ConfirmDeleteCollection { .. } | Dialog::ConfirmDeleteEndpoint { .. } => None,
        }
    }
}

/// Status line message
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            is_error: true,
        }
    }
}

/// One row of the collection tree
#[derive(Clone, Debug, PartialEq)]
pub enum SidebarRow {
    Group {
        name: String,
        count: usize,
        expanded: bool,
    },
    Endpoint {
        group: String,
        endpoint: EndpointDescriptor,
    },
}

/// A send that has not come back yet
#[derive(Clone, Debug)]
pub(crate) struct InFlightSend {
    /// Selection the send was made from
    pub generation: u64,
    pub entry: HistoryEntry,
}

/// Everything the console knows during a session
pub struct ConsoleState {
    // Stores
    pub network: NetworkId,
    pub environments: EnvironmentStore,
    pub registry: RegistryCache,
    pub history: HistoryLedger,

    // Request / response
    pub pending: Option<PendingRequest>,
    pub response: Option<ResponseRecord>,
    pub(crate) next_request_id: u64,
    pub(crate) selection_generation: u64,
    pub(crate) active_send: Option<u64>,
    pub(crate) in_flight: HashMap<u64, InFlightSend>,
    /// Outstanding registry calls and what they were for
    pub(crate) registry_requests: HashMap<u64, String>,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub editing_search: bool,
    pub search: String,
    pub sidebar_index: usize,
    pub expanded: HashSet<String>,
    pub selected_header: usize,
    pub header_field: HeaderField,
    pub response_tab: ResponseTab,
    pub response_scroll: u16,
    pub selected_variable: usize,
    pub reveal_secrets: bool,
    pub selected_history: usize,

    // Popups
    pub dialog: Option<Dialog>,
    pub show_help: bool,
    pub notice: Option<Notice>,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new(NetworkId::default())
    }
}

impl ConsoleState {
    pub fn new(network: NetworkId) -> Self {
        ConsoleState {
            network,
            environments: EnvironmentStore::with_defaults(),
            registry: RegistryCache::new(network),
            history: HistoryLedger::new(),
            pending: None,
            response: None,
            next_request_id: 1,
            selection_generation: 0,
            active_send: None,
            in_flight: HashMap::new(),
            registry_requests: HashMap::new(),
            active_panel: Panel::Collections,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            editing_search: false,
            search: String::new(),
            sidebar_index: 0,
            expanded: HashSet::new(),
            selected_header: 0,
            header_field: HeaderField::default(),
            response_tab: ResponseTab::default(),
            response_scroll: 0,
            selected_variable: 0,
            reveal_secrets: false,
            selected_history: 0,
            dialog: None,
            show_help: false,
            notice: None,
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Self {
        let mut state = ConsoleState::new(config.initial_network);
        state.environments = config.environments.clone().with_policy(config.collision_policy);
        state.registry = RegistryCache::new(config.initial_network).with_policy(config.collision_policy);
        state
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.environments = self.environments.with_policy(policy);
        self.registry = self.registry.with_policy(policy);
        self
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn phase(&self) -> ConsolePhase {
        match (&self.pending, self.active_send) {
            (None, _) => ConsolePhase::Idle,
            (Some(_), Some(_)) => ConsolePhase::Sending,
            (Some(_), None) => ConsolePhase::Viewing,
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.registry_requests.is_empty()
    }

    /// Rows of the collection tree after search filtering
    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        let searching = !self.search.trim().is_empty();
        let mut rows = Vec::new();
        for (group, endpoints) in self.registry.filter(&self.search) {
            let expanded = searching || self.expanded.contains(&group);
            rows.push(SidebarRow::Group {
                name: group.clone(),
                count: endpoints.len(),
                expanded,
            });
            if expanded {
                for endpoint in endpoints {
                    rows.push(SidebarRow::Endpoint {
                        group: group.clone(),
                        endpoint,
                    });
                }
            }
        }
        rows
    }

    /// Collection name of the highlighted row
    pub fn selected_group(&self) -> Option<String> {
        match self.sidebar_rows().into_iter().nth(self.sidebar_index)? {
            SidebarRow::Group { name, .. } => Some(name),
            SidebarRow::Endpoint { group, .. } => Some(group),
        }
    }

    /// URL the send button would hit
    pub fn resolved_url(&self) -> Option<String> {
        self.pending
            .as_ref()
            .map(|p| format!("{}{}", self.environments.base_url(self.network), p.endpoint.path))
    }

    /// Get the current input field content
    pub fn current_input(&self) -> Option<&str> {
        if let Some(dialog) = &self.dialog {
            return dialog.input().map(String::as_str);
        }
        match self.active_panel {
            Panel::Collections if self.editing_search => Some(self.search.as_str()),
            Panel::Body => self.pending.as_ref().map(|p| p.body.as_str()),
            Panel::Headers => {
                let header = self.pending.as_ref()?.headers.get(self.selected_header)?;
                Some(match self.header_field {
                    HeaderField::Key => header.key.as_str(),
                    HeaderField::Value => header.value.as_str(),
                })
            }
            Panel::Environment => {
                let key = self.environments.key_at(self.network, self.selected_variable)?;
                self.environments.value(self.network, key).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Get mutable reference to current input field
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        if let Some(dialog) = &mut self.dialog {
            return dialog.input_mut();
        }
        match self.active_panel {
            Panel::Collections if self.editing_search => Some(&mut self.search),
            Panel::Body => self.pending.as_mut().map(|p| &mut p.body),
            Panel::Headers => {
                let field = self.header_field;
                let header = self.pending.as_mut()?.headers.get_mut(self.selected_header)?;
                Some(match field {
                    HeaderField::Key => &mut header.key,
                    HeaderField::Value => &mut header.value,
                })
            }
            Panel::Environment => {
                let key = self
                    .environments
                    .key_at(self.network, self.selected_variable)?
                    .to_string();
                self.environments.value_mut(self.network, &key)
            }
            _ => None,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            network: self.network,
            phase: self.phase(),
            is_loading: self.is_loading(),
            active_panel: self.active_panel,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            search: self.search.clone(),
            editing_search: self.editing_search,
            sidebar_rows: self.sidebar_rows(),
            sidebar_index: self.sidebar_index,
            pending: self.pending.clone(),
            resolved_url: self.resolved_url(),
            selected_header: self.selected_header,
            header_field: self.header_field,
            response: self.response.clone(),
            response_tab: self.response_tab,
            response_scroll: self.response_scroll,
            environment: self.environments.masked_entries(self.network, self.reveal_secrets),
            selected_variable: self.selected_variable,
            reveal_secrets: self.reveal_secrets,
            history: self.history.list(),
            selected_history: self.selected_history,
            dialog: self.dialog.clone(),
            show_help: self.show_help,
            notice: self.notice.clone(),
        }
    }
}

//! Command handlers - business logic for processing UI events

use crate::app::state::{
    ConsoleState, Dialog, EndpointField, HeaderField, InFlightSend, Notice, SidebarRow,
    VariableField,
};
use crate::constants::HISTORY_GROUP;
use crate::environment::is_required;
use crate::messages::ui_events::{InputMode, Panel};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{
    EndpointDescriptor, Header, HistoryEntry, NetworkId, PendingRequest, ResponseRecord,
};
use crate::network::build_request;
use crate::registry::{EndpointDraft, RegistryMutation};

const REFRESH_ACTION: &str = "refresh";

impl ConsoleState {
    // ========================
    // Navigation
    // ========================

    pub fn next_panel(&mut self) {
        self.active_panel = self.active_panel.next();
    }

    pub fn prev_panel(&mut self) {
        self.active_panel = self.active_panel.prev();
    }

    pub fn move_up(&mut self) {
        match self.active_panel {
            Panel::Collections => self.sidebar_index = self.sidebar_index.saturating_sub(1),
            Panel::Headers => self.selected_header = self.selected_header.saturating_sub(1),
            Panel::Response => self.response_scroll = self.response_scroll.saturating_sub(1),
            Panel::Environment => self.selected_variable = self.selected_variable.saturating_sub(1),
            Panel::History => self.selected_history = self.selected_history.saturating_sub(1),
            Panel::Body => {}
        }
    }

    pub fn move_down(&mut self) {
        match self.active_panel {
            Panel::Collections => {
                let len = self.sidebar_rows().len();
                if self.sidebar_index + 1 < len {
                    self.sidebar_index += 1;
                }
            }
            Panel::Headers => {
                let len = self.pending.as_ref().map_or(0, |p| p.headers.len());
                if self.selected_header + 1 < len {
                    self.selected_header += 1;
                }
            }
            Panel::Response => {
                if self.response.is_some() {
                    self.response_scroll = self.response_scroll.saturating_add(1);
                }
            }
            Panel::Environment => {
                if self.selected_variable + 1 < self.environments.len(self.network) {
                    self.selected_variable += 1;
                }
            }
            Panel::History => {
                if self.selected_history + 1 < self.history.len() {
                    self.selected_history += 1;
                }
            }
            Panel::Body => {}
        }
    }

    /// Enter on the focused panel
    pub fn activate(&mut self) -> Option<NetworkCommand> {
        match self.active_panel {
            Panel::Collections => {
                match self.sidebar_rows().into_iter().nth(self.sidebar_index) {
                    Some(SidebarRow::Group { name, expanded, .. }) => {
                        // Search results are always expanded
                        if self.search.trim().is_empty() {
                            if expanded {
                                self.expanded.remove(&name);
                            } else {
                                self.expanded.insert(name);
                            }
                        }
                    }
                    Some(SidebarRow::Endpoint { group, endpoint }) => {
                        self.select_endpoint(&group, endpoint);
                    }
                    None => {}
                }
                None
            }
            Panel::Headers => {
                self.toggle_header();
                None
            }
            Panel::History => self.replay_history(self.selected_history),
            _ => None,
        }
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if self.active_panel == Panel::Body {
            match &self.pending {
                None => return,
                Some(p) if !p.endpoint.method.has_body() => {
                    self.notice = Some(Notice::info("GET requests carry no body"));
                    return;
                }
                Some(_) => {}
            }
        }
        let Some(len) = self.current_input().map(str::len) else {
            return;
        };
        self.input_mode = InputMode::Editing;
        self.cursor_position = len;
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
        self.editing_search = false;
    }

    pub fn move_cursor_left(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        let Some(input) = self.current_input_mut() else {
            return;
        };
        if cursor_pos <= input.len() && input.is_char_boundary(cursor_pos) {
            input.insert(cursor_pos, c);
            self.cursor_position = cursor_pos + c.len_utf8();
        }
        if self.editing_search {
            self.sidebar_index = 0;
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let cursor_pos = self.cursor_position;
            let Some(input) = self.current_input_mut() else {
                return;
            };
            if cursor_pos > input.len() {
                return;
            }
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
        if self.editing_search {
            self.sidebar_index = 0;
        }
    }

    pub fn insert_newline(&mut self) {
        self.enter_char('\n');
    }

    /// Header editor: swap between name and value
    pub fn next_field(&mut self) {
        if self.active_panel != Panel::Headers {
            return;
        }
        self.header_field = match self.header_field {
            HeaderField::Key => HeaderField::Value,
            HeaderField::Value => HeaderField::Key,
        };
        self.cursor_position = self.current_input().map_or(0, str::len);
    }

    pub fn start_search(&mut self) {
        self.active_panel = Panel::Collections;
        self.editing_search = true;
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.search.len();
        self.sidebar_index = 0;
    }

    // ========================
    // Network
    // ========================

    /// Change the active network. The old selection and response are dropped
    /// and the registry is refetched for the new network.
    pub fn switch_network(&mut self, network: NetworkId) -> Option<NetworkCommand> {
        if network == self.network {
            return None;
        }
        tracing::debug!(from = %self.network, to = %network, "Switching network");
        self.network = network;
        self.registry.reset(network);
        self.clear_selection();
        self.stop_editing();
        self.expanded.clear();
        self.sidebar_index = 0;
        self.selected_variable = 0;
        Some(self.refresh_registry())
    }

    pub fn next_network(&mut self) -> Option<NetworkCommand> {
        self.switch_network(self.network.next())
    }

    pub fn refresh_registry(&mut self) -> NetworkCommand {
        let id = self.next_id();
        self.registry_requests.insert(id, REFRESH_ACTION.to_string());
        tracing::info!(id, network = %self.network, "Refreshing registry");
        NetworkCommand::RefreshRegistry {
            id,
            network: self.network,
        }
    }

    fn clear_selection(&mut self) {
        self.pending = None;
        self.response = None;
        self.active_send = None;
        self.selection_generation += 1;
        self.selected_header = 0;
        self.header_field = HeaderField::default();
        self.response_scroll = 0;
    }

    // ========================
    // Request
    // ========================

    /// Make `endpoint` the request being worked on, seeding its body
    pub fn select_endpoint(&mut self, group: &str, endpoint: EndpointDescriptor) {
        tracing::debug!(group, method = endpoint.method.as_str(), path = %endpoint.path, "Endpoint selected");
        self.clear_selection();
        self.pending = Some(PendingRequest::for_endpoint(group, endpoint));
    }

    /// Build and dispatch the pending request. Nothing happens while the same
    /// selection is already in flight.
    pub fn send_request(&mut self) -> Option<NetworkCommand> {
        if self.active_send.is_some() {
            tracing::debug!("Send ignored, request already in flight");
            return None;
        }
        let pending = self.pending.as_ref()?;
        let env = self.environments.get(self.network);
        let built = build_request(
            self.network,
            &pending.endpoint,
            &env,
            &pending.body,
            &pending.headers,
        );
        let entry = HistoryEntry::new(
            pending.endpoint.method,
            pending.endpoint.path.clone(),
            pending.body.clone(),
            self.network,
        );

        self.response = None;
        self.response_scroll = 0;

        match built {
            Err(error) => {
                tracing::warn!(%error, "Request rejected before sending");
                self.response = Some(ResponseRecord::preflight_failure(&error));
                None
            }
            Ok(request) => {
                let id = self.next_id();
                self.in_flight.insert(
                    id,
                    InFlightSend {
                        generation: self.selection_generation,
                        entry,
                    },
                );
                self.active_send = Some(id);
                Some(NetworkCommand::ExecuteRequest { id, request })
            }
        }
    }

    /// Apply a network result
    pub fn handle_response(&mut self, response: NetworkResponse) {
        tracing::debug!(id = response.id(), "Network response received");
        match response {
            NetworkResponse::RequestCompleted { id, record } => {
                let Some(send) = self.in_flight.remove(&id) else {
                    tracing::warn!(id, "Completion for unknown request");
                    return;
                };
                if record.kind.is_exchange() {
                    self.history.append(send.entry);
                }
                let is_current =
                    self.active_send == Some(id) && send.generation == self.selection_generation;
                if is_current {
                    self.active_send = None;
                    self.response = Some(record);
                    self.response_scroll = 0;
                } else {
                    tracing::warn!(id, status = record.status, "Discarding stale response");
                }
            }
            NetworkResponse::RegistryLoaded {
                id,
                network,
                registry,
            } => {
                let action = self.registry_requests.remove(&id);
                if !self.registry.replace(network, registry) {
                    tracing::warn!(id, %network, active = %self.network, "Discarding registry for inactive network");
                    return;
                }
                if let Some(action) = action.filter(|a| a != REFRESH_ACTION) {
                    self.notice = Some(Notice::info(format!("Done: {}", action)));
                }
                self.resolve_replayed_endpoint();
                let rows = self.sidebar_rows().len();
                self.sidebar_index = self.sidebar_index.min(rows.saturating_sub(1));
            }
            NetworkResponse::RegistryFailed {
                id,
                network,
                action,
                error,
            } => {
                self.registry_requests.remove(&id);
                if network != self.network {
                    return;
                }
                self.notice = Some(Notice::error(format!("Failed to {}: {}", action, error)));
            }
        }
    }

    // ========================
    // Headers
    // ========================

    pub fn toggle_header(&mut self) {
        if let Some(header) = self
            .pending
            .as_mut()
            .and_then(|p| p.headers.get_mut(self.selected_header))
        {
            header.enabled = !header.enabled;
        }
    }

    pub fn add_header(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.headers.push(Header::new("X-Header", ""));
        self.selected_header = pending.headers.len() - 1;
        self.header_field = HeaderField::Key;
    }

    pub fn delete_header(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if self.selected_header < pending.headers.len() {
            pending.headers.remove(self.selected_header);
            if self.selected_header > 0 && self.selected_header >= pending.headers.len() {
                self.selected_header -= 1;
            }
        }
    }

    // ========================
    // Response view
    // ========================

    pub fn next_response_tab(&mut self) {
        self.response_tab = self.response_tab.next();
        self.response_scroll = 0;
    }

    pub fn prev_response_tab(&mut self) {
        self.response_tab = self.response_tab.prev();
        self.response_scroll = 0;
    }

    // ========================
    // Environment
    // ========================

    pub fn toggle_reveal(&mut self) {
        self.reveal_secrets = !self.reveal_secrets;
    }

    pub fn delete_variable(&mut self) {
        let Some(key) = self
            .environments
            .key_at(self.network, self.selected_variable)
            .map(str::to_string)
        else {
            return;
        };
        if is_required(&key) {
            self.notice = Some(Notice::error(format!("{} is required", key)));
            return;
        }
        self.environments.remove_variable(self.network, &key);
        let len = self.environments.len(self.network);
        self.selected_variable = self.selected_variable.min(len.saturating_sub(1));
    }

    // ========================
    // History
    // ========================

    /// Reinstall a past request. Switching to the entry's network comes first,
    /// so the returned command is that network's registry refresh, if any.
    pub fn replay_history(&mut self, index: usize) -> Option<NetworkCommand> {
        let entry = self.history.get(index)?.clone();
        let refresh = self.switch_network(entry.network);

        let (group, endpoint) = match self.registry.locate(entry.method, &entry.path) {
            Some((group, endpoint)) => (group.to_string(), endpoint.clone()),
            None => (
                HISTORY_GROUP.to_string(),
                EndpointDescriptor::new(entry.method, entry.path.clone(), ""),
            ),
        };
        self.select_endpoint(&group, endpoint);
        if let Some(pending) = self.pending.as_mut() {
            pending.body = entry.body_text;
        }
        refresh
    }

    /// A replay issued before the cache was loaded sits under the `History`
    /// group; attach it to its collection once the registry knows it.
    fn resolve_replayed_endpoint(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if pending.group != HISTORY_GROUP {
            return;
        }
        let method = pending.endpoint.method;
        if let Some((group, endpoint)) = self.registry.locate(method, &pending.endpoint.path) {
            pending.group = group.to_string();
            pending.endpoint = endpoint.clone();
        }
    }

    // ========================
    // Dialogs
    // ========================

    pub fn open_new_collection(&mut self) {
        self.dialog = Some(Dialog::NewCollection {
            name: String::new(),
        });
    }

    pub fn open_rename_collection(&mut self) {
        match self.selected_group() {
            Some(from) => {
                self.dialog = Some(Dialog::RenameCollection {
                    name: from.clone(),
                    from,
                })
            }
            None => self.notice = Some(Notice::error("Select a collection first")),
        }
    }

    pub fn open_add_endpoint(&mut self) {
        match self.selected_group() {
            Some(collection) => {
                self.dialog = Some(Dialog::EndpointForm {
                    collection,
                    editing: None,
                    draft: EndpointDraft::default(),
                    field: EndpointField::default(),
                })
            }
            None => self.notice = Some(Notice::error("Select a collection first")),
        }
    }

    pub fn open_edit_endpoint(&mut self) {
        match self.sidebar_rows().into_iter().nth(self.sidebar_index) {
            Some(SidebarRow::Endpoint { group, endpoint }) => {
                self.dialog = Some(Dialog::EndpointForm {
                    collection: group,
                    editing: Some(endpoint.identity()),
                    draft: EndpointDraft::from_descriptor(&endpoint),
                    field: EndpointField::Path,
                })
            }
            _ => self.notice = Some(Notice::error("Select an endpoint first")),
        }
    }

    /// `d` on the sidebar: confirm deleting the highlighted collection or endpoint
    pub fn open_delete_dialog(&mut self) {
        self.dialog = match self.sidebar_rows().into_iter().nth(self.sidebar_index) {
            Some(SidebarRow::Group { name, .. }) => Some(Dialog::ConfirmDeleteCollection { name }),
            Some(SidebarRow::Endpoint { group, endpoint }) => Some(Dialog::ConfirmDeleteEndpoint {
                collection: group,
                identity: endpoint.identity(),
            }),
            None => return,
        };
    }

    pub fn open_new_variable(&mut self) {
        self.dialog = Some(Dialog::NewVariable {
            key: String::new(),
            value: String::new(),
            field: VariableField::Key,
        });
    }

    pub fn open_rename_variable(&mut self) {
        let Some(from) = self
            .environments
            .key_at(self.network, self.selected_variable)
            .map(str::to_string)
        else {
            return;
        };
        if is_required(&from) {
            self.notice = Some(Notice::error(format!("{} is required", from)));
            return;
        }
        self.dialog = Some(Dialog::RenameVariable {
            name: from.clone(),
            from,
        });
    }

    pub fn dialog_char(&mut self, c: char) {
        if let Some(input) = self.dialog.as_mut().and_then(Dialog::input_mut) {
            input.push(c);
        }
    }

    pub fn dialog_backspace(&mut self) {
        if let Some(input) = self.dialog.as_mut().and_then(Dialog::input_mut) {
            input.pop();
        }
    }

    pub fn dialog_next_field(&mut self) {
        match self.dialog.as_mut() {
            Some(Dialog::EndpointForm { field, .. }) => *field = field.next(),
            Some(Dialog::NewVariable { field, .. }) => *field = toggle_variable_field(*field),
            _ => {}
        }
    }

    pub fn dialog_prev_field(&mut self) {
        match self.dialog.as_mut() {
            Some(Dialog::EndpointForm { field, .. }) => *field = field.prev(),
            Some(Dialog::NewVariable { field, .. }) => *field = toggle_variable_field(*field),
            _ => {}
        }
    }

    /// Left/right cycle the method while the method field is focused
    pub fn dialog_cycle(&mut self, forward: bool) {
        if let Some(Dialog::EndpointForm {
            draft,
            field: EndpointField::Method,
            ..
        }) = self.dialog.as_mut()
        {
            draft.method = if forward {
                draft.method.next()
            } else {
                draft.method.prev()
            };
        }
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog = None;
    }

    /// Validate the open dialog and either dispatch its registry write or
    /// apply its environment change. An invalid dialog stays open.
    pub fn submit_dialog(&mut self) -> Option<NetworkCommand> {
        let dialog = self.dialog.take()?;
        let network = self.network;

        let outcome: Result<Option<RegistryMutation>, String> = match &dialog {
            Dialog::NewCollection { name } => self
                .registry
                .plan_create_collection(name)
                .map(Some)
                .map_err(|e| e.to_string()),
            Dialog::RenameCollection { from, name } => self
                .registry
                .plan_rename_collection(from, name)
                .map(Some)
                .map_err(|e| e.to_string()),
            Dialog::ConfirmDeleteCollection { name } => self
                .registry
                .plan_delete_collection(name)
                .map(Some)
                .map_err(|e| e.to_string()),
            Dialog::EndpointForm {
                collection,
                draft,
                editing,
                ..
            } => self
                .registry
                .plan_upsert_endpoint(collection, draft.clone(), editing.as_ref())
                .map(Some)
                .map_err(|e| e.to_string()),
            Dialog::ConfirmDeleteEndpoint {
                collection,
                identity,
            } => self
                .registry
                .plan_delete_endpoint(collection, identity.clone())
                .map(Some)
                .map_err(|e| e.to_string()),
            Dialog::NewVariable { key, value, .. } => self
                .environments
                .add_variable(network, key.trim(), value.clone())
                .map(|()| None)
                .map_err(|e| e.to_string()),
            Dialog::RenameVariable { from, name } => self
                .environments
                .rename_variable(network, from, name.trim())
                .map(|()| None)
                .map_err(|e| e.to_string()),
        };

        match outcome {
            Ok(Some(mutation)) => Some(self.mutate_registry(mutation)),
            Ok(None) => {
                let len = self.environments.len(network);
                if matches!(dialog, Dialog::NewVariable { .. }) {
                    self.selected_variable = len.saturating_sub(1);
                }
                self.selected_variable = self.selected_variable.min(len.saturating_sub(1));
                None
            }
            Err(message) => {
                self.notice = Some(Notice::error(message));
                self.dialog = Some(dialog);
                None
            }
        }
    }

    fn mutate_registry(&mut self, mutation: RegistryMutation) -> NetworkCommand {
        let id = self.next_id();
        let action = mutation.describe();
        tracing::info!(id, network = %self.network, action = %action, "Dispatching registry mutation");
        self.registry_requests.insert(id, action);
        NetworkCommand::MutateRegistry {
            id,
            network: self.network,
            mutation,
        }
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}

fn toggle_variable_field(field: VariableField) -> VariableField {
    match field {
        VariableField::Key => VariableField::Value,
        VariableField::Value => VariableField::Key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionRegistry, ExchangeKind, HttpMethod};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> CollectionRegistry {
        let mut reg = CollectionRegistry::new();
        reg.insert(
            "Accounts".to_string(),
            vec![
                EndpointDescriptor::new(HttpMethod::GET, "/accounts", "List accounts"),
                EndpointDescriptor::new(HttpMethod::POST, "/accounts", "Create account")
                    .with_body(json!({"name": "alice"})),
            ],
        );
        reg
    }

    fn loaded_state() -> ConsoleState {
        let mut state = ConsoleState::new(NetworkId::Testnet);
        state.handle_response(NetworkResponse::RegistryLoaded {
            id: 0,
            network: NetworkId::Testnet,
            registry: registry(),
        });
        state
    }

    fn ok_record() -> ResponseRecord {
        ResponseRecord::http(200, r#"{"ok":true}"#, IndexMap::new(), 12)
    }

    #[test]
    fn test_sidebar_group_toggles_and_selects() {
        let mut state = loaded_state();
        assert_eq!(state.sidebar_rows().len(), 1);

        state.activate();
        assert_eq!(state.sidebar_rows().len(), 3);

        state.move_down();
        state.move_down();
        state.activate();
        let pending = state.pending.as_ref().unwrap();
        assert_eq!(pending.endpoint.method, HttpMethod::POST);
        assert_eq!(pending.body, "{\n  \"name\": \"alice\"\n}");
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut state = loaded_state();
        state.select_endpoint("Accounts", EndpointDescriptor::new(HttpMethod::POST, "/x", "x"));
        state.active_panel = Panel::Body;
        state.start_editing();
        assert_eq!(state.input_mode, InputMode::Editing);
        assert_eq!(state.cursor_position, 2);

        state.move_cursor_left();
        state.enter_char('é');
        state.delete_char();
        state.enter_char('1');
        assert_eq!(state.pending.as_ref().unwrap().body, "{1}");
    }

    #[test]
    fn test_get_body_is_not_editable() {
        let mut state = loaded_state();
        state.select_endpoint("Accounts", EndpointDescriptor::new(HttpMethod::GET, "/x", "x"));
        state.active_panel = Panel::Body;
        state.start_editing();
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_second_send_is_ignored_while_sending() {
        let mut state = loaded_state();
        state.select_endpoint("Accounts", EndpointDescriptor::new(HttpMethod::GET, "/ping", "ping"));
        assert!(state.send_request().is_some());
        assert!(state.send_request().is_none());
        assert_eq!(state.in_flight.len(), 1);
    }

    #[test]
    fn test_reselecting_discards_late_result() {
        let mut state = loaded_state();
        state.select_endpoint("Accounts", EndpointDescriptor::new(HttpMethod::GET, "/ping", "ping"));
        let Some(NetworkCommand::ExecuteRequest { id, .. }) = state.send_request() else {
            panic!("expected a request");
        };
        state.select_endpoint("Accounts", EndpointDescriptor::new(HttpMethod::GET, "/other", "other"));

        state.handle_response(NetworkResponse::RequestCompleted { id, record: ok_record() });
        assert!(state.response.is_none());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_executor_side_preflight_is_not_recorded() {
        let mut state = loaded_state();
        state.select_endpoint("Accounts", EndpointDescriptor::new(HttpMethod::GET, "/ping", "ping"));
        let Some(NetworkCommand::ExecuteRequest { id, .. }) = state.send_request() else {
            panic!("expected a request");
        };
        let record = ResponseRecord::preflight_failure(&crate::error::PreflightError::Rejected(
            "bad".into(),
        ));
        state.handle_response(NetworkResponse::RequestCompleted { id, record });
        assert_eq!(state.response.as_ref().map(|r| r.kind), Some(ExchangeKind::Preflight));
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_new_collection_dialog_dispatches_mutation() {
        let mut state = loaded_state();
        state.open_new_collection();
        for c in "My Tests".chars() {
            state.dialog_char(c);
        }
        let cmd = state.submit_dialog();
        match cmd {
            Some(NetworkCommand::MutateRegistry { mutation, network, .. }) => {
                assert_eq!(network, NetworkId::Testnet);
                assert_eq!(mutation, RegistryMutation::CreateCollection { name: "MyTests".into() });
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(state.dialog.is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn test_invalid_endpoint_form_stays_open() {
        let mut state = loaded_state();
        state.open_add_endpoint();
        state.dialog_cycle(true);
        state.dialog_next_field();
        for c in "no-slash".chars() {
            state.dialog_char(c);
        }
        assert!(state.submit_dialog().is_none());
        assert!(matches!(state.dialog, Some(Dialog::EndpointForm { .. })));
        assert!(state.notice.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_registry_failure_keeps_cache() {
        let mut state = loaded_state();
        state.open_delete_dialog();
        let Some(NetworkCommand::MutateRegistry { id, .. }) = state.submit_dialog() else {
            panic!("expected a mutation");
        };
        state.handle_response(NetworkResponse::RegistryFailed {
            id,
            network: NetworkId::Testnet,
            action: "delete collection Accounts".into(),
            error: crate::error::RegistryError::Status { status: 500, body: "boom".into() },
        });
        assert!(state.registry.contains("Accounts"));
        assert!(!state.is_loading());
        assert!(state.notice.as_ref().unwrap().text.contains("delete collection Accounts"));
    }

    #[test]
    fn test_required_variables_cannot_be_removed() {
        let mut state = loaded_state();
        state.delete_variable();
        assert_eq!(state.environments.len(NetworkId::Testnet), 2);

        state.open_new_variable();
        for c in "REGION".chars() {
            state.dialog_char(c);
        }
        state.dialog_next_field();
        for c in "eu".chars() {
            state.dialog_char(c);
        }
        assert!(state.submit_dialog().is_none());
        assert_eq!(state.selected_variable, 2);
        assert_eq!(
            state.environments.value(NetworkId::Testnet, "REGION").map(String::as_str),
            Some("eu")
        );

        state.delete_variable();
        assert_eq!(state.environments.len(NetworkId::Testnet), 2);
        assert_eq!(state.selected_variable, 1);
    }

    #[test]
    fn test_search_filters_rows() {
        let mut state = loaded_state();
        state.start_search();
        for c in "create".chars() {
            state.enter_char(c);
        }
        let rows = state.sidebar_rows();
        assert_eq!(rows.len(), 2);
        assert!(matches!(&rows[1], SidebarRow::Endpoint { endpoint, .. } if endpoint.method == HttpMethod::POST));
        state.stop_editing();
        assert!(!state.editing_search);
    }
}

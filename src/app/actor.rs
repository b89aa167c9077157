//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::ConsoleState;
use crate::messages::ui_events::{InputMode, Panel};
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: ConsoleState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: ConsoleState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Load the initial network's registry before the first frame
        let refresh = self.state.refresh_registry();
        self.dispatch(Some(refresh));
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn dispatch(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        // Any keypress acknowledges the last notice
        if !matches!(event, UiEvent::Quit) {
            self.state.notice = None;
        }

        let cmd = match event {
            // Network
            UiEvent::NextNetwork => self.state.next_network(),
            UiEvent::SwitchNetwork(network) => self.state.switch_network(network),
            UiEvent::RefreshRegistry => Some(self.state.refresh_registry()),

            // Panel navigation
            UiEvent::NextPanel => {
                self.state.next_panel();
                None
            }
            UiEvent::PrevPanel => {
                self.state.prev_panel();
                None
            }
            UiEvent::MoveUp => {
                self.state.move_up();
                None
            }
            UiEvent::MoveDown => {
                self.state.move_down();
                None
            }
            UiEvent::Activate => self.state.activate(),

            // Input editing
            UiEvent::StartEditing => {
                self.state.start_editing();
                None
            }
            UiEvent::StopEditing => {
                self.state.stop_editing();
                None
            }
            UiEvent::CharInput(c) => {
                self.state.enter_char(c);
                None
            }
            UiEvent::Backspace => {
                self.state.delete_char();
                None
            }
            UiEvent::CursorLeft => {
                self.state.move_cursor_left();
                None
            }
            UiEvent::CursorRight => {
                self.state.move_cursor_right();
                None
            }
            UiEvent::Newline => {
                self.state.insert_newline();
                None
            }
            UiEvent::NextField => {
                self.state.next_field();
                None
            }

            // Request actions
            UiEvent::SendRequest => {
                if self.state.input_mode == InputMode::Editing {
                    self.state.stop_editing();
                }
                self.state.send_request()
            }

            // Sidebar
            UiEvent::StartSearch => {
                self.state.start_search();
                None
            }
            UiEvent::NewCollection => {
                self.state.open_new_collection();
                None
            }
            UiEvent::RenameCollection => {
                self.state.open_rename_collection();
                None
            }
            UiEvent::AddEndpoint => {
                self.state.open_add_endpoint();
                None
            }
            UiEvent::EditEndpoint => {
                self.state.open_edit_endpoint();
                None
            }

            // Panel-dependent
            UiEvent::AddItem => {
                match self.state.active_panel {
                    Panel::Headers => self.state.add_header(),
                    Panel::Environment => self.state.open_new_variable(),
                    _ => {}
                }
                None
            }
            UiEvent::DeleteItem => {
                match self.state.active_panel {
                    Panel::Collections => self.state.open_delete_dialog(),
                    Panel::Headers => self.state.delete_header(),
                    Panel::Environment => self.state.delete_variable(),
                    _ => {}
                }
                None
            }

            // Environment
            UiEvent::RenameVariable => {
                self.state.open_rename_variable();
                None
            }
            UiEvent::ToggleReveal => {
                self.state.toggle_reveal();
                None
            }

            // Response
            UiEvent::NextResponseTab => {
                self.state.next_response_tab();
                None
            }
            UiEvent::PrevResponseTab => {
                self.state.prev_response_tab();
                None
            }

            // Dialogs
            UiEvent::DialogChar(c) => {
                self.state.dialog_char(c);
                None
            }
            UiEvent::DialogBackspace => {
                self.state.dialog_backspace();
                None
            }
            UiEvent::DialogNextField => {
                self.state.dialog_next_field();
                None
            }
            UiEvent::DialogPrevField => {
                self.state.dialog_prev_field();
                None
            }
            UiEvent::DialogLeft => {
                self.state.dialog_cycle(false);
                None
            }
            UiEvent::DialogRight => {
                self.state.dialog_cycle(true);
                None
            }
            UiEvent::DialogSubmit => self.state.submit_dialog(),
            UiEvent::DialogCancel => {
                self.state.cancel_dialog();
                None
            }

            // Popups
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                None
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                None
            }

            // System
            UiEvent::Quit => return true,
        };

        self.dispatch(cmd);
        false
    }
}

//! Stellar API Test Console - Actor-based terminal client
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - console state machine processing events
//! - Network Layer (Tokio) - target requests and registry sync

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use stellar_console::app::state::{
    ConsolePhase, Dialog, EndpointField, HeaderField, ResponseTab, SidebarRow, VariableField,
};
use stellar_console::app::{AppActor, ConsoleState};
use stellar_console::config::ConsoleConfig;
use stellar_console::constants::{APP_NAME, DEFAULT_LOG_FILE};
use stellar_console::messages::ui_events::{key_to_ui_event, InputMode, Panel};
use stellar_console::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use stellar_console::models::NetworkId;
use stellar_console::network::{create_client, NetworkActor};
use stellar_console::registry::RegistryClient;
use stellar_console::ui::{
    centered_rect, cursor_row_col, highlight_json, method_color, panel_border, render_tabs,
    status_color,
};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConsoleConfig::from_env().context("loading configuration")?;

    // Initialize logging to file
    let log_dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .unwrap_or(OsStr::new(DEFAULT_LOG_FILE));
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(
        registry = %config.registry_url,
        network = %config.initial_network,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting console"
    );

    // Terminal setup
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let http = create_client(config.request_timeout);
    let registry = RegistryClient::new(http.clone(), config.registry_url.clone());
    let network_actor = NetworkActor::new(http, registry, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(ConsoleState::from_config(&config), net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_panel,
                    current_state.input_mode,
                    current_state.show_help,
                    current_state.dialog.as_ref().map(Dialog::kind),
                ) {
                    if matches!(event, UiEvent::Quit) {
                        let _ = ui_tx.send(event);
                        break;
                    }
                    let _ = ui_tx.send(event);
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Network bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_network_bar(f, state, main_chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(26),
            Constraint::Percentage(48),
            Constraint::Percentage(26),
        ])
        .split(main_chunks[1]);

    draw_sidebar(f, state, columns[0]);
    draw_request_column(f, state, columns[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[2]);
    draw_environment(f, state, right[0]);
    draw_history(f, state, right[1]);

    draw_status_bar(f, state, main_chunks[2]);

    // Popups
    if let Some(dialog) = &state.dialog {
        draw_dialog(f, dialog, area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_network_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![
        Span::styled(format!(" {} ", APP_NAME), Style::default().fg(Color::White).bold()),
        Span::raw(" "),
    ];

    for (i, network) in NetworkId::ALL.iter().enumerate() {
        let style = if *network == state.network {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, network.label()), style));
        spans.push(Span::raw(" "));
    }

    if state.is_loading {
        spans.push(Span::styled(" [syncing] ", Style::default().fg(Color::Yellow)));
    }
    if state.phase == ConsolePhase::Sending {
        spans.push(Span::styled(" [sending...] ", Style::default().fg(Color::Magenta)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_sidebar(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let is_focused = state.active_panel == Panel::Collections;
    let editing_search = state.editing_search && state.input_mode == InputMode::Editing;

    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused && state.editing_search, editing_search))
        .title(" Search (/) ");
    let search_text = if state.search.is_empty() && !editing_search {
        Span::styled("path, description, method", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.search.as_str())
    };
    f.render_widget(Paragraph::new(search_text).block(search_block), chunks[0]);

    if editing_search && state.dialog.is_none() {
        let (_, col) = cursor_row_col(&state.search, state.cursor_position);
        let max_x = chunks[0].x + chunks[0].width.saturating_sub(2);
        let cursor_x = (chunks[0].x + col + 1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, chunks[0].y + 1));
    }

    let items: Vec<ListItem> = if state.sidebar_rows.is_empty() {
        let text = if state.is_loading {
            "Loading collections..."
        } else {
            "No collections. Press c to create one."
        };
        vec![ListItem::new(text).style(Style::default().fg(Color::DarkGray))]
    } else {
        state
            .sidebar_rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let selected = is_focused && !state.editing_search && i == state.sidebar_index;
                let line = match row {
                    SidebarRow::Group { name, count, expanded } => {
                        let marker = if *expanded { "▾" } else { "▸" };
                        Line::from(vec![
                            Span::styled(format!("{} {}", marker, name), Style::default().bold()),
                            Span::styled(format!(" ({})", count), Style::default().fg(Color::DarkGray)),
                        ])
                    }
                    SidebarRow::Endpoint { endpoint, .. } => {
                        let is_current = state.pending.as_ref().is_some_and(|p| {
                            p.endpoint.identity() == endpoint.identity()
                        });
                        let path_style = if is_current {
                            Style::default().fg(Color::Cyan)
                        } else {
                            Style::default()
                        };
                        Line::from(vec![
                            Span::raw("   "),
                            Span::styled(
                                format!("{:<6}", endpoint.method.as_str()),
                                Style::default().fg(method_color(endpoint.method)).bold(),
                            ),
                            Span::styled(endpoint.path.clone(), path_style),
                        ])
                    }
                };
                let style = if selected {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(line).style(style)
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused && !state.editing_search, false))
        .title(" Collections ");
    f.render_widget(List::new(items).block(block), chunks[1]);
}

fn draw_request_column(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Percentage(35),
            Constraint::Min(5),
        ])
        .split(area);

    draw_request_bar(f, state, chunks[0]);

    let selected_tab = if state.active_panel == Panel::Headers { 1 } else { 0 };
    f.render_widget(render_tabs(&["Body", "Headers"], selected_tab), chunks[1]);

    if state.active_panel == Panel::Headers {
        draw_headers_panel(f, state, chunks[2]);
    } else {
        draw_body_panel(f, state, chunks[2]);
    }

    draw_response(f, state, chunks[3]);
}

fn draw_request_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Request ");

    let line = match &state.pending {
        Some(pending) => {
            let method = pending.endpoint.method;
            let mut spans = vec![
                Span::styled(
                    format!(" {} ", method.as_str()),
                    Style::default().fg(Color::Black).bg(method_color(method)).bold(),
                ),
                Span::raw(" "),
                Span::raw(state.resolved_url.clone().unwrap_or_default()),
            ];
            if !pending.endpoint.description.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", pending.endpoint.description),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled(
            "Select an endpoint from the sidebar",
            Style::default().fg(Color::DarkGray),
        )),
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_body_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Body;
    let is_editing = is_focused && state.input_mode == InputMode::Editing;

    let has_body = state
        .pending
        .as_ref()
        .is_some_and(|p| p.endpoint.method.has_body());
    let title = if has_body {
        " Body (JSON) "
    } else {
        " Body (none for GET) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused, is_editing))
        .title(title);

    let content = match &state.pending {
        Some(p) if has_body => p.body.as_str(),
        _ => "",
    };

    let body = Paragraph::new(highlight_json(content)).block(block);
    f.render_widget(body, area);

    if is_editing && has_body && state.dialog.is_none() {
        let (row, col) = cursor_row_col(content, state.cursor_position);
        let max_x = area.x + area.width.saturating_sub(2);
        let max_y = area.y + area.height.saturating_sub(2);
        let cursor_x = (area.x + col + 1).min(max_x);
        let cursor_y = (area.y + row + 1).min(max_y);
        f.set_cursor_position(Position::new(cursor_x, cursor_y));
    }
}

fn draw_headers_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Headers;
    let is_editing = is_focused && state.input_mode == InputMode::Editing;

    let headers = state.pending.as_ref().map(|p| p.headers.as_slice()).unwrap_or(&[]);
    let items: Vec<ListItem> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let selected = is_focused && i == state.selected_header;
            let style = if !h.enabled {
                Style::default().fg(Color::DarkGray)
            } else if selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default()
            };
            let prefix = if h.enabled { "[x]" } else { "[ ]" };
            let (key, value) = if selected && is_editing {
                match state.header_field {
                    HeaderField::Key => (format!("<{}>", h.key), h.value.clone()),
                    HeaderField::Value => (h.key.clone(), format!("<{}>", h.value)),
                }
            } else {
                (h.key.clone(), h.value.clone())
            };
            ListItem::new(format!("{} {}: {}", prefix, key, value)).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused, is_editing))
        .title(" Headers (Authorization is added from API_KEY) ");
    f.render_widget(List::new(items).block(block), area);
}

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Response;

    let status_text = match &state.response {
        Some(record) => Span::styled(
            format!(" {} ", record.status),
            Style::default().fg(status_color(record.status)).bold(),
        ),
        None if state.phase == ConsolePhase::Sending => Span::raw(" Sending... "),
        None => Span::raw(" Response "),
    };

    let time_text = state
        .response
        .as_ref()
        .map(|r| format!(" {}ms ", r.elapsed_ms))
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused, false))
        .title(status_text)
        .title_bottom(Line::from(time_text).right_aligned());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    f.render_widget(
        render_tabs(&["Pretty", "Raw", "Headers"], state.response_tab.index()),
        chunks[0],
    );

    let Some(record) = &state.response else {
        return;
    };

    let lines = match state.response_tab {
        ResponseTab::Pretty => highlight_json(&record.payload.pretty()),
        ResponseTab::Raw => vec![Line::from(record.payload.raw())],
        ResponseTab::Headers => highlight_json(&record.headers_pretty()),
    };
    let response = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(response, chunks[1]);
}

fn draw_environment(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Environment;
    let is_editing = is_focused && state.input_mode == InputMode::Editing;

    let items: Vec<ListItem> = state
        .environment
        .iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let selected = is_focused && i == state.selected_variable;
            let value = if selected && is_editing {
                format!("<{}>", value)
            } else {
                value.clone()
            };
            let style = if selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}: ", key), Style::default().fg(Color::Cyan)),
                Span::raw(value),
            ]))
            .style(style)
        })
        .collect();

    let reveal = if state.reveal_secrets { "v:hide" } else { "v:show" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused, is_editing))
        .title(format!(" Environment: {} ", state.network.label()))
        .title_bottom(Line::from(format!(" {} ", reveal)).right_aligned());
    f.render_widget(List::new(items).block(block), area);
}

fn draw_history(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::History;

    let items: Vec<ListItem> = if state.history.is_empty() {
        vec![ListItem::new("No requests yet").style(Style::default().fg(Color::DarkGray))]
    } else {
        state
            .history
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if is_focused && i == state.selected_history {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            format!("{:<6}", entry.method.as_str()),
                            Style::default().fg(method_color(entry.method)).bold(),
                        ),
                        Span::raw(entry.path.clone()),
                    ]),
                    Line::from(Span::styled(
                        format!("  {} · {}", entry.network, entry.timestamp.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
                .style(style)
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(is_focused, false))
        .title(" History ");
    f.render_widget(List::new(items).block(block), area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let line = if let Some(notice) = &state.notice {
        let color = if notice.is_error { Color::Red } else { Color::Green };
        Line::from(Span::styled(format!(" {} ", notice.text), Style::default().fg(color)))
    } else {
        let hint = if state.dialog.is_some() {
            " Enter:save | Esc:cancel | Tab:next field | ←/→:method "
        } else if state.input_mode == InputMode::Editing {
            " ESC:stop editing | arrows:move | Tab:key/value "
        } else {
            match state.active_panel {
                Panel::Collections => " Enter:open | /:search | c:new | r:rename | a:add | e:edit | d:delete | s:send ",
                Panel::Body => " e:edit body | s:send | Tab:panel | ?:help ",
                Panel::Headers => " a:add | d:delete | e:edit | Enter:toggle | s:send ",
                Panel::Response => " ←/→:view | ↑/↓:scroll | s:send ",
                Panel::Environment => " e:edit | k:rename | a:add | d:delete | v:reveal ",
                Panel::History => " Enter:replay | ↑/↓:select ",
            }
        };
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    };

    f.render_widget(Paragraph::new(line), area);
}

fn draw_dialog(f: &mut Frame, dialog: &Dialog, area: Rect) {
    let popup_area = centered_rect(60, 40, area);

    let (title, lines) = match dialog {
        Dialog::NewCollection { name } => (
            " New collection ",
            vec![
                field_line("Name", name, true),
                hint_line("Whitespace is removed from the name"),
            ],
        ),
        Dialog::RenameCollection { from, name } => (
            " Rename collection ",
            vec![
                Line::from(format!(" From: {}", from)),
                field_line("To", name, true),
                hint_line("An existing collection with this name is merged"),
            ],
        ),
        Dialog::ConfirmDeleteCollection { name } => (
            " Delete collection ",
            vec![
                Line::from(format!(" Delete {} and all of its endpoints?", name)),
                hint_line("y:delete | n:cancel"),
            ],
        ),
        Dialog::EndpointForm { collection, editing, draft, field } => (
            if editing.is_some() { " Edit endpoint " } else { " New endpoint " },
            vec![
                Line::from(format!(" Collection: {}", collection)),
                Line::from(vec![
                    Span::raw(if *field == EndpointField::Method { "> " } else { "  " }),
                    Span::raw("Method: "),
                    Span::styled(
                        format!("◂ {} ▸", draft.method.as_str()),
                        Style::default().fg(method_color(draft.method)).bold(),
                    ),
                ]),
                field_line("Path", &draft.path, *field == EndpointField::Path),
                field_line("Description", &draft.description, *field == EndpointField::Description),
                field_line("Sample body", &draft.body_text, *field == EndpointField::Body),
            ],
        ),
        Dialog::ConfirmDeleteEndpoint { collection, identity } => (
            " Delete endpoint ",
            vec![
                Line::from(format!(
                    " Delete {} {} from {}?",
                    identity.method.as_str(),
                    identity.path,
                    collection
                )),
                hint_line("y:delete | n:cancel"),
            ],
        ),
        Dialog::NewVariable { key, value, field } => (
            " New variable ",
            vec![
                field_line("Key", key, *field == VariableField::Key),
                field_line("Value", value, *field == VariableField::Value),
            ],
        ),
        Dialog::RenameVariable { from, name } => (
            " Rename variable ",
            vec![Line::from(format!(" From: {}", from)), field_line("To", name, true)],
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .style(Style::default().bg(Color::Black));

    let popup = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(popup, popup_area);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::raw(if focused { "> " } else { "  " }),
        Span::raw(format!("{}: ", label)),
        Span::styled(value, style),
        Span::styled(if focused { "_" } else { "" }, style),
    ])
}

fn hint_line(text: &str) -> Line<'_> {
    Line::from(Span::styled(format!(" {}", text), Style::default().fg(Color::DarkGray)))
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = r#"
 STELLAR API TEST CONSOLE - Keyboard Shortcuts

 GLOBAL
   Tab / Shift+Tab    Switch panels
   n / 1 / 2 / 3      Next network / Testnet / Public Net / Kipaji
   s                  Send request
   R                  Reload collections
   v                  Show or hide API keys

 COLLECTIONS
   ↑ / ↓ / Enter      Navigate, expand, select endpoint
   /                  Search
   c / r / d          New, rename, delete collection
   a / e / d          Add, edit, delete endpoint

 BODY / HEADERS
   e                  Edit (Enter adds a newline in the body)
   a / d / Enter      Add, delete, toggle header
   Tab (editing)      Switch header key/value

 RESPONSE
   ← / →              Pretty / Raw / Headers
   ↑ / ↓              Scroll

 ENVIRONMENT / HISTORY
   e / k / a / d      Edit value, rename key, add, delete
   Enter              Replay history entry

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

use ratatui::{prelude::*, widgets::*};

use crate::models::HttpMethod;

/// Border style for a panel given focus and edit state
pub fn panel_border(is_focused: bool, is_editing: bool) -> Style {
    if is_focused && is_editing {
        Style::default().fg(Color::Yellow)
    } else if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Simple JSON syntax highlighting
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for line in text.lines() {
        let mut spans = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut escaped = false;

        for (idx, c) in line.char_indices() {
            if in_string {
                current.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    // Key strings are followed by a colon
                    let is_key = line[idx + 1..].trim_start().starts_with(':');
                    let color = if is_key { Color::Cyan } else { Color::Green };
                    spans.push(Span::styled(std::mem::take(&mut current), Style::default().fg(color)));
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => {
                    flush_plain(&mut spans, &mut current);
                    in_string = true;
                    current.push(c);
                }
                '{' | '}' | '[' | ']' => {
                    flush_plain(&mut spans, &mut current);
                    spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
                }
                ':' | ',' => {
                    flush_plain(&mut spans, &mut current);
                    spans.push(Span::styled(c.to_string(), Style::default().fg(Color::White)));
                }
                _ => current.push(c),
            }
        }

        if in_string {
            spans.push(Span::styled(current, Style::default().fg(Color::Green)));
        } else {
            flush_plain(&mut spans, &mut current);
        }

        lines.push(Line::from(spans));
    }

    lines
}

/// Color bare tokens: numbers and literals
fn flush_plain(spans: &mut Vec<Span<'static>>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    let trimmed = token.trim();
    let style = if matches!(trimmed, "true" | "false" | "null") {
        Style::default().fg(Color::Magenta)
    } else if !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
    {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    spans.push(Span::styled(token, style));
}

/// Status code color; 0 is the no-response sentinel
pub fn status_color(code: u16) -> Color {
    match code {
        0 => Color::DarkGray,
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Red,
        500..=599 => Color::Magenta,
        _ => Color::Yellow,
    }
}

/// Method color
pub fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::GET => Color::Green,
        HttpMethod::POST => Color::Yellow,
        HttpMethod::PUT => Color::Blue,
        HttpMethod::DELETE => Color::Red,
    }
}

/// Row and column of a byte offset inside multi-line text
pub fn cursor_row_col(text: &str, byte_pos: usize) -> (u16, u16) {
    let end = byte_pos.min(text.len());
    let before = text.get(..end).unwrap_or(text);
    let row = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map(|last| last.chars().count())
        .unwrap_or(0);
    (row as u16, col as u16)
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

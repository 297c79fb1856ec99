//! TUI rendering.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use super::app::{App, ConfirmKill};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_table(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);

    if let Some(confirm) = app.confirm() {
        draw_confirm_dialog(frame, confirm);
    }
    if let Some(notice) = app.notice_text() {
        draw_notice(frame, notice);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("portman | {} ports", app.inventory.len());

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(header, area);
}

fn draw_table(frame: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["PORT", "PID", "PROCESS", "STATE"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = app.inventory.iter().enumerate().map(|(i, binding)| {
        let cells = vec![
            Cell::from(binding.port.to_string()),
            Cell::from(binding.pid.to_string()),
            Cell::from(truncate(&binding.process_name, 25)),
            Cell::from(binding.state.as_str()),
        ];

        let style = if i == app.selected {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };

        Row::new(cells).style(style)
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(25),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Listening Ports "),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    state.select((!app.inventory.is_empty()).then_some(app.selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help = "j/k: navigate | x: kill | r: refresh | q: quit";

    let status = app.status();
    let footer_text = if status.is_empty() {
        help.to_string()
    } else {
        format!("{} | {}", status, help)
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(footer, area);
}

fn draw_confirm_dialog(frame: &mut Frame, confirm: &ConfirmKill) {
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(format!(
            "Kill process '{}' (PID: {}) on port {}?",
            confirm.process_name, confirm.pid, confirm.port
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Yes  [n] No",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Confirm Kill Process "),
        );

    frame.render_widget(dialog, area);
}

fn draw_notice(frame: &mut Frame, notice: &str) {
    let area = centered_rect(60, 5, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(notice.to_string()),
        Line::from(Span::styled(
            "Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        );

    frame.render_widget(popup, area);
}

/// Center a `width` x `height` box inside `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…", &s[..max - 1])
    }
}

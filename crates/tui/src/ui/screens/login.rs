use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField, LoginMode},
    ui::theme::Theme,
};

fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let login = &state.login;
    let registering = login.mode == LoginMode::Register;

    let box_width = 40;
    let box_height = if registering { 11 } else { 9 };
    let card_area = centered_box(box_width, box_height, area);

    frame.render_widget(Clear, card_area);

    let title = if registering { " register " } else { " login " };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let mut constraints = vec![
        Constraint::Length(1), // Username
        Constraint::Length(1),
        Constraint::Length(1), // Password
    ];
    if registering {
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1)); // Confirm
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1)); // Mode hint

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    render_input(
        frame,
        rows[0],
        "user",
        &login.username,
        false,
        login.focus == LoginField::Username,
        theme,
    );
    render_input(
        frame,
        rows[2],
        "pass",
        &login.password,
        true,
        login.focus == LoginField::Password,
        theme,
    );
    if registering {
        render_input(
            frame,
            rows[4],
            "again",
            &login.confirm,
            true,
            login.focus == LoginField::Confirm,
            theme,
        );
    }

    let hint = if registering {
        "Ctrl+N back to login"
    } else {
        "Ctrl+N create account"
    };
    if let Some(row) = rows.last() {
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(theme.dim)))
                .alignment(Alignment::Center),
            *row,
        );
    }

    if let Some(message) = &login.message {
        let error_area = Rect {
            x: card_area.x,
            y: card_area.y + card_area.height + 1,
            width: card_area.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            error_area.intersection(area),
        );
    }
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    is_password: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };

    let display = if is_password {
        format!("{}{}", "•".repeat(value.chars().count()), cursor)
    } else {
        format!("{value}{cursor}")
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let line = Line::from(vec![
        Span::styled(format!("{label:>5} "), Style::default().fg(theme.dim)),
        Span::styled(display, style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

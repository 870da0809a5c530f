use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{components::card::Card, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Account
            Constraint::Min(5),    // Security
            Constraint::Length(6), // Data
        ])
        .split(area);

    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.text_muted));
    let value = |text: String| Span::styled(text, Style::default().fg(theme.text));

    let username = state
        .user
        .as_ref()
        .map_or_else(|| "-".to_string(), |user| user.username.clone());
    let account = vec![
        Line::from(vec![label("User      "), value(username)]),
        Line::from(vec![label("Server    "), value(state.base_url.clone())]),
        Line::from(vec![label("Currency  "), value(state.currency.to_string())]),
        Line::from(vec![
            label("Categories"),
            value(format!(" {}", state.categories.len())),
        ]),
        Line::from(vec![
            label("Fixed     "),
            value(format!(
                "{} expenses, edited on the dashboard",
                state.fixed_expenses.len()
            )),
        ]),
    ];
    Card::new("Account", theme).render_with(frame, layout[0], Paragraph::new(account));

    let key = |text: &'static str| Span::styled(text, Style::default().fg(theme.accent));
    let security = vec![
        Line::from(vec![key("u"), Span::raw(" change username")]),
        Line::from(vec![key("w"), Span::raw(" change password")]),
        Line::from(vec![
            Span::styled("D", Style::default().fg(theme.negative)),
            Span::raw(" delete all data, then log out"),
            Span::styled("  (asks for your password)", Style::default().fg(theme.dim)),
        ]),
    ];
    Card::new("Security", theme).render_with(frame, layout[1], Paragraph::new(security));

    let data = vec![
        Line::from(vec![label("File      "), value(state.export_path.clone())]),
        Line::from(""),
        Line::from(vec![
            Span::styled("x", Style::default().fg(theme.accent)),
            Span::raw(" export JSON   "),
            Span::styled("i", Style::default().fg(theme.accent)),
            Span::raw(" import JSON (validated first)   "),
            Span::styled("l", Style::default().fg(theme.accent)),
            Span::raw(" log out"),
        ]),
    ];
    Card::new("Data", theme).render_with(frame, layout[2], Paragraph::new(data));
}

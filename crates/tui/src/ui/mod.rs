pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use engine::month_label;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{AppState, BudgetMode, BudgetPane, DashboardPane, Screen, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );
    match state.screen {
        Screen::Login => screens::login::render(frame, area, state, &theme),
        Screen::Home => render_shell(frame, area, state, &theme),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tabs
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Hints
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, theme);
    components::tabs::render_tabs(frame, layout[1], state.section, theme);

    let content = layout[2];
    match state.section {
        Section::Dashboard => screens::dashboard::render(frame, content, state, theme),
        Section::Budget => screens::budget::render(frame, content, state, theme),
        Section::Analysis => screens::analysis::render(frame, content, state, theme),
        Section::Stats => screens::stats::render(frame, content, state, theme),
        Section::Settings => screens::settings::render(frame, content, state, theme),
    }

    render_bottom_bar(frame, layout[3], state, theme);
    if let Some(form) = &state.form {
        components::form::render_form(frame, content, form, theme);
    } else if let Some(pending) = &state.confirm {
        components::form::render_confirm(frame, content, pending, theme);
    }
    components::toast::render(frame, area, state.toast.as_ref(), theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .user
        .as_ref()
        .map_or("-", |user| user.username.as_str());
    let month = state
        .month
        .current()
        .map(|view| month_label(view.month().year, view.month().month))
        .unwrap_or_else(|| "-".to_string());
    let (status, status_style) = if state.month.view.is_loading() {
        ("loading", Style::default().fg(theme.warning))
    } else if state.month.error.is_some() {
        ("ERR", Style::default().fg(theme.error))
    } else {
        ("OK", Style::default().fg(theme.positive))
    };

    let line = Line::from(vec![
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Month", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {month}  ")),
        Span::styled("Currency", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.currency)),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    let context_hints = context_hints(state);
    if !context_hints.is_empty() {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.extend(hint_spans(&context_hints, theme));
    }

    if !state.is_typing() {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.extend(hint_spans(&[("q", "quit")], theme));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn hint_spans(hints: &[(&'static str, &'static str)], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {label}")));
    }
    spans
}

fn context_hints(state: &AppState) -> Vec<(&'static str, &'static str)> {
    if state.form.is_some() {
        return vec![("Tab", "next field"), ("Enter", "save"), ("Esc", "cancel")];
    }
    if state.confirm.is_some() {
        return vec![("y", "delete"), ("any key", "keep")];
    }
    if state.savings.editor.is_editing() || state.budget.mode != BudgetMode::List {
        return vec![("Enter", "save"), ("Esc", "cancel")];
    }

    let open_month = state.writable_month().is_ok();
    let month_nav = [("p/n", "month")];
    match state.section {
        Section::Dashboard => {
            let mut hints = month_nav.to_vec();
            hints.push(("w", "pane"));
            if open_month || state.dashboard.pane == DashboardPane::Fixed {
                hints.extend([("+", "new"), ("m", "edit"), ("x", "delete")]);
            }
            hints.extend([("s", "savings"), ("g", "goal"), ("t", "retirement")]);
            if state.can_close_selected() {
                hints.push(("c", "close month"));
            }
            if state.month.current().is_some_and(|view| view.is_closed()) {
                hints.push(("d", "pdf"));
            }
            hints.push(("r", "refresh"));
            hints
        }
        Section::Budget => {
            let mut hints = month_nav.to_vec();
            hints.extend([("↑/↓", "select"), ("w", "pane")]);
            match (open_month, state.budget.pane) {
                (false, _) => {}
                (true, BudgetPane::Categories) => hints.extend([
                    ("e", "allocation"),
                    ("+", "category"),
                    ("m", "edit"),
                    ("x", "delete"),
                    ("a", "quick add"),
                ]),
                (true, BudgetPane::Items) => {
                    hints.extend([("m", "edit"), ("x", "delete"), ("a", "quick add")]);
                }
            }
            hints
        }
        Section::Analysis => month_nav.to_vec(),
        Section::Stats => vec![("r", "refresh")],
        Section::Settings => vec![
            ("u", "username"),
            ("w", "password"),
            ("D", "delete data"),
            ("x", "export"),
            ("i", "import"),
            ("l", "logout"),
        ],
    }
}

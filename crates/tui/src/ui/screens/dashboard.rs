use engine::{Currency, Money, SavingsField, month_label};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use crate::{
    app::{AppState, DashboardPane, MonthView},
    ui::{
        components::{
            card::{Card, StatCard},
            money::{alert_amount, plain_amount, savings_gauge, styled_amount},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Month header
            Constraint::Length(4), // Totals
            Constraint::Min(5),    // Income and fixed expenses
            Constraint::Length(8), // Savings
        ])
        .split(area);

    render_month_header(frame, layout[0], state, theme);

    match state.month.current() {
        Some(view) => render_totals(frame, layout[1], view, state.currency, theme),
        None => render_placeholder(frame, layout[1], state, theme),
    }

    render_lists(frame, layout[2], state, theme);
    render_savings_row(frame, layout[3], state, theme);
}

fn render_lists(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let currency = state.currency;
    let pane = state.dashboard.pane;

    let income: Vec<(&str, f64)> = state.month.current().map_or_else(Vec::new, |view| {
        view.summary
            .income_entries
            .iter()
            .map(|entry| (entry.label.as_str(), entry.amount))
            .collect()
    });
    let income_empty = if state.writable_month().is_ok() {
        "No income yet. + to add."
    } else {
        "No income."
    };
    render_entries(
        frame,
        cols[0],
        EntryList {
            title: "Income",
            rows: &income,
            selected: state.dashboard.income,
            focused: pane == DashboardPane::Income,
            empty: income_empty,
        },
        currency,
        theme,
    );

    let fixed: Vec<(&str, f64)> = state
        .fixed_expenses
        .iter()
        .map(|expense| (expense.label.as_str(), expense.amount))
        .collect();
    render_entries(
        frame,
        cols[1],
        EntryList {
            title: "Fixed expenses",
            rows: &fixed,
            selected: state.dashboard.fixed,
            focused: pane == DashboardPane::Fixed,
            empty: "No fixed expenses. + to add.",
        },
        currency,
        theme,
    );
}

struct EntryList<'a> {
    title: &'a str,
    rows: &'a [(&'a str, f64)],
    selected: usize,
    focused: bool,
    empty: &'static str,
}

fn render_entries(
    frame: &mut Frame<'_>,
    area: Rect,
    list: EntryList<'_>,
    currency: Currency,
    theme: &Theme,
) {
    let card = Card::new(list.title, theme).focused(list.focused);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if list.rows.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(list.empty, Style::default().fg(theme.dim))),
            inner,
        );
        return;
    }

    let visible = usize::from(inner.height.max(1));
    let offset = list.selected.saturating_sub(visible - 1);
    let items: Vec<ListItem> = list
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, (label, amount))| {
            let selected = list.focused && i == list.selected;
            let marker = if selected { "› " } else { "  " };
            let label_style = if selected {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::styled(format!("{label:<20}"), label_style),
                plain_amount(Money::from_major(*amount, currency), currency, theme),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

fn render_month_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let nav = state.month.nav();
    let arrow = |enabled: bool, text: &'static str| {
        let color = if enabled { theme.accent } else { theme.border };
        Span::styled(text, Style::default().fg(color))
    };

    let mut spans = vec![arrow(nav.prev.is_some(), "‹ p  ")];
    match state.month.current() {
        Some(view) => {
            spans.push(Span::styled(
                month_label(view.month().year, view.month().month),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ));
            spans.push(arrow(nav.next.is_some(), "  n ›"));
            if view.is_closed() {
                spans.push(Span::styled(
                    "   closed · read-only · d pdf",
                    Style::default().fg(theme.warning),
                ));
            } else if state.can_close_selected() {
                spans.push(Span::styled(
                    "   last day · c to close",
                    Style::default().fg(theme.accent),
                ));
            }
        }
        None => {
            spans.push(Span::styled("-", Style::default().fg(theme.dim)));
            spans.push(arrow(nav.next.is_some(), "  n ›"));
        }
    }

    Card::new("Month", theme).render_with(
        frame,
        area,
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
    );
}

fn render_placeholder(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let (text, color) = match &state.month.error {
        Some(error) if !state.month.view.is_loading() => (error.clone(), theme.error),
        _ => ("Loading…".to_string(), theme.dim),
    };
    Card::new("Overview", theme).render_with(
        frame,
        area,
        Paragraph::new(Span::styled(text, Style::default().fg(color))),
    );
}

fn render_totals(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &MonthView,
    currency: Currency,
    theme: &Theme,
) {
    let totals = view.totals;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    StatCard::new("Income", plain_amount(totals.income, currency, theme), theme)
        .subtitle(format!("{} entries", view.summary.income_entries.len()))
        .render(frame, cols[0]);

    StatCard::new("Fixed", plain_amount(totals.fixed, currency, theme), theme)
        .subtitle(format!("{} expenses", view.summary.fixed_expenses.len()))
        .render(frame, cols[1]);

    let spent = if totals.spent > totals.budgeted {
        alert_amount(totals.spent, currency, theme)
    } else {
        plain_amount(totals.spent, currency, theme)
    };
    StatCard::new("Spent", spent, theme)
        .subtitle(format!("of {} budgeted", totals.budgeted.format(currency)))
        .render(frame, cols[2]);

    let remaining = StatCard::new(
        "Remaining",
        styled_amount(totals.remaining, currency, theme),
        theme,
    );
    let remaining = if totals.remaining.is_negative() {
        remaining.subtitle_styled(Span::styled(
            "deficit",
            Style::default().fg(theme.negative),
        ))
    } else {
        remaining.subtitle("after fixed and spending")
    };
    remaining.render(frame, cols[3]);
}

fn render_savings_row(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_savings_card(frame, cols[0], state, theme);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(4)])
        .split(cols[1]);

    let currency = state.currency;
    let remaining = state
        .month
        .current()
        .map_or(Money::ZERO, |view| view.totals.remaining);
    let projected = state.savings.state.projected(remaining);
    StatCard::new(
        "Projected savings",
        plain_amount(projected, currency, theme),
        theme,
    )
    .subtitle("if the remaining budget is kept")
    .render(frame, side[0]);

    StatCard::new(
        "Retirement",
        plain_amount(state.savings.retirement, currency, theme),
        theme,
    )
    .subtitle("t to edit")
    .render(frame, side[1]);
}

fn render_savings_card(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let currency = state.currency;
    let savings = &state.savings;
    let editing = savings.editor.editing_field();

    let card = Card::new("Savings", theme).focused(editing.is_some());
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Savings, goal, target
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Ahead / behind
            Constraint::Length(1), // Edit error
        ])
        .split(inner);

    let remaining = state
        .month
        .current()
        .map_or(Money::ZERO, |view| view.totals.remaining);
    let projection = savings.state.projection(remaining);

    let field_value = |field: SavingsField, value: Money, unset: bool| -> Span<'static> {
        if editing == Some(field) {
            let buffer = savings.editor.buffer().unwrap_or_default();
            Span::styled(format!("{buffer}│"), Style::default().fg(theme.accent))
        } else if unset {
            Span::styled("not set", Style::default().fg(theme.dim))
        } else {
            plain_amount(value, currency, theme)
        }
    };

    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.text_muted));
    let target_note = if savings.state.has_goal() {
        " (goal)"
    } else {
        " (projected)"
    };
    let lines = vec![
        Line::from(vec![
            label("Savings  "),
            field_value(SavingsField::Savings, savings.state.current, false),
        ]),
        Line::from(vec![
            label("Goal     "),
            field_value(
                SavingsField::Goal,
                savings.state.goal,
                !savings.state.has_goal(),
            ),
        ]),
        Line::from(vec![
            label("Target   "),
            plain_amount(projection.target, currency, theme),
            Span::styled(target_note, Style::default().fg(theme.dim)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), rows[0]);

    frame.render_widget(
        savings_gauge(projection.percentage, projection.is_ahead, theme),
        rows[1],
    );

    let verdict = if projection.is_ahead {
        Span::styled(
            format!("Ahead by {}", projection.difference.format(currency)),
            Style::default().fg(theme.positive),
        )
    } else {
        Span::styled(
            format!("Behind by {}", projection.difference.abs().format(currency)),
            Style::default().fg(theme.warning),
        )
    };
    frame.render_widget(Paragraph::new(verdict), rows[2]);

    if let Some(error) = &savings.error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                error.as_str(),
                Style::default().fg(theme.error),
            )),
            rows[3],
        );
    }
}

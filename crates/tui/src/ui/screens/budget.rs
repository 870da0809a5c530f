use engine::Money;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use crate::{
    app::{AppState, BudgetMode, BudgetPane, MonthView},
    ui::{
        components::{
            card::Card,
            money::{plain_amount, styled_amount, usage_bar},
        },
        theme::Theme,
    },
};

const RECENT_ITEMS: usize = 8;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let Some(view) = state.month.current() else {
        let text = state.month.error.as_deref().unwrap_or("Loading…");
        Card::new("Budget", theme).render_with(
            frame,
            area,
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
        );
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(RECENT_ITEMS as u16 + 2),
            Constraint::Length(3),
        ])
        .split(area);

    render_lines(frame, layout[0], state, view, theme);
    render_items(frame, layout[1], state, view, theme);
    render_input(frame, layout[2], state, view, theme);
}

fn render_lines(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    view: &MonthView,
    theme: &Theme,
) {
    let currency = state.currency;
    let focused = state.budget.pane == BudgetPane::Categories;
    let card = Card::new("Categories", theme).focused(focused);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if view.lines.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No categories budgeted this month.",
                Style::default().fg(theme.dim),
            )),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = view
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let selected = focused && i == state.budget.selected;
            let marker = if selected { "› " } else { "  " };
            let label_style = if selected {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::styled(format!("{:<18}", line.label), label_style),
                Span::styled(
                    format!(
                        "{:>12} / {:<12}",
                        line.spent.format(currency),
                        line.allocated.format(currency)
                    ),
                    Style::default().fg(theme.text_muted),
                ),
                usage_bar(line, 12, theme),
                Span::raw("  "),
                styled_amount(line.variance(), currency, theme),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}

fn render_items(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    view: &MonthView,
    theme: &Theme,
) {
    let currency = state.currency;
    let focused = state.budget.pane == BudgetPane::Items;
    let items = view.items_newest_first();
    let offset = state.budget.item.saturating_sub(RECENT_ITEMS - 1);

    let rows: Vec<ListItem> = items
        .into_iter()
        .enumerate()
        .skip(offset)
        .take(RECENT_ITEMS)
        .map(|(i, item)| {
            let selected = focused && i == state.budget.item;
            ListItem::new(Line::from(vec![
                Span::styled(
                    if selected { "› " } else { "  " },
                    Style::default().fg(theme.accent),
                ),
                Span::styled(
                    format!("{}  ", item.spent_on.format("%d %b")),
                    Style::default().fg(theme.dim),
                ),
                Span::styled(
                    format!("{:<16}", item.category_label),
                    Style::default().fg(theme.text_muted),
                ),
                Span::styled(
                    format!("{:<24}", item.description),
                    Style::default().fg(theme.text),
                ),
                plain_amount(Money::from_major(item.amount, currency), currency, theme),
            ]))
        })
        .collect();

    let title = format!("Spending ({})", view.summary.items.len());
    Card::new(&title, theme)
        .focused(focused)
        .render_with(frame, area, List::new(rows));
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    view: &MonthView,
    theme: &Theme,
) {
    let budget = &state.budget;
    let editing = budget.mode != BudgetMode::List;
    let prompt = |label: String, buffer: &str, help: &'static str| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(theme.text_muted)),
            Span::styled(format!("{buffer}│"), Style::default().fg(theme.accent)),
            Span::styled(help, Style::default().fg(theme.dim)),
        ])
    };

    let mut line = match &budget.mode {
        BudgetMode::EditAllocation { buffer } => {
            let label = view
                .lines
                .get(budget.selected)
                .map_or("", |line| line.label.as_str());
            prompt(format!("Allocation for {label}: "), buffer, "")
        }
        BudgetMode::QuickAdd { buffer } => {
            prompt("Add: ".to_string(), buffer, "   12.50 #category note")
        }
        BudgetMode::List if view.is_closed() => Line::from(Span::styled(
            "This month is closed and read-only.",
            Style::default().fg(theme.warning),
        )),
        BudgetMode::List => Line::from(Span::styled(
            "a quick add · w switch pane · m edit · x delete",
            Style::default().fg(theme.dim),
        )),
    };
    if let Some(message) = &budget.message {
        line.push_span(Span::styled(
            format!("   {message}"),
            Style::default().fg(theme.error),
        ));
    }

    Card::new("Entry", theme)
        .focused(editing)
        .render_with(frame, area, Paragraph::new(line));
}

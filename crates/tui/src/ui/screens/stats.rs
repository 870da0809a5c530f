use engine::{Currency, StatsView};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Card, StatCard},
            charts::{ascii_bar, bar_value, mini_bar_chart, render_bar_chart, spending_bars},
            money::{plain_amount, styled_amount, styled_change},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let Some(stats) = state.stats.data.as_ref() else {
        let (text, color) = match &state.stats.error {
            Some(error) => (error.as_str(), theme.error),
            None => ("Loading…", theme.dim),
        };
        Card::new("Stats", theme).render_with(
            frame,
            area,
            Paragraph::new(Span::styled(text, Style::default().fg(color))),
        );
        return;
    };

    if !stats.has_history() {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(4)])
            .split(area);
        Card::new("Trends", theme).render_with(
            frame,
            layout[0],
            Paragraph::new(Span::styled(
                "Trends appear once there is more than one month of history.",
                Style::default().fg(theme.dim),
            )),
        );
        render_categories(frame, layout[1], stats, state.currency, theme);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Averages
            Constraint::Length(10), // Spending chart
            Constraint::Min(4),     // Categories
        ])
        .split(area);

    render_averages(frame, layout[0], stats, state.currency, theme);

    let bars = spending_bars(&stats.trend);
    let data: Vec<(&str, u64)> = bars
        .iter()
        .map(|(label, value)| (label.as_str(), *value))
        .collect();
    render_bar_chart(frame, layout[1], "Spending per month", &data, theme);

    render_categories(frame, layout[2], stats, state.currency, theme);
}

fn render_averages(
    frame: &mut Frame<'_>,
    area: Rect,
    stats: &StatsView,
    currency: Currency,
    theme: &Theme,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let spent: Vec<u64> = stats.trend.iter().map(|p| bar_value(p.spent)).collect();
    StatCard::new(
        "Avg spending",
        plain_amount(stats.average_spending, currency, theme),
        theme,
    )
    .subtitle(mini_bar_chart(&spent))
    .render(frame, cols[0]);

    let income: Vec<u64> = stats.trend.iter().map(|p| bar_value(p.income)).collect();
    StatCard::new(
        "Avg income",
        plain_amount(stats.average_income, currency, theme),
        theme,
    )
    .subtitle(mini_bar_chart(&income))
    .render(frame, cols[1]);

    let latest_net = stats.trend.last().map(|p| p.net).unwrap_or_default();
    let months = stats.trend.len();
    StatCard::new(
        "Net, last month",
        styled_amount(latest_net, currency, theme),
        theme,
    )
    .subtitle(format!("over {months} months of history"))
    .render(frame, cols[2]);
}

fn render_categories(
    frame: &mut Frame<'_>,
    area: Rect,
    stats: &StatsView,
    currency: Currency,
    theme: &Theme,
) {
    let max = stats
        .categories
        .iter()
        .map(|c| bar_value(c.current))
        .max()
        .unwrap_or(0);

    let items: Vec<ListItem> = stats
        .categories
        .iter()
        .map(|category| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<18}", category.label),
                    Style::default().fg(theme.text),
                ),
                Span::styled(
                    ascii_bar(bar_value(category.current), max, 16),
                    Style::default().fg(theme.accent),
                ),
                Span::styled(
                    format!(
                        " {:>12}  was {:>12}  ",
                        category.current.format(currency),
                        category.previous.format(currency)
                    ),
                    Style::default().fg(theme.text_muted),
                ),
                styled_change(category.change, currency, theme),
            ]))
        })
        .collect();

    Card::new("Categories vs previous month", theme).render_with(frame, area, List::new(items));
}

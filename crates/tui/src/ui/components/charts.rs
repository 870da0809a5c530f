use engine::{Money, TrendPoint};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    widgets::BarChart,
};

use crate::ui::{components::card::Card, theme::Theme};

/// Vertical bar chart inside a card, one bar per label.
pub fn render_bar_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    data: &[(&str, u64)],
    theme: &Theme,
) {
    let chart = BarChart::default()
        .data(data)
        .bar_width(8)
        .bar_gap(2)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.dim));

    Card::new(title, theme).render_with(frame, area, chart);
}

/// Whole major units for chart heights; negative values are drawn as zero.
#[must_use]
pub fn bar_value(amount: Money) -> u64 {
    u64::try_from(amount.minor() / 100).unwrap_or(0)
}

/// Spending per month, oldest first, labelled `Mar 26`-style to fit the bars.
#[must_use]
pub fn spending_bars(trend: &[TrendPoint]) -> Vec<(String, u64)> {
    trend
        .iter()
        .map(|point| (short_label(&point.label), bar_value(point.spent)))
        .collect()
}

fn short_label(label: &str) -> String {
    match label.split_once(' ') {
        Some((month, year)) if year.len() == 4 => format!("{month} {}", &year[2..]),
        _ => label.to_string(),
    }
}

/// Text bar such as `████████░░░░░░░░░░░░` for `value / max`.
#[must_use]
pub fn ascii_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return "░".repeat(width);
    }

    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// One-line chart such as `▁▂▃▅▇▅▃▂▁`.
#[must_use]
pub fn mini_bar_chart(values: &[u64]) -> String {
    let Some(&max) = values.iter().max() else {
        return String::new();
    };
    if max == 0 {
        return " ".repeat(values.len());
    }

    let bars = [
        symbols::bar::ONE_EIGHTH,
        symbols::bar::ONE_QUARTER,
        symbols::bar::THREE_EIGHTHS,
        symbols::bar::HALF,
        symbols::bar::FIVE_EIGHTHS,
        symbols::bar::THREE_QUARTERS,
        symbols::bar::SEVEN_EIGHTHS,
        symbols::bar::FULL,
    ];

    values
        .iter()
        .map(|&v| {
            if v == 0 {
                " "
            } else {
                let index = ((v as f64 / max as f64) * 7.0) as usize;
                bars[index.min(7)]
            }
        })
        .collect()
}

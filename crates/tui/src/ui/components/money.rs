use engine::{BudgetLine, Change, ChangeSize, Currency, Money};
use ratatui::{
    style::{Modifier, Style},
    text::Span,
    widgets::Gauge,
};

use crate::ui::theme::Theme;

/// Signed amount: green with `+` when positive, red when negative.
#[must_use]
pub fn styled_amount(amount: Money, currency: Currency, theme: &Theme) -> Span<'static> {
    let formatted = amount.format(currency);

    let (color, prefix) = if amount.is_positive() {
        (theme.positive, "+")
    } else if amount.is_negative() {
        (theme.negative, "")
    } else {
        (theme.text, "")
    };

    Span::styled(format!("{prefix}{formatted}"), Style::default().fg(color))
}

/// Amount in plain text color, for figures whose sign carries no verdict
/// (income, fixed costs, allocations).
#[must_use]
pub fn plain_amount(amount: Money, currency: Currency, theme: &Theme) -> Span<'static> {
    Span::styled(amount.format(currency), Style::default().fg(theme.text))
}

/// Bold red amount, used for overruns and deficits.
#[must_use]
pub fn alert_amount(amount: Money, currency: Currency, theme: &Theme) -> Span<'static> {
    Span::styled(
        amount.format(currency),
        Style::default()
            .fg(theme.negative)
            .add_modifier(Modifier::BOLD),
    )
}

/// Text progress bar such as `████████░░ 80%`.
#[must_use]
pub fn inline_progress_bar(ratio: f64, width: usize) -> String {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((ratio * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);
    let percentage = (ratio * 100.0).round() as u16;

    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(empty),
        percentage
    )
}

/// Spent vs. allocated bar of a budget line. Overspent and unplanned lines
/// are always red.
#[must_use]
pub fn usage_bar(line: &BudgetLine, width: usize, theme: &Theme) -> Span<'static> {
    let ratio = line.usage_ratio();
    let color = if line.variance().is_positive() {
        theme.negative
    } else if ratio < 0.7 {
        theme.positive
    } else if ratio < 0.9 {
        theme.warning
    } else {
        theme.negative
    };
    Span::styled(
        inline_progress_bar(ratio, width),
        Style::default().fg(color),
    )
}

/// Gauge for progress towards the savings target.
#[must_use]
pub fn savings_gauge(percentage: f64, is_ahead: bool, theme: &Theme) -> Gauge<'static> {
    let shown = if percentage.is_finite() {
        percentage.max(0.0)
    } else {
        0.0
    };
    let color = if is_ahead {
        theme.positive
    } else {
        theme.warning
    };
    Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio((shown / 100.0).min(1.0))
        .label(format!("{shown:.1}%"))
}

/// Month-over-month change of a spending figure. More spending is red.
#[must_use]
pub fn styled_change(change: Change, currency: Currency, theme: &Theme) -> Span<'static> {
    let (arrow, color, size) = match change {
        Change::Flat => return Span::raw(""),
        Change::Up(size) => ("▲", theme.negative, size),
        Change::Down(size) => ("▼", theme.positive, size),
    };
    let text = match size {
        ChangeSize::Percent(percent) => format!("{arrow} {percent:.1}%"),
        ChangeSize::Amount(amount) => format!("{arrow} {}", amount.format(currency)),
    };
    Span::styled(text, Style::default().fg(color))
}

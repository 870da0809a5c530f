use engine::{BudgetAnalysis, Currency, LineVariance, Money, Outlook};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::Card,
            money::{alert_amount, plain_amount},
        },
        theme::Theme,
    },
};

/// Under-budget lines suggested as a source of funds when off track.
const SUGGESTIONS: usize = 3;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let Some(view) = state.month.current() else {
        let text = state.month.error.as_deref().unwrap_or("Loading…");
        Card::new("Analysis", theme).render_with(
            frame,
            area,
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
        );
        return;
    };
    let analysis = &view.analysis;
    let currency = state.currency;

    let show_suggestions = !analysis.on_track && !analysis.report.under_budget.is_empty();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Outlook
            Constraint::Length(5), // Income check
            Constraint::Min(5),    // Buckets
            Constraint::Length(if show_suggestions {
                SUGGESTIONS as u16 + 3
            } else {
                0
            }),
        ])
        .split(area);

    render_outlook(frame, layout[0], analysis, currency, theme);
    render_income_check(frame, layout[1], analysis, currency, theme);
    render_buckets(frame, layout[2], analysis, currency, theme);
    if show_suggestions {
        render_suggestions(frame, layout[3], analysis, currency, theme);
    }
}

fn render_outlook(
    frame: &mut Frame<'_>,
    area: Rect,
    analysis: &BudgetAnalysis,
    currency: Currency,
    theme: &Theme,
) {
    let (text, color) = match analysis.outlook {
        Outlook::Ahead { saved } => (
            format!("On track: {} under plan", saved.format(currency)),
            theme.positive,
        ),
        Outlook::OnTrack => ("On track: spending exactly as planned".to_string(), theme.positive),
        Outlook::Over { amount } => (
            format!("Off track by {}", amount.format(currency)),
            theme.negative,
        ),
    };
    Card::new("Outlook", theme).render_with(
        frame,
        area,
        Paragraph::new(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    );
}

fn render_income_check(
    frame: &mut Frame<'_>,
    area: Rect,
    analysis: &BudgetAnalysis,
    currency: Currency,
    theme: &Theme,
) {
    let income = analysis.income;
    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.text_muted));
    let shortfall = if income.has_shortfall() {
        alert_amount(income.shortfall, currency, theme)
    } else {
        Span::styled("none", Style::default().fg(theme.positive))
    };
    let lines = vec![
        Line::from(vec![
            label("Income             "),
            plain_amount(income.income, currency, theme),
        ]),
        Line::from(vec![
            label("Needed (fixed+plan)"),
            Span::raw(" "),
            plain_amount(income.income_needed, currency, theme),
        ]),
        Line::from(vec![label("Shortfall          "), shortfall]),
    ];
    Card::new("Income", theme).render_with(frame, area, Paragraph::new(lines));
}

fn render_buckets(
    frame: &mut Frame<'_>,
    area: Rect,
    analysis: &BudgetAnalysis,
    currency: Currency,
    theme: &Theme,
) {
    let report = &analysis.report;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    render_bucket(
        frame,
        cols[0],
        "Over budget",
        report.total_overspend,
        &report.over_budget,
        |line| line.variance,
        theme.negative,
        currency,
        theme,
    );
    render_bucket(
        frame,
        cols[1],
        "Unplanned",
        report.total_unplanned,
        &report.unplanned,
        |line| line.spent,
        theme.warning,
        currency,
        theme,
    );
    render_bucket(
        frame,
        cols[2],
        "Under budget",
        report.total_saved,
        &report.under_budget,
        |line| line.variance.abs(),
        theme.positive,
        currency,
        theme,
    );
}

#[allow(clippy::too_many_arguments)]
fn render_bucket(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    total: Money,
    lines: &[LineVariance],
    amount: impl Fn(&LineVariance) -> Money,
    color: Color,
    currency: Currency,
    theme: &Theme,
) {
    let mut text = vec![Line::from(vec![
        Span::styled("Total ", Style::default().fg(theme.text_muted)),
        Span::styled(
            total.format(currency),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])];
    if lines.is_empty() {
        text.push(Line::from(Span::styled(
            "nothing here",
            Style::default().fg(theme.dim),
        )));
    }
    for line in lines {
        text.push(Line::from(vec![
            Span::styled(format!("{:<16}", line.label), Style::default().fg(theme.text)),
            Span::styled(amount(line).format(currency), Style::default().fg(color)),
        ]));
    }
    Card::new(title, theme).render_with(frame, area, Paragraph::new(text));
}

fn render_suggestions(
    frame: &mut Frame<'_>,
    area: Rect,
    analysis: &BudgetAnalysis,
    currency: Currency,
    theme: &Theme,
) {
    let under = &analysis.report.under_budget;
    let mut lines: Vec<Line> = under
        .iter()
        .take(SUGGESTIONS)
        .map(|line| {
            Line::from(vec![
                Span::styled("Could reallocate ", Style::default().fg(theme.text_muted)),
                Span::styled(
                    line.variance.abs().format(currency),
                    Style::default().fg(theme.positive),
                ),
                Span::styled(" from ", Style::default().fg(theme.text_muted)),
                Span::styled(line.label.clone(), Style::default().fg(theme.text)),
            ])
        })
        .collect();
    if under.len() > SUGGESTIONS {
        lines.push(Line::from(Span::styled(
            format!("+{} more", under.len() - SUGGESTIONS),
            Style::default().fg(theme.dim),
        )));
    }
    Card::new("Rebalance", theme).render_with(frame, area, Paragraph::new(lines));
}

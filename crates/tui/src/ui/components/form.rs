use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{Form, PendingDelete},
    ui::theme::Theme,
};

const MODAL_WIDTH: u16 = 56;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn modal_block<'a>(title: &str, color: Color, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme.background))
}

/// Draws an open form over the current screen, one bordered input per
/// field.
pub fn render_form(frame: &mut Frame<'_>, area: Rect, form: &Form, theme: &Theme) {
    let height = form.fields.len() as u16 * 3 + 4;
    let modal = centered(area, MODAL_WIDTH, height);
    frame.render_widget(Clear, modal);

    let block = modal_block(form.kind.title(), theme.accent, theme);
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let mut constraints = vec![Constraint::Length(3); form.fields.len()];
    constraints.push(Constraint::Length(1)); // Error
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let border = if focused {
            theme.border_focused
        } else {
            theme.border
        };
        let shown = if field.secret {
            "•".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let mut spans = vec![Span::styled(shown, Style::default().fg(theme.text))];
        if focused {
            spans.push(Span::styled("│", Style::default().fg(theme.accent)));
        }
        let input = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", field.label),
                    Style::default().fg(theme.text_muted),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(input, rows[i]);
    }

    if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                error.as_str(),
                Style::default().fg(theme.error),
            )),
            rows[form.fields.len()],
        );
    }
}

pub fn render_confirm(frame: &mut Frame<'_>, area: Rect, pending: &PendingDelete, theme: &Theme) {
    let modal = centered(area, MODAL_WIDTH, 5);
    frame.render_widget(Clear, modal);

    let lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                pending.label.as_str(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.negative)),
            Span::styled(" delete   any other key keeps it", Style::default().fg(theme.dim)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(modal_block("Confirm", theme.warning, theme)),
        modal,
    );
}

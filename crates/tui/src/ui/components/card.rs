use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::ui::theme::Theme;

/// Rounded container used for every dashboard panel.
pub struct Card<'a> {
    title: &'a str,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> Card<'a> {
    pub fn new(title: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            theme,
            focused: false,
        }
    }

    /// Highlights the border, e.g. while the card is being edited.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(&self) -> Block<'a> {
        let border_color = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border
        };

        Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(self.theme.accent),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(self.theme.surface_bright))
    }

    pub fn inner(&self, area: Rect) -> Rect {
        self.block().inner(area)
    }

    pub fn render_frame(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(self.block(), area);
    }

    pub fn render_with<W: Widget>(&self, frame: &mut Frame<'_>, area: Rect, content: W) {
        let inner = self.inner(area);
        frame.render_widget(self.block(), area);
        frame.render_widget(content, inner);
    }
}

/// A headline figure with an optional note underneath.
pub struct StatCard<'a> {
    title: &'a str,
    value: Span<'static>,
    subtitle: Option<Span<'static>>,
    theme: &'a Theme,
}

impl<'a> StatCard<'a> {
    pub fn new(title: &'a str, value: Span<'static>, theme: &'a Theme) -> Self {
        Self {
            title,
            value,
            subtitle: None,
            theme,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(Span::styled(
            subtitle.into(),
            Style::default().fg(self.theme.dim),
        ));
        self
    }

    pub fn subtitle_styled(mut self, subtitle: Span<'static>) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    pub fn render(self, frame: &mut Frame<'_>, area: Rect) {
        let value = self
            .value
            .patch_style(Style::default().add_modifier(Modifier::BOLD));
        let mut lines = vec![Line::from(value)];
        if let Some(sub) = self.subtitle {
            lines.push(Line::from(sub));
        }
        Card::new(self.title, self.theme).render_with(frame, area, Paragraph::new(lines));
    }
}

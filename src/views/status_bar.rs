use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::theme::ResolvedTheme;

/// Builder for the one-line status bar.
///
/// Layout: `[Label] Position | Notice | Help Text`
pub struct StatusBar<'a> {
    theme: &'a ResolvedTheme,
    label: &'a str,
    position: Option<(usize, usize)>,
    notice: Option<&'a str>,
    help_text: &'a str,
}

impl<'a> StatusBar<'a> {
    pub fn new(theme: &'a ResolvedTheme) -> Self {
        Self {
            theme,
            label: "",
            position: None,
            notice: None,
            help_text: "",
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn position(mut self, current: usize, total: usize) -> Self {
        self.position = Some((current, total));
        self
    }

    pub fn notice(mut self, text: &'a str) -> Self {
        self.notice = Some(text);
        self
    }

    pub fn help(mut self, text: &'a str) -> Self {
        self.help_text = text;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(format!(" {} ", self.label), self.theme.status_bar_style()),
            Span::raw(" "),
        ];

        if let Some((current, total)) = self.position {
            spans.push(Span::styled(
                format!("{}/{}", current, total),
                Style::default().fg(self.theme.foreground_dim),
            ));
            spans.push(Span::raw(" | "));
        }

        if let Some(notice) = self.notice {
            spans.push(Span::styled(notice.to_string(), self.theme.error_style()));
            spans.push(Span::raw(" | "));
        }

        spans.push(Span::styled(
            self.help_text.to_string(),
            Style::default().fg(self.theme.foreground_dim),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

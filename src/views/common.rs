use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::api::ApiError;
use crate::app::App;
use crate::theme::ResolvedTheme;
use crate::views::spinner::spinner_frame;

/// Render an error message in a bordered block.
pub fn render_error(frame: &mut Frame, error: &ApiError, theme: &ResolvedTheme, area: Rect) {
    let widget = Paragraph::new(error.user_message())
        .style(theme.error_style())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title("Error"),
        );
    frame.render_widget(widget, area);
}

/// Bottom edge of a list: what happens if the user keeps scrolling.
///
/// Spinner while a page is in flight, the error with its retry key after a
/// failure, an end marker once exhausted.
pub fn list_footer(app: &App) -> Line<'static> {
    let theme = &app.theme;
    if app.active_is_fetching() {
        return Line::from(Span::styled(
            format!(" {} Loading more… ", spinner_frame(app.started_at)),
            theme.spinner_style(),
        ));
    }
    if let Some(err) = app.active_error() {
        let mut spans = vec![Span::styled(
            format!(" {} ", err.user_message()),
            theme.error_style(),
        )];
        if !err.user_message().contains("retry") {
            spans.push(Span::styled("r:retry ", theme.dim_style()));
        }
        return Line::from(spans);
    }
    if !app.active_has_more() {
        return Line::from(Span::styled(" · no more results · ", theme.dim_style()));
    }
    Line::from(Span::styled(" m:load more ", theme.dim_style()))
}

/// Title for an empty list, which differs between "still loading" and
/// "nothing there".
pub fn empty_message(app: &App, nothing: &'static str) -> &'static str {
    if app.active_is_fetching() || (app.active_has_more() && app.active_error().is_none()) {
        "Loading…"
    } else {
        nothing
    }
}

/// Compact age like "5m ago" or "3d ago".
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 2_592_000 => format!("{}d ago", s / 86_400),
        s if s < 31_536_000 => format!("{}mo ago", s / 2_592_000),
        s => format!("{}y ago", s / 31_536_000),
    }
}

pub fn age_span(created: Option<DateTime<Utc>>, theme: &ResolvedTheme) -> Span<'static> {
    let text = created
        .map(|t| format_relative(t, Utc::now()))
        .unwrap_or_default();
    Span::styled(text, Style::default().fg(theme.foreground_dim))
}

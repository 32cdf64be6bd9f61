use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{App, Tab};
use crate::theme::ResolvedTheme;

/// Side pane with the full record of the selected entry.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    // Borders plus padding
    let width = area.width.saturating_sub(4).max(10) as usize;

    let (title, lines) = match app.tab {
        Tab::Gallery => match app.selected_page() {
            Some(page) => {
                let mut lines = heading(&page.title, width, theme);
                if let Some(category) = &page.category {
                    lines.push(field("category", category.clone(), theme));
                }
                lines.push(field("likes", page.likes.to_string(), theme));
                lines.push(field("downloads", page.downloads.to_string(), theme));
                if let Some(created) = page.created() {
                    lines.push(field("added", created.format("%Y-%m-%d").to_string(), theme));
                }
                lines.push(Line::from(""));
                if let Some(description) = &page.description {
                    lines.extend(paragraph(description, width, theme));
                    lines.push(Line::from(""));
                }
                lines.push(field("link", page.web_url(&app.settings.site_url), theme));
                ("Page", lines)
            }
            None => ("Page", Vec::new()),
        },
        Tab::History => match app.selected_generation() {
            Some(generation) => {
                let mut lines = heading(&generation.prompt, width, theme);
                lines.push(field("id", generation.id.clone(), theme));
                lines.push(field("status", format!("{:?}", generation.status).to_lowercase(), theme));
                if let Some(created) = generation.created() {
                    lines.push(field(
                        "created",
                        created.format("%Y-%m-%d %H:%M").to_string(),
                        theme,
                    ));
                }
                if let Some(url) = &generation.image_url {
                    lines.push(field("image", url.clone(), theme));
                }
                ("Generation", lines)
            }
            None => ("Generation", Vec::new()),
        },
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn heading(text: &str, width: usize, theme: &ResolvedTheme) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = wrap_text(text, width)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, theme.active_tab_style())))
        .collect();
    lines.push(Line::from(""));
    lines
}

fn paragraph(text: &str, width: usize, theme: &ResolvedTheme) -> Vec<Line<'static>> {
    wrap_text(text, width)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(theme.foreground))))
        .collect()
}

fn field(name: &'static str, value: String, theme: &ResolvedTheme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name}: "), theme.dim_style()),
        Span::styled(value, Style::default().fg(theme.foreground)),
    ])
}

/// Wrap text to specified width, preserving words
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    textwrap::wrap(text, width)
        .into_iter()
        .map(|cow| cow.into_owned())
        .collect()
}

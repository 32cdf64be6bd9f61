use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::api::ColoringPage;
use crate::app::App;
use crate::theme::ResolvedTheme;
use crate::views::common::{age_span, empty_message, list_footer, render_error};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let pages = app.gallery.items();

    // A failed first page has nothing to keep on screen
    if pages.is_empty()
        && let Some(err) = app.gallery.error()
    {
        render_error(frame, err, theme, area);
        return;
    }

    let items: Vec<ListItem> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| page_to_list_item(page, i + 1, theme))
        .collect();

    let title = if pages.is_empty() {
        format!("{} Pages ({})", app.sort.label(), empty_message(app, "no pages"))
    } else {
        format!("{} Pages", app.sort.label())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title)
                .title_bottom(list_footer(app)),
        )
        .highlight_style(theme.selection_style())
        .highlight_symbol("▶ ");

    let mut state = ListState::default()
        .with_offset(app.gallery_view.scroll_offset)
        .with_selected((!pages.is_empty()).then_some(app.gallery_view.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn page_to_list_item(page: &ColoringPage, rank: usize, theme: &ResolvedTheme) -> ListItem<'static> {
    let mut title = vec![
        Span::styled(format!("{:>3}. ", rank), theme.dim_style()),
        Span::styled(page.title.clone(), Style::default().fg(theme.item_title)),
    ];
    if let Some(category) = &page.category {
        title.push(Span::styled(
            format!(" [{category}]"),
            Style::default().fg(theme.item_category),
        ));
    }

    let meta = Line::from(vec![
        Span::raw("     "),
        Span::styled(
            format!("♥ {}", page.likes),
            Style::default().fg(theme.item_likes),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("⤓ {}", page.downloads),
            Style::default().fg(theme.item_downloads),
        ),
        Span::raw(" | "),
        age_span(page.created(), theme),
    ]);

    ListItem::new(vec![Line::from(title), meta])
}

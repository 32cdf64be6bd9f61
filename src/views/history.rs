use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::api::Generation;
use crate::app::{App, is_placeholder};
use crate::feed::ItemStatus;
use crate::theme::ResolvedTheme;
use crate::views::common::{age_span, empty_message, list_footer, render_error};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let generations = app.history.items();

    if generations.is_empty()
        && let Some(err) = app.history.error()
    {
        render_error(frame, err, theme, area);
        return;
    }

    let items: Vec<ListItem> = generations
        .iter()
        .map(|generation| generation_to_list_item(generation, theme))
        .collect();

    let title = if generations.is_empty() {
        format!(
            "My Generations ({})",
            empty_message(app, "press p to create one")
        )
    } else {
        "My Generations".to_string()
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
        .with_offset(app.history_view.scroll_offset)
        .with_selected((!generations.is_empty()).then_some(app.history_view.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn status_span(generation: &Generation, theme: &ResolvedTheme) -> Span<'static> {
    match generation.status {
        ItemStatus::Pending if is_placeholder(&generation.id) => {
            Span::styled("◌ submitting", Style::default().fg(theme.warning))
        }
        ItemStatus::Pending => Span::styled("◌ generating", Style::default().fg(theme.warning)),
        ItemStatus::Completed => Span::styled("✓ ready", Style::default().fg(theme.success)),
        ItemStatus::Failed => Span::styled("✗ failed", theme.error_style()),
    }
}

fn generation_to_list_item(generation: &Generation, theme: &ResolvedTheme) -> ListItem<'static> {
    let prompt_style = match generation.status {
        ItemStatus::Completed => Style::default().fg(theme.item_title),
        _ => Style::default()
            .fg(theme.item_title)
            .add_modifier(Modifier::ITALIC),
    };
    let title = Line::from(vec![
        Span::raw(" "),
        Span::styled(generation.prompt.clone(), prompt_style),
    ]);
    let meta = Line::from(vec![
        Span::raw("   "),
        status_span(generation, theme),
        Span::raw(" | "),
        age_span(generation.created(), theme),
    ]);
    ListItem::new(vec![title, meta])
}

//! Help overlay showing keybindings.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Tab};
use crate::help::overlay_items;
use crate::keys::{Keymap, gallery_keymap, global_keymap, history_keymap};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if !app.show_help {
        return;
    }

    // Dim the underlying content
    let buf = frame.buffer_mut();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let cell = &mut buf[(x, y)];
            cell.set_style(cell.style().add_modifier(Modifier::DIM));
        }
    }

    let theme = &app.theme;
    let keymap: Keymap = match app.tab {
        Tab::Gallery => global_keymap().extend(gallery_keymap()),
        Tab::History => global_keymap().extend(history_keymap()),
    };

    let formatted: Vec<(String, &str)> = overlay_items()
        .iter()
        .filter_map(|item| item.format_for_overlay(&keymap))
        .collect();

    let key_width = formatted.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    let label_width = formatted.iter().map(|(_, l)| l.width()).max().unwrap_or(0);
    let content_width = key_width + 2 + label_width; // 2 for column spacing
    let padding = 2;
    let popup_width = (content_width + 2 + padding * 2) as u16; // 2 for borders
    let popup_height = (formatted.len() + 2 + 2) as u16; // borders + vertical padding

    let popup_width = popup_width.min(area.width.saturating_sub(4));
    let popup_height = popup_height.min(area.height.saturating_sub(4));
    let popup_area = centered_rect(popup_width, popup_height, area);

    frame.render_widget(Clear, popup_area);

    let alt_row_style = Style::default().bg(theme.selection_bg);

    let lines: Vec<Line> = formatted
        .iter()
        .enumerate()
        .map(|(i, (keys, label))| {
            let base_style = if i % 2 == 1 {
                alt_row_style
            } else {
                Style::default()
            };
            let key_pad = " ".repeat(key_width.saturating_sub(keys.width()));
            Line::from(vec![
                Span::styled(format!("{key_pad}{keys}"), theme.dim_style().patch(base_style)),
                Span::styled("  ", base_style),
                Span::styled(
                    format!("{:<width$}", label, width = label_width),
                    Style::default().fg(theme.item_title).patch(base_style),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title("Help")
            .title_style(theme.active_tab_style())
            .padding(Padding::uniform(1)),
    );

    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

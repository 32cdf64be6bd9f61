pub mod common;
pub mod detail;
pub mod gallery;
pub mod help_overlay;
pub mod history;
pub mod spinner;
pub mod status_bar;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, Tab};
use crate::help::{format_items, gallery_help, history_help, prompt_help};
use crate::keys::{gallery_keymap, global_keymap, history_keymap};
use crate::views::status_bar::StatusBar;

/// Draw one full frame: tabs, the active list (plus detail pane), status bar.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Tabs
        Constraint::Min(0),    // List
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
    help_overlay::render(frame, app, frame.area());
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans: Vec<Span> = Tab::all()
        .iter()
        .enumerate()
        .flat_map(|(i, tab)| {
            let style = if *tab == app.tab {
                theme.active_tab_style()
            } else {
                theme.dim_style()
            };
            vec![
                Span::styled(format!("[{}]", i + 1), theme.dim_style()),
                Span::styled(tab.label(), style),
                Span::raw("  "),
            ]
        })
        .collect();

    if app.tab == Tab::Gallery {
        spans.push(Span::styled(
            format!("sort: {}", app.sort.label()),
            theme.dim_style(),
        ));
    }

    if app.active_is_fetching() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            spinner::spinner_frame(app.started_at),
            theme.spinner_style(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let (list_area, detail_area) = if app.show_detail {
        let chunks =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    match app.tab {
        Tab::Gallery => gallery::render(frame, app, list_area),
        Tab::History => history::render(frame, app, list_area),
    }
    if let Some(detail_area) = detail_area {
        detail::render(frame, app, detail_area);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(prompt) = &app.prompt {
        let theme = &app.theme;
        let line = Line::from(vec![
            Span::styled(" Generate ", theme.status_bar_style()),
            Span::raw(" "),
            Span::styled(format!("{prompt}▏"), Style::default().fg(theme.foreground)),
            Span::raw("  "),
            Span::styled(prompt_help(), theme.dim_style()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let help_text = match app.tab {
        Tab::Gallery => format_items(&gallery_help(), &global_keymap().extend(gallery_keymap())),
        Tab::History => format_items(&history_help(), &global_keymap().extend(history_keymap())),
    };
    let len = app.active_len();
    let position = if len == 0 {
        0
    } else {
        app.active_view().selected + 1
    };

    let mut bar = StatusBar::new(&app.theme)
        .label(app.tab.label())
        .position(position, len)
        .help(&help_text);
    if let Some(notice) = &app.notice {
        bar = bar.notice(notice);
    }
    bar.render(frame, area);
}

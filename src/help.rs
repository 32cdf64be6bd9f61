//! Help text generated from keymaps.

use crate::app::Message;
use crate::keys::{Keymap, format_key};

/// One or more related actions under a single label.
pub struct HelpItem {
    /// Keys for these are joined with "/".
    messages: Vec<Message>,
    label: &'static str,
}

impl HelpItem {
    pub fn new(message: Message, label: &'static str) -> Self {
        Self {
            messages: vec![message],
            label,
        }
    }

    /// Paired actions, e.g. j/k for next/prev.
    pub fn pair(first: Message, second: Message, label: &'static str) -> Self {
        Self {
            messages: vec![first, second],
            label,
        }
    }

    fn keys(&self, keymap: &Keymap) -> Option<String> {
        let keys: Vec<String> = self
            .messages
            .iter()
            .filter_map(|msg| {
                keymap
                    .find_key(msg)
                    .map(|(code, mods)| format_key(code, mods))
            })
            .collect();
        (!keys.is_empty()).then(|| keys.join("/"))
    }

    /// `keys:label`, or None if nothing is bound.
    pub fn format(&self, keymap: &Keymap) -> Option<String> {
        self.keys(keymap)
            .map(|keys| format!("{}:{}", keys, self.label))
    }

    /// `(keys, label)` for the overlay's two columns.
    pub fn format_for_overlay(&self, keymap: &Keymap) -> Option<(String, &'static str)> {
        self.keys(keymap).map(|keys| (keys, self.label))
    }
}

/// Compact status bar hint for the gallery.
pub fn gallery_help() -> Vec<HelpItem> {
    use Message::{CycleSort, LoadMore, NextTab, OpenPrompt, ToggleHelp};
    vec![
        HelpItem::new(CycleSort, "sort"),
        HelpItem::new(LoadMore, "more"),
        HelpItem::new(OpenPrompt, "generate"),
        HelpItem::new(NextTab, "tab"),
        HelpItem::new(ToggleHelp, "help"),
    ]
}

/// Compact status bar hint for the generation history.
pub fn history_help() -> Vec<HelpItem> {
    use Message::{LoadMore, NextTab, OpenPrompt, Refresh, ToggleHelp};
    vec![
        HelpItem::new(OpenPrompt, "generate"),
        HelpItem::new(LoadMore, "more"),
        HelpItem::new(Refresh, "refresh"),
        HelpItem::new(NextTab, "tab"),
        HelpItem::new(ToggleHelp, "help"),
    ]
}

/// Help while typing a prompt.
pub fn prompt_help() -> &'static str {
    "Enter:submit  Esc:cancel"
}

pub fn format_items(items: &[HelpItem], keymap: &Keymap) -> String {
    items
        .iter()
        .filter_map(|item| item.format(keymap))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Everything shown in the help overlay.
pub fn overlay_items() -> Vec<HelpItem> {
    use Message::{
        CycleSort, LoadMore, NextTab, OpenPrompt, OpenUrl, PageDown, PageUp, Quit, Refresh,
        SelectFirst, SelectLast, SelectNext, SelectPrev, ToggleDetail, ToggleHelp,
    };
    vec![
        HelpItem::pair(SelectNext, SelectPrev, "navigate"),
        HelpItem::pair(SelectFirst, SelectLast, "top/bottom"),
        HelpItem::pair(PageDown, PageUp, "page down/up"),
        HelpItem::new(ToggleDetail, "details"),
        HelpItem::new(OpenUrl, "open in browser"),
        HelpItem::new(LoadMore, "load more / retry"),
        HelpItem::new(Refresh, "refresh"),
        HelpItem::new(CycleSort, "change sort"),
        HelpItem::new(OpenPrompt, "new generation"),
        HelpItem::new(NextTab, "switch tab"),
        HelpItem::new(Quit, "quit"),
        HelpItem::new(ToggleHelp, "close"),
    ]
}

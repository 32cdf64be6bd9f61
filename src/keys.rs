use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Message, Tab};

/// A declarative keybinding map that can be composed and extended.
#[derive(Clone)]
pub struct Keymap {
    bindings: Vec<(KeyCode, KeyModifiers, Message)>,
}

impl Keymap {
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a key binding with no modifiers.
    pub fn bind(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::NONE, message));
        self
    }

    /// Add a key binding with Ctrl modifier.
    pub fn bind_ctrl(mut self, code: KeyCode, message: Message) -> Self {
        self.bindings.push((code, KeyModifiers::CONTROL, message));
        self
    }

    /// Look up a message for a key event.
    /// Later bindings take precedence over earlier ones.
    pub fn get(&self, event: &KeyEvent) -> Option<Message> {
        self.bindings
            .iter()
            .rev()
            .find(|(code, mods, _)| *code == event.code && event.modifiers.contains(*mods))
            .map(|(_, _, msg)| msg.clone())
    }

    /// Extend this keymap with another. The other keymap's bindings take precedence.
    pub fn extend(mut self, other: Self) -> Self {
        self.bindings.extend(other.bindings);
        self
    }

    /// Find the first key bound to a specific message.
    pub fn find_key(&self, message: &Message) -> Option<(KeyCode, KeyModifiers)> {
        self.bindings
            .iter()
            .find(|(_, _, msg)| msg == message)
            .map(|(code, mods, _)| (*code, *mods))
    }
}

/// Format a key binding for display in help text.
pub fn format_key(code: KeyCode, mods: KeyModifiers) -> String {
    let key_str = match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "S-Tab".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };
    if mods.contains(KeyModifiers::CONTROL) {
        format!("C-{key_str}")
    } else if mods.contains(KeyModifiers::ALT) {
        format!("M-{key_str}")
    } else {
        key_str
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

/// Global keybindings that work in both lists.
pub fn global_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('q'), Message::Quit)
        .bind_ctrl(KeyCode::Char('c'), Message::Quit)
        .bind(KeyCode::Tab, Message::NextTab)
        .bind(KeyCode::BackTab, Message::PrevTab)
        .bind(KeyCode::Char('1'), Message::SwitchTab(Tab::Gallery))
        .bind(KeyCode::Char('2'), Message::SwitchTab(Tab::History))
        .bind(KeyCode::Char('p'), Message::OpenPrompt)
}

/// Keybindings for the help overlay popup.
fn help_overlay_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('?'), Message::ToggleHelp)
        .bind(KeyCode::Esc, Message::ToggleHelp)
        .bind(KeyCode::Char('q'), Message::ToggleHelp)
        .bind_ctrl(KeyCode::Char('c'), Message::ToggleHelp)
}

/// Keybindings while typing a generation prompt. Printable characters are
/// handled separately as input.
fn prompt_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Enter, Message::SubmitPrompt)
        .bind(KeyCode::Esc, Message::CancelPrompt)
        .bind_ctrl(KeyCode::Char('c'), Message::CancelPrompt)
        .bind(KeyCode::Backspace, Message::PromptBackspace)
}

/// Navigation keybindings shared between the gallery and history lists.
fn navigation_keymap() -> Keymap {
    Keymap::new()
        .bind(KeyCode::Char('j'), Message::SelectNext)
        .bind(KeyCode::Down, Message::SelectNext)
        .bind(KeyCode::Char('k'), Message::SelectPrev)
        .bind(KeyCode::Up, Message::SelectPrev)
        .bind(KeyCode::Char('g'), Message::SelectFirst)
        .bind(KeyCode::Char('G'), Message::SelectLast)
        .bind_ctrl(KeyCode::Char('d'), Message::PageDown)
        .bind_ctrl(KeyCode::Char('u'), Message::PageUp)
        .bind(KeyCode::Enter, Message::ToggleDetail)
        .bind(KeyCode::Char('o'), Message::OpenUrl)
        .bind(KeyCode::Char('m'), Message::LoadMore)
        .bind(KeyCode::Char('r'), Message::LoadMore)
        .bind(KeyCode::Char('R'), Message::Refresh)
        .bind(KeyCode::Char('?'), Message::ToggleHelp)
}

/// Gallery list keybindings.
pub fn gallery_keymap() -> Keymap {
    navigation_keymap().bind(KeyCode::Char('s'), Message::CycleSort)
}

/// Generation history keybindings.
pub fn history_keymap() -> Keymap {
    navigation_keymap().bind(KeyCode::Esc, Message::SwitchTab(Tab::Gallery))
}

pub fn handle_key(key: KeyEvent, app: &App) -> Option<Message> {
    // Prompt input takes priority when open
    if app.prompt.is_some() {
        if let Some(msg) = prompt_keymap().get(&key) {
            return Some(msg);
        }
        return match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Message::PromptInput(c))
            }
            _ => None,
        };
    }

    // Help overlay takes priority when open
    if app.show_help {
        return help_overlay_keymap().get(&key);
    }

    // Global keys first
    if let Some(msg) = global_keymap().get(&key) {
        return Some(msg);
    }

    match app.tab {
        Tab::Gallery => gallery_keymap().get(&key),
        Tab::History => history_keymap().get(&key),
    }
}

//! Reader keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub first_page: Vec<String>,
    pub last_page: Vec<String>,
    pub toggle_fullscreen: Vec<String>,
    pub exit_fullscreen: Vec<String>,
    pub toggle_contents: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub select: Vec<String>,
    pub open_link: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            next_page: keys(&["Right", "Space", "l", "PageDown"]),
            prev_page: keys(&["Left", "h", "PageUp"]),
            first_page: keys(&["Home", "g"]),
            last_page: keys(&["End", "G"]),
            toggle_fullscreen: keys(&["f"]),
            exit_fullscreen: keys(&["Esc"]),
            toggle_contents: keys(&["t"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            select: keys(&["Enter"]),
            open_link: keys(&["o"]),
        }
    }
}

impl KeybindingConfig {
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 12] = [
            (&self.quit, Action::Quit),
            (&self.next_page, Action::NextPage),
            (&self.prev_page, Action::PrevPage),
            (&self.first_page, Action::FirstPage),
            (&self.last_page, Action::LastPage),
            (&self.toggle_fullscreen, Action::ToggleFullscreen),
            (&self.exit_fullscreen, Action::ExitFullscreen),
            (&self.toggle_contents, Action::ToggleContents),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.select, Action::Select),
            (&self.open_link, Action::OpenLink),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_key(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

fn matches_key(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored on the event side so `"G"` matches Shift+g terminals.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse `"f"`, `"Space"`, `"Ctrl+c"`, `"Shift+Tab"` and similar.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    let (modifier_parts, key_part) = match s.rsplit_once('+') {
        Some((mods, key)) if !key.is_empty() => (Some(mods), key),
        _ => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts.into_iter().flat_map(|m| m.split('+')) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        _ => Err(format!("Unknown key: {}", s)),
    }
}

//! Reader color theme.

use ratatui::style::Color;
use serde::{de, Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub accent: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub title: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub subtitle: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub pull_quote: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub link: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub credits: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_bg: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            border: Color::DarkGray,
            accent: Color::Rgb(212, 175, 55),
            title: Color::White,
            subtitle: Color::Gray,
            pull_quote: Color::Rgb(212, 175, 55),
            link: Color::Blue,
            credits: Color::DarkGray,
            selection_bg: Color::Rgb(212, 175, 55),
            selection_fg: Color::Black,
            status_fg: Color::White,
            status_bg: Color::DarkGray,
        }
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color_string(&s).map_err(de::Error::custom)
}

/// Parse a named color (`"Gray"`, `"lightblue"`) or a `#RRGGBB` / `#RGB` hex code.
pub fn parse_color_string(s: &str) -> Result<Color, String> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex).ok_or_else(|| format!("Invalid hex color: {}", s));
    }

    let color = match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        "reset" => Color::Reset,
        _ => return Err(format!("Unknown color: {}", s)),
    };
    Ok(color)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

    match hex.len() {
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Some(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => None,
    }
}

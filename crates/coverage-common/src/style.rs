//! Color definitions used by palettes and label styles.

use serde::{Deserialize, Serialize};

/// Color representation supporting multiple formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Hex string ("#RRGGBB" or "#RRGGBBAA") or a color name
    Named(String),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgba { r, g, b, a: 255 }
    }

    pub fn named(name: &str) -> Self {
        Color::Named(name.to_string())
    }

    /// Convert to an RGBA quadruple; unrecognised colors become opaque black.
    pub fn to_rgba(&self) -> [u8; 4] {
        self.try_to_rgba().unwrap_or([0, 0, 0, 255])
    }

    /// Convert to an RGBA quadruple, or `None` for an unknown name, a
    /// malformed hex string or an array that is not 3 or 4 long.
    pub fn try_to_rgba(&self) -> Option<[u8; 4]> {
        match self {
            Color::Array(arr) => match arr.as_slice() {
                [r, g, b] => Some([*r, *g, *b, 255]),
                [r, g, b, a] => Some([*r, *g, *b, *a]),
                _ => None,
            },
            Color::Named(s) if s.starts_with('#') => parse_hex_color(s),
            Color::Named(name) => named_color(name),
            Color::Rgba { r, g, b, a } => Some([*r, *g, *b, *a]),
        }
    }
}

fn parse_hex_color(s: &str) -> Option<[u8; 4]> {
    let s = s.trim_start_matches('#');
    if !s.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        6 => Some([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Some([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => None,
    }
}

/// CSS color names used by the nesting palette and labels.
fn named_color(name: &str) -> Option<[u8; 4]> {
    let rgba = match name.to_lowercase().as_str() {
        "transparent" => [0, 0, 0, 0],
        "black" => [0, 0, 0, 255],
        "white" => [255, 255, 255, 255],
        "red" => [255, 0, 0, 255],
        "orange" => [255, 165, 0, 255],
        "yellow" => [255, 255, 0, 255],
        "green" => [0, 128, 0, 255],
        "lime" => [0, 255, 0, 255],
        "blue" => [0, 0, 255, 255],
        "indigo" => [75, 0, 130, 255],
        "violet" => [238, 130, 238, 255],
        "cyan" => [0, 255, 255, 255],
        "magenta" => [255, 0, 255, 255],
        "purple" => [128, 0, 128, 255],
        "gray" | "grey" => [128, 128, 128, 255],
        _ => return None,
    };
    Some(rgba)
}

/// Default nesting-depth palette, shallowest first.
pub fn default_nesting_palette() -> Vec<Color> {
    ["red", "orange", "yellow", "green", "blue", "indigo", "violet", "black"]
        .iter()
        .map(|name| Color::named(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::named("orange").to_rgba(), [255, 165, 0, 255]);
        assert_eq!(Color::named("Indigo").to_rgba(), [75, 0, 130, 255]);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::named("#2828ff").to_rgba(), [40, 40, 255, 255]);
        assert_eq!(Color::named("#2828ff80").to_rgba(), [40, 40, 255, 128]);
    }

    #[test]
    fn test_array_and_yaml() {
        let colors: Vec<Color> = serde_yaml::from_str("- [1, 2, 3]\n- red\n- '#000000'\n").unwrap();
        assert_eq!(colors[0].to_rgba(), [1, 2, 3, 255]);
        assert_eq!(colors[1].to_rgba(), [255, 0, 0, 255]);
        assert_eq!(colors[2].to_rgba(), [0, 0, 0, 255]);
    }

    #[test]
    fn test_unrecognised_colors() {
        assert_eq!(Color::named("chartreuse-ish").try_to_rgba(), None);
        assert_eq!(Color::named("#12345").try_to_rgba(), None);
        assert_eq!(Color::named("#zz0000").try_to_rgba(), None);
        assert_eq!(Color::Array(vec![1, 2]).try_to_rgba(), None);
        assert_eq!(Color::named("chartreuse-ish").to_rgba(), [0, 0, 0, 255]);
        assert!(default_nesting_palette().iter().all(|c| c.try_to_rgba().is_some()));
    }
}

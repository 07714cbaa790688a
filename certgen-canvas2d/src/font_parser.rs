//! CSS font shorthand parsing.
//!
//! Parses strings like `900 150px "Segoe UI", Arial, sans-serif` into the
//! pieces cosmic-text needs.

use crate::error::{Canvas2dError, Canvas2dResult};
use cosmic_text::{Style, Weight};

/// Parsed font specification from a CSS font string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFont {
    /// Font style (normal, italic, oblique).
    pub style: Style,
    /// Font weight (100-900 or keywords like bold).
    pub weight: Weight,
    /// Font size in pixels.
    pub size_px: f32,
    /// Font families in order of preference.
    pub families: Vec<String>,
}

impl Default for ParsedFont {
    fn default() -> Self {
        Self {
            style: Style::Normal,
            weight: Weight::NORMAL,
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

/// Keywords that may precede the font size, with their effect.
enum Prefix {
    Style(Style),
    Weight(Weight),
    Ignored,
}

const PREFIX_KEYWORDS: &[(&str, Prefix)] = &[
    ("italic", Prefix::Style(Style::Italic)),
    ("oblique", Prefix::Style(Style::Oblique)),
    ("normal", Prefix::Ignored),
    ("small-caps", Prefix::Ignored),
    ("bolder", Prefix::Weight(Weight::EXTRA_BOLD)),
    ("bold", Prefix::Weight(Weight::BOLD)),
    ("lighter", Prefix::Weight(Weight::LIGHT)),
];

/// Parse a CSS font string into components.
///
/// Supports `[style] [variant] [weight] size[/line-height] family[, family]*`.
/// An empty string yields the default `10px sans-serif`.
pub fn parse_font(font_str: &str) -> Canvas2dResult<ParsedFont> {
    let font_str = font_str.trim();
    if font_str.is_empty() {
        return Ok(ParsedFont::default());
    }

    let mut result = ParsedFont::default();
    let mut remaining = font_str;

    'prefix: loop {
        let trimmed = remaining.trim_start();
        for (keyword, effect) in PREFIX_KEYWORDS {
            if let Some(rest) = strip_word(trimmed, keyword) {
                match effect {
                    Prefix::Style(style) => result.style = *style,
                    Prefix::Weight(weight) => result.weight = *weight,
                    Prefix::Ignored => {}
                }
                remaining = rest;
                continue 'prefix;
            }
        }
        if let Some((weight, rest)) = parse_numeric_weight(trimmed) {
            result.weight = weight;
            remaining = rest;
            continue;
        }
        remaining = trimmed;
        break;
    }

    let (size, rest) = parse_font_size(remaining)?;
    result.size_px = size;
    remaining = rest;

    // Line height has no effect on single-line text
    if let Some(rest) = remaining.strip_prefix('/') {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        remaining = &rest[end..];
    }

    let families = parse_font_families(remaining);
    if !families.is_empty() {
        result.families = families;
    }

    Ok(result)
}

/// Strip `word` from the start of `s` if it is followed by whitespace or the end.
fn strip_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(word)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// Try to parse a numeric weight (1-1000).
fn parse_numeric_weight(s: &str) -> Option<(Weight, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let rest = &s[end..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let weight: u16 = s[..end].parse().ok()?;
    if !(1..=1000).contains(&weight) {
        return None;
    }
    Some((Weight(weight), rest))
}

/// Parse the font size and its unit, returning the size in pixels.
///
/// A unit is required; a bare number is not a font size.
fn parse_font_size(s: &str) -> Canvas2dResult<(f32, &str)> {
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    if num_end == 0 {
        return Err(Canvas2dError::FontParseError(format!(
            "Expected font size, got: {s}"
        )));
    }

    let size: f32 = s[..num_end].parse().map_err(|_| {
        Canvas2dError::FontParseError(format!("Invalid font size number: {}", &s[..num_end]))
    })?;
    let rest = &s[num_end..];

    let (multiplier, unit_len) = if rest.starts_with("px") {
        (1.0, 2)
    } else if rest.starts_with("pt") {
        (4.0 / 3.0, 2)
    } else if rest.starts_with("rem") {
        (16.0, 3)
    } else if rest.starts_with("em") {
        (16.0, 2)
    } else if rest.starts_with('%') {
        (16.0 / 100.0, 1)
    } else {
        return Err(Canvas2dError::FontParseError(format!(
            "Font size {} has no unit",
            &s[..num_end]
        )));
    };

    Ok((size * multiplier, &rest[unit_len..]))
}

/// Parse a comma-separated family list, honoring single and double quotes.
fn parse_font_families(s: &str) -> Vec<String> {
    s.split(',')
        .map(|family| {
            family
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim()
                .to_string()
        })
        .filter(|family| !family.is_empty())
        .collect()
}

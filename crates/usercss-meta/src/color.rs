//! Color parsing and canonical formatting for `color` variables.

use std::fmt;

/// An 8-bit RGB color with a fractional alpha channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in `0.0..=1.0`.
    pub a: f64,
}

impl Rgba {
    /// Parse any CSS color: named, hex, `rgb()`, `hsl()`, `hwb()` and friends.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let color = csscolorparser::parse(&input.to_ascii_lowercase()).ok()?;
        let [r, g, b, _] = color.to_rgba8();
        Some(Self {
            r,
            g,
            b,
            a: f64::from(color.a).clamp(0.0, 1.0),
        })
    }

    /// Whether the color is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// `rgb(r, g, b)`, or `rgba(r, g, b, a)` for translucent colors.
    pub fn to_rgb_string(&self) -> String {
        let Self { r, g, b, .. } = *self;
        if self.is_opaque() {
            format!("rgb({r}, {g}, {b})")
        } else {
            format!("rgba({r}, {g}, {b}, {})", format_alpha(self.a))
        }
    }

    /// `#rrggbb`. Alpha is dropped.
    pub fn to_hex_string(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Comma-joined channels, `r, g, b`.
    pub fn channels(&self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rgb_string())
    }
}

/// Parse `input` and return its canonical `rgb(...)` form.
pub fn normalize_color(input: &str) -> Option<String> {
    Rgba::parse(input).map(|c| c.to_rgb_string())
}

fn format_alpha(a: f64) -> String {
    let s = format!("{a:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".to_string() } else { s.to_string() }
}

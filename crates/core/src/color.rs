use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#')?;
        if s.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Relative luminance in 0..=1, used to pick a readable label color.
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hex())
    }
}

/// The 20-color categorical scheme.
pub const PALETTE: [Color; 20] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xae, 0xc7, 0xe8),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0xff, 0xbb, 0x78),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0x98, 0xdf, 0x8a),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0xff, 0x98, 0x96),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0xc5, 0xb0, 0xd5),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xc4, 0x9c, 0x94),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0xf7, 0xb6, 0xd2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xc7, 0xc7, 0xc7),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0xdb, 0xdb, 0x8d),
    Color::rgb(0x17, 0xbe, 0xcf),
    Color::rgb(0x9e, 0xda, 0xe5),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorOrder {
    /// Colors follow the order categories are first asked for.
    #[default]
    FirstSeen,
    /// Categories are seeded in sorted order, so colors do not depend on
    /// document order.
    Sorted,
}

/// Category name to palette color, assigned in insertion order and cycling
/// through the palette once it runs out.
#[derive(Debug, Clone)]
pub struct CategoryColorMap {
    palette: Vec<Color>,
    seen: Vec<(String, Color)>,
}

impl Default for CategoryColorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryColorMap {
    pub fn new() -> Self {
        Self::with_palette(PALETTE.to_vec())
    }

    /// An empty palette falls back to the default one.
    pub fn with_palette(palette: Vec<Color>) -> Self {
        let palette = if palette.is_empty() { PALETTE.to_vec() } else { palette };
        Self {
            palette,
            seen: Vec::new(),
        }
    }

    /// Pre-assign colors to `names` in sorted order.
    pub fn seed_sorted<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();
        names.dedup();
        for name in names {
            self.color_for(name);
        }
    }

    pub fn color_for(&mut self, name: &str) -> Color {
        if let Some((_, c)) = self.seen.iter().find(|(n, _)| n == name) {
            return *c;
        }
        let c = self.palette[self.seen.len() % self.palette.len()];
        self.seen.push((name.to_string(), c));
        c
    }

    pub fn get(&self, name: &str) -> Option<Color> {
        self.seen.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    pub fn assignments(&self) -> &[(String, Color)] {
        &self.seen
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

use serde::{Deserialize, Serialize};

/// Color representation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Red color: `#FF0000FF`
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// Green color: `#00FF00FF`
    pub const GREEN: Color = Color::rgba(0, 255, 0, 255);
    /// Blue color: `#0000FFFF`
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Converts the color into u8 array (RGBA).
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Color as `#RRGGBBAA` string.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` strings.
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        let hex = hex_string.strip_prefix('#')?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok();
        let a = if hex.len() == 8 { channel(3)? } else { 255 };
        Some(Self::rgba(channel(0)?, channel(1)?, channel(2)?, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        assert_eq!(Color::try_from_hex("#FF0000"), Some(Color::RED));
        assert_eq!(Color::try_from_hex("#00000000"), Some(Color::TRANSPARENT));
        assert_eq!(Color::BLUE.to_hex(), "#0000FFFF");
        assert_eq!(Color::try_from_hex("0000FF"), None);
        assert_eq!(Color::try_from_hex("#00FF"), None);
    }
}

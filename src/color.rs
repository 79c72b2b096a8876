use bytemuck::{Pod, Zeroable};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Zeroable, Pod, Hash)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const GREEN: Color = Color::rgba(0, 255, 0, 255);
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(255, 255, 255, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    pub const fn alpha(mut self, alpha: u8) -> Self {
        self.a = alpha;
        return self;
    }

    /// Parse `rrggbb` or `rrggbbaa`, with or without a leading `#`.
    pub fn from_hex(s: &str) -> Option<Color> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        match s.len() {
            6 => return Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => return Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("ff0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("#0000ff80"), Some(Color::BLUE.alpha(0x80)));
        assert_eq!(Color::from_hex("12345"), None);
        assert_eq!(Color::from_hex("zz0000"), None);
    }
}

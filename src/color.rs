use egui::Color32;

/// Parses `#rrggbb`, `rrggbb` or `#rrggbbaa` into straight (non-premultiplied) RGBA.
pub fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match digits.len() {
        6 => Some([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Some([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => None,
    }
}

/// Like [`parse_hex`], falling back to opaque black for anything unparseable.
pub fn hex_to_rgba(hex: &str) -> [u8; 4] {
    parse_hex(hex).unwrap_or([0, 0, 0, 255])
}

pub fn hex_to_color32(hex: &str) -> Color32 {
    let [r, g, b, a] = hex_to_rgba(hex);
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Formats an opaque colour as `#rrggbb`.
pub fn color32_to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

pub fn to_skia(rgba: [u8; 4]) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

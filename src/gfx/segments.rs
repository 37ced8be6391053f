//! Seven-segment glyphs for axis labels and control readouts.
//!
//! Only digits, `.` and `-` are drawn; anything else advances the pen.

use super::draw::DrawContext;
use super::math::Color;

// Segments: A(top), B(top-right), C(bottom-right), D(bottom),
// E(bottom-left), F(top-left), G(middle)
const SEGMENT_MAP: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],     // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],    // 2
    [true, true, true, true, false, false, true],    // 3
    [false, true, true, false, false, true, true],   // 4
    [true, false, true, true, false, true, true],    // 5
    [true, false, true, true, true, true, true],     // 6
    [true, true, true, false, false, false, false],  // 7
    [true, true, true, true, true, true, true],      // 8
    [true, true, true, true, false, true, true],     // 9
];

const WIDTH_RATIO: f32 = 0.55;
const THICKNESS_RATIO: f32 = 0.14;
const SPACING_RATIO: f32 = 0.3;

fn digit_width(height: f32) -> f32 {
    height * WIDTH_RATIO
}

fn thickness(height: f32) -> f32 {
    (height * THICKNESS_RATIO).max(1.0)
}

fn advance(ch: char, height: f32) -> f32 {
    let spacing = digit_width(height) * SPACING_RATIO;
    match ch {
        '.' => thickness(height) + spacing,
        _ => digit_width(height) + spacing,
    }
}

/// Horizontal extent of `text` at glyph `height`, without trailing spacing.
pub fn text_width(text: &str, height: f32) -> f32 {
    let total: f32 = text.chars().map(|c| advance(c, height)).sum();
    if text.is_empty() {
        0.0
    } else {
        total - digit_width(height) * SPACING_RATIO
    }
}

pub fn draw_text(draw: &mut DrawContext, text: &str, x: f32, y: f32, height: f32, color: Color) {
    let mut pen = x;
    for ch in text.chars() {
        match ch {
            '0'..='9' => draw_digit(draw, ch as u8 - b'0', pen, y, height, color),
            '.' => {
                let t = thickness(height);
                draw.rect(pen, y + height - t, t, t, color);
            }
            '-' => {
                let t = thickness(height);
                draw.rect(pen, y + (height - t) * 0.5, digit_width(height), t, color);
            }
            _ => {}
        }
        pen += advance(ch, height);
    }
}

fn draw_digit(draw: &mut DrawContext, digit: u8, x: f32, y: f32, height: f32, color: Color) {
    let segments = SEGMENT_MAP[digit as usize];
    let w = digit_width(height);
    let t = thickness(height);
    let half = height * 0.5;

    if segments[0] { draw.rect(x, y, w, t, color); }
    if segments[1] { draw.rect(x + w - t, y, t, half, color); }
    if segments[2] { draw.rect(x + w - t, y + half, t, half, color); }
    if segments[3] { draw.rect(x, y + height - t, w, t, color); }
    if segments[4] { draw.rect(x, y + half, t, half, color); }
    if segments[5] { draw.rect(x, y, t, half, color); }
    if segments[6] { draw.rect(x, y + half - t * 0.5, w, t, color); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 10.0), 0.0);
        assert!((text_width("8", 10.0) - 5.5).abs() < 1e-5);
        // "0.5" is two digits and a narrow point
        let expected = 5.5 + 1.65 + 1.4 + 1.65 + 5.5;
        assert!((text_width("0.5", 10.0) - expected).abs() < 1e-4);
    }
}

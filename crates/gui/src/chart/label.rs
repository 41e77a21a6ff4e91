//! Text labels rasterized into RGBA textures with a built-in 5x7 font.

/// Glyph cell is 5x7 dots plus one column/row of spacing
const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;
const CELL_W: u32 = 6;
const CELL_H: u32 = 8;

/// CPU-side texture, rows top to bottom, 4 bytes per pixel
#[derive(Clone, PartialEq)]
pub struct LabelTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for LabelTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelTexture")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Longest label rendered in full; longer text is cut and ends in "..."
pub const MAX_GLYPHS: usize = 32;
/// Largest whole-pixel glyph scale (a 128px cell)
const MAX_SCALE: u32 = 16;

impl LabelTexture {
    /// Render `text` in white on a transparent background. `font_px` is the
    /// cell height; glyphs are scaled by whole pixels. At most
    /// [`MAX_GLYPHS`] characters are drawn.
    pub fn rasterize(text: &str, font_px: u32) -> Self {
        let scale = (font_px / CELL_H).clamp(1, MAX_SCALE);
        let chars = clip_text(text);
        let width = (chars.len() * (CELL_W * scale) as usize).max(1);
        let height = (CELL_H * scale) as usize;
        let Some(len) = width.checked_mul(height).and_then(|n| n.checked_mul(4)) else {
            return Self::blank();
        };
        let mut rgba = vec![0u8; len];

        for (i, ch) in chars.iter().enumerate() {
            let origin_x = i * (CELL_W * scale) as usize;
            for (row, bits) in glyph(*ch).iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                        continue;
                    }
                    let x0 = origin_x + (col * scale) as usize;
                    let y0 = row * scale as usize;
                    for y in y0..y0 + scale as usize {
                        for x in x0..x0 + scale as usize {
                            let idx = (y * width + x) * 4;
                            if let Some(px) = rgba.get_mut(idx..idx + 4) {
                                px.copy_from_slice(&[255, 255, 255, 255]);
                            }
                        }
                    }
                }
            }
        }

        Self {
            width: width as u32,
            height: height as u32,
            rgba,
        }
    }

    fn blank() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![0; 4],
        }
    }

    /// Count of opaque pixels
    pub fn coverage(&self) -> usize {
        self.rgba.chunks_exact(4).filter(|px| px[3] > 0).count()
    }
}

fn clip_text(text: &str) -> Vec<char> {
    let mut chars: Vec<char> = text.chars().take(MAX_GLYPHS + 1).collect();
    if chars.len() > MAX_GLYPHS {
        chars.truncate(MAX_GLYPHS - 3);
        chars.extend(['.', '.', '.']);
    }
    chars
}

fn glyph(c: char) -> [u8; GLYPH_H as usize] {
    match c.to_ascii_uppercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ' ' => [0x00; 7],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_follows_text_length() {
        let t = LabelTexture::rasterize("2024-01-02", 48);
        assert_eq!(t.width, 10 * 6 * 6);
        assert_eq!(t.height, 48);
        assert_eq!(t.rgba.len(), (t.width * t.height * 4) as usize);
    }

    #[test]
    fn test_dash_coverage() {
        // '-' is one row of five dots, each scaled to 2x2 at 16px
        let t = LabelTexture::rasterize("-", 16);
        assert_eq!(t.coverage(), 5 * 4);
    }

    #[test]
    fn test_space_and_empty_are_blank() {
        assert_eq!(LabelTexture::rasterize("   ", 8).coverage(), 0);
        let empty = LabelTexture::rasterize("", 48);
        assert_eq!(empty.width, 1);
        assert_eq!(empty.coverage(), 0);
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        assert_eq!(
            LabelTexture::rasterize("jan", 8).rgba,
            LabelTexture::rasterize("JAN", 8).rgba
        );
    }

    #[test]
    fn test_long_text_is_clipped() {
        let t = LabelTexture::rasterize(&"x".repeat(700_000), 48);
        assert_eq!(t.width, (MAX_GLYPHS * 6 * 6) as u32);
        assert_eq!(t.rgba.len(), (t.width * t.height * 4) as usize);

        let exact = LabelTexture::rasterize(&"7".repeat(MAX_GLYPHS), 48);
        assert_eq!(exact.width, t.width);
        // the clipped label ends in three dots
        let dots = LabelTexture::rasterize("...", 48).coverage();
        let head = LabelTexture::rasterize(&"x".repeat(MAX_GLYPHS - 3), 48).coverage();
        assert_eq!(t.coverage(), head + dots);
    }

    #[test]
    fn test_huge_font_is_capped() {
        let t = LabelTexture::rasterize("1", u32::MAX);
        assert_eq!(t.height, 8 * 16);
    }
}

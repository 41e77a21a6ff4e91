//! Color helpers for chart materials.

pub const GAIN: u32 = 0x00ff00;
pub const LOSS: u32 = 0xff0000;
pub const AXIS: u32 = 0xffffff;

/// 0xRRGGBB to [r, g, b] in 0..=1
pub fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// HSL (all components in 0..=1, hue wraps) to RGB
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex_rgb(0x00ff00), [0.0, 1.0, 0.0]);
        assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert!(close(hex_rgb(0x111111), [17.0 / 255.0; 3]));
    }

    #[test]
    fn test_hsl_rise_and_fall_hues() {
        assert!(close(hsl_to_rgb(0.3, 1.0, 0.5), [0.2, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_hsl_grey() {
        assert_eq!(hsl_to_rgb(0.7, 0.0, 0.25), [0.25; 3]);
    }
}

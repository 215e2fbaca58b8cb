use serde::{Deserialize, Serialize};

/// Opaque 8-bit RGB colour. Opacity is chosen by the paint rules, not the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn channels(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }

    /// Move lightness by `delta` (in HSL lightness units, clamped to 0..1).
    pub fn shade(self, delta: f64) -> Rgb {
        let (h, s, l) = rgb_to_hsl(self);
        hsl_to_rgb(h, s, (l + delta).clamp(0.0, 1.0))
    }
}

/// Deterministic player colour from the CRC32 of the player's name.
pub fn player_color(name: &str) -> Rgb {
    let [r, g, b, _] = crc32fast::hash(name.as_bytes()).to_be_bytes();
    Rgb(r, g, b)
}

/// Returns `(h: 0..360, s: 0..1, l: 0..1)`.
pub fn rgb_to_hsl(color: Rgb) -> (f64, f64, f64) {
    let [r, g, b] = color.channels().map(|c| c as f64 / 255.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let sector = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (sector * 60.0, s, l)
}

pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    if s < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return Rgb(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h / 360.0;
    let channel = |t: f64| (hue_channel(p, q, t) * 255.0).round() as u8;

    Rgb(
        channel(h + 1.0 / 3.0),
        channel(h),
        channel(h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

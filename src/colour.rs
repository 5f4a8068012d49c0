use ratatui::style::Color;

/// Saturation used for every region fill
const FILL_SATURATION: f64 = 0.55;
/// Lightness used for every region fill
const FILL_LIGHTNESS: f64 = 0.55;

/// Fill for regions without a usable name (#aaaaaa)
pub const NEUTRAL_GREY: Fill = Fill::Rgb(0xaa, 0xaa, 0xaa);

/// Outline colour shared by all regions (#333333)
pub const STROKE: Color = Color::Rgb(0x33, 0x33, 0x33);

/// Region fill colour
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    /// Hue in degrees, saturation and lightness in 0..1
    Hsl(u16, f64, f64),
    Rgb(u8, u8, u8),
}

impl Fill {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Fill::Rgb(r, g, b) => (r, g, b),
            Fill::Hsl(h, s, l) => hsl_to_rgb(h as f64, s, l),
        }
    }

    /// Fill composited over a black terminal background at the given opacity
    pub fn blended(self, opacity: f64) -> Color {
        let (r, g, b) = self.rgb();
        let scale = |c: u8| (c as f64 * opacity).round() as u8;
        Color::Rgb(scale(r), scale(g), scale(b))
    }
}

impl From<Fill> for Color {
    fn from(fill: Fill) -> Self {
        let (r, g, b) = fill.rgb();
        Color::Rgb(r, g, b)
    }
}

/// Rolling 31x hash over UTF-16 code units.
///
/// Only the shift is truncated to i32; the accumulator itself keeps growing,
/// which is how browsers evaluate `c + ((hash << 5) - hash)`. It grows by at
/// most 2^31 + 2^16 per unit, so i64 holds any realistic name.
#[inline(always)]
pub fn name_hash(name: &str) -> i64 {
    name.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        (unit as i64).wrapping_add(shifted.wrapping_sub(hash))
    })
}

/// Deterministic fill for a region name.
///
/// Same name, same colour, in every run. Different names may land on the
/// same hue since there are only 360 of them.
pub fn name_to_colour(name: Option<&str>) -> Fill {
    match name {
        None | Some("") => NEUTRAL_GREY,
        Some(name) => {
            let hue = name_hash(name).unsigned_abs() % 360;
            Fill::Hsl(hue as u16, FILL_SATURATION, FILL_LIGHTNESS)
        }
    }
}

/// Convert HSL (h in degrees, s and l in 0..1) to RGB
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    let channel = |t: f64| (hue_to_channel(p, q, t) * 255.0).round() as u8;
    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn hue(name: &str) -> u16 {
        match name_to_colour(Some(name)) {
            Fill::Hsl(h, _, _) => h,
            other => panic!("expected hsl fill, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_name_is_grey() {
        assert_eq!(name_to_colour(None), NEUTRAL_GREY);
        assert_eq!(name_to_colour(Some("")), NEUTRAL_GREY);
        assert_eq!(NEUTRAL_GREY.rgb(), (170, 170, 170));
    }

    #[test]
    fn test_known_hues() {
        assert_eq!(name_hash("Rome"), 2_553_013);
        assert_eq!(hue("Rome"), 253);
        assert_eq!(hue("Byzantine Empire"), 176);
    }

    #[test]
    fn test_long_names_leave_i32_range() {
        // Same values a browser gives for these names
        assert_eq!(name_hash("Holy Roman Empire"), 3_951_746_563);
        assert_eq!(hue("Holy Roman Empire"), 283);
        assert_eq!(name_hash("Ottoman Empire"), -5_382_902_918);
        assert_eq!(hue("Ottoman Empire"), 38);
        assert_eq!(hue("Kingdom of Aksum"), 147);
    }

    #[test]
    fn test_deterministic() {
        let a = name_to_colour(Some("Rome"));
        let b = name_to_colour(Some("Rome"));
        assert_eq!(a, b);
        assert_eq!(a.rgb(), b.rgb());
        assert!(matches!(a, Fill::Hsl(_, s, l) if s == 0.55 && l == 0.55));
    }

    #[test]
    fn test_very_long_name_does_not_panic() {
        let name = "Empire".repeat(500);
        assert!(hue(&name) < 360);
    }

    #[test]
    fn test_hsl_to_rgb_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 0.5), (128, 128, 128));
    }

    #[test]
    fn test_blended_halves_channels() {
        assert_eq!(Fill::Rgb(200, 100, 0).blended(0.5), Color::Rgb(100, 50, 0));
    }
}

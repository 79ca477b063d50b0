use eframe::egui::Color32;
use palette::{IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Colour scales for quantitative chart encodings
// ---------------------------------------------------------------------------

/// Gradient used to map a value onto a colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scheme {
    /// Light to dark blue.
    Blues,
    /// Red below `mid`, white at `mid`, blue above.
    RedBlue { mid: f64 },
}

const BLUE_LIGHT: (u8, u8, u8) = (222, 235, 247);
const BLUE_DARK: (u8, u8, u8) = (8, 48, 107);
const RED: (u8, u8, u8) = (178, 24, 43);
const WHITE: (u8, u8, u8) = (247, 247, 247);
const BLUE: (u8, u8, u8) = (33, 102, 172);

fn linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

fn mix(from: (u8, u8, u8), to: (u8, u8, u8), t: f32) -> Color32 {
    let mixed = linear(from).mix(linear(to), t.clamp(0.0, 1.0));
    let rgb: Srgb = mixed.into_color();
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Maps values in `[min, max]` onto a [`Scheme`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub scheme: Scheme,
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// Scale spanning the finite values of `values`; `None` if there are none.
    pub fn from_values(scheme: Scheme, values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(ColorScale { scheme, min, max })
    }

    /// Position of `value` in the domain, in `[0, 1]`.
    fn position(&self, value: f64, lo: f64, hi: f64) -> f32 {
        let range = hi - lo;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - lo) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        match self.scheme {
            Scheme::Blues => {
                let t = self.position(value, self.min, self.max);
                mix(BLUE_LIGHT, BLUE_DARK, t)
            }
            Scheme::RedBlue { mid } => {
                if value < mid {
                    let t = self.position(value, self.min.min(mid), mid);
                    mix(RED, WHITE, t)
                } else {
                    let t = self.position(value, mid, self.max.max(mid));
                    mix(WHITE, BLUE, t)
                }
            }
        }
    }

    /// Colour for an optional value; grey when missing.
    pub fn color_or_missing(&self, value: Option<f64>) -> Color32 {
        value.map_or(Color32::GRAY, |v| self.color_for(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness(c: Color32) -> u32 {
        c.r() as u32 + c.g() as u32 + c.b() as u32
    }

    #[test]
    fn blues_darken_with_value() {
        let scale = ColorScale::from_values(Scheme::Blues, [10.0, 20.0, 30.0]).unwrap();
        assert_eq!(scale.min, 10.0);
        assert_eq!(scale.max, 30.0);

        let lo = scale.color_for(10.0);
        let mid = scale.color_for(20.0);
        let hi = scale.color_for(30.0);
        assert_eq!(lo, Color32::from_rgb(BLUE_LIGHT.0, BLUE_LIGHT.1, BLUE_LIGHT.2));
        assert_eq!(hi, Color32::from_rgb(BLUE_DARK.0, BLUE_DARK.1, BLUE_DARK.2));
        assert!(brightness(lo) > brightness(mid));
        assert!(brightness(mid) > brightness(hi));
        // Out-of-domain values clamp.
        assert_eq!(scale.color_for(100.0), hi);
    }

    #[test]
    fn diverging_is_white_at_mid() {
        let scale = ColorScale::from_values(Scheme::RedBlue { mid: 100_000.0 }, [60_000.0, 160_000.0])
            .unwrap();
        let white = scale.color_for(100_000.0);
        assert_eq!(white, Color32::from_rgb(WHITE.0, WHITE.1, WHITE.2));

        let low = scale.color_for(60_000.0);
        assert!(low.r() > low.b());
        let high = scale.color_for(160_000.0);
        assert!(high.b() > high.r());
    }

    #[test]
    fn degenerate_domains() {
        assert!(ColorScale::from_values(Scheme::Blues, [f64::NAN]).is_none());
        let flat = ColorScale::from_values(Scheme::Blues, [5.0, 5.0]).unwrap();
        assert_eq!(flat.color_for(5.0), mix(BLUE_LIGHT, BLUE_DARK, 0.5));
        assert_eq!(flat.color_or_missing(None), Color32::GRAY);
    }
}

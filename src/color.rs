use std::fmt;

use serde::{Deserialize, Serialize};

/// Color used in place of any input that does not normalize to six hex digits.
pub const FALLBACK: ColorSpec = ColorSpec { r: 0, g: 0, b: 0 };

/// A 24-bit color in canonical form. Alpha is attached only when the color becomes a gradient
/// stop; see [`ColorSpec::to_rgba`].
///
/// Deserializes from (and serializes to) a hex string, running the same normalization as
/// [`ColorSpec::normalize`], so malformed colors in parameter files fall back to black instead of
/// failing the whole file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub struct ColorSpec {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A color with a straight (not premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl ColorSpec {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        ColorSpec { r, g, b }
    }

    /// Parses `#rgb`, `rgb`, `#rrggbb`, or `rrggbb` (any case). Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix('#').unwrap_or(raw);
        let expanded: String;
        let digits = if digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            expanded = digits.chars().flat_map(|c| [c, c]).collect();
            expanded.as_str()
        } else {
            digits
        };
        let mut rgb = [0u8; 3];
        hex::decode_to_slice(digits, &mut rgb).ok()?;
        let [r, g, b] = rgb;
        Some(ColorSpec { r, g, b })
    }

    /// Like [`ColorSpec::parse`], but never fails: malformed input becomes [`FALLBACK`].
    pub fn normalize(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            tracing::debug!(input = raw, "unrecognized color, using fallback");
            FALLBACK
        })
    }

    /// Canonical `#rrggbb` form, lowercase.
    pub fn hex(&self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }

    pub fn to_rgba(&self, alpha: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn opaque(&self) -> raqote::SolidSource {
        raqote::SolidSource::from_unpremultiplied_argb(0xff, self.r, self.g, self.b)
    }
}

impl Rgba {
    /// Gradient stop color for `raqote`, which takes straight 8-bit ARGB.
    pub fn to_raqote(&self) -> raqote::Color {
        raqote::Color::new(self.alpha_u8(), self.r, self.g, self.b)
    }

    pub fn alpha_u8(&self) -> u8 {
        (self.alpha * 255.0).round() as u8
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        FALLBACK
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl std::str::FromStr for ColorSpec {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ColorSpec::normalize(s))
    }
}

impl From<String> for ColorSpec {
    fn from(s: String) -> Self {
        ColorSpec::normalize(&s)
    }
}

impl From<ColorSpec> for String {
    fn from(c: ColorSpec) -> Self {
        c.hex()
    }
}

/// Normalizes a user-entered hex color to canonical `#rrggbb` form, or `#000000` if it cannot be
/// read as a color.
pub fn normalize_hex(raw: &str) -> String {
    ColorSpec::normalize(raw).hex()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_expands_short_form() {
        assert_eq!(normalize_hex("#abc"), "#aabbcc");
        assert_eq!(normalize_hex("abc"), "#aabbcc");
        assert_eq!(normalize_hex("#F0a"), "#ff00aa");
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(normalize_hex("#3B82F6"), "#3b82f6");
        assert_eq!(normalize_hex("f8fafc"), "#f8fafc");
        assert_eq!(ColorSpec::normalize("#ec4899"), ColorSpec::new(0xec, 0x48, 0x99));
    }

    #[test]
    fn test_fallback_on_invalid() {
        for raw in [
            "zzzzzz", "#12", "", "#", "##abcdef", "#abcd", "#abcdefa", "#ab c", "#ggg", "#ａｂｃ",
        ] {
            assert_eq!(normalize_hex(raw), "#000000", "input {:?}", raw);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "#abc", "ABC", "#3b82f6", "zzzzzz", "#12", "", "123456", "#FfFfFf", "0x1234", "#0d0019",
        ] {
            let once = normalize_hex(raw);
            assert_eq!(normalize_hex(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn test_to_rgba() {
        let c = ColorSpec::normalize("#f59e0b");
        assert_eq!(
            c.to_rgba(0.2),
            Rgba {
                r: 245,
                g: 158,
                b: 11,
                alpha: 0.2
            }
        );
        assert_eq!(c.to_rgba(0.0).alpha_u8(), 0);
        assert_eq!(c.to_rgba(0.2).alpha_u8(), 51);
        assert_eq!(c.to_rgba(1.0).alpha_u8(), 255);
        assert_eq!(c.to_rgba(7.0).alpha, 1.0);
    }

    #[test]
    fn test_serde_normalizes() {
        let colors: Vec<ColorSpec> = serde_json::from_str(r##"["#abc", "bogus", "#F59E0B"]"##)
            .expect("valid JSON");
        assert_eq!(
            colors,
            vec![
                ColorSpec::new(0xaa, 0xbb, 0xcc),
                FALLBACK,
                ColorSpec::new(0xf5, 0x9e, 0x0b)
            ]
        );
        assert_eq!(
            serde_json::to_string(&colors[0]).expect("serializable"),
            "\"#aabbcc\""
        );
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::ColorSpec;

pub const DEFAULT_BACKGROUND: &str = "#f8fafc";
pub const DEFAULT_COLORS: [&str; 4] = ["#3b82f6", "#8b5cf6", "#ec4899", "#f59e0b"];
pub const DEFAULT_LONG_EDGE: u32 = 3840;
/// Longest canvas side a render will allocate.
pub const MAX_LONG_EDGE: u32 = 16384;

const MAX_BLUR: f64 = 1000.0;
const MAX_PERCENT: f64 = 1000.0;
const MIN_SCALE: f64 = 0.8;
const MAX_SCALE: f64 = 1.2;

/// Everything a render needs besides the random source. Read-only during a render.
#[derive(Debug, Clone, PartialEq, clap::Args, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectParameters {
    /// Background color, as `#rrggbb` or `#rgb`. Unreadable colors become black.
    #[clap(long, default_value = DEFAULT_BACKGROUND)]
    pub background: ColorSpec,

    /// A blob color; repeat the flag for more blobs. Later colors paint over earlier ones.
    #[clap(long = "color", default_values = DEFAULT_COLORS)]
    pub colors: Vec<ColorSpec>,

    /// Blur radius in pixels. The second blur pass uses half of this.
    #[clap(long, default_value_t = 60.0)]
    pub blur: f64,

    /// Film grain strength, as a fraction of the full channel range.
    #[clap(long, default_value_t = 0.2)]
    pub noise: f64,

    /// Contrast in percent; 100 leaves the image unchanged.
    #[clap(long, default_value_t = 130.0)]
    pub contrast: f64,

    /// Saturation in percent; 100 leaves the image unchanged.
    #[clap(long, default_value_t = 110.0)]
    pub saturation: f64,

    /// Blob size relative to the canvas, between 0.8 and 1.2.
    #[clap(long, default_value_t = MIN_SCALE)]
    pub scale: f64,

    #[clap(skip = DEFAULT_LONG_EDGE as i32)]
    pub width: i32,

    #[clap(skip = AspectRatio::WIDESCREEN.dimensions(DEFAULT_LONG_EDGE).1)]
    pub height: i32,
}

impl Default for EffectParameters {
    fn default() -> Self {
        let (width, height) = AspectRatio::WIDESCREEN.dimensions(DEFAULT_LONG_EDGE);
        EffectParameters {
            background: ColorSpec::normalize(DEFAULT_BACKGROUND),
            colors: DEFAULT_COLORS.iter().map(|c| ColorSpec::normalize(c)).collect(),
            blur: 60.0,
            noise: 0.2,
            contrast: 130.0,
            saturation: 110.0,
            scale: MIN_SCALE,
            width,
            height,
        }
    }
}

impl EffectParameters {
    /// Returns a copy with every numeric knob forced into the range the pipeline handles:
    ///
    /// | knob | range | NaN becomes |
    /// |---|---|---|
    /// | `blur` | `0..=1000` | `0` |
    /// | `noise` | `0..=1` | `0` |
    /// | `contrast`, `saturation` | `0..=1000` | `100` |
    /// | `scale` | `0.8..=1.2` | `0.8` |
    ///
    /// Dimensions are left alone; a non-positive dimension means there is nothing to render
    /// into.
    pub fn sanitized(&self) -> EffectParameters {
        fn clamp_or(v: f64, lo: f64, hi: f64, nan: f64) -> f64 {
            if v.is_nan() {
                nan
            } else {
                v.clamp(lo, hi)
            }
        }
        EffectParameters {
            blur: clamp_or(self.blur, 0.0, MAX_BLUR, 0.0),
            noise: clamp_or(self.noise, 0.0, 1.0, 0.0),
            contrast: clamp_or(self.contrast, 0.0, MAX_PERCENT, 100.0),
            saturation: clamp_or(self.saturation, 0.0, MAX_PERCENT, 100.0),
            scale: clamp_or(self.scale, MIN_SCALE, MAX_SCALE, MIN_SCALE),
            ..self.clone()
        }
    }

    pub fn with_aspect(mut self, aspect: AspectRatio, long_edge: u32) -> Self {
        (self.width, self.height) = aspect.dimensions(long_edge);
        self
    }
}

/// Where blob centers go.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    /// Every blob is centered on the canvas; only the outlines vary between renders.
    #[default]
    Centered,
    /// Every blob gets a random center and size.
    Scattered,
}

/// Canvas proportions, written `W:H` or by name (`widescreen`, `classic`, `square`, `ultrawide`,
/// `portrait`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    pub w: u32,
    pub h: u32,
}

impl AspectRatio {
    pub const WIDESCREEN: AspectRatio = AspectRatio { w: 16, h: 9 };
    pub const CLASSIC: AspectRatio = AspectRatio { w: 4, h: 3 };
    pub const SQUARE: AspectRatio = AspectRatio { w: 1, h: 1 };
    pub const ULTRAWIDE: AspectRatio = AspectRatio { w: 21, h: 9 };
    pub const PORTRAIT: AspectRatio = AspectRatio { w: 9, h: 16 };

    const NAMED: [(&'static str, AspectRatio); 5] = [
        ("widescreen", AspectRatio::WIDESCREEN),
        ("classic", AspectRatio::CLASSIC),
        ("square", AspectRatio::SQUARE),
        ("ultrawide", AspectRatio::ULTRAWIDE),
        ("portrait", AspectRatio::PORTRAIT),
    ];

    /// Canvas size whose longer side is `long_edge` pixels, capped at [`MAX_LONG_EDGE`]. The
    /// short side is rounded and is at least one pixel.
    pub const fn dimensions(&self, long_edge: u32) -> (i32, i32) {
        let long = if long_edge > MAX_LONG_EDGE {
            MAX_LONG_EDGE as u64
        } else {
            long_edge as u64
        };
        if self.w >= self.h {
            let short = (long * self.h as u64 + self.w as u64 / 2) / self.w as u64;
            (long as i32, if short == 0 { 1 } else { short as i32 })
        } else {
            let short = (long * self.w as u64 + self.h as u64 / 2) / self.h as u64;
            (if short == 0 { 1 } else { short as i32 }, long as i32)
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::WIDESCREEN
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.w, self.h)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAspectError(String);

impl fmt::Display for ParseAspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid aspect ratio {:?}: expected W:H with positive integers, or a name like \"square\"",
            self.0
        )
    }
}

impl std::error::Error for ParseAspectError {}

impl FromStr for AspectRatio {
    type Err = ParseAspectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAspectError(s.to_string());
        if let Some(&(_, named)) = AspectRatio::NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
        {
            return Ok(named);
        }
        let (w, h) = s.split_once([':', 'x']).ok_or_else(err)?;
        let w: u32 = w.trim().parse().map_err(|_| err())?;
        let h: u32 = h.trim().parse().map_err(|_| err())?;
        if w == 0 || h == 0 {
            return Err(err());
        }
        Ok(AspectRatio { w, h })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = EffectParameters::default();
        assert_eq!(params.background.hex(), "#f8fafc");
        assert_eq!(params.colors.len(), 4);
        assert_eq!(params.colors[3].hex(), "#f59e0b");
        assert_eq!((params.width, params.height), (3840, 2160));
        assert_eq!(params.sanitized(), params);
    }

    #[test]
    fn test_sanitized_clamps() {
        let params = EffectParameters {
            blur: -5.0,
            noise: 3.0,
            contrast: f64::NAN,
            saturation: -1.0,
            scale: 9.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(params.blur, 0.0);
        assert_eq!(params.noise, 1.0);
        assert_eq!(params.contrast, 100.0);
        assert_eq!(params.saturation, 0.0);
        assert_eq!(params.scale, 1.2);

        let params = EffectParameters {
            blur: f64::INFINITY,
            noise: f64::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(params.blur, 1000.0);
        assert_eq!(params.noise, 0.0);
    }

    #[test]
    fn test_aspect_dimensions() {
        const TEST_CASES: &[(AspectRatio, u32, (i32, i32))] = &[
            (AspectRatio::WIDESCREEN, 3840, (3840, 2160)),
            (AspectRatio::WIDESCREEN, 1920, (1920, 1080)),
            (AspectRatio::CLASSIC, 3840, (3840, 2880)),
            (AspectRatio::SQUARE, 512, (512, 512)),
            (AspectRatio::ULTRAWIDE, 3840, (3840, 1646)),
            (AspectRatio::PORTRAIT, 3840, (2160, 3840)),
            (AspectRatio { w: 1000, h: 1 }, 10, (10, 1)),
            (AspectRatio::WIDESCREEN, 3_000_000_000, (16384, 9216)),
            (AspectRatio::PORTRAIT, u32::MAX, (9216, 16384)),
        ];
        for &(aspect, long_edge, want) in TEST_CASES {
            assert_eq!(aspect.dimensions(long_edge), want, "{} @ {}", aspect, long_edge);
        }
    }

    #[test]
    fn test_parse_aspect() {
        assert_eq!("16:9".parse::<AspectRatio>(), Ok(AspectRatio::WIDESCREEN));
        assert_eq!("9x16".parse::<AspectRatio>(), Ok(AspectRatio::PORTRAIT));
        assert_eq!(" 4 : 3 ".parse::<AspectRatio>(), Ok(AspectRatio::CLASSIC));
        assert_eq!("Square".parse::<AspectRatio>(), Ok(AspectRatio::SQUARE));
        assert_eq!("ultrawide".parse::<AspectRatio>(), Ok(AspectRatio::ULTRAWIDE));
        assert_eq!("classic".parse::<AspectRatio>(), Ok(AspectRatio::CLASSIC));
        assert!("16".parse::<AspectRatio>().is_err());
        assert!("cinema".parse::<AspectRatio>().is_err());
        assert!("0:9".parse::<AspectRatio>().is_err());
        assert!("a:b".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio::ULTRAWIDE.to_string(), "21:9");
    }

    #[test]
    fn test_params_from_json() {
        let params: EffectParameters = serde_json::from_str(
            r##"{"background": "#0d0019", "colors": ["#abc"], "blur": 125, "width": 640, "height": 360}"##,
        )
        .expect("valid params");
        assert_eq!(params.background.hex(), "#0d0019");
        assert_eq!(params.colors, vec![ColorSpec::new(0xaa, 0xbb, 0xcc)]);
        assert_eq!(params.blur, 125.0);
        assert_eq!(params.noise, 0.2);
        assert_eq!((params.width, params.height), (640, 360));
    }

    #[test]
    fn test_placement_mode_serde() {
        let mode: PlacementMode = serde_json::from_str("\"scattered\"").expect("valid mode");
        assert_eq!(mode, PlacementMode::Scattered);
        assert_eq!(PlacementMode::default(), PlacementMode::Centered);
    }
}

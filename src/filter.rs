//! Whole-raster post-processing stages.
//!
//! Every stage writes back channel values that are already clamped to `0..=255` and never
//! exceed the pixel's alpha, so the next stage always reads a valid premultiplied raster.

use super::config::EffectParameters;
use super::noise::add_noise;
use super::rand::Random;
use super::raster::{pack, premultiply, unpack, unpremultiply, Raster};

/// Number of box blurs stacked to approximate one Gaussian.
const BOX_PASSES: usize = 3;

/// Rec. 709 luma weights, as used by the CSS `saturate()` filter.
const LUMA: [f64; 3] = [0.213, 0.715, 0.072];

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Filter {
    /// Gaussian blur with standard deviation `radius` pixels.
    Blur { radius: f64 },
    /// Contrast then saturation, both in percent.
    ColorAdjust { contrast: f64, saturation: f64 },
    /// Additive luminance grain; see [`add_noise`].
    Noise { intensity: f64 },
}

impl Filter {
    pub fn apply(&self, raster: &mut Raster, rng: &mut impl Random) {
        match *self {
            Filter::Blur { radius } => blur(raster, radius),
            Filter::ColorAdjust {
                contrast,
                saturation,
            } => adjust_color(raster, contrast, saturation),
            Filter::Noise { intensity } => add_noise(raster, intensity, rng),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Blur { .. } => "blur",
            Filter::ColorAdjust { .. } => "color-adjust",
            Filter::Noise { .. } => "noise",
        }
    }
}

/// The ordered post-processing stages of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain(pub Vec<Filter>);

impl FilterChain {
    /// Blur, then contrast and saturation, then a second blur at half the radius to soften what
    /// the color step sharpened, then grain.
    pub fn for_params(params: &EffectParameters) -> FilterChain {
        FilterChain(vec![
            Filter::Blur {
                radius: params.blur,
            },
            Filter::ColorAdjust {
                contrast: params.contrast,
                saturation: params.saturation,
            },
            Filter::Blur {
                radius: params.blur / 2.0,
            },
            Filter::Noise {
                intensity: params.noise,
            },
        ])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.0.iter()
    }
}

/// Gaussian blur approximated by three box blurs, each run horizontally then vertically.
/// Pixels beyond the edge repeat the nearest edge pixel. Radii below half a pixel are a no-op.
pub fn blur(raster: &mut Raster, radius: f64) {
    if !(radius >= 0.5) {
        return;
    }
    let width = raster.width() as usize;
    let height = raster.height() as usize;

    let mut bytes: Vec<u8> = raster.words().iter().flat_map(|&w| unpack(w)).collect();
    let mut scratch = vec![0u8; bytes.len()];
    for size in box_sizes(radius, BOX_PASSES) {
        let r = (size - 1) / 2;
        if r == 0 {
            continue;
        }
        // Rows.
        box_pass(&bytes, &mut scratch, r, width, 4, height, width * 4);
        // Columns.
        box_pass(&scratch, &mut bytes, r, height, width * 4, width, 4);
    }

    for (word, px) in raster.words_mut().iter_mut().zip(bytes.chunks_exact(4)) {
        *word = pack([px[0], px[1], px[2], px[3]]);
    }
}

/// Widths of `n` successive box filters whose combined variance matches a Gaussian with
/// standard deviation `sigma`. Every width is odd.
pub fn box_sizes(sigma: f64, n: usize) -> Vec<usize> {
    let nf = n as f64;
    let w_ideal = (12.0 * sigma * sigma / nf + 1.0).sqrt();
    let mut wl = w_ideal.floor() as usize;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wu = wl + 2;
    let wlf = wl as f64;
    let m_ideal =
        (12.0 * sigma * sigma - nf * wlf * wlf - 4.0 * nf * wlf - 3.0 * nf) / (-4.0 * wlf - 4.0);
    let m = m_ideal.round().max(0.0) as usize;
    (0..n).map(|i| if i < m { wl } else { wu }).collect()
}

/// One box blur of radius `r` along `lines` independent lines of `len` pixels. Pixel `i` of line
/// `l` starts at byte `l * line_stride + i * stride`; all four channels are filtered.
fn box_pass(
    src: &[u8],
    dst: &mut [u8],
    r: usize,
    len: usize,
    stride: usize,
    lines: usize,
    line_stride: usize,
) {
    let window = (2 * r + 1) as u32;
    let last = len - 1;
    for line in 0..lines {
        let base = line * line_stride;
        let at = |i: usize, c: usize| u32::from(src[base + i.min(last) * stride + c]);
        for c in 0..4 {
            let mut sum = (r as u32 + 1) * at(0, c);
            for k in 1..=r {
                sum += at(k, c);
            }
            for i in 0..len {
                dst[base + i * stride + c] = ((sum + window / 2) / window) as u8;
                sum += at(i + r + 1, c);
                sum -= at(i.saturating_sub(r), c);
            }
        }
    }
}

/// Contrast around mid-gray, then saturation with luminance kept fixed. Both are percentages,
/// with `100` leaving the channel untouched.
pub fn adjust_color(raster: &mut Raster, contrast: f64, saturation: f64) {
    if contrast == 100.0 && saturation == 100.0 {
        return;
    }
    let k = contrast / 100.0;
    let contrast_lut: [f64; 256] = std::array::from_fn(|c| {
        let unit = c as f64 / 255.0;
        ((unit - 0.5) * k + 0.5).clamp(0.0, 1.0) * 255.0
    });
    let matrix = saturate_matrix(saturation / 100.0);

    for word in raster.words_mut() {
        let [r, g, b, a] = unpremultiply(unpack(*word));
        if a == 0 {
            continue;
        }
        let rgb = [
            contrast_lut[r as usize],
            contrast_lut[g as usize],
            contrast_lut[b as usize],
        ];
        let out = matrix.map(|row| {
            let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            v.round().clamp(0.0, 255.0) as u8
        });
        *word = pack(premultiply([out[0], out[1], out[2], a]));
    }
}

/// The CSS `saturate()` color matrix for factor `s`.
fn saturate_matrix(s: f64) -> [[f64; 3]; 3] {
    let [lr, lg, lb] = LUMA;
    [
        [lr + (1.0 - lr) * s, lg - lg * s, lb - lb * s],
        [lr - lr * s, lg + (1.0 - lg) * s, lb - lb * s],
        [lr - lr * s, lg - lg * s, lb + (1.0 - lb) * s],
    ]
}

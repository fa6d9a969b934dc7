use std::path::Path;

use anyhow::Context;
use raqote::DrawTarget;

use crate::color::ColorSpec;

/// The pixel grid a render composites into.
///
/// Backed by a `raqote` draw target, so pixels are premultiplied ARGB words. Every pipeline stage
/// keeps the buffer opaque, in which case premultiplied and straight channels coincide.
pub struct Raster {
    dt: DrawTarget,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Allocates a transparent raster, or `None` if either dimension is not positive.
    pub fn new(width: i32, height: i32) -> Option<Raster> {
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(Raster {
            dt: DrawTarget::new(width, height),
        })
    }

    pub fn width(&self) -> i32 {
        self.dt.width()
    }

    pub fn height(&self) -> i32 {
        self.dt.height()
    }

    /// Overwrites every pixel with `color`, fully opaque.
    pub fn fill(&mut self, color: ColorSpec) {
        self.dt.clear(color.opaque());
    }

    pub fn draw_target_mut(&mut self) -> &mut DrawTarget {
        &mut self.dt
    }

    /// Premultiplied ARGB words in row-major order.
    pub fn words(&self) -> &[u32] {
        self.dt.get_data()
    }

    pub fn words_mut(&mut self) -> &mut [u32] {
        self.dt.get_data_mut()
    }

    /// Straight `[r, g, b, a]` at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        assert!(
            (0..self.width()).contains(&x) && (0..self.height()).contains(&y),
            "pixel ({}, {}) out of bounds",
            x,
            y
        );
        unpremultiply(unpack(self.words()[(y * self.width() + x) as usize]))
    }

    pub fn is_opaque(&self) -> bool {
        self.words().iter().all(|&w| w >> 24 == 0xff)
    }

    pub fn write_png(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.dt
            .write_png(path)
            .with_context(|| format!("Failed to write PNG to {}", path.display()))
    }
}

/// Splits a premultiplied ARGB word into `[r, g, b, a]`.
#[inline]
pub fn unpack(word: u32) -> [u8; 4] {
    let [b, g, r, a] = word.to_le_bytes();
    [r, g, b, a]
}

/// Inverse of [`unpack`].
#[inline]
pub fn pack([r, g, b, a]: [u8; 4]) -> u32 {
    u32::from_le_bytes([b, g, r, a])
}

/// Converts premultiplied `[r, g, b, a]` to straight alpha. Fully transparent pixels come out as
/// transparent black.
#[inline]
pub fn unpremultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    match a {
        0 => [0, 0, 0, 0],
        0xff => [r, g, b, a],
        _ => {
            let un = |c: u8| ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
            [un(r), un(g), un(b), a]
        }
    }
}

/// Converts straight `[r, g, b, a]` to premultiplied alpha.
#[inline]
pub fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    match a {
        0xff => [r, g, b, a],
        _ => {
            let pre = |c: u8| ((u32::from(c) * u32::from(a) + 127) / 255) as u8;
            [pre(r), pre(g), pre(b), a]
        }
    }
}

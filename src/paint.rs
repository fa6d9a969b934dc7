use raqote::{DrawOptions, Gradient, GradientStop, Point as RaqotePoint, Source, Spread};

use super::blob::Blob;
use super::color::{ColorSpec, Rgba};
use super::config::PlacementMode;
use super::math::Point;
use super::rand::Random;
use super::raster::Raster;

/// `(offset, alpha)` for each stop of a blob's radial gradient: an opaque core fading to 20% at
/// four fifths of the radius and to nothing at the rim.
pub const STOPS: [(f32, f64); 3] = [(0.0, 1.0), (0.8, 0.2), (1.0, 0.0)];

/// A radial gradient brush in a single color, centered on a blob.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RadialBrush {
    pub center: Point,
    pub radius: f64,
    pub stops: [(f32, Rgba); 3],
}

impl RadialBrush {
    pub fn new(color: ColorSpec, center: Point, radius: f64) -> Self {
        let stops = STOPS.map(|(offset, alpha)| (offset, color.to_rgba(alpha)));
        RadialBrush {
            center,
            radius,
            stops,
        }
    }

    pub fn to_source(&self) -> Source<'static> {
        let stops = self
            .stops
            .iter()
            .map(|&(position, color)| GradientStop {
                position,
                color: color.to_raqote(),
            })
            .collect();
        Source::new_radial_gradient(
            Gradient { stops },
            RaqotePoint::new(self.center.0 as f32, self.center.1 as f32),
            self.radius as f32,
            Spread::Pad,
        )
    }
}

/// Where one blob goes and how far its gradient reaches.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    pub center: Point,
    pub end_radius: f64,
}

impl Placement {
    /// Centered blobs sit in the middle of the canvas and reach `scale` times its longer side.
    /// Scattered blobs get a uniformly random center, and a reach between `scale` and
    /// `2 * scale` times the shorter side.
    pub fn choose(
        mode: PlacementMode,
        width: i32,
        height: i32,
        scale: f64,
        rng: &mut impl Random,
    ) -> Placement {
        let (w, h) = (f64::from(width), f64::from(height));
        match mode {
            PlacementMode::Centered => Placement {
                center: (w / 2.0, h / 2.0),
                end_radius: w.max(h) * scale,
            },
            PlacementMode::Scattered => {
                let x = rng.rnd() * w;
                let y = rng.rnd() * h;
                let end_radius = rng.uniform(scale, 2.0 * scale) * w.min(h);
                Placement {
                    center: (x, y),
                    end_radius,
                }
            }
        }
    }
}

/// Paints one color as a soft, irregular splotch: a fresh blob outline filled with the color's
/// radial gradient. Returns the outline that was filled.
pub fn paint_blob(
    raster: &mut Raster,
    color: ColorSpec,
    placement: Placement,
    rng: &mut impl Random,
) -> Blob {
    let Placement { center, end_radius } = placement;
    let blob = Blob::generate(center, end_radius, rng);
    if !(end_radius > 0.0) {
        tracing::warn!(end_radius, "skipping blob with empty reach");
        return blob;
    }
    let brush = RadialBrush::new(color, center, end_radius);
    raster
        .draw_target_mut()
        .fill(&blob.to_path(), &brush.to_source(), &DrawOptions::new());
    blob
}

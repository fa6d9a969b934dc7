use raqote::{Path, PathBuilder};

use super::math::{add_polar_offset, midpoint, pi, Point};
use super::rand::Random;

pub const MIN_POINTS: u32 = 5;
pub const MAX_POINTS: u32 = 9;

/// Points sit between this fraction of the base radius and the full base radius.
const MIN_RADIUS_FRACTION: f64 = 0.3;

/// One quadratic edge of a blob outline, starting wherever the previous edge ended.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Segment {
    pub control: Point,
    pub end: Point,
}

/// A closed organic outline: random points around a center joined by bulging quadratic curves.
///
/// With few points the outline may cross itself. That is fine; the fill rule decides which
/// lobes get paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub center: Point,
    pub base_radius: f64,
    pub start: Point,
    pub segments: Vec<Segment>,
}

impl Blob {
    pub fn generate(center: Point, base_radius: f64, rng: &mut impl Random) -> Blob {
        let num_points = rng.int_in(MIN_POINTS, MAX_POINTS);
        Blob::with_point_count(center, base_radius, num_points as usize, rng)
    }

    /// Like [`Blob::generate`], but with a caller-chosen number of points.
    ///
    /// # Panics
    ///
    /// Panics if `num_points` is zero.
    pub fn with_point_count(
        center: Point,
        base_radius: f64,
        num_points: usize,
        rng: &mut impl Random,
    ) -> Blob {
        assert!(num_points > 0, "a blob needs at least one point");
        let points: Vec<Point> = (0..num_points)
            .map(|_| {
                let theta = rng.uniform(0.0, pi(2.0));
                let fraction = rng.uniform(MIN_RADIUS_FRACTION, 1.0);
                add_polar_offset(center, theta, base_radius * fraction)
            })
            .collect();

        let segments = (0..num_points)
            .map(|i| {
                let from = points[i];
                let end = points[(i + 1) % num_points];
                let (mx, my) = midpoint(from, end);
                let dx = (rng.rnd() - 0.5) * base_radius;
                let dy = (rng.rnd() - 0.5) * base_radius;
                Segment {
                    control: (mx + dx, my + dy),
                    end,
                }
            })
            .collect();

        Blob {
            center,
            base_radius,
            start: points[0],
            segments,
        }
    }

    pub fn num_points(&self) -> usize {
        self.segments.len()
    }

    /// The outline's vertices, starting with [`Blob::start`].
    #[cfg(test)]
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start).chain(
            self.segments[..self.segments.len().saturating_sub(1)]
                .iter()
                .map(|s| s.end),
        )
    }

    /// Whether the last edge returns exactly to the starting point.
    pub fn is_closed(&self) -> bool {
        self.segments.last().map(|s| s.end) == Some(self.start)
    }

    pub fn to_path(&self) -> Path {
        let mut pb = PathBuilder::new();
        pb.move_to(self.start.0 as f32, self.start.1 as f32);
        for Segment { control, end } in &self.segments {
            pb.quad_to(
                control.0 as f32,
                control.1 as f32,
                end.0 as f32,
                end.1 as f32,
            );
        }
        pb.close();
        pb.finish()
    }
}

use std::f64::consts::PI;

pub type Point = (f64, f64);

#[inline(always)]
pub fn pi(v: f64) -> f64 {
    PI * v
}

pub fn add_polar_offset((x, y): Point, theta: f64, r: f64) -> Point {
    (x + r * theta.cos(), y + r * theta.sin())
}

pub fn midpoint((x1, y1): Point, (x2, y2): Point) -> Point {
    ((x1 + x2) / 2.0, (y1 + y2) / 2.0)
}

/// Computes the distance between two points.
#[cfg(test)]
pub fn dist((x1, y1): Point, (x2, y2): Point) -> f64 {
    f64::hypot(x2 - x1, y2 - y1)
}

use std::cmp::Ordering;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::DVec2;
use serde::Serialize;

use crate::config;

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Angular distance between two directions, in `[0, π]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

/// Distance from the center to the edge of the square canvas along `phi`.
pub fn max_distance_for_angle(phi: f64) -> f64 {
    let mut reduced = normalize_angle(phi);
    while reduced > FRAC_PI_4 {
        reduced -= FRAC_PI_2;
    }
    0.5 * config::CANVAS_SIZE / reduced.cos()
}

/// Point around the web center, stored as angle (radians) and distance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PolarPoint {
    angle: f64,
    distance: f64,
}

impl PolarPoint {
    pub fn new(angle: f64, distance: f64) -> Self {
        Self {
            angle: normalize_angle(angle),
            distance: distance.max(0.0),
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = normalize_angle(angle);
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Negative distances clamp to the center.
    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance.max(0.0);
    }

    pub fn to_cartesian(&self) -> DVec2 {
        DVec2::from_angle(self.angle) * self.distance
    }

    /// Law of cosines; no Cartesian round trip.
    pub fn distance_to(&self, other: &PolarPoint) -> f64 {
        let (r1, r2) = (self.distance, other.distance);
        let sq = r1 * r1 + r2 * r2 - 2.0 * r1 * r2 * (other.angle - self.angle).cos();
        sq.max(0.0).sqrt()
    }

    /// Ordering by angle only.
    pub fn cmp_angle(&self, other: &PolarPoint) -> Ordering {
        self.angle.total_cmp(&other.angle)
    }
}

/// Sum of edge lengths of the closed polyline through `points`.
pub fn closed_perimeter(points: &[PolarPoint]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].distance_to(&points[(i + 1) % n]))
        .sum()
}

/// Closed polygon in Cartesian space, last vertex joined to the first.
#[derive(Clone, Debug)]
pub struct Polygon {
    vertices: Vec<DVec2>,
}

impl Polygon {
    pub fn from_polar(points: &[PolarPoint]) -> Self {
        Self {
            vertices: points.iter().map(PolarPoint::to_cartesian).collect(),
        }
    }

    /// Even-odd crossing test.
    pub fn contains(&self, p: DVec2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// True when `center` and the eight points at `±margin` around it are all inside.
    pub fn contains_with_margin(&self, center: DVec2, margin: f64) -> bool {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let probe = center + DVec2::new(dx as f64 * margin, dy as f64 * margin);
                if !self.contains(probe) {
                    return false;
                }
            }
        }
        true
    }
}

/// Axis-aligned square.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Square {
    pub min: DVec2,
    pub size: f64,
}

impl Square {
    pub fn centered(center: DVec2, size: f64) -> Self {
        Self {
            min: center - DVec2::splat(size * 0.5),
            size,
        }
    }

    pub fn max(&self) -> DVec2 {
        self.min + DVec2::splat(self.size)
    }

    pub fn center(&self) -> DVec2 {
        self.min + DVec2::splat(self.size * 0.5)
    }

    /// Liang–Barsky clip of segment `a..b` against the square. Touching the
    /// boundary counts as an intersection.
    pub fn intersects_segment(&self, a: DVec2, b: DVec2) -> bool {
        let max = self.max();
        let d = b - a;
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;

        let edges = [
            (-d.x, a.x - self.min.x),
            (d.x, max.x - a.x),
            (-d.y, a.y - self.min.y),
            (d.y, max.y - a.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return false;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return false;
                }
                t1 = t1.min(t);
            }
        }
        t0 <= t1
    }
}

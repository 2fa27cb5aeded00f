use std::f64::consts::TAU;
use std::sync::Arc;

use ::rand::Rng;
use glam::DVec2;
use tracing::debug;

use crate::config;
use crate::error::{EngineError, InvariantViolation, Result};
use crate::geometry::{angular_distance, max_distance_for_angle, PolarPoint, Polygon};

/// Radiating support lines of a web, one point per side, sorted by angle.
///
/// Point storage is shared between clones and copied on first write, so
/// cloning a web for an offspring is cheap until a mutation touches it.
#[derive(Clone, Debug)]
pub struct Skeleton {
    points: Arc<Vec<PolarPoint>>,
    min_angle: f64,
}

impl Skeleton {
    /// Rejection-sample a skeleton with `sides` points.
    pub fn generate(sides: usize, min_angle: f64, rng: &mut impl Rng) -> Result<Self> {
        for attempt in 1..=config::MAX_SKELETON_ATTEMPTS {
            let Some(mut points) = sample_points(sides, min_angle, rng) else {
                continue;
            };
            points.sort_by(PolarPoint::cmp_angle);
            let skeleton = Self {
                points: Arc::new(points),
                min_angle,
            };
            if !skeleton.is_invalid() {
                if attempt > 1 {
                    debug!(attempt, sides, "skeleton accepted after retries");
                }
                return Ok(skeleton);
            }
        }
        Err(EngineError::Construction {
            what: "skeleton",
            attempts: config::MAX_SKELETON_ATTEMPTS,
        })
    }

    /// Build from explicit points, sorted by angle. Validity is checked by
    /// whoever assembles the web.
    #[cfg(test)]
    pub(crate) fn from_points(mut points: Vec<PolarPoint>, min_angle: f64) -> Self {
        points.sort_by(PolarPoint::cmp_angle);
        Self {
            points: Arc::new(points),
            min_angle,
        }
    }

    pub fn points(&self) -> &[PolarPoint] {
        &self.points
    }

    pub fn point(&self, side: usize) -> PolarPoint {
        self.points[side]
    }

    pub fn sides(&self) -> usize {
        self.points.len()
    }

    pub fn min_angle(&self) -> f64 {
        self.min_angle
    }

    pub fn polygon(&self) -> Polygon {
        Polygon::from_polar(&self.points)
    }

    pub fn is_invalid(&self) -> bool {
        self.check().is_err()
    }

    /// Angles of the sides before and after `side`, the successor unwrapped
    /// past 2π when `side` is the last one.
    pub fn neighbour_angles(&self, side: usize) -> (f64, f64) {
        let n = self.points.len();
        let prev = if side == 0 {
            self.points[n - 1].angle() - TAU
        } else {
            self.points[side - 1].angle()
        };
        let next = if side == n - 1 {
            self.points[0].angle() + TAU
        } else {
            self.points[side + 1].angle()
        };
        (prev, next)
    }

    pub(crate) fn set_angle(&mut self, side: usize, angle: f64) {
        Arc::make_mut(&mut self.points)[side].set_angle(angle);
    }

    pub(crate) fn set_distance(&mut self, side: usize, distance: f64) {
        Arc::make_mut(&mut self.points)[side].set_distance(distance);
    }

    pub(crate) fn rotate_left(&mut self, k: usize) {
        if k != 0 {
            Arc::make_mut(&mut self.points).rotate_left(k);
        }
    }

    /// Index of the side with the smallest angle.
    pub(crate) fn first_side(&self) -> usize {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp_angle(b))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Sorted order, angular separation and center containment with margin.
    pub fn check(&self) -> std::result::Result<(), InvariantViolation> {
        let n = self.points.len();
        for side in 1..n {
            if self.points[side].angle() < self.points[side - 1].angle() {
                return Err(InvariantViolation::Unsorted { side });
            }
        }
        // small slack so sampled angles landing on the bound still count
        let min_gap = self.min_angle - 1e-9;
        for side in 0..n {
            let next = &self.points[(side + 1) % n];
            if angular_distance(self.points[side].angle(), next.angle()) < min_gap {
                return Err(InvariantViolation::SidesTooClose { side });
            }
        }
        if !self
            .polygon()
            .contains_with_margin(DVec2::ZERO, config::MIN_RING_CLEARANCE)
        {
            return Err(InvariantViolation::CenterOutside);
        }
        Ok(())
    }
}

fn sample_point(rng: &mut impl Rng) -> PolarPoint {
    let angle = rng.gen_range(0.0..TAU);
    let max_distance = max_distance_for_angle(angle);
    let distance = rng.gen_range(config::MIN_SKELETON_DISTANCE..=max_distance);
    PolarPoint::new(angle, distance)
}

fn sample_points(sides: usize, min_angle: f64, rng: &mut impl Rng) -> Option<Vec<PolarPoint>> {
    let mut points: Vec<PolarPoint> = Vec::with_capacity(sides);
    for _ in 0..sides {
        let mut placed = false;
        for _ in 0..config::MAX_POINT_ATTEMPTS {
            let p = sample_point(rng);
            if points
                .iter()
                .all(|q| angular_distance(p.angle(), q.angle()) >= min_angle)
            {
                points.push(p);
                placed = true;
                break;
            }
        }
        if !placed {
            return None;
        }
    }
    Some(points)
}

use std::sync::Arc;

use ::rand::Rng;

use crate::config;
use crate::error::{EngineError, InvariantViolation, Result};
use crate::geometry::{closed_perimeter, PolarPoint, Square};
use crate::skeleton::Skeleton;

/// One capture ring: a point on every skeleton side.
#[derive(Clone, Debug)]
pub struct TrappingNetCircle {
    points: Arc<Vec<PolarPoint>>,
}

impl TrappingNetCircle {
    /// Sample a ring just outside `previous` (or around the center when there
    /// is none). Returns `None` when some side has no room left, i.e. the ring
    /// does not fit.
    pub fn sample(
        skeleton: &Skeleton,
        previous: Option<&TrappingNetCircle>,
        rng: &mut impl Rng,
    ) -> Option<Self> {
        let clearance = config::MIN_RING_CLEARANCE;
        let mut points = Vec::with_capacity(skeleton.sides());
        for (side, spoke) in skeleton.points().iter().enumerate() {
            let lower = clearance + previous.map_or(0.0, |c| c.points[side].distance());
            let max = spoke.distance() - clearance;
            if lower > max {
                return None;
            }
            let upper = max.min(lower + config::RING_DISPERSION * clearance);
            let distance = rng.gen_range(lower..=upper);
            points.push(PolarPoint::new(spoke.angle(), distance));
        }
        Some(Self::from_points(points))
    }

    pub(crate) fn from_points(points: Vec<PolarPoint>) -> Self {
        Self {
            points: Arc::new(points),
        }
    }

    pub fn points(&self) -> &[PolarPoint] {
        &self.points
    }

    pub fn distance(&self, side: usize) -> f64 {
        self.points[side].distance()
    }

    /// Always derived from the current points.
    pub fn perimeter(&self) -> f64 {
        closed_perimeter(&self.points)
    }

    pub fn catches(&self, body: &Square) -> bool {
        let n = self.points.len();
        (0..n).any(|i| {
            let a = self.points[i].to_cartesian();
            let b = self.points[(i + 1) % n].to_cartesian();
            body.intersects_segment(a, b)
        })
    }

    fn set_angle(&mut self, side: usize, angle: f64) {
        Arc::make_mut(&mut self.points)[side].set_angle(angle);
    }

    fn set_distance(&mut self, side: usize, distance: f64) {
        Arc::make_mut(&mut self.points)[side].set_distance(distance);
    }
}

/// Concentric rings, innermost first.
#[derive(Clone, Debug, Default)]
pub struct TrappingNet {
    circles: Vec<TrappingNetCircle>,
}

impl TrappingNet {
    #[cfg(test)]
    pub(crate) fn from_circles(circles: Vec<TrappingNetCircle>) -> Self {
        Self { circles }
    }

    /// Build the initial net with `MIN_RING_COUNT` rings.
    pub fn grow_to_minimum(skeleton: &Skeleton, rng: &mut impl Rng) -> Result<Self> {
        let mut net = Self::default();
        while net.circles.len() < config::MIN_RING_COUNT {
            match TrappingNetCircle::sample(skeleton, net.circles.last(), rng) {
                Some(circle) => net.circles.push(circle),
                None => {
                    return Err(EngineError::Construction {
                        what: "trapping net",
                        attempts: 1,
                    })
                }
            }
        }
        Ok(net)
    }

    pub fn circles(&self) -> &[TrappingNetCircle] {
        &self.circles
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Total silk used: sum of ring perimeters.
    pub fn length(&self) -> f64 {
        self.circles.iter().map(TrappingNetCircle::perimeter).sum()
    }

    pub fn can_add_circle(&self, max_length: f64) -> bool {
        self.length() < max_length
    }

    /// Grow by one ring outside the current outermost one. Returns whether a
    /// ring was added.
    pub fn try_add_circle(
        &mut self,
        skeleton: &Skeleton,
        max_length: f64,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.can_add_circle(max_length) {
            return false;
        }
        match TrappingNetCircle::sample(skeleton, self.circles.last(), rng) {
            Some(circle) => {
                self.circles.push(circle);
                true
            }
            None => false,
        }
    }

    pub fn can_remove_circle(&self) -> bool {
        self.circles.len() > config::MIN_RING_COUNT
    }

    pub fn remove_circle(&mut self, index: usize) -> Option<TrappingNetCircle> {
        if !self.can_remove_circle() || index >= self.circles.len() {
            return None;
        }
        Some(self.circles.remove(index))
    }

    pub fn try_to_catch(&self, body: &Square) -> bool {
        self.circles.iter().any(|c| c.catches(body))
    }

    /// Distances of every ring at `side`, innermost first.
    pub fn side_distances(&self, side: usize) -> Vec<f64> {
        self.circles.iter().map(|c| c.distance(side)).collect()
    }

    pub fn outermost_distance(&self, side: usize) -> Option<f64> {
        self.circles.last().map(|c| c.distance(side))
    }

    pub(crate) fn set_side_angle(&mut self, side: usize, angle: f64) {
        for circle in &mut self.circles {
            circle.set_angle(side, angle);
        }
    }

    pub(crate) fn set_side_distances(&mut self, side: usize, distances: &[f64]) {
        debug_assert_eq!(distances.len(), self.circles.len());
        for (circle, &d) in self.circles.iter_mut().zip(distances) {
            circle.set_distance(side, d);
        }
    }

    pub(crate) fn set_circle_distances(&mut self, ring: usize, distances: &[f64]) {
        let circle = &mut self.circles[ring];
        for (side, &d) in distances.iter().enumerate() {
            circle.set_distance(side, d);
        }
    }

    pub(crate) fn rotate_left(&mut self, k: usize) {
        if k == 0 {
            return;
        }
        for circle in &mut self.circles {
            Arc::make_mut(&mut circle.points).rotate_left(k);
        }
    }

    /// Verify ring spacing, skeleton bounds, shared angles and ring count.
    pub fn check(&self, skeleton: &Skeleton) -> std::result::Result<(), InvariantViolation> {
        let clearance = config::MIN_RING_CLEARANCE;
        // tolerance for values sampled exactly on an interval bound
        let eps = 1e-9;
        if self.circles.len() < config::MIN_RING_COUNT {
            return Err(InvariantViolation::TooFewRings {
                found: self.circles.len(),
                min: config::MIN_RING_COUNT,
            });
        }
        for (ring, circle) in self.circles.iter().enumerate() {
            if circle.points.len() != skeleton.sides() {
                return Err(InvariantViolation::PointCount {
                    expected: skeleton.sides(),
                    found: circle.points.len(),
                });
            }
            for (side, p) in circle.points.iter().enumerate() {
                let spoke = skeleton.point(side);
                if p.angle() != spoke.angle() {
                    return Err(InvariantViolation::AngleMismatch {
                        ring,
                        side,
                        expected: spoke.angle(),
                        found: p.angle(),
                    });
                }
                let min = clearance
                    + if ring == 0 {
                        0.0
                    } else {
                        self.circles[ring - 1].distance(side)
                    };
                if p.distance() < min - eps {
                    return Err(InvariantViolation::RingTooClose {
                        ring,
                        side,
                        distance: p.distance(),
                        min,
                    });
                }
                let max = spoke.distance() - clearance;
                if p.distance() > max + eps {
                    return Err(InvariantViolation::RingOutsideSkeleton {
                        ring,
                        side,
                        distance: p.distance(),
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::SeedableRng;
    use glam::DVec2;
    use rand_chacha::ChaCha8Rng;

    fn regular_skeleton(sides: usize, distance: f64) -> Skeleton {
        let step = std::f64::consts::TAU / sides as f64;
        let points = (0..sides)
            .map(|i| PolarPoint::new(i as f64 * step, distance))
            .collect();
        Skeleton::from_points(points, step / 2.0)
    }

    #[test]
    fn generated_nets_respect_spacing_and_skeleton_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..30 {
            let skeleton = Skeleton::generate(14, 0.04, &mut rng).unwrap();
            let mut net = TrappingNet::grow_to_minimum(&skeleton, &mut rng).unwrap();
            while net.try_add_circle(&skeleton, config::MAX_MAX_NET_LENGTH, &mut rng) {}
            assert!(net.len() >= config::MIN_RING_COUNT);
            net.check(&skeleton).unwrap();
        }
    }

    #[test]
    fn perimeter_equals_direct_sum_of_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let skeleton = Skeleton::generate(10, 0.06, &mut rng).unwrap();
        let net = TrappingNet::grow_to_minimum(&skeleton, &mut rng).unwrap();

        let mut total = 0.0;
        for circle in net.circles() {
            let pts = circle.points();
            let direct: f64 = (0..pts.len())
                .map(|i| {
                    pts[i]
                        .to_cartesian()
                        .distance(pts[(i + 1) % pts.len()].to_cartesian())
                })
                .sum();
            assert!((circle.perimeter() - direct).abs() < 1e-6);
            total += direct;
        }
        assert!((net.length() - total).abs() < 1e-6);
    }

    #[test]
    fn length_follows_point_edits() {
        let skeleton = regular_skeleton(10, 300.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut net = TrappingNet::grow_to_minimum(&skeleton, &mut rng).unwrap();
        let before = net.length();

        let outer: Vec<f64> = net.side_distances(3).iter().map(|d| d + 5.0).collect();
        net.set_side_distances(3, &outer);
        let recomputed: f64 = net
            .circles()
            .iter()
            .map(|c| closed_perimeter(c.points()))
            .sum();
        assert_ne!(net.length(), before);
        assert_eq!(net.length(), recomputed);
    }

    #[test]
    fn ring_that_does_not_fit_is_rejected() {
        let skeleton = regular_skeleton(10, 25.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let first = TrappingNetCircle::from_points(
            skeleton
                .points()
                .iter()
                .map(|p| PolarPoint::new(p.angle(), 12.0))
                .collect(),
        );
        assert!(TrappingNetCircle::sample(&skeleton, Some(&first), &mut rng).is_none());

        let mut net = TrappingNet::from_circles(vec![first.clone(), first]);
        assert!(!net.try_add_circle(&skeleton, config::MAX_MAX_NET_LENGTH, &mut rng));
        assert_eq!(net.len(), 2);
    }

    #[test]
    fn removal_stops_at_minimum_ring_count() {
        let skeleton = regular_skeleton(10, 300.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut net = TrappingNet::grow_to_minimum(&skeleton, &mut rng).unwrap();
        assert!(net.try_add_circle(&skeleton, config::MAX_MAX_NET_LENGTH, &mut rng));
        assert!(net.remove_circle(1).is_some());
        assert_eq!(net.len(), config::MIN_RING_COUNT);
        assert!(net.remove_circle(0).is_none());
        assert_eq!(net.len(), config::MIN_RING_COUNT);
    }

    #[test]
    fn fly_on_a_ring_edge_is_caught() {
        let skeleton = regular_skeleton(10, 300.0);
        let circle = TrappingNetCircle::from_points(
            skeleton
                .points()
                .iter()
                .map(|p| PolarPoint::new(p.angle(), 100.0))
                .collect(),
        );
        let net = TrappingNet::from_circles(vec![circle]);
        let on_edge = Square::centered(DVec2::new(100.0, 0.0), config::FLY_SIZE);
        let at_center = Square::centered(DVec2::ZERO, config::FLY_SIZE);
        let far_out = Square::centered(DVec2::new(250.0, 0.0), config::FLY_SIZE);
        assert!(net.try_to_catch(&on_edge));
        assert!(!net.try_to_catch(&at_center));
        assert!(!net.try_to_catch(&far_out));
    }
}

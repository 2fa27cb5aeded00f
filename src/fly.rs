use std::f64::consts::TAU;

use ::rand::Rng;
use serde::Serialize;

use crate::config;
use crate::geometry::{max_distance_for_angle, PolarPoint, Square};

/// Where in the canvas a fly was sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlyDistribution {
    /// Any direction.
    Normal,
    /// Only the band `[1.5π, 2π)`.
    Restricted,
}

/// Prey: a fixed-size square. Whether it is caught depends on the web that
/// holds it, so that status lives on the web, not here.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Fly {
    pub center: PolarPoint,
    pub body: Square,
    pub distribution: FlyDistribution,
}

impl Fly {
    pub fn new(center: PolarPoint, distribution: FlyDistribution) -> Self {
        Self {
            center,
            body: Square::centered(center.to_cartesian(), config::FLY_SIZE),
            distribution,
        }
    }

    pub fn sample(distribution: FlyDistribution, rng: &mut impl Rng) -> Self {
        let min_angle = match distribution {
            FlyDistribution::Normal => 0.0,
            FlyDistribution::Restricted => config::RESTRICTED_FLY_MIN_ANGLE,
        };
        let angle = rng.gen_range(min_angle..TAU);
        let distance = rng.gen_range(0.0..max_distance_for_angle(angle));
        Self::new(PolarPoint::new(angle, distance), distribution)
    }
}

/// Sample `count` flies. Unless every fly is normal, the first quarter of the
/// sequence is normal and the rest come from the restricted band.
pub fn generate_flies(count: usize, normal_distribution: bool, rng: &mut impl Rng) -> Vec<Fly> {
    let normal_prefix = count as f64 * config::NORMAL_FLIES_FRACTION;
    (0..count)
        .map(|i| {
            let distribution = if normal_distribution || i as f64 <= normal_prefix {
                FlyDistribution::Normal
            } else {
                FlyDistribution::Restricted
            };
            Fly::sample(distribution, rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn restricted_flies_are_a_fixed_suffix() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let flies = generate_flies(100, false, &mut rng);
        assert_eq!(flies.len(), 100);

        // indices 0..=25 normal, the rest restricted
        for (i, fly) in flies.iter().enumerate() {
            let expected = if i <= 25 {
                FlyDistribution::Normal
            } else {
                FlyDistribution::Restricted
            };
            assert_eq!(fly.distribution, expected, "fly {i}");
            if expected == FlyDistribution::Restricted {
                assert!(fly.center.angle() >= config::RESTRICTED_FLY_MIN_ANGLE);
            }
        }
    }

    #[test]
    fn normal_flag_makes_every_fly_normal() {
        let mut rng = ChaCha8Rng::seed_from_u64(18);
        let flies = generate_flies(40, true, &mut rng);
        assert!(flies
            .iter()
            .all(|f| f.distribution == FlyDistribution::Normal));
    }

    #[test]
    fn flies_stay_on_the_canvas() {
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let half = config::CANVAS_SIZE * 0.5;
        for fly in generate_flies(500, false, &mut rng) {
            let c = fly.body.center();
            assert!(c.x.abs() <= half + 1e-6 && c.y.abs() <= half + 1e-6);
            assert!((fly.body.size - config::FLY_SIZE).abs() < 1e-12);
        }
    }
}

use ::rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config;
use crate::error::{EngineError, Result};
use crate::geometry::max_distance_for_angle;
use crate::web::Web;

/// The closed set of structural changes an offspring can undergo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    SkeletonAngle,
    SkeletonDistance,
    NetRegenerate,
    NetRescale,
    RingJitter,
    AddRing,
    RemoveRing,
}

impl MutationKind {
    pub const ALL: [MutationKind; 7] = [
        Self::SkeletonAngle,
        Self::SkeletonDistance,
        Self::NetRegenerate,
        Self::NetRescale,
        Self::RingJitter,
        Self::AddRing,
        Self::RemoveRing,
    ];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SkeletonAngle => "skeleton_angle",
            Self::SkeletonDistance => "skeleton_distance",
            Self::NetRegenerate => "net_regenerate",
            Self::NetRescale => "net_rescale",
            Self::RingJitter => "ring_jitter",
            Self::AddRing => "add_ring",
            Self::RemoveRing => "remove_ring",
        }
    }
}

/// Apply one uniformly chosen mutation.
pub fn mutate(web: &mut Web, rng: &mut impl Rng) -> Result<MutationKind> {
    let kind = MutationKind::random(rng);
    apply(web, kind, rng)?;
    Ok(kind)
}

/// Apply `kind`, then advance the generation and rescore.
///
/// On failure the web is left exactly as it was and the generation is not
/// advanced.
pub fn apply(web: &mut Web, kind: MutationKind, rng: &mut impl Rng) -> Result<()> {
    match kind {
        MutationKind::SkeletonAngle => skeleton_angle(web, rng)?,
        MutationKind::SkeletonDistance => skeleton_distance(web, rng)?,
        MutationKind::NetRegenerate => net_regenerate(web, rng),
        MutationKind::NetRescale => net_rescale(web, rng),
        MutationKind::RingJitter => ring_jitter(web, rng),
        MutationKind::AddRing => {
            let max_length = web.config().max_net_length;
            web.net.try_add_circle(&web.skeleton, max_length, rng);
        }
        MutationKind::RemoveRing => {
            if web.net.can_remove_circle() {
                let index = rng.gen_range(0..web.net.len());
                web.net.remove_circle(index);
            }
        }
    }

    web.generation += 1;
    web.last_mutation = Some(kind);
    web.calculate_efficiency();
    Ok(())
}

fn exhausted(what: &'static str) -> EngineError {
    debug!(what, attempts = config::MAX_MUTATION_ATTEMPTS, "mutation retries exhausted");
    EngineError::Construction {
        what,
        attempts: config::MAX_MUTATION_ATTEMPTS,
    }
}

/// Move one side's angle between its neighbours and carry the new angle into
/// every ring.
fn skeleton_angle(web: &mut Web, rng: &mut impl Rng) -> Result<()> {
    let sides = web.skeleton.sides();
    let min_angle = web.skeleton.min_angle();

    for _ in 0..config::MAX_MUTATION_ATTEMPTS {
        let side = rng.gen_range(0..sides);
        let (prev, next) = web.skeleton.neighbour_angles(side);
        let lower = prev + min_angle;
        let upper = next - min_angle;
        if lower > upper {
            continue;
        }

        let mut candidate = web.skeleton.clone();
        candidate.set_angle(side, rng.gen_range(lower..=upper));
        let angle = candidate.point(side).angle();
        // a first or last side may have wrapped across zero
        let first = candidate.first_side();
        candidate.rotate_left(first);
        if candidate.is_invalid() {
            continue;
        }

        web.skeleton = candidate;
        web.net.set_side_angle(side, angle);
        web.net.rotate_left(first);
        return Ok(());
    }
    Err(exhausted("skeleton angle mutation"))
}

/// Push one side in or out, staying outside the outermost ring and inside
/// the canvas.
fn skeleton_distance(web: &mut Web, rng: &mut impl Rng) -> Result<()> {
    let sides = web.skeleton.sides();

    for _ in 0..config::MAX_MUTATION_ATTEMPTS {
        let side = rng.gen_range(0..sides);
        let angle = web.skeleton.point(side).angle();
        let lower =
            web.net.outermost_distance(side).unwrap_or(0.0) + config::MIN_RING_CLEARANCE;
        let upper = max_distance_for_angle(angle);
        if lower > upper {
            continue;
        }

        let mut candidate = web.skeleton.clone();
        candidate.set_distance(side, rng.gen_range(lower..=upper));
        if candidate.is_invalid() {
            continue;
        }
        web.skeleton = candidate;
        return Ok(());
    }
    Err(exhausted("skeleton distance mutation"))
}

/// Redraw every ring's distance on one side. Sorted samples get `k`
/// clearances added so ring `k` stays a clearance outside ring `k - 1`.
fn net_regenerate(web: &mut Web, rng: &mut impl Rng) {
    let clearance = config::MIN_RING_CLEARANCE;
    let side = rng.gen_range(0..web.skeleton.sides());
    let rings = web.net.len();
    let max = web.skeleton.point(side).distance() - clearance;
    let hi = max - rings.saturating_sub(1) as f64 * clearance;
    if rings == 0 || hi < clearance {
        return;
    }

    let mut samples: Vec<f64> = (0..rings).map(|_| rng.gen_range(clearance..=hi)).collect();
    samples.sort_by(f64::total_cmp);
    let distances: Vec<f64> = samples
        .iter()
        .enumerate()
        .map(|(k, s)| s + k as f64 * clearance)
        .collect();
    web.net.set_side_distances(side, &distances);
}

/// Scale every ring's distance on one side by a single factor.
fn net_rescale(web: &mut Web, rng: &mut impl Rng) {
    let clearance = config::MIN_RING_CLEARANCE;
    let side = rng.gen_range(0..web.skeleton.sides());
    let current = web.net.side_distances(side);
    let (Some(&inner), Some(&outer)) = (current.first(), current.last()) else {
        return;
    };

    // smallest factor that keeps the innermost ring and every gap at a clearance
    let mut min_factor = config::MIN_RESCALE_FACTOR.max(clearance / inner);
    for pair in current.windows(2) {
        min_factor = min_factor.max(clearance / (pair[1] - pair[0]));
    }
    let max_factor = (web.skeleton.point(side).distance() - clearance) / outer;
    if min_factor > max_factor {
        return;
    }

    let factor = rng.gen_range(min_factor..=max_factor);
    let scaled: Vec<f64> = current.iter().map(|d| d * factor).collect();
    web.net.set_side_distances(side, &scaled);
}

/// Nudge one ring by at most a clearance on every side, between its
/// neighbours.
fn ring_jitter(web: &mut Web, rng: &mut impl Rng) {
    let clearance = config::MIN_RING_CLEARANCE;
    let spread = config::RING_JITTER * clearance;
    let rings = web.net.len();
    if rings == 0 {
        return;
    }
    let ring = rng.gen_range(0..rings);
    let circles = web.net.circles();

    let distances: Vec<f64> = (0..web.skeleton.sides())
        .map(|side| {
            let current = circles[ring].distance(side);
            let lower = clearance
                + if ring == 0 {
                    0.0
                } else {
                    circles[ring - 1].distance(side)
                };
            let upper = if ring + 1 == rings {
                web.skeleton.point(side).distance()
            } else {
                circles[ring + 1].distance(side)
            } - clearance;
            let lo = lower.max(current - spread);
            let hi = upper.min(current + spread);
            if lo > hi {
                current
            } else {
                rng.gen_range(lo..=hi)
            }
        })
        .collect();
    web.net.set_circle_distances(ring, &distances);
}

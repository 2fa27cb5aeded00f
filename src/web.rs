use std::cmp::Ordering;
use std::sync::Arc;

use ::rand::Rng;
use tracing::debug;

use crate::config::{self, WebConfig};
use crate::error::{EngineError, InvariantViolation, Result};
use crate::fitness::Fitness;
use crate::fly::{generate_flies, Fly};
use crate::mutation::MutationKind;
use crate::skeleton::Skeleton;
use crate::snapshot::WebSnapshot;
use crate::trapping_net::TrappingNet;

/// One candidate web: skeleton, trapping net and the flies it is judged on.
///
/// Geometry only changes through [`crate::mutation`] and
/// [`crate::reproduction`]; everything public here is read-only.
#[derive(Clone, Debug)]
pub struct Web {
    config: WebConfig,
    pub(crate) generation: u64,
    pub(crate) skeleton: Skeleton,
    pub(crate) net: TrappingNet,
    flies: Arc<Vec<Fly>>,
    caught: Vec<bool>,
    fitness: Fitness,
    efficiency: f64,
    pub(crate) last_mutation: Option<MutationKind>,
}

impl Web {
    /// Fresh random web: skeleton, minimum net, flies, scored.
    pub fn create(config: WebConfig, rng: &mut impl Rng) -> Result<Self> {
        config.validate()?;

        let mut last_err = None;
        for attempt in 1..=config::MAX_WEB_BUILD_ATTEMPTS {
            match Self::build(config, rng) {
                Ok(web) => return Ok(web),
                Err(err @ EngineError::Construction { .. }) => {
                    debug!(attempt, %err, "web construction failed, retrying");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap_or(EngineError::Construction {
            what: "web",
            attempts: config::MAX_WEB_BUILD_ATTEMPTS,
        }))
    }

    fn build(config: WebConfig, rng: &mut impl Rng) -> Result<Self> {
        let skeleton = Skeleton::generate(config.sides_count, config.min_angle_between_sides(), rng)?;
        let net = TrappingNet::grow_to_minimum(&skeleton, rng)?;
        let flies = generate_flies(config.flies_count, config.normal_flies_distribution, rng);
        Self::from_parts(config, skeleton, net, flies)
    }

    /// Assemble a web from existing geometry and score it. The configuration
    /// and the geometry are both checked; the flies are taken as given.
    pub fn from_parts(
        config: WebConfig,
        skeleton: Skeleton,
        net: TrappingNet,
        flies: Vec<Fly>,
    ) -> Result<Self> {
        config.validate()?;
        let mut web = Self {
            config,
            generation: 1,
            skeleton,
            net,
            caught: vec![false; flies.len()],
            flies: Arc::new(flies),
            fitness: Fitness::default(),
            efficiency: 0.0,
            last_mutation: None,
        };
        web.check_invariants()?;
        web.calculate_efficiency();
        Ok(web)
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn fitness(&self) -> Fitness {
        self.fitness
    }

    pub fn caught_count(&self) -> usize {
        self.fitness.caught
    }

    pub fn trapping_net_length(&self) -> f64 {
        self.net.length()
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn trapping_net(&self) -> &TrappingNet {
        &self.net
    }

    pub fn flies(&self) -> &[Fly] {
        &self.flies
    }

    /// Caught status per fly, same order as [`Web::flies`].
    pub fn caught_flags(&self) -> &[bool] {
        &self.caught
    }

    /// The mutation that produced this web, `None` for a fresh web or a
    /// parent that survived selection unchanged.
    pub fn last_mutation(&self) -> Option<MutationKind> {
        self.last_mutation
    }

    /// Re-run every fly against the current net and rescore.
    pub fn calculate_efficiency(&mut self) {
        self.caught.clear();
        self.caught
            .extend(self.flies.iter().map(|fly| self.net.try_to_catch(&fly.body)));
        self.fitness = Fitness {
            caught: self.caught.iter().filter(|c| **c).count(),
            net_length: self.net.length(),
        };
        self.efficiency = self.config.scoring.efficiency(&self.fitness);
    }

    /// Replace the prey with a freshly sampled population. Caller rescores.
    pub(crate) fn regenerate_flies(&mut self, rng: &mut impl Rng) {
        self.flies = Arc::new(generate_flies(
            self.config.flies_count,
            self.config.normal_flies_distribution,
            rng,
        ));
    }

    /// `Greater` when `self` is the better web under the configured policy.
    pub fn cmp_fitness(&self, other: &Web) -> Ordering {
        self.config.scoring.compare(&self.fitness, &other.fitness)
    }

    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        if self.skeleton.sides() != self.config.sides_count {
            return Err(InvariantViolation::PointCount {
                expected: self.config.sides_count,
                found: self.skeleton.sides(),
            });
        }
        self.skeleton.check()?;
        self.net.check(&self.skeleton)
    }

    pub fn snapshot(&self) -> WebSnapshot {
        WebSnapshot::capture(self)
    }

    pub fn status_line(&self) -> String {
        format!(
            "Generation: {}. Efficiency: {:.3}. Length: {:.0}.",
            self.generation,
            self.efficiency,
            self.trapping_net_length()
        )
    }
}

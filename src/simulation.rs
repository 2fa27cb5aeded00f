use ::rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{self, WebConfig};
use crate::error::{EngineError, Result};
use crate::mutation::MutationKind;
use crate::reproduction::{reproduce, select_best};
use crate::stats::LineageStats;
use crate::web::Web;

/// What one reproduce-and-select step settled on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepOutcome {
    pub generation: u64,
    pub efficiency: f64,
    pub caught: usize,
    pub net_length: f64,
    pub ring_count: usize,
    /// Mutation that produced the selected web, `None` when the parent survived.
    pub winner: Option<MutationKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub done: u64,
    pub total: u64,
    pub percent: u8,
}

/// Headless driver: owns the live web and the seeded random source, and
/// advances the lineage one generation at a time.
pub struct Simulation {
    web: Web,
    rng: ChaCha8Rng,
    seed: u64,
    steps: u64,
    stats: LineageStats,
    history_capacity: usize,
}

impl Simulation {
    pub fn new(config: WebConfig, seed: u64) -> Result<Self> {
        Self::with_history_capacity(config, seed, config::HISTORY_CAPACITY)
    }

    /// Like [`Simulation::new`], keeping the last `capacity` generations in
    /// the lineage history.
    pub fn with_history_capacity(config: WebConfig, seed: u64, capacity: usize) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let web = Web::create(config, &mut rng)?;
        info!(
            seed,
            sides = config.sides_count,
            flies = config.flies_count,
            scoring = config.scoring.label(),
            "created web"
        );
        Ok(Self {
            web,
            rng,
            seed,
            steps: 0,
            stats: LineageStats::new(capacity),
            history_capacity: capacity,
        })
    }

    /// Start over with a fresh random web under the same configuration.
    pub fn reset(&mut self) -> Result<()> {
        self.web = Web::create(*self.web.config(), &mut self.rng)?;
        self.steps = 0;
        self.stats = LineageStats::new(self.history_capacity);
        Ok(())
    }

    pub fn web(&self) -> &Web {
        &self.web
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn stats(&self) -> &LineageStats {
        &self.stats
    }

    pub fn status_line(&self) -> String {
        self.web.status_line()
    }

    /// Reproduce the current web and keep the best of the generation. Debug
    /// builds verify the winner and surface a broken one as
    /// [`EngineError::Invariant`] without adopting it.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let offspring = reproduce(&self.web, &mut self.rng)?;
        if let Some(best) = select_best(offspring) {
            if cfg!(debug_assertions) {
                best.check_invariants()?;
            }
            self.web = best;
        }

        let outcome = StepOutcome {
            generation: self.web.generation(),
            efficiency: self.web.efficiency(),
            caught: self.web.caught_count(),
            net_length: self.web.trapping_net_length(),
            ring_count: self.web.trapping_net().len(),
            winner: self.web.last_mutation(),
        };
        self.steps += 1;
        self.stats.record(&outcome);

        debug!(
            generation = outcome.generation,
            efficiency = outcome.efficiency,
            winner = outcome.winner.map(MutationKind::label),
            "step"
        );
        Ok(outcome)
    }

    /// Run `generations` steps. Progress is reported for batches of 50 or
    /// more, roughly a hundred times per batch. A step that cannot construct a
    /// valid offspring is skipped; too many in a row abort the batch.
    pub fn run(&mut self, generations: u64, mut on_progress: impl FnMut(Progress)) -> Result<()> {
        let progress_every = (generations / 100).saturating_sub(1).max(1);
        let mut consecutive_failures = 0;

        for i in 0..generations {
            match self.step() {
                Ok(_) => consecutive_failures = 0,
                Err(err @ EngineError::Construction { .. }) => {
                    consecutive_failures += 1;
                    self.stats.record_failure();
                    warn!(%err, consecutive_failures, "step skipped");
                    if consecutive_failures >= config::MAX_CONSECUTIVE_FAILURES {
                        return Err(err);
                    }
                }
                Err(err) => return Err(err),
            }

            if generations >= 50 && i % progress_every == 0 {
                on_progress(Progress {
                    done: i,
                    total: generations,
                    percent: (100 * i / generations) as u8,
                });
            }
        }

        info!(
            generation = self.web.generation(),
            efficiency = self.web.efficiency(),
            length = self.web.trapping_net_length(),
            "batch finished"
        );
        Ok(())
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::WebConfig;
use crate::fitness::Fitness;
use crate::simulation::Simulation;
use crate::stats::History;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl MetricSummary {
    /// Summarize samples given oldest first.
    pub fn of(samples: impl IntoIterator<Item = f64>) -> Self {
        let samples: Vec<f64> = samples.into_iter().collect();
        let (Some(&first), Some(&last)) = (samples.first(), samples.last()) else {
            return Self::default();
        };

        let mut sorted = samples;
        sorted.sort_by(f64::total_cmp);

        Self {
            count: sorted.len(),
            first,
            last,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            p50: nearest_rank(&sorted, 0.50),
            p90: nearest_rank(&sorted, 0.90),
            p95: nearest_rank(&sorted, 0.95),
            p99: nearest_rank(&sorted, 0.99),
        }
    }
}

impl History {
    pub fn summary(&self) -> MetricSummary {
        MetricSummary::of(self.iter())
    }
}

fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize).saturating_sub(1);
    sorted[rank.min(sorted.len() - 1)]
}

/// Summary of a batch run, written by the CLI as JSON. Metric summaries cover
/// the most recent generations still held in the lineage history; counters
/// cover the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub config: WebConfig,
    pub steps: u64,
    pub failed_steps: u64,
    pub final_generation: u64,
    pub final_efficiency: f64,
    pub final_fitness: Fitness,
    pub final_ring_count: usize,
    pub status: String,
    pub efficiency: MetricSummary,
    pub caught: MetricSummary,
    pub net_length: MetricSummary,
    pub ring_count: MetricSummary,
    pub parent_kept: u64,
    pub mutation_wins: BTreeMap<String, u64>,
}

impl RunReport {
    pub fn from_simulation(sim: &Simulation) -> Self {
        let web = sim.web();
        let stats = sim.stats();
        Self {
            seed: sim.seed(),
            config: *web.config(),
            steps: sim.steps(),
            failed_steps: stats.failed_steps,
            final_generation: web.generation(),
            final_efficiency: web.efficiency(),
            final_fitness: web.fitness(),
            final_ring_count: web.trapping_net().len(),
            status: web.status_line(),
            efficiency: stats.efficiency.summary(),
            caught: stats.caught.summary(),
            net_length: stats.net_length.summary(),
            ring_count: stats.ring_count.summary(),
            parent_kept: stats.parent_kept,
            mutation_wins: stats
                .mutation_wins
                .iter()
                .map(|(kind, count)| (kind.label().to_string(), *count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_keeps_run_order_and_ranks() {
        // a lineage that climbs from 1 to 10 catches, two steps per level
        let summary = MetricSummary::of((1..=10).flat_map(|c| [c as f64, c as f64]));
        assert_eq!(summary.count, 20);
        assert_eq!((summary.first, summary.last), (1.0, 10.0));
        assert_eq!((summary.min, summary.max), (1.0, 10.0));
        assert!((summary.mean - 5.5).abs() < 1e-12);
        assert_eq!(summary.p50, 5.0);
        assert_eq!(summary.p90, 9.0);
        assert_eq!(summary.p95, 10.0);
        assert_eq!(summary.p99, 10.0);
    }

    #[test]
    fn empty_history_summarizes_to_zeroes() {
        let history = History::with_capacity(4);
        assert!(history.is_empty());
        assert_eq!(history.summary(), MetricSummary::default());
    }

    #[test]
    fn report_reads_the_lineage_history() {
        let config = WebConfig::builder()
            .sides_count(10)
            .flies_count(50)
            .build()
            .unwrap();
        let mut sim = Simulation::with_history_capacity(config, 12, 8).unwrap();
        sim.run(20, |_| {}).unwrap();

        let report = RunReport::from_simulation(&sim);
        assert_eq!(report.steps + report.failed_steps, 20);
        // summaries only see the retained window
        assert_eq!(report.efficiency.count, 8);
        assert_eq!(report.caught.count, 8);
        assert_eq!(report.ring_count.last, report.final_ring_count as f64);
        assert_eq!(report.efficiency.last, report.final_efficiency);
        assert_eq!(report.caught.last, report.final_fitness.caught as f64);
    }
}

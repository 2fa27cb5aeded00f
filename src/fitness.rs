use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// The two raw signals a web is judged by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Fitness {
    pub caught: usize,
    pub net_length: f64,
}

impl Fitness {
    fn inverse_length(&self) -> f64 {
        if self.net_length > 0.0 {
            1.0 / self.net_length
        } else {
            0.0
        }
    }
}

/// How fitness is turned into an efficiency score and how webs are ranked.
/// Every policy breaks ties in favour of the shorter net.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Most flies caught wins, then least silk. Efficiency is reported as
    /// `caught + 1/length` but never used for ranking.
    #[default]
    CatchesThenMaterial,
    /// Rank by the scalar `caught + 1/length`.
    Blended,
    /// Flies caught per 1000 units of silk.
    CatchRate,
}

impl ScoringPolicy {
    pub fn efficiency(&self, f: &Fitness) -> f64 {
        match self {
            Self::CatchesThenMaterial | Self::Blended => f.caught as f64 + f.inverse_length(),
            Self::CatchRate => f.caught as f64 * 1000.0 * f.inverse_length(),
        }
    }

    /// `Greater` means `a` is the better web.
    pub fn compare(&self, a: &Fitness, b: &Fitness) -> Ordering {
        let primary = match self {
            Self::CatchesThenMaterial => a.caught.cmp(&b.caught),
            Self::Blended | Self::CatchRate => self.efficiency(a).total_cmp(&self.efficiency(b)),
        };
        primary.then_with(|| b.net_length.total_cmp(&a.net_length))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CatchesThenMaterial => "catches_then_material",
            Self::Blended => "blended",
            Self::CatchRate => "catch_rate",
        }
    }

    pub fn parse_cli(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "catches" | "catches-then-material" | "catches_then_material" => {
                Some(Self::CatchesThenMaterial)
            }
            "blended" => Some(Self::Blended),
            "rate" | "catch-rate" | "catch_rate" => Some(Self::CatchRate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(caught: usize, net_length: f64) -> Fitness {
        Fitness { caught, net_length }
    }

    const POLICIES: [ScoringPolicy; 3] = [
        ScoringPolicy::CatchesThenMaterial,
        ScoringPolicy::Blended,
        ScoringPolicy::CatchRate,
    ];

    #[test]
    fn ties_break_toward_shorter_net() {
        for policy in POLICIES {
            assert_eq!(
                policy.compare(&f(5, 900.0), &f(5, 1200.0)),
                Ordering::Greater,
                "{}",
                policy.label()
            );
            assert_eq!(policy.compare(&f(5, 900.0), &f(5, 900.0)), Ordering::Equal);
        }
    }

    #[test]
    fn catches_dominate_material_under_default_policy() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.compare(&f(6, 20_000.0), &f(5, 1.0)), Ordering::Greater);
    }

    #[test]
    fn ordering_is_transitive() {
        let samples = [
            f(0, 500.0),
            f(3, 800.0),
            f(3, 700.0),
            f(4, 2000.0),
            f(4, 2000.0),
            f(10, 9000.0),
            f(1, 100.0),
        ];
        for policy in POLICIES {
            for a in &samples {
                for b in &samples {
                    for c in &samples {
                        let ab = policy.compare(a, b);
                        let bc = policy.compare(b, c);
                        if ab != Ordering::Less && bc != Ordering::Less {
                            assert_ne!(policy.compare(a, c), Ordering::Less);
                        }
                    }
                    assert_eq!(policy.compare(a, b), policy.compare(b, a).reverse());
                }
            }
        }
    }

    #[test]
    fn catch_rate_rewards_frugal_webs() {
        let policy = ScoringPolicy::CatchRate;
        assert_eq!(policy.compare(&f(4, 1000.0), &f(6, 3000.0)), Ordering::Greater);
        assert!((policy.efficiency(&f(4, 1000.0)) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn parses_cli_names() {
        assert_eq!(ScoringPolicy::parse_cli("Blended"), Some(ScoringPolicy::Blended));
        assert_eq!(ScoringPolicy::parse_cli("rate"), Some(ScoringPolicy::CatchRate));
        assert_eq!(ScoringPolicy::parse_cli("nope"), None);
    }
}

// All tunable simulation constants in one place.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fitness::ScoringPolicy;

// Canvas
pub const CANVAS_SIZE: f64 = 800.0;

// Skeleton
pub const MIN_SIDES: usize = 10;
pub const MAX_SIDES: usize = 20;
pub const MIN_SKELETON_DISTANCE: f64 = CANVAS_SIZE / 5.0;

// Trapping net
pub const MIN_RING_COUNT: usize = 2;
pub const MIN_RING_CLEARANCE: f64 = 10.0; // CANVAS_SIZE / 75, floored
pub const RING_DISPERSION: f64 = 8.0;
pub const RING_JITTER: f64 = 1.0;
pub const MIN_RESCALE_FACTOR: f64 = 0.5;
pub const MIN_MAX_NET_LENGTH: f64 = 1_000.0;
pub const MAX_MAX_NET_LENGTH: f64 = 25_000.0;

// Flies
pub const FLY_SIZE: f64 = CANVAS_SIZE / 50.0;
pub const MIN_FLIES: usize = 10;
pub const MAX_FLIES: usize = 1000;
pub const NORMAL_FLIES_FRACTION: f64 = 0.25;
pub const RESTRICTED_FLY_MIN_ANGLE: f64 = 1.5 * std::f64::consts::PI;

// Reproduction
pub const CHILDREN_COUNT: usize = 3;
pub const MAX_CHILDREN: usize = 16;

// Retry caps
pub const MAX_POINT_ATTEMPTS: u32 = 1_000;
pub const MAX_SKELETON_ATTEMPTS: u32 = 10_000;
pub const MAX_MUTATION_ATTEMPTS: u32 = 1_000;
pub const MAX_WEB_BUILD_ATTEMPTS: u32 = 16;
pub const MAX_CONSECUTIVE_FAILURES: u32 = 8;

// Generations kept in the lineage history.
pub const HISTORY_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid web sides count: {0} (should be in range [{min}, {max}])", min = MIN_SIDES, max = MAX_SIDES)]
    SidesCount(usize),
    #[error("flies count should be in range [{min}, {max}], got {0}", min = MIN_FLIES, max = MAX_FLIES)]
    FliesCount(usize),
    #[error(
        "invalid max trapping net length: {0} (should be in range [{min}, {max}])",
        min = MIN_MAX_NET_LENGTH,
        max = MAX_MAX_NET_LENGTH
    )]
    MaxNetLength(f64),
    #[error("children count should be in range [1, {max}], got {0}", max = MAX_CHILDREN)]
    ChildrenCount(usize),
}

/// Parameters a web is built and evolved with. Construct through
/// [`WebConfig::builder`] or deserialize and call [`WebConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub sides_count: usize,
    pub flies_count: usize,
    pub max_net_length: f64,
    pub normal_flies_distribution: bool,
    pub dynamic_flies: bool,
    pub children_count: usize,
    pub scoring: ScoringPolicy,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            sides_count: 15,
            flies_count: 200,
            max_net_length: 1_500.0,
            normal_flies_distribution: true,
            dynamic_flies: false,
            children_count: CHILDREN_COUNT,
            scoring: ScoringPolicy::default(),
        }
    }
}

impl WebConfig {
    pub fn builder() -> WebConfigBuilder {
        WebConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIDES..=MAX_SIDES).contains(&self.sides_count) {
            return Err(ConfigError::SidesCount(self.sides_count));
        }
        if !(MIN_FLIES..=MAX_FLIES).contains(&self.flies_count) {
            return Err(ConfigError::FliesCount(self.flies_count));
        }
        if !(MIN_MAX_NET_LENGTH..=MAX_MAX_NET_LENGTH).contains(&self.max_net_length) {
            return Err(ConfigError::MaxNetLength(self.max_net_length));
        }
        if !(1..=MAX_CHILDREN).contains(&self.children_count) {
            return Err(ConfigError::ChildrenCount(self.children_count));
        }
        Ok(())
    }

    /// Minimum angle kept between two neighbouring skeleton lines.
    pub fn min_angle_between_sides(&self) -> f64 {
        std::f64::consts::PI / (5.0 * self.sides_count as f64)
    }
}

#[derive(Debug, Clone)]
pub struct WebConfigBuilder {
    config: WebConfig,
}

impl WebConfigBuilder {
    pub fn sides_count(mut self, value: usize) -> Self {
        self.config.sides_count = value;
        self
    }

    pub fn flies_count(mut self, value: usize) -> Self {
        self.config.flies_count = value;
        self
    }

    pub fn max_net_length(mut self, value: f64) -> Self {
        self.config.max_net_length = value;
        self
    }

    pub fn normal_flies_distribution(mut self, value: bool) -> Self {
        self.config.normal_flies_distribution = value;
        self
    }

    pub fn dynamic_flies(mut self, value: bool) -> Self {
        self.config.dynamic_flies = value;
        self
    }

    pub fn children_count(mut self, value: usize) -> Self {
        self.config.children_count = value;
        self
    }

    pub fn scoring(mut self, value: ScoringPolicy) -> Self {
        self.config.scoring = value;
        self
    }

    pub fn build(self) -> Result<WebConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(WebConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected_not_clamped() {
        assert_eq!(
            WebConfig::builder().sides_count(9).build(),
            Err(ConfigError::SidesCount(9))
        );
        assert_eq!(
            WebConfig::builder().sides_count(21).build(),
            Err(ConfigError::SidesCount(21))
        );
        assert_eq!(
            WebConfig::builder().flies_count(1001).build(),
            Err(ConfigError::FliesCount(1001))
        );
        assert_eq!(
            WebConfig::builder().max_net_length(999.0).build(),
            Err(ConfigError::MaxNetLength(999.0))
        );
        assert_eq!(
            WebConfig::builder().children_count(0).build(),
            Err(ConfigError::ChildrenCount(0))
        );
    }

    #[test]
    fn builder_keeps_boundary_values() {
        let config = WebConfig::builder()
            .sides_count(MAX_SIDES)
            .flies_count(MIN_FLIES)
            .max_net_length(MAX_MAX_NET_LENGTH)
            .build()
            .unwrap();
        assert_eq!(config.sides_count, MAX_SIDES);
        assert_eq!(config.flies_count, MIN_FLIES);
        assert_eq!(config.max_net_length, MAX_MAX_NET_LENGTH);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: WebConfig = serde_json::from_str(r#"{ "sides_count": 12 }"#).unwrap();
        assert_eq!(config.sides_count, 12);
        assert_eq!(config.flies_count, WebConfig::default().flies_count);
        assert!(config.validate().is_ok());
    }
}

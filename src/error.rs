use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rejection sampling ran out of attempts. Retrying with fresh randomness
    /// (or a fresh parent) is expected to succeed.
    #[error("could not construct a valid {what} after {attempts} attempts")]
    Construction { what: &'static str, attempts: u32 },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// A geometric contract that construction and mutation are supposed to
/// uphold was found broken.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("expected {expected} points, found {found}")]
    PointCount { expected: usize, found: usize },
    #[error("skeleton points are not sorted by angle at side {side}")]
    Unsorted { side: usize },
    #[error("skeleton does not contain the center with its safety margin")]
    CenterOutside,
    #[error("skeleton sides {side} and its successor are closer than the minimum angle")]
    SidesTooClose { side: usize },
    #[error("ring {ring} has angle {found} at side {side}, skeleton has {expected}")]
    AngleMismatch {
        ring: usize,
        side: usize,
        expected: f64,
        found: f64,
    },
    #[error("ring {ring} at side {side} is {distance}, needs at least {min}")]
    RingTooClose {
        ring: usize,
        side: usize,
        distance: f64,
        min: f64,
    },
    #[error("ring {ring} at side {side} is {distance}, skeleton allows at most {max}")]
    RingOutsideSkeleton {
        ring: usize,
        side: usize,
        distance: f64,
        max: f64,
    },
    #[error("trapping net has {found} rings, minimum is {min}")]
    TooFewRings { found: usize, min: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;

use thiserror::Error;

/// Invalid input reaching the easing math or the cycle timer.
///
/// The controls clamp every value before it is published, so seeing one of
/// these at runtime means a boundary guard is missing.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("power must be a finite value above zero, got {0}")]
    NonPositivePower(f64),
    #[error("elasticity must be a finite value of at least zero, got {0}")]
    NegativeElasticity(f64),
    #[error("cycle duration must be longer than zero")]
    NonPositiveDuration,
}

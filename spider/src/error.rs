use thiserror::Error;

/// Reasons a body plan cannot drive a creature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("body plan has no legs")]
    NoLegs,
    #[error("leg {leg} has no segments")]
    EmptyLeg { leg: usize },
    #[error("leg {leg} segment {segment} has invalid length {length}")]
    InvalidSegmentLength { leg: usize, segment: usize, length: f64 },
    #[error("leg {leg} segment {segment} has a zero or non-finite initial direction")]
    InvalidDirection { leg: usize, segment: usize },
    #[error("leg {leg} has a non-finite attachment or rest position")]
    NonFinitePosition { leg: usize },
    #[error("body plan scale must be finite and positive, got {0}")]
    InvalidScale(f64),
}

use thiserror::Error;

/// Errors raised by simulation lifecycle components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    /// The requested simulation index does not exist in the set.
    #[error("simulation index {index} is out of range (set has {count} simulations)")]
    SimulationOutOfRange { index: usize, count: usize },
}

//! Recorder error types

use crate::geometry::Topology;
use thiserror::Error;

/// Errors surfaced by canvas operations
///
/// Every failing call is side-effect free: state, stacks, caches and the
/// recorded output are left exactly as they were.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// Pop on an empty state/matrix/scissor stack
    #[error("pop on empty {0} stack")]
    EmptyStack(&'static str),

    /// Point count below the topology's minimum
    #[error("{topology:?} needs at least {min} points, got {got}")]
    InvalidGeometry {
        topology: Topology,
        min: usize,
        got: usize,
    },
}

/// Result type for canvas operations
pub type Result<T> = std::result::Result<T, CanvasError>;

use std::fmt;

/// raised synchronously at the public entry points; never returned from
/// inside a DP once the input has been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// `budget < 2`; a single sensor can never disambiguate a source.
    InvalidBudget { budget: usize },
    /// the adjacency list is not connected, has the wrong edge count, or
    /// contains a self-loop / parallel edge.
    NotATree,
    /// `n == 0`.
    EmptyGraph,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBudget { budget } => {
                write!(f, "sensor budget {budget} is invalid, must be >= 2")
            }
            Self::NotATree => write!(f, "input graph is not a tree"),
            Self::EmptyGraph => write!(f, "input graph has no nodes"),
        }
    }
}

impl std::error::Error for PlacementError {}

pub type Result<T> = std::result::Result<T, PlacementError>;

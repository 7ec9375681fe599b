use crate::path::Cell;
use std::fmt;

/// Why a drawn path was rejected before the match could start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Fewer than two cells; there is no walk to make.
    TooShort,
    /// A cell lies outside the placement grid.
    OutOfBounds { cell: Cell },
    /// Consecutive cells are not exactly one orthogonal step apart.
    Discontiguous { index: usize },
    /// A marked cell is not reachable from the start of the walk.
    Disconnected { cell: Cell },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::TooShort => write!(f, "path needs at least two cells"),
            PathError::OutOfBounds { cell } => {
                write!(f, "path cell ({}, {}) is outside the grid", cell.x, cell.y)
            }
            PathError::Discontiguous { index } => {
                write!(f, "path breaks between cells {} and {}", index, index + 1)
            }
            PathError::Disconnected { cell } => write!(
                f,
                "marked cell ({}, {}) is not connected to the path start",
                cell.x, cell.y
            ),
        }
    }
}

impl std::error::Error for PathError {}

/// Error when constructing a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewGameError {
    /// The configured path failed validation; the simulation refuses to start.
    InvalidPath(PathError),
}

impl fmt::Display for NewGameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewGameError::InvalidPath(e) => write!(f, "invalid path: {}", e),
        }
    }
}

impl std::error::Error for NewGameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NewGameError::InvalidPath(e) => Some(e),
        }
    }
}

impl From<PathError> for NewGameError {
    fn from(e: PathError) -> Self {
        NewGameError::InvalidPath(e)
    }
}

/// Error when spending skill points on a meta upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    /// The skill is already at its maximum level.
    MaxLevel,
    /// Not enough banked points.
    NotEnoughPoints { cost: u32, have: u32 },
}

impl fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseError::MaxLevel => write!(f, "skill is already at maximum level"),
            PurchaseError::NotEnoughPoints { cost, have } => {
                write!(f, "need {} skill points, have {}", cost, have)
            }
        }
    }
}

impl std::error::Error for PurchaseError {}

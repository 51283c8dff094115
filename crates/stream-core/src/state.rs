use std::fmt;

/// How far the cache of a stream has grown.
///
/// `Empty -> PartiallyFilled -> FullyFilled | CeilingReached`. The last two
/// are terminal: the cache never grows past them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierState {
    Empty,
    PartiallyFilled,
    /// The whole collection is cached.
    FullyFilled,
    /// The cache holds every record the server lets a client reach.
    CeilingReached,
}

impl FrontierState {
    pub fn classify(cached: usize, count: Option<usize>, ceiling: usize) -> Self {
        if count == Some(cached) {
            FrontierState::FullyFilled
        } else if cached >= ceiling {
            FrontierState::CeilingReached
        } else if cached == 0 {
            FrontierState::Empty
        } else {
            FrontierState::PartiallyFilled
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FrontierState::FullyFilled | FrontierState::CeilingReached
        )
    }
}

impl fmt::Display for FrontierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontierState::Empty => write!(f, "empty"),
            FrontierState::PartiallyFilled => write!(f, "partially filled"),
            FrontierState::FullyFilled => write!(f, "fully filled"),
            FrontierState::CeilingReached => write!(f, "ceiling reached"),
        }
    }
}

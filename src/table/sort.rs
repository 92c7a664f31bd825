use crate::query::{Direction, TableParams};

/// The single active sort of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub column: String,
    pub direction: Direction,
}

impl SortDescriptor {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        SortDescriptor {
            column: column.into(),
            direction,
        }
    }

    /// Reads the committed sort back out of the filters echo.
    pub fn from_filters(filters: &TableParams) -> Option<Self> {
        let column = filters.sort.as_deref().filter(|s| !s.is_empty())?;
        Some(Self::new(
            column,
            Direction::parse_lenient(filters.direction.as_deref()),
        ))
    }
}

/// Sort that results from clicking `clicked` while `current` is active: the same
/// column flips direction, a different column replaces the sort and starts ascending.
pub fn next_sort(current: Option<&SortDescriptor>, clicked: &str) -> SortDescriptor {
    match current {
        Some(current) if current.column == clicked => {
            SortDescriptor::new(clicked, current.direction.toggled())
        }
        _ => SortDescriptor::new(clicked, Direction::Asc),
    }
}

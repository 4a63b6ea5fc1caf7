use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    pub fn other(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }

    /// (row, column) offset between two consecutive letters of a word
    fn step(self) -> (i32, i32) {
        match self {
            Direction::Across => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

/// A cell of the unbounded grid, rows grow downward and columns rightward.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { row: 0, column: 0 };

    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Moves `distance` cells along `direction` (negative goes backward).
    pub fn along(self, direction: Direction, distance: i32) -> Self {
        let (dr, dc) = direction.step();
        Self::new(self.row + dr * distance, self.column + dc * distance)
    }

    /// Moves `distance` cells perpendicular to `direction`.
    pub fn across(self, direction: Direction, distance: i32) -> Self {
        self.along(direction.other(), distance)
    }

    /// Packs both coordinates into a single key, 16 bits each.
    ///
    /// Unique as long as both coordinates stay within the `i16` range, which
    /// placement search never leaves in practice.
    #[inline(always)]
    pub(crate) fn key(self) -> u32 {
        ((self.row as i16 as u16 as u32) << 16) | (self.column as i16 as u16 as u32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Start cell and direction of a word, without the word itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionOrientation {
    pub start: Position,
    pub direction: Direction,
}

impl PositionOrientation {
    pub fn new(row: i32, column: i32, direction: Direction) -> Self {
        Self {
            start: Position::new(row, column),
            direction,
        }
    }

    pub fn across(row: i32, column: i32) -> Self {
        Self::new(row, column, Direction::Across)
    }

    pub fn down(row: i32, column: i32) -> Self {
        Self::new(row, column, Direction::Down)
    }

    pub fn is_vertical(&self) -> bool {
        self.direction == Direction::Down
    }

    /// Last cell of a word of `length` letters placed here.
    pub fn end(&self, length: usize) -> Position {
        self.start.along(self.direction, length as i32 - 1)
    }

    /// Checks if a cell is covered by a word of `length` letters placed here
    pub fn contains(&self, length: usize, cell: Position) -> bool {
        self.offset_of(length, cell).is_some()
    }

    /// Index of `cell` within a word of `length` letters placed here.
    pub fn offset_of(&self, length: usize, cell: Position) -> Option<usize> {
        let (fixed, cell_fixed, first, cell_moving) = match self.direction {
            Direction::Across => (self.start.row, cell.row, self.start.column, cell.column),
            Direction::Down => (self.start.column, cell.column, self.start.row, cell.row),
        };
        if fixed != cell_fixed || cell_moving < first {
            return None;
        }
        let offset = (cell_moving - first) as usize;
        (offset < length).then_some(offset)
    }

    /// Iterates over the cells of a word of `length` letters placed here
    pub fn cells(self, length: usize) -> CellIterator {
        CellIterator::new(self, length)
    }
}

impl fmt::Display for PositionOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = match self.direction {
            Direction::Across => 'H',
            Direction::Down => 'V',
        };
        write!(f, "{}{}", d, self.start)
    }
}

pub struct CellIterator {
    placement: PositionOrientation,
    length: usize,
    current: usize,
}

impl CellIterator {
    fn new(placement: PositionOrientation, length: usize) -> Self {
        Self {
            placement,
            length,
            current: 0,
        }
    }
}

impl Iterator for CellIterator {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.length {
            return None;
        }
        let next = self
            .placement
            .start
            .along(self.placement.direction, self.current as i32);
        self.current += 1;
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellIterator {}

/// Inclusive rectangle of cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundingRectangle {
    pub min: Position,
    pub max: Position,
}

impl Default for BoundingRectangle {
    /// The single cell (0, 0), which every layout's bounds include.
    fn default() -> Self {
        Self {
            min: Position::ORIGIN,
            max: Position::ORIGIN,
        }
    }
}

impl BoundingRectangle {
    pub fn new(min_row: i32, max_row: i32, min_column: i32, max_column: i32) -> Self {
        Self {
            min: Position::new(min_row, min_column),
            max: Position::new(max_row, max_column),
        }
    }

    pub fn width(&self) -> i32 {
        self.max.column - self.min.column + 1
    }

    pub fn height(&self) -> i32 {
        self.max.row - self.min.row + 1
    }

    pub fn contains(&self, cell: Position) -> bool {
        (self.min.row..=self.max.row).contains(&cell.row)
            && (self.min.column..=self.max.column).contains(&cell.column)
    }

    /// Smallest rectangle holding both `self` and a word of `length` letters
    /// placed at `placement`.
    pub fn extend(&self, placement: PositionOrientation, length: usize) -> Self {
        let start = placement.start;
        let end = placement.end(length);
        Self::new(
            self.min.row.min(start.row),
            self.max.row.max(end.row),
            self.min.column.min(start.column),
            self.max.column.max(end.column),
        )
    }

    pub fn adjusted_surface(&self) -> i64 {
        adjusted_surface(self.width(), self.height())
    }
}

/// Surface of a `width` x `height` rectangle, multiplied by the squared
/// difference of its sides so that elongated shapes score worse.
pub fn adjusted_surface(width: i32, height: i32) -> i64 {
    let (w, h) = (width as i64, height as i64);
    w * h * (w - h) * (w - h)
}

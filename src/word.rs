use std::{fmt, sync::Arc};

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use ustr::Ustr;

use crate::position::{Direction, Position, PositionOrientation};

/// Joins the parts of a multi-token word so it stays one run of cells.
pub const SEPARATOR: char = '·';

/// Shortest canonical word accepted in a layout.
pub const MIN_WORD_LENGTH: usize = 3;

/// Stable handle of a word placed in a [`Layout`](crate::Layout).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordId(pub(crate) usize);

impl WordId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The text of a word, in canonical and original form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    canonical: Ustr,
    original: Ustr,
    letters: Arc<[char]>,
}

impl Word {
    pub fn new(original: &str) -> Self {
        let canonical = canonize(original);
        let letters = canonical.chars().collect();
        Self {
            canonical: Ustr::from(canonical.as_str()),
            original: Ustr::from(original),
            letters,
        }
    }

    /// Uppercase form with spaces replaced by [`SEPARATOR`], e.g. `NON·SEQUITUR`.
    pub fn canonical(&self) -> Ustr {
        self.canonical
    }

    /// Text as it was given, e.g. `Non sequitur`.
    pub fn original(&self) -> Ustr {
        self.original
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Key used to detect duplicates regardless of case and accents.
    pub fn duplicate_key(&self) -> String {
        fold_diacritics(self.canonical.as_str())
    }
}

/// A word together with where it sits on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordPosition {
    word: Word,
    placement: PositionOrientation,
}

impl WordPosition {
    pub fn new(word: Word, placement: PositionOrientation) -> Self {
        Self { word, placement }
    }

    pub fn word(&self) -> &Word {
        &self.word
    }

    pub fn canonical(&self) -> Ustr {
        self.word.canonical
    }

    pub fn original(&self) -> Ustr {
        self.word.original
    }

    pub fn letters(&self) -> &[char] {
        self.word.letters()
    }

    pub fn len(&self) -> usize {
        self.word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    pub fn placement(&self) -> PositionOrientation {
        self.placement
    }

    pub fn start(&self) -> Position {
        self.placement.start
    }

    pub fn end(&self) -> Position {
        self.placement.end(self.len())
    }

    pub fn direction(&self) -> Direction {
        self.placement.direction
    }

    pub fn is_vertical(&self) -> bool {
        self.placement.is_vertical()
    }

    /// Only the layout may move a placed word, so that its squares follow.
    pub(crate) fn set_placement(&mut self, placement: PositionOrientation) {
        self.placement = placement;
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> {
        self.placement.cells(self.len())
    }

    pub fn contains(&self, cell: Position) -> bool {
        self.placement.contains(self.len(), cell)
    }

    pub fn letter_at(&self, cell: Position) -> Option<char> {
        self.placement
            .offset_of(self.len(), cell)
            .map(|i| self.letters()[i])
    }

    /// Checks if this word shares at least one cell with `other`, letters
    /// are not compared.
    pub fn intersects(&self, other: &WordPosition) -> bool {
        let (a_start, a_end) = (self.start(), self.end());
        let (b_start, b_end) = (other.start(), other.end());
        match (self.direction(), other.direction()) {
            (Direction::Down, Direction::Down) => {
                a_start.column == b_start.column
                    && a_start.row <= b_end.row
                    && b_start.row <= a_end.row
            }
            (Direction::Across, Direction::Across) => {
                a_start.row == b_start.row
                    && a_start.column <= b_end.column
                    && b_start.column <= a_end.column
            }
            (Direction::Across, Direction::Down) => {
                (a_start.column..=a_end.column).contains(&b_start.column)
                    && (b_start.row..=b_end.row).contains(&a_start.row)
            }
            (Direction::Down, Direction::Across) => other.intersects(self),
        }
    }
}

impl fmt::Display for WordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' {}", self.word.canonical, self.placement)
    }
}

/// Canonical form of a word: composed (NFC), trimmed, uppercase, and every
/// run of inner whitespace replaced by a single [`SEPARATOR`].
pub fn canonize(word: &str) -> String {
    let composed: String = word.nfc().collect();
    let mut canonical = String::with_capacity(composed.len());
    for (i, part) in composed.split_whitespace().enumerate() {
        if i > 0 {
            canonical.push(SEPARATOR);
        }
        canonical.extend(part.chars().flat_map(char::to_uppercase));
    }
    canonical
}

/// Strips accents from an uppercase word: decomposes it, drops combining
/// marks, and spells out the letters that have no decomposition.
pub fn fold_diacritics(canonical: &str) -> String {
    let mut folded = String::with_capacity(canonical.len());
    for c in canonical.nfd().filter(|&c| !is_combining_mark(c)) {
        match c {
            'Æ' => folded.push_str("AE"),
            'Œ' => folded.push_str("OE"),
            'Ø' => folded.push('O'),
            'Đ' => folded.push('D'),
            'Ł' => folded.push('L'),
            'Ħ' => folded.push('H'),
            'Ŧ' => folded.push('T'),
            _ => folded.push(c),
        }
    }
    folded
}

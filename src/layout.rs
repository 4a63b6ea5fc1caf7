use std::{collections::HashMap, fmt};

use log::trace;
use tinyset::SetUsize;
use vec_map::VecMap;

use crate::{
    error::LayoutError,
    position::{BoundingRectangle, Position, PositionOrientation},
    word::{WordId, WordPosition},
};

/// Result of checking where a word may go.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlaceWordStatus {
    /// Only crossings with perpendicular words, nothing adjacent.
    Valid,
    /// No conflicting overlap, but a neighboring cell is occupied and could be
    /// read as an unintended word.
    TooClose,
    /// Different letter in an occupied cell, or overlap with a parallel word.
    Invalid,
}

/// A letter on the grid, shared by `share_count` placed words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Square {
    pub position: Position,
    pub letter: char,
    pub share_count: u32,
}

/// Placed words and the squares they cover. Does not decide placement.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    words: VecMap<WordPosition>,
    squares: HashMap<u32, Square>, // derived from `words`, keyed by Position::key
    next_id: usize,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, id: WordId) -> Option<&WordPosition> {
        self.words.get(id.0)
    }

    /// Placed words in insertion order.
    pub fn words(&self) -> impl Iterator<Item = (WordId, &'_ WordPosition)> {
        self.words.iter().map(|(index, w)| (WordId(index), w))
    }

    pub fn square(&self, cell: Position) -> Option<&Square> {
        self.squares.get(&cell.key())
    }

    pub fn squares(&self) -> impl Iterator<Item = &'_ Square> {
        self.squares.values()
    }

    pub fn find(&self, canonical: &str) -> Option<WordId> {
        self.words()
            .find(|(_, w)| w.canonical().as_str() == canonical)
            .map(|(id, _)| id)
    }

    /// Refuses a word already placed, ignoring case and accents. Otherwise
    /// checks the placement and adds the word unless it is
    /// [`PlaceWordStatus::Invalid`]. `TooClose` placements are accepted.
    ///
    /// The returned id is `Some` exactly when the word was added.
    pub fn add_word(
        &mut self,
        word: WordPosition,
    ) -> Result<(PlaceWordStatus, Option<WordId>), LayoutError> {
        let key = word.word().duplicate_key();
        if self.words.values().any(|w| w.word().duplicate_key() == key) {
            return Err(LayoutError::AlreadyPlaced(word.canonical().to_string()));
        }

        let status = self.can_place_word(&word, true);
        if status == PlaceWordStatus::Invalid {
            return Ok((status, None));
        }
        Ok((status, Some(self.add_word_unchecked(word))))
    }

    /// Adds a word whose placement was already checked.
    pub fn add_word_unchecked(&mut self, word: WordPosition) -> WordId {
        let id = WordId(self.next_id);
        self.next_id += 1;
        trace!("adding {} as {}", word, id);

        Self::share_squares(&mut self.squares, &word, true);
        self.words.insert(id.0, word);
        id
    }

    pub fn remove_word(&mut self, id: WordId) -> Result<WordPosition, LayoutError> {
        let word = self.words.remove(id.0).ok_or(LayoutError::NotFound(id))?;
        trace!("removing {} ({})", word, id);

        Self::share_squares(&mut self.squares, &word, false);
        Ok(word)
    }

    /// Moves a placed word, keeping its id. The new placement is checked the
    /// way a manual edit is, so `TooClose` is accepted; on `Invalid` the
    /// word stays where it was.
    pub fn move_word(
        &mut self,
        id: WordId,
        placement: PositionOrientation,
    ) -> Result<PlaceWordStatus, LayoutError> {
        let mut word = self.words.remove(id.0).ok_or(LayoutError::NotFound(id))?;
        Self::share_squares(&mut self.squares, &word, false);

        let status = self.classify(word.letters(), placement, true);
        if status != PlaceWordStatus::Invalid {
            trace!("moving {} to {}", word, placement);
            word.set_placement(placement);
        }

        Self::share_squares(&mut self.squares, &word, true);
        self.words.insert(id.0, word);
        Ok(status)
    }

    /// Single place where squares follow the words covering them.
    fn share_squares(squares: &mut HashMap<u32, Square>, word: &WordPosition, added: bool) {
        for (cell, &letter) in word.cells().zip(word.letters()) {
            let key = cell.key();
            if added {
                let square = squares.entry(key).or_insert(Square {
                    position: cell,
                    letter,
                    share_count: 0,
                });
                debug_assert_eq!(square.letter, letter);
                square.share_count += 1;
            } else if let Some(square) = squares.get_mut(&key) {
                square.share_count -= 1;
                if square.share_count == 0 {
                    squares.remove(&key);
                }
            } else {
                debug_assert!(false, "no square under {} at {}", word, cell);
            }
        }
    }

    #[inline(always)]
    fn is_occupied(&self, cell: Position) -> bool {
        self.squares.contains_key(&cell.key())
    }

    /// Words covering `cell`.
    fn words_at(&self, cell: Position) -> impl Iterator<Item = &'_ WordPosition> {
        self.words.values().filter(move |w| w.contains(cell))
    }

    /// Classifies a placement without changing the layout. When
    /// `allow_too_close` is false, a too close placement is `Invalid`.
    pub fn can_place_word(&self, word: &WordPosition, allow_too_close: bool) -> PlaceWordStatus {
        self.classify(word.letters(), word.placement(), allow_too_close)
    }

    pub(crate) fn classify(
        &self,
        letters: &[char],
        placement: PositionOrientation,
        allow_too_close: bool,
    ) -> PlaceWordStatus {
        let direction = placement.direction;
        let mut result = PlaceWordStatus::Valid;

        // cells just before the first letter and just after the last one
        let before = placement.start.along(direction, -1);
        let after = placement.start.along(direction, letters.len() as i32);
        for cell in [before, after] {
            if self.is_occupied(cell) {
                if !allow_too_close {
                    return PlaceWordStatus::Invalid;
                }
                result = PlaceWordStatus::TooClose;
            }
        }

        for (cell, &letter) in placement.cells(letters.len()).zip(letters) {
            match self.squares.get(&cell.key()) {
                Some(square) if square.letter == letter => {
                    // a shared letter is only a crossing if nothing parallel covers it
                    if self.words_at(cell).any(|w| w.direction() == direction) {
                        return PlaceWordStatus::Invalid;
                    }
                }
                Some(_) => return PlaceWordStatus::Invalid,
                None => {
                    if self.is_occupied(cell.across(direction, -1))
                        || self.is_occupied(cell.across(direction, 1))
                    {
                        if !allow_too_close {
                            return PlaceWordStatus::Invalid;
                        }
                        result = PlaceWordStatus::TooClose;
                    }
                }
            }
        }

        result
    }

    /// Bounds of all placed words, always including cell (0, 0).
    pub fn bounds(&self) -> BoundingRectangle {
        self.words
            .values()
            .fold(BoundingRectangle::default(), |r, w| {
                r.extend(w.placement(), w.len())
            })
    }

    /// Words reachable from `id` through intersecting words, `id` excluded.
    pub fn connected_words(&self, id: WordId) -> Result<Vec<WordId>, LayoutError> {
        if !self.words.contains_key(id.0) {
            return Err(LayoutError::NotFound(id));
        }

        let mut component = self.component(id.0);
        component.remove(id.0);

        let mut connected: Vec<WordId> = component.iter().map(WordId).collect();
        connected.sort();
        Ok(connected)
    }

    /// Number of groups of connected words; a finished puzzle has exactly 1.
    pub fn disconnected_group_count(&self) -> usize {
        let mut remaining = SetUsize::new();
        for index in self.words.keys() {
            remaining.insert(index);
        }

        let mut groups = 0;
        loop {
            let seed = match remaining.iter().next() {
                Some(seed) => seed,
                None => break,
            };
            groups += 1;
            for index in self.component(seed).iter() {
                remaining.remove(index);
            }
        }
        groups
    }

    fn component(&self, seed: usize) -> SetUsize {
        let mut visited = SetUsize::new();
        visited.insert(seed);
        let mut to_examine = vec![seed];

        while let Some(index) = to_examine.pop() {
            let word = &self.words[index];
            for (other_index, other) in self.words.iter() {
                if !visited.contains(other_index) && word.intersects(other) {
                    visited.insert(other_index);
                    to_examine.push(other_index);
                }
            }
        }
        visited
    }

    /// Copy to hand back to [`Layout::restore`] if a batch fails.
    pub fn snapshot(&self) -> Layout {
        self.clone()
    }

    /// Returns to a snapshot. Ids handed out since the snapshot are not
    /// reissued.
    pub fn restore(&mut self, snapshot: Layout) {
        let next_id = self.next_id.max(snapshot.next_id);
        *self = snapshot;
        self.next_id = next_id;
    }
}

impl fmt::Display for Layout {
    /// One line per row of the bounds, a space for each empty cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.bounds();
        for row in r.min.row..=r.max.row {
            for column in r.min.column..=r.max.column {
                let letter = self
                    .square(Position::new(row, column))
                    .map_or(' ', |sq| sq.letter);
                write!(f, "{}", letter)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

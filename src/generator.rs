use std::{collections::HashSet, str::FromStr};

use log::{debug, info, trace, warn};
use nanorand::WyRand;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    error::GeneratorError,
    layout::{Layout, PlaceWordStatus},
    position::{BoundingRectangle, Direction, PositionOrientation},
    random::{wyrand, RandomSource},
    word::{Word, WordId, WordPosition, MIN_WORD_LENGTH},
};

/// How a placement is picked among the valid ones.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Optimization {
    /// First placement that keeps the bounds, otherwise the smallest adjusted surface.
    Aggressive,
    /// Any placement that keeps the bounds, otherwise any of the smallest adjusted surface.
    #[default]
    High,
    /// Any placement within 15% of the current adjusted surface, otherwise any.
    Standard,
    /// Any placement.
    None,
}

impl FromStr for Optimization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aggressive" => Ok(Optimization::Aggressive),
            "high" => Ok(Optimization::High),
            "standard" => Ok(Optimization::Standard),
            "none" => Ok(Optimization::None),
            other => Err(format!(
                "unknown optimization '{}', expected aggressive, high, standard or none",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters {
    /// `None` gives a different layout on each run.
    pub seed: Option<u64>,
    pub optimization: Optimization,
    /// Look for placements around each placed word in parallel.
    pub parallel_candidates: bool,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_optimization(mut self, optimization: Optimization) -> Self {
        self.optimization = optimization;
        self
    }

    pub fn with_parallel_candidates(mut self, parallel_candidates: bool) -> Self {
        self.parallel_candidates = parallel_candidates;
        self
    }
}

/// A valid placement and the bounds the layout would have with it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub placement: PositionOrientation,
    pub bounds: BoundingRectangle,
    pub surface: i64,
}

impl Candidate {
    fn new(placement: PositionOrientation, length: usize, current: BoundingRectangle) -> Self {
        let bounds = current.extend(placement, length);
        Self {
            placement,
            bounds,
            surface: bounds.adjusted_surface(),
        }
    }
}

pub struct Generator<R = WyRand> {
    layout: Layout,
    rng: R,
    parameters: Parameters,
}

impl Generator<WyRand> {
    pub fn new(parameters: Parameters) -> Self {
        let rng = wyrand(parameters.seed);
        Self::with_rng(parameters, rng)
    }
}

impl<R: RandomSource> Generator<R> {
    pub fn with_rng(parameters: Parameters, rng: R) -> Self {
        Self {
            layout: Layout::new(),
            rng,
            parameters,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// For manual edits between batches.
    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn into_layout(self) -> Layout {
        self.layout
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Drops every placed word.
    pub fn new_layout(&mut self) {
        self.layout.restore(Layout::new());
    }

    /// Rejects words shorter than three letters and duplicates, within `words`
    /// or against the layout, ignoring case and accents.
    pub fn check_words_list<S: AsRef<str>>(&self, words: &[S]) -> Result<(), GeneratorError> {
        let mut seen: HashSet<String> = self
            .layout
            .words()
            .map(|(_, w)| w.word().duplicate_key())
            .collect();

        let mut too_short = Vec::new();
        let mut duplicates = Vec::new();
        for text in words {
            let text = text.as_ref();
            let word = Word::new(text);
            if word.len() < MIN_WORD_LENGTH {
                too_short.push(text.to_string());
            } else if !seen.insert(word.duplicate_key()) {
                duplicates.push(text.to_string());
            }
        }

        if too_short.is_empty() && duplicates.is_empty() {
            Ok(())
        } else {
            Err(GeneratorError::RejectedWords {
                too_short,
                duplicates,
            })
        }
    }

    /// Places a list of words, in passes, until all are placed or a pass
    /// places nothing.
    ///
    /// On failure the layout goes back to its state before the call if
    /// `backup` is set, otherwise it keeps what was placed.
    pub fn place_word_list<S: AsRef<str>>(
        &mut self,
        words: &[S],
        backup: bool,
    ) -> Result<Vec<WordId>, GeneratorError> {
        let snapshot = backup.then(|| self.layout.snapshot());
        self.check_words_list(words)?;

        let mut remaining: Vec<Word> = words.iter().map(|w| Word::new(w.as_ref())).collect();
        self.rng.shuffle(&mut remaining);
        info!(
            "Placing {} words on a layout of {}",
            remaining.len(),
            self.layout.len()
        );

        let mut placed = Vec::with_capacity(remaining.len());
        let mut pass = 0;
        while !remaining.is_empty() {
            pass += 1;
            let placed_before = placed.len();

            remaining.retain(|word| match self.place_one_word(word) {
                Some(id) => {
                    placed.push(id);
                    false
                }
                None => true,
            });

            debug!(
                "Pass {}: placed {}, {} remaining",
                pass,
                placed.len() - placed_before,
                remaining.len()
            );

            if placed.len() == placed_before {
                let remaining: Vec<String> =
                    remaining.iter().map(|w| w.original().to_string()).collect();
                warn!("No placement found for: {}", remaining.join(", "));
                if let Some(snapshot) = snapshot {
                    self.layout.restore(snapshot);
                }
                return Err(GeneratorError::Unplaceable { remaining });
            }
        }

        info!(
            "Placed {} words in {} passes, bounds {:?}",
            placed.len(),
            pass,
            self.layout.bounds()
        );
        Ok(placed)
    }

    /// Lays out all current words again from an empty layout. The previous
    /// layout is kept if that fails.
    pub fn place_words_again(&mut self) -> Result<Vec<WordId>, GeneratorError> {
        let snapshot = self.layout.snapshot();
        let words: Vec<String> = self
            .layout
            .words()
            .map(|(_, w)| w.original().to_string())
            .collect();

        self.new_layout();
        self.place_word_list(&words, false).map_err(|e| {
            self.layout.restore(snapshot);
            e
        })
    }

    /// Places a single word, or returns `None` when no valid crossing exists.
    /// Duplicates are not checked here.
    pub fn place_one_word(&mut self, word: &Word) -> Option<WordId> {
        // the only placement that needs no crossing
        if self.layout.is_empty() {
            let direction = if self.rng.coin() {
                Direction::Down
            } else {
                Direction::Across
            };
            let placement = PositionOrientation::new(0, 0, direction);
            debug!("First word {} at {}", word.canonical(), placement);
            return Some(
                self.layout
                    .add_word_unchecked(WordPosition::new(word.clone(), placement)),
            );
        }

        let bounds = self.layout.bounds();
        let candidates = self.candidates(word, bounds);
        trace!("{} candidates for {}", candidates.len(), word.canonical());

        let placement = self.select(&candidates, bounds)?;
        debug!("Placing {} at {}", word.canonical(), placement);
        Some(
            self.layout
                .add_word_unchecked(WordPosition::new(word.clone(), placement)),
        )
    }

    /// Every valid crossing of `word` with the placed words, in placement
    /// order of the words crossed. The letters of `word` are tried in a fresh
    /// random order for each placed word.
    pub fn candidates(&mut self, word: &Word, current: BoundingRectangle) -> Vec<Candidate> {
        let distinct = distinct_letters(word.letters());
        // drawn before any parallel work so a seed gives the same candidates
        let orders: Vec<Vec<char>> = (0..self.layout.len())
            .map(|_| {
                let mut order = distinct.clone();
                self.rng.shuffle(&mut order);
                order
            })
            .collect();

        let layout = &self.layout;
        let anchors: Vec<(&WordPosition, &[char])> = layout
            .words()
            .map(|(_, w)| w)
            .zip(orders.iter().map(Vec::as_slice))
            .collect();

        let placements: Vec<PositionOrientation> = if self.parameters.parallel_candidates {
            anchors
                .par_iter()
                .map(|&(anchor, order)| crossings(layout, word, anchor, order))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            anchors
                .iter()
                .flat_map(|&(anchor, order)| crossings(layout, word, anchor, order))
                .collect()
        };

        placements
            .into_iter()
            .map(|placement| Candidate::new(placement, word.len(), current))
            .collect()
    }

    fn select(
        &mut self,
        candidates: &[Candidate],
        current: BoundingRectangle,
    ) -> Option<PositionOrientation> {
        if candidates.is_empty() {
            return None;
        }

        match self.parameters.optimization {
            Optimization::Aggressive => candidates
                .iter()
                .find(|c| c.bounds == current)
                .or_else(|| candidates.iter().min_by_key(|c| c.surface))
                .map(|c| c.placement),

            Optimization::High => {
                let inside: Vec<&Candidate> =
                    candidates.iter().filter(|c| c.bounds == current).collect();
                if !inside.is_empty() {
                    return self.rng.choose(&inside).map(|c| c.placement);
                }
                let min_surface = candidates.iter().map(|c| c.surface).min()?;
                let smallest: Vec<&Candidate> = candidates
                    .iter()
                    .filter(|c| c.surface == min_surface)
                    .collect();
                self.rng.choose(&smallest).map(|c| c.placement)
            }

            Optimization::Standard => {
                let surface = current.adjusted_surface();
                let below: Vec<&Candidate> = candidates
                    .iter()
                    .filter(|c| c.surface * 100 < surface * 115)
                    .collect();
                if below.is_empty() {
                    self.rng.choose(candidates).map(|c| c.placement)
                } else {
                    self.rng.choose(&below).map(|c| c.placement)
                }
            }

            Optimization::None => self.rng.choose(candidates).map(|c| c.placement),
        }
    }
}

/// Valid placements of `word` crossing `anchor` perpendicularly, one for
/// each pair of equal letters, letters taken in `order`.
fn crossings(
    layout: &Layout,
    word: &Word,
    anchor: &WordPosition,
    order: &[char],
) -> Vec<PositionOrientation> {
    let letters = word.letters();
    let anchor_letters = anchor.letters();
    let start = anchor.start();

    let mut placements = Vec::new();
    for &letter in order {
        if !anchor_letters.contains(&letter) {
            continue;
        }

        for i in occurrences(letters, letter) {
            for j in occurrences(anchor_letters, letter) {
                let placement = match anchor.direction() {
                    Direction::Down => PositionOrientation::across(start.row + j, start.column - i),
                    Direction::Across => PositionOrientation::down(start.row - i, start.column + j),
                };
                if layout.classify(letters, placement, false) == PlaceWordStatus::Valid {
                    placements.push(placement);
                }
            }
        }
    }
    placements
}

/// Letters of a word without repeats, in first-occurrence order.
fn distinct_letters(letters: &[char]) -> Vec<char> {
    let mut distinct: Vec<char> = Vec::with_capacity(letters.len());
    for &letter in letters {
        if !distinct.contains(&letter) {
            distinct.push(letter);
        }
    }
    distinct
}

fn occurrences(letters: &[char], letter: char) -> impl Iterator<Item = i32> + '_ {
    letters
        .iter()
        .enumerate()
        .filter(move |&(_, &c)| c == letter)
        .map(|(i, _)| i as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    /// Replays fixed values, each reduced modulo the requested bound.
    struct Scripted {
        values: Vec<usize>,
        next: usize,
    }

    impl Scripted {
        fn new(values: &[usize]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn below(&mut self, n: usize) -> usize {
            let value = self.values.get(self.next).copied().unwrap_or(0);
            self.next += 1;
            value % n
        }
    }

    fn generator(optimization: Optimization, values: &[usize]) -> Generator<Scripted> {
        Generator::with_rng(
            Parameters::new().with_optimization(optimization),
            Scripted::new(values),
        )
    }

    fn candidate(marker: i32, bounds: BoundingRectangle) -> Candidate {
        Candidate {
            placement: PositionOrientation::across(marker, 0),
            bounds,
            surface: bounds.adjusted_surface(),
        }
    }

    #[test]
    fn parse_optimization() {
        assert_eq!("High".parse(), Ok(Optimization::High));
        assert_eq!("none".parse(), Ok(Optimization::None));
        assert!("best".parse::<Optimization>().is_err());
    }

    #[test]
    fn first_word_goes_to_origin() {
        let mut g = generator(Optimization::High, &[1]);
        let ids = g.place_word_list(&["cat"], true).unwrap();
        let cat = g.layout().get(ids[0]).unwrap();
        assert_eq!(cat.placement(), PositionOrientation::down(0, 0));

        let mut g = generator(Optimization::High, &[0]);
        let ids = g.place_word_list(&["cat"], true).unwrap();
        let cat = g.layout().get(ids[0]).unwrap();
        assert_eq!(cat.placement(), PositionOrientation::across(0, 0));
    }

    #[test]
    fn short_words_are_rejected() {
        let mut g = generator(Optimization::High, &[]);
        let err = g.place_word_list(&["AB", "CDE"], true).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::RejectedWords {
                too_short: vec!["AB".to_string()],
                duplicates: vec![],
            }
        );
        assert!(err.to_string().contains("AB"));
        assert!(g.layout().is_empty());
    }

    #[test]
    fn duplicates_are_rejected_against_batch_and_layout() {
        let mut g = generator(Optimization::High, &[]);
        g.place_word_list(&["Élève"], true).unwrap();

        let err = g
            .check_words_list(&[
                "eleve",
                "chat",
                "CHAT",
                "Non sequitur",
                "sosea",
                "Șosea",
                "cafe",
                "Cafe\u{301}",
            ])
            .unwrap_err();
        assert_eq!(
            err,
            GeneratorError::RejectedWords {
                too_short: vec![],
                duplicates: vec![
                    "eleve".to_string(),
                    "CHAT".to_string(),
                    "Șosea".to_string(),
                    "Cafe\u{301}".to_string(),
                ],
            }
        );
        assert_eq!(g.layout().len(), 1);
    }

    #[test]
    fn crossings_of_a_word() {
        let cat = || WordPosition::new(Word::new("cat"), PositionOrientation::across(0, 0));

        // keeps A, C, E in order
        let mut g = generator(Optimization::High, &[2, 1]);
        g.layout_mut().add_word_unchecked(cat());
        let current = g.layout().bounds();
        let placements: Vec<_> = g
            .candidates(&Word::new("ace"), current)
            .into_iter()
            .map(|c| c.placement)
            .collect();
        assert_eq!(
            placements,
            vec![PositionOrientation::down(0, 1), PositionOrientation::down(-1, 0)]
        );
        assert!(g.candidates(&Word::new("dog"), current).is_empty());

        // shuffled to C, E, A
        let mut g = generator(Optimization::High, &[0, 0]);
        g.layout_mut().add_word_unchecked(cat());
        let placements: Vec<_> = g
            .candidates(&Word::new("ace"), current)
            .into_iter()
            .map(|c| c.placement)
            .collect();
        assert_eq!(
            placements,
            vec![PositionOrientation::down(-1, 0), PositionOrientation::down(0, 1)]
        );
    }

    #[test]
    fn distinct_letters_keep_first_occurrence() {
        let word = Word::new("banana");
        assert_eq!(distinct_letters(word.letters()), vec!['B', 'A', 'N']);
    }

    #[test]
    fn crossings_skip_too_close_placements() {
        let mut g = generator(Optimization::High, &[]);
        let layout = g.layout_mut();
        layout.add_word_unchecked(WordPosition::new(
            Word::new("cat"),
            PositionOrientation::across(0, 0),
        ));
        layout.add_word_unchecked(WordPosition::new(
            Word::new("dog"),
            PositionOrientation::across(2, 0),
        ));

        // ACE down from (-1, 0) crosses CAT but its end touches DOG
        let ace = WordPosition::new(Word::new("ace"), PositionOrientation::down(-1, 0));
        assert_eq!(g.layout().can_place_word(&ace, true), PlaceWordStatus::TooClose);

        let current = g.layout().bounds();
        assert!(g.candidates(&Word::new("ace"), current).is_empty());

        let tic: Vec<_> = g
            .candidates(&Word::new("tic"), current)
            .into_iter()
            .map(|c| c.placement)
            .collect();
        assert_eq!(tic, vec![PositionOrientation::down(-2, 0)]);
    }

    #[test]
    fn aggressive_prefers_first_placement_inside_bounds() {
        let current = BoundingRectangle::new(0, 2, 0, 2);
        let candidates = [
            candidate(0, BoundingRectangle::new(0, 3, 0, 2)),
            candidate(1, current),
            candidate(2, BoundingRectangle::new(-1, 2, 0, 3)),
            candidate(3, current),
        ];
        let mut g = generator(Optimization::Aggressive, &[]);
        assert_eq!(
            g.select(&candidates, current),
            Some(PositionOrientation::across(1, 0))
        );

        let outside = [candidates[0], candidates[2]];
        assert_eq!(
            g.select(&outside, current),
            Some(PositionOrientation::across(2, 0))
        );
    }

    #[test]
    fn high_picks_among_placements_inside_bounds() {
        let current = BoundingRectangle::new(0, 2, 0, 2);
        let candidates = [
            candidate(0, BoundingRectangle::new(0, 3, 0, 2)),
            candidate(1, current),
            candidate(2, BoundingRectangle::new(-1, 2, 0, 3)),
            candidate(3, current),
        ];
        let mut g = generator(Optimization::High, &[1, 0]);
        assert_eq!(
            g.select(&candidates, current),
            Some(PositionOrientation::across(3, 0))
        );

        let outside = [
            candidates[0],
            candidates[2],
            candidate(4, BoundingRectangle::new(0, 2, 0, 6)),
            candidate(5, BoundingRectangle::new(0, 3, -1, 2)),
        ];
        // candidates 2 and 5 are both 4x4
        let mut g = generator(Optimization::High, &[1]);
        assert_eq!(
            g.select(&outside, current),
            Some(PositionOrientation::across(5, 0))
        );
    }

    #[test]
    fn standard_keeps_small_growth() {
        let current = BoundingRectangle::new(0, 2, 0, 3);
        assert_eq!(current.adjusted_surface(), 12);

        let same = candidate(0, current);
        let wide = candidate(1, BoundingRectangle::new(0, 2, 0, 6));
        let square = candidate(2, BoundingRectangle::new(-1, 2, 0, 3));

        let mut g = generator(Optimization::Standard, &[1, 0]);
        assert_eq!(
            g.select(&[same, wide, square], current),
            Some(PositionOrientation::across(2, 0))
        );
        assert_eq!(
            g.select(&[wide], current),
            Some(PositionOrientation::across(1, 0))
        );
    }

    #[test]
    fn none_picks_any() {
        let current = BoundingRectangle::new(0, 2, 0, 3);
        let candidates = [
            candidate(0, current),
            candidate(1, BoundingRectangle::new(0, 2, 0, 6)),
            candidate(2, BoundingRectangle::new(-1, 2, 0, 3)),
        ];
        let mut g = generator(Optimization::None, &[1]);
        assert_eq!(
            g.select(&candidates, current),
            Some(PositionOrientation::across(1, 0))
        );
        assert_eq!(g.select(&[], current), None);
    }

    #[test]
    fn unplaceable_batch_restores_layout() {
        let mut g = generator(Optimization::High, &[]);
        let err = g.place_word_list(&["ZEBRA", "QUILT"], true).unwrap_err();
        assert!(matches!(err, GeneratorError::Unplaceable { ref remaining } if remaining.len() == 1));
        assert!(g.layout().is_empty());
        assert_eq!(g.layout().bounds(), BoundingRectangle::default());
    }

    #[test]
    fn unplaceable_batch_without_backup_keeps_placed_words() {
        let mut g = generator(Optimization::High, &[]);
        assert!(g.place_word_list(&["ZEBRA", "QUILT"], false).is_err());
        assert_eq!(g.layout().len(), 1);
        let (_, first) = g.layout().words().next().unwrap();
        assert_eq!(first.start(), Position::ORIGIN);
    }

    #[test]
    fn failed_batch_keeps_earlier_batches() {
        let mut g = generator(Optimization::High, &[]);
        g.place_word_list(&["cat", "ace"], true).unwrap();
        let before = g.layout().to_string();

        assert!(g.place_word_list(&["quiz", "lynx"], true).is_err());
        assert_eq!(g.layout().to_string(), before);
        assert_eq!(g.layout().len(), 2);
    }
}

//! Bonza-style crossword layouts: words placed on an unbounded grid so that
//! they only meet at crossings, kept as compact as possible.
//!
//! [`Layout`] holds the placed words and answers whether a word may go
//! somewhere; [`Generator`] decides where each word of a list goes.

pub mod error;
pub mod generator;
pub mod layout;
pub mod position;
pub mod random;
pub mod word;

pub use error::{GeneratorError, LayoutError};
pub use generator::{Candidate, Generator, Optimization, Parameters};
pub use layout::{Layout, PlaceWordStatus, Square};
pub use position::{adjusted_surface, BoundingRectangle, Direction, Position, PositionOrientation};
pub use random::{wyrand, RandomSource};
pub use word::{canonize, fold_diacritics, Word, WordId, WordPosition, SEPARATOR};

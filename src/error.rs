use thiserror::Error;

use crate::word::WordId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("word {0} is already in the layout")]
    AlreadyPlaced(String),

    #[error("word {0} is not in the layout")]
    NotFound(WordId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The word list was refused as a whole, nothing was placed.
    #[error("{}", describe_rejected(.too_short, .duplicates))]
    RejectedWords {
        too_short: Vec<String>,
        duplicates: Vec<String>,
    },

    /// A full pass placed no word.
    #[error("no placement found for {} word(s): {}", .remaining.len(), .remaining.join(", "))]
    Unplaceable { remaining: Vec<String> },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

fn describe_rejected(too_short: &[String], duplicates: &[String]) -> String {
    let plural = |n: usize| if n > 1 { "s" } else { "" };
    let mut message = String::new();
    if !too_short.is_empty() {
        message.push_str(&format!(
            "word{} of length <= 2 not allowed: {}",
            plural(too_short.len()),
            too_short.join(", ")
        ));
    }
    if !duplicates.is_empty() {
        if !message.is_empty() {
            message.push('\n');
        }
        message.push_str(&format!(
            "duplicate word{}: {}",
            plural(duplicates.len()),
            duplicates.join(", ")
        ));
    }
    message
}

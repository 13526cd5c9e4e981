//! Error types for quiz-core.

use thiserror::Error;

/// Result type alias using QuizError.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Card markup that cannot be wired into a widget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("element is not a quiz card (expected .quiz-mcq or .quiz-num)")]
    NotACard,

    #[error("multiple-choice card has no .choices container")]
    MissingChoices,

    #[error("multiple-choice card has no .choice elements")]
    NoChoiceButtons,

    #[error("card has no .feedback region")]
    MissingFeedback,

    #[error("card has no [data-action=\"{0}\"] control")]
    MissingControl(&'static str),

    #[error("numeric card has no text or number input")]
    MissingInput,

    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),

    #[error("invalid value for {attribute}: {value:?}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },

    #[error("data-correct={index} but the card only has {count} choices")]
    CorrectIndexOutOfRange { index: usize, count: usize },
}

/// Failure to load one deck fragment.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error loading {url}: {message}")]
    Network { url: String, message: String },

    #[error("failed to load {url}: {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fragment url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("no .quiz-mcq/.quiz-num/.card found in {url}")]
    NoCard { url: String },
}

/// Errors surfaced by widget, deck, and page operations.
///
/// None of these are fatal: structural and fetch errors leave a widget or
/// fragment out, parse and selection errors are shown to the user.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("{message}")]
    Parse { message: String },

    #[error("no choice selected")]
    NoSelection,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no quiz questions found in this deck")]
    EmptyDeck,
}

//! Core types shared by the widgets, decks, and markup parser.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of quiz card, taken from its `quiz-mcq` / `quiz-num` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Mcq,
    Numeric,
}

impl CardKind {
    /// CSS class that marks this kind of card.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Mcq => "quiz-mcq",
            Self::Numeric => "quiz-num",
        }
    }

    /// Detect the kind from a list of class names. MCQ wins if both are present.
    pub fn from_classes<'a>(classes: impl Iterator<Item = &'a str>) -> Option<Self> {
        let mut kind = None;
        for class in classes {
            match class {
                "quiz-mcq" => return Some(Self::Mcq),
                "quiz-num" => kind = Some(Self::Numeric),
                _ => {}
            }
        }
        kind
    }
}

/// Tri-state result shown in a feedback region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    #[default]
    Neutral,
}

impl Outcome {
    /// Visual class applied to the feedback region (`ok` / `bad`).
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Pass => Some("ok"),
            Self::Fail => Some("bad"),
            Self::Neutral => None,
        }
    }

    pub fn from_passed(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Visual state of one multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceState {
    #[default]
    Neutral,
    Selected,
    Correct,
    Wrong,
}

/// What re-selecting an option does after the card has been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReselectionPolicy {
    /// Clear the verdict and return the feedback to the neutral prompt.
    #[default]
    Revert,
    /// Recolor the options right away; the old verdict stays until the next check.
    Recolor,
}

impl ReselectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revert => "revert",
            Self::Recolor => "recolor",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revert" => Some(Self::Revert),
            "recolor" => Some(Self::Recolor),
            _ => None,
        }
    }
}

/// Widget behavior settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub reselection: ReselectionPolicy,
}

/// Which action controls the card offers.
///
/// Check and reset are required, so only the optional reveal control is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub reveal: bool,
}

/// Authored solution snippets (inner HTML).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snippets {
    pub correct: Option<String>,
    /// Per-choice wrong-answer snippets, keyed by choice index (MCQ only).
    pub wrong_by_choice: HashMap<usize, String>,
    pub wrong: Option<String>,
    pub reveal: Option<String>,
}

/// Validated multiple-choice card.
#[derive(Debug, Clone, PartialEq)]
pub struct McqSpec {
    pub correct_index: usize,
    /// Choice labels (inner HTML) in document order.
    pub choices: Vec<String>,
    pub snippets: Snippets,
    pub controls: Controls,
}

/// Validated numeric-answer card.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSpec {
    pub answer: f64,
    pub tolerance: f64,
    pub decimals: usize,
    /// Opaque TeX appended after the number inside the same math span.
    pub units: String,
    /// Initial value of the input field.
    pub initial_input: String,
    pub snippets: Snippets,
    pub controls: Controls,
}

impl NumericSpec {
    pub const DEFAULT_DECIMALS: usize = 3;
}

/// Validated card of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CardSpec {
    Mcq(McqSpec),
    Numeric(NumericSpec),
}

impl CardSpec {
    pub fn kind(&self) -> CardKind {
        match self {
            Self::Mcq(_) => CardKind::Mcq,
            Self::Numeric(_) => CardKind::Numeric,
        }
    }
}

/// Keys the widgets and decks react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    ArrowLeft,
    ArrowRight,
}

/// User interaction with a single card.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Click on the option with this index.
    Select(usize),
    Check,
    Reveal,
    Reset,
    /// Replace the numeric input's text.
    Input(String),
    /// Key pressed while the card's input has focus.
    Key(Key),
}

/// User interaction with a deck.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckEvent {
    Previous,
    Next,
    /// Key pressed while focus is inside the deck.
    Key(Key),
    /// Event for the currently visible card.
    Card(WidgetEvent),
}

//! Core quiz library shared by the quiz front ends.
//!
//! Provides:
//! - Markup parser for quiz cards, decks, and pages
//! - Multiple-choice and numeric-answer widget state machines
//! - Deck navigation over inline or fetched cards
//! - Iframe height synchronization protocol
//! - Shared types (CardSpec, Outcome, WidgetEvent, etc.)

pub mod deck;
pub mod error;
pub mod feedback;
pub mod height_sync;
pub mod markup;
pub mod mcq;
pub mod number;
pub mod numeric;
pub mod page;
pub mod types;
pub mod widget;

pub use deck::{Deck, DeckSource, DeckState, FragmentLoader};
pub use error::{FetchError, QuizError, Result, StructuralError};
pub use feedback::{FeedbackRegion, MathOptions, MathRenderError, MathRenderer, RenderEnv};
pub use height_sync::{HeightMessage, HeightSyncChannel, IframeSizer, ResizeNotifier, ResizeTrigger};
pub use markup::{card_view, html_to_text, parse_card, CardMarkup, CardView, DeckMarkup};
pub use mcq::{McqState, McqWidget};
pub use number::{format_fixed, parse_number_loose};
pub use numeric::{NumericState, NumericWidget};
pub use page::QuizPage;
pub use types::{
    CardKind, CardSpec, ChoiceState, DeckEvent, Key, McqSpec, NumericSpec, Outcome,
    ReselectionPolicy, WidgetConfig, WidgetEvent,
};
pub use widget::{Card, Widget};

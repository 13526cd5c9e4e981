//! Deck controller: one visible card at a time with Previous/Next navigation.

use crate::error::{FetchError, QuizError, Result};
use crate::feedback::RenderEnv;
use crate::height_sync::ResizeTrigger;
use crate::markup::{extract_fragment_card, CardMarkup, DeckMarkup};
use crate::types::{DeckEvent, Key, ReselectionPolicy, WidgetEvent};
use crate::widget::Card;

pub const LOADING_LABEL: &str = "Loading questions…";
pub const EMPTY_PLACEHOLDER: &str = "No quiz questions found in this deck.";

/// Fetches the document behind one `data-src` entry.
#[allow(async_fn_in_trait)]
pub trait FragmentLoader {
    /// Load the raw HTML at `url`, bypassing any cache.
    async fn load(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Where a deck's cards come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSource {
    /// Cards written inside the deck element.
    Inline,
    /// Fragment URLs from `data-src`.
    Fetched(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckState {
    Loading,
    Ready { index: usize },
    /// No quiz cards survived loading; the placeholder is shown.
    Empty,
}

#[derive(Debug)]
pub struct Deck {
    source: DeckSource,
    pending: Vec<CardMarkup>,
    start: Option<String>,
    cards: Vec<Card>,
    state: DeckState,
    initialized: bool,
}

impl Deck {
    pub fn new(markup: DeckMarkup) -> Self {
        let source = if markup.sources.is_empty() {
            DeckSource::Inline
        } else {
            DeckSource::Fetched(markup.sources)
        };
        Self {
            source,
            pending: markup.inline_cards,
            start: markup.start,
            cards: Vec::new(),
            state: DeckState::Loading,
            initialized: false,
        }
    }

    pub fn source(&self) -> &DeckSource {
        &self.source
    }

    pub fn state(&self) -> DeckState {
        self.state
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            DeckState::Ready { index } => Some(index),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.index()?)
    }

    pub fn current_mut(&mut self) -> Option<&mut Card> {
        let index = self.index()?;
        self.cards.get_mut(index)
    }

    /// Text shown in the deck body instead of a card, if any.
    pub fn status_text(&self) -> Option<&'static str> {
        match self.state {
            DeckState::Loading if matches!(self.source, DeckSource::Fetched(_)) => {
                Some(LOADING_LABEL)
            }
            DeckState::Empty => Some(EMPTY_PLACEHOLDER),
            _ => None,
        }
    }

    /// "Question i of N" for the visible card.
    pub fn progress_label(&self) -> Option<String> {
        self.index()
            .map(|index| format!("Question {} of {}", index + 1, self.cards.len()))
    }

    pub fn previous_disabled(&self) -> bool {
        self.index().map_or(true, |index| index == 0)
    }

    pub fn next_disabled(&self) -> bool {
        self.index()
            .map_or(true, |index| index + 1 >= self.cards.len())
    }

    /// Collect the cards, wire them, and show the starting card.
    ///
    /// Fragments load one after another; a fragment that fails to load is
    /// logged and left out. Calling this again does nothing.
    pub async fn initialize<L: FragmentLoader>(
        &mut self,
        loader: &L,
        policy: ReselectionPolicy,
        env: &RenderEnv<'_>,
    ) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        let candidates = match &self.source {
            DeckSource::Inline => std::mem::take(&mut self.pending),
            DeckSource::Fetched(urls) => load_fragments(loader, urls).await,
        };

        self.cards = candidates
            .into_iter()
            .filter(|card| card.kind.is_some())
            .map(Card::new)
            .collect();

        if self.cards.is_empty() {
            tracing::warn!("quiz deck has no cards");
            self.state = DeckState::Empty;
            env.request_resize(ResizeTrigger::Mutation);
            return Err(QuizError::EmptyDeck);
        }

        for card in &mut self.cards {
            card.initialize(policy, env);
        }

        self.go_to(self.start_index(), env);
        Ok(())
    }

    /// 0-based start from the 1-based `data-start`; unusable values mean 1.
    fn start_index(&self) -> isize {
        let start = self
            .start
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map_or(1, |n| n as isize);
        start.saturating_sub(1)
    }

    /// Show the card at `index`, clamped into range. Returns the shown index.
    pub fn go_to(&mut self, index: isize, env: &RenderEnv<'_>) -> Option<usize> {
        let last = self.cards.len().checked_sub(1)?;
        let index = index.clamp(0, last as isize) as usize;

        for (i, card) in self.cards.iter_mut().enumerate() {
            card.set_hidden(i != index);
        }
        self.cards[index].render_math(env);
        self.state = DeckState::Ready { index };
        tracing::debug!(index, total = self.cards.len(), "deck navigated");
        env.request_resize(ResizeTrigger::Mutation);
        Some(index)
    }

    pub fn previous(&mut self, env: &RenderEnv<'_>) -> Option<usize> {
        let index = self.index()? as isize;
        self.go_to(index - 1, env)
    }

    pub fn next(&mut self, env: &RenderEnv<'_>) -> Option<usize> {
        let index = self.index()? as isize;
        self.go_to(index + 1, env)
    }

    /// Dispatch a deck-level event. Card events go to the visible card.
    pub fn handle(&mut self, event: DeckEvent, env: &RenderEnv<'_>) -> Result<()> {
        match event {
            DeckEvent::Previous | DeckEvent::Key(Key::ArrowLeft) => {
                self.previous(env);
            }
            DeckEvent::Next | DeckEvent::Key(Key::ArrowRight) => {
                self.next(env);
            }
            DeckEvent::Key(key) => return self.forward(WidgetEvent::Key(key), env),
            DeckEvent::Card(event) => return self.forward(event, env),
        }
        Ok(())
    }

    fn forward(&mut self, event: WidgetEvent, env: &RenderEnv<'_>) -> Result<()> {
        match self.current_mut() {
            Some(card) => card.handle(event, env),
            None => Ok(()),
        }
    }
}

async fn load_fragments<L: FragmentLoader>(loader: &L, urls: &[String]) -> Vec<CardMarkup> {
    let mut loaded = Vec::with_capacity(urls.len());
    for url in urls {
        let result = match loader.load(url).await {
            Ok(document) => extract_fragment_card(&document)
                .ok_or_else(|| FetchError::NoCard { url: url.clone() }),
            Err(e) => Err(e),
        };
        match result {
            Ok(card) => loaded.push(card),
            Err(e) => tracing::warn!(error = %e, "dropping quiz fragment"),
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{MathOptions, MathRenderError, MathRenderer};
    use crate::height_sync::ResizeNotifier;
    use crate::types::{CardKind, Outcome};
    use crate::widget::Widget;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    fn mcq(label: &str) -> String {
        format!(
            r#"<div class="card quiz-mcq"><p>{label}</p>
              <div class="choices" data-correct="1">
                <button class="choice">no</button><button class="choice">yes</button>
              </div>
              <button data-action="check">Check</button>
              <button data-action="reset">Reset</button>
              <div class="feedback"></div></div>"#
        )
    }

    fn page(body: &str) -> String {
        format!("<!doctype html><html><body>{body}</body></html>")
    }

    #[derive(Default)]
    struct MemoryLoader {
        pages: HashMap<String, String>,
        requests: RefCell<Vec<String>>,
    }

    impl MemoryLoader {
        fn with(mut self, url: &str, body: String) -> Self {
            self.pages.insert(url.to_string(), body);
            self
        }
    }

    impl FragmentLoader for MemoryLoader {
        async fn load(&self, url: &str) -> std::result::Result<String, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn inline_deck(count: usize) -> Deck {
        let cards = (0..count)
            .map(|i| CardMarkup {
                kind: Some(CardKind::Mcq),
                html: mcq(&format!("Q{i}")),
            })
            .collect();
        Deck::new(DeckMarkup::inline(cards))
    }

    fn ready(mut deck: Deck) -> Deck {
        let env = RenderEnv::detached();
        let loader = MemoryLoader::default();
        tokio_test::block_on(deck.initialize(&loader, ReselectionPolicy::Revert, &env)).unwrap();
        deck
    }

    fn visible(deck: &Deck) -> Vec<bool> {
        deck.cards().iter().map(|c| !c.is_hidden()).collect()
    }

    /// Remembers the markup of every card it was asked to typeset.
    #[derive(Default)]
    struct RecordingMath {
        seen: RefCell<Vec<String>>,
    }

    impl MathRenderer for RecordingMath {
        fn render(
            &self,
            html: &mut String,
            _options: &MathOptions,
        ) -> std::result::Result<(), MathRenderError> {
            self.seen.borrow_mut().push(html.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingResize {
        count: Cell<usize>,
    }

    impl ResizeNotifier for CountingResize {
        fn request_resize(&self, _trigger: ResizeTrigger) {
            self.count.set(self.count.get() + 1);
        }
    }

    #[test]
    fn failed_fragment_is_dropped() {
        let loader = MemoryLoader::default()
            .with("q1.html", page(&mcq("one")))
            .with("q3.html", page(&mcq("three")));
        let mut deck = Deck::new(DeckMarkup::fetched(["q1.html", "q2.html", "q3.html"]));
        assert_eq!(deck.status_text(), Some(LOADING_LABEL));

        let env = RenderEnv::detached();
        tokio_test::block_on(deck.initialize(&loader, ReselectionPolicy::Revert, &env)).unwrap();

        assert_eq!(deck.len(), 2);
        assert_eq!(deck.progress_label().as_deref(), Some("Question 1 of 2"));
        assert_eq!(*loader.requests.borrow(), ["q1.html", "q2.html", "q3.html"]);
        assert_eq!(deck.status_text(), None);
    }

    #[test]
    fn fragment_without_card_is_dropped() {
        let loader = MemoryLoader::default()
            .with("a.html", page("<p>nothing here</p>"))
            .with("b.html", page(&mcq("b")));
        let mut deck = Deck::new(DeckMarkup::fetched(["a.html", "b.html"]));

        let env = RenderEnv::detached();
        tokio_test::block_on(deck.initialize(&loader, ReselectionPolicy::Revert, &env)).unwrap();

        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn empty_deck_shows_placeholder() {
        let mut deck = Deck::new(DeckMarkup::inline(vec![CardMarkup {
            kind: None,
            html: r#"<div class="card">notes</div>"#.into(),
        }]));

        let result = tokio_test::block_on(deck.initialize(
            &MemoryLoader::default(),
            ReselectionPolicy::Revert,
            &RenderEnv::detached(),
        ));

        assert!(matches!(result, Err(QuizError::EmptyDeck)));
        assert_eq!(deck.state(), DeckState::Empty);
        assert_eq!(deck.status_text(), Some(EMPTY_PLACEHOLDER));
        assert_eq!(deck.progress_label(), None);
        assert!(deck.previous_disabled());
        assert!(deck.next_disabled());
    }

    #[test]
    fn go_to_clamps() {
        let env = RenderEnv::detached();
        let mut deck = ready(inline_deck(4));

        assert_eq!(deck.go_to(-5, &env), Some(0));
        assert_eq!(visible(&deck), [true, false, false, false]);
        assert!(deck.previous_disabled());
        assert!(!deck.next_disabled());

        assert_eq!(deck.go_to(99, &env), Some(3));
        assert_eq!(visible(&deck), [false, false, false, true]);
        assert_eq!(deck.progress_label().as_deref(), Some("Question 4 of 4"));
        assert!(!deck.previous_disabled());
        assert!(deck.next_disabled());
    }

    #[test]
    fn navigation_typesets_visible_card_and_resizes_once() {
        let math = RecordingMath::default();
        let resize = CountingResize::default();
        let env = RenderEnv::detached().with_math(&math).with_resize(&resize);
        let mut deck = inline_deck(3);
        let loader = MemoryLoader::default();
        tokio_test::block_on(deck.initialize(&loader, ReselectionPolicy::Revert, &env)).unwrap();

        let typeset = math.seen.borrow().len();
        let resized = resize.count.get();

        deck.handle(DeckEvent::Next, &env).unwrap();
        assert_eq!(math.seen.borrow().len(), typeset + 1);
        assert!(math.seen.borrow()[typeset].contains("<p>Q1</p>"));
        assert_eq!(resize.count.get(), resized + 1);

        deck.go_to(2, &env);
        assert_eq!(math.seen.borrow().len(), typeset + 2);
        assert!(math.seen.borrow()[typeset + 1].contains("<p>Q2</p>"));
        assert_eq!(resize.count.get(), resized + 2);

        deck.handle(DeckEvent::Key(Key::ArrowLeft), &env).unwrap();
        assert_eq!(math.seen.borrow().len(), typeset + 3);
        assert!(math.seen.borrow()[typeset + 2].contains("<p>Q1</p>"));
        assert_eq!(resize.count.get(), resized + 3);
    }

    #[test]
    fn start_attribute_is_one_based_and_clamped() {
        let cases = [("2", 1), ("0", 0), ("40", 2), ("abc", 0), ("", 0)];
        for (start, expected) in cases {
            let cards = (0..3)
                .map(|i| CardMarkup {
                    kind: Some(CardKind::Mcq),
                    html: mcq(&i.to_string()),
                })
                .collect();
            let deck = ready(Deck::new(DeckMarkup::inline(cards).with_start(start)));
            assert_eq!(deck.index(), Some(expected), "data-start={start:?}");
        }
    }

    #[test]
    fn arrow_keys_navigate() {
        let env = RenderEnv::detached();
        let mut deck = ready(inline_deck(3));

        deck.handle(DeckEvent::Key(Key::ArrowRight), &env).unwrap();
        deck.handle(DeckEvent::Next, &env).unwrap();
        deck.handle(DeckEvent::Next, &env).unwrap();
        assert_eq!(deck.index(), Some(2));

        deck.handle(DeckEvent::Key(Key::ArrowLeft), &env).unwrap();
        deck.handle(DeckEvent::Previous, &env).unwrap();
        deck.handle(DeckEvent::Previous, &env).unwrap();
        assert_eq!(deck.index(), Some(0));
    }

    #[test]
    fn card_events_reach_visible_card_only() {
        let env = RenderEnv::detached();
        let mut deck = ready(inline_deck(2));

        deck.handle(DeckEvent::Next, &env).unwrap();
        deck.handle(DeckEvent::Card(WidgetEvent::Select(1)), &env).unwrap();
        deck.handle(DeckEvent::Card(WidgetEvent::Check), &env).unwrap();

        let outcomes: Vec<_> = deck
            .cards()
            .iter()
            .map(|c| c.widget().map(|w| w.feedback().outcome()))
            .collect();
        assert_eq!(outcomes, [Some(Outcome::Neutral), Some(Outcome::Pass)]);

        let Some(Widget::Mcq(widget)) = deck.current().and_then(Card::widget) else {
            panic!("expected mcq");
        };
        assert_eq!(widget.selected(), Some(1));
    }

    #[test]
    fn reinitialize_is_noop() {
        let env = RenderEnv::detached();
        let mut deck = ready(inline_deck(3));
        deck.go_to(2, &env);

        let loader = MemoryLoader::default();
        tokio_test::block_on(deck.initialize(&loader, ReselectionPolicy::Revert, &env)).unwrap();

        assert_eq!(deck.index(), Some(2));
        assert_eq!(deck.len(), 3);
        assert!(loader.requests.borrow().is_empty());
    }
}

//! A quiz page: every deck and standalone card found in one document.

use crate::deck::{Deck, FragmentLoader};
use crate::feedback::RenderEnv;
use crate::height_sync::ResizeTrigger;
use crate::markup::parse_page;
use crate::types::ReselectionPolicy;
use crate::widget::Card;

#[derive(Debug)]
pub struct QuizPage {
    decks: Vec<Deck>,
    cards: Vec<Card>,
    initialized: bool,
}

impl QuizPage {
    /// Discover decks and the cards that sit outside any deck.
    pub fn parse(html: &str) -> Self {
        let markup = parse_page(html);
        Self {
            decks: markup.decks.into_iter().map(Deck::new).collect(),
            cards: markup.cards.into_iter().map(Card::new).collect(),
            initialized: false,
        }
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn decks_mut(&mut self) -> &mut [Deck] {
        &mut self.decks
    }

    /// Standalone cards, in document order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty() && self.cards.is_empty()
    }

    /// Wire decks first, then standalone cards. Calling this again does nothing.
    ///
    /// Problems with individual decks or cards are logged; they never stop the
    /// rest of the page from initializing.
    pub async fn initialize<L: FragmentLoader>(
        &mut self,
        loader: &L,
        policy: ReselectionPolicy,
        env: &RenderEnv<'_>,
    ) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        for (position, deck) in self.decks.iter_mut().enumerate() {
            if let Err(e) = deck.initialize(loader, policy, env).await {
                tracing::warn!(deck = position, error = %e, "quiz deck not usable");
            }
        }
        for card in &mut self.cards {
            card.initialize(policy, env);
        }

        tracing::debug!(
            decks = self.decks.len(),
            cards = self.cards.len(),
            "quiz page initialized"
        );
        env.request_resize(ResizeTrigger::Settle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::DeckState;
    use crate::error::FetchError;
    use crate::types::{CardKind, WidgetEvent};
    use crate::widget::Widget;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct Offline;

    impl FragmentLoader for Offline {
        async fn load(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::Network {
                url: url.to_string(),
                message: "offline".into(),
            })
        }
    }

    const NUMERIC: &str = r#"<div class="card quiz-num" data-answer="2" data-tol="0">
        <input type="number"><button data-action="check">Check</button>
        <button data-action="reset">Reset</button><div class="feedback"></div></div>"#;

    #[test]
    fn page_initializes_decks_and_standalone_cards() {
        let html = format!(
            r#"<html><body>
              {NUMERIC}
              <div class="quiz-deck">{NUMERIC}{NUMERIC}</div>
              <div class="quiz-deck" data-src="gone.html"></div>
              <div class="card quiz-mcq"><p>broken</p></div>
            </body></html>"#
        );
        let mut page = QuizPage::parse(&html);
        assert_eq!(page.decks().len(), 2);
        assert_eq!(page.cards().len(), 2);

        let env = RenderEnv::detached();
        tokio_test::block_on(page.initialize(&Offline, ReselectionPolicy::Revert, &env));

        assert_eq!(page.decks()[0].state(), DeckState::Ready { index: 0 });
        assert_eq!(page.decks()[1].state(), DeckState::Empty);

        let standalone = page.cards();
        assert_eq!(standalone[0].widget().map(|w| w.kind()), Some(CardKind::Numeric));
        assert!(standalone[1].inert_reason().is_some());
        assert!(standalone.iter().all(|c| c.is_initialized()));
    }

    #[derive(Default)]
    struct CountingLoader {
        requests: Cell<usize>,
    }

    impl FragmentLoader for CountingLoader {
        async fn load(&self, _url: &str) -> Result<String, FetchError> {
            self.requests.set(self.requests.get() + 1);
            Ok(format!("<html><body>{NUMERIC}</body></html>"))
        }
    }

    #[test]
    fn second_initialize_fetches_nothing() {
        let html = format!(
            r#"<html><body>
              <div class="quiz-deck" data-src="q1.html"></div>
              {NUMERIC}
            </body></html>"#
        );
        let mut page = QuizPage::parse(&html);
        let loader = CountingLoader::default();
        let env = RenderEnv::detached();

        tokio_test::block_on(page.initialize(&loader, ReselectionPolicy::Revert, &env));
        page.cards_mut()[0]
            .handle(WidgetEvent::Input("2".into()), &env)
            .unwrap();
        tokio_test::block_on(page.initialize(&loader, ReselectionPolicy::Revert, &env));

        assert_eq!(loader.requests.get(), 1);
        assert_eq!(page.decks()[0].len(), 1);
        let Some(Widget::Numeric(numeric)) = page.cards()[0].widget() else {
            panic!("expected numeric widget");
        };
        assert_eq!(numeric.input(), "2");
    }

    #[test]
    fn page_without_quizzes() {
        let page = QuizPage::parse("<html><body><p>hello</p></body></html>");
        assert!(page.is_empty());
    }
}

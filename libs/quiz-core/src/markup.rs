//! HTML markup parser for quiz cards, decks, and pages.
//!
//! # Card format
//! ```html
//! <div class="card quiz-mcq">
//!   <p>Which is prime?</p>
//!   <div class="choices" data-correct="1">
//!     <button class="choice" data-i="0">4</button>
//!     <button class="choice" data-i="1">7</button>
//!   </div>
//!   <button data-action="check">Check</button>
//!   <button data-action="show">Show solution</button>
//!   <button data-action="reset">Reset</button>
//!   <div class="feedback"></div>
//!   <div class="solution-wrong" data-i="0">4 = 2 × 2.</div>
//!   <div class="solution-show">7 has no divisors but 1 and 7.</div>
//! </div>
//!
//! <div class="card quiz-num" data-answer="17.3205" data-tol="0.15"
//!      data-decimals="2" data-units="\,\mathrm{m/s}">
//!   <input type="text">
//!   ...
//! </div>
//! ```
//!
//! Decks are `<div class="quiz-deck" data-src="q1.html,q2.html" data-start="1">`.

use crate::error::StructuralError;
use crate::types::{CardKind, CardSpec, Controls, McqSpec, NumericSpec, Snippets};
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static QUIZ_CARD: LazyLock<Selector> = LazyLock::new(|| selector(".quiz-mcq, .quiz-num"));
static STYLED_QUIZ_CARD: LazyLock<Selector> =
    LazyLock::new(|| selector(".card.quiz-mcq, .card.quiz-num"));
static ANY_CARD: LazyLock<Selector> = LazyLock::new(|| selector(".card"));
static DECK_CARD: LazyLock<Selector> = LazyLock::new(|| {
    selector(".card.quiz-mcq, .card.quiz-num, .quiz-mcq, .quiz-num, .card")
});
static DECK: LazyLock<Selector> = LazyLock::new(|| selector(".quiz-deck"));

static CHOICES: LazyLock<Selector> = LazyLock::new(|| selector(".choices"));
static CHOICE: LazyLock<Selector> = LazyLock::new(|| selector(".choice"));
static FEEDBACK: LazyLock<Selector> = LazyLock::new(|| selector(".feedback"));
static CHECK: LazyLock<Selector> = LazyLock::new(|| selector(r#"[data-action="check"]"#));
static SHOW: LazyLock<Selector> = LazyLock::new(|| selector(r#"[data-action="show"]"#));
static RESET: LazyLock<Selector> = LazyLock::new(|| selector(r#"[data-action="reset"]"#));
static INPUT: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"input[type="text"], input[type="number"]"#));
static SOLUTION_CORRECT: LazyLock<Selector> = LazyLock::new(|| selector(".solution-correct"));
static SOLUTION_WRONG: LazyLock<Selector> = LazyLock::new(|| selector(".solution-wrong"));
static SOLUTION_SHOW: LazyLock<Selector> = LazyLock::new(|| selector(".solution-show"));

/// Classes whose subtrees are not part of a card's prompt text.
const NON_PROMPT_CLASSES: &[&str] = &[
    "choices",
    "choice",
    "feedback",
    "solution-correct",
    "solution-wrong",
    "solution-show",
];
const NON_PROMPT_TAGS: &[&str] = &["button", "input", "script", "style", "template"];

/// Elements that start a new line of text; inline markup joins its neighbours.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

/// A card element lifted out of a page, deck, or fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMarkup {
    /// `None` for elements that only carry the generic `card` class.
    pub kind: Option<CardKind>,
    /// Outer HTML of the card element.
    pub html: String,
}

impl CardMarkup {
    fn from_element(el: ElementRef<'_>) -> Self {
        Self {
            kind: CardKind::from_classes(el.value().classes()),
            html: el.html(),
        }
    }
}

/// Attributes and contents of a `.quiz-deck` container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckMarkup {
    /// Fragment URLs from `data-src`, in order.
    pub sources: Vec<String>,
    /// Raw 1-based `data-start`.
    pub start: Option<String>,
    /// Card elements found inside the container.
    pub inline_cards: Vec<CardMarkup>,
}

impl DeckMarkup {
    /// Deck whose cards come from external fragments.
    pub fn fetched<S: Into<String>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Deck built from cards already on the page.
    pub fn inline(cards: Vec<CardMarkup>) -> Self {
        Self {
            inline_cards: cards,
            ..Self::default()
        }
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }
}

/// Everything quiz-related found on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMarkup {
    pub decks: Vec<DeckMarkup>,
    /// Cards that are not inside any deck.
    pub cards: Vec<CardMarkup>,
}

/// Text shown for a card in a plain-text view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardView {
    pub prompt: String,
    pub choices: Vec<String>,
}

/// Find decks and standalone cards in a page.
pub fn parse_page(html: &str) -> PageMarkup {
    let doc = Html::parse_document(html);

    let decks = doc.select(&DECK).map(deck_from_element).collect();
    let cards = doc
        .select(&QUIZ_CARD)
        .filter(|el| !inside_deck(*el))
        .map(CardMarkup::from_element)
        .collect();

    PageMarkup { decks, cards }
}

fn deck_from_element(deck: ElementRef<'_>) -> DeckMarkup {
    let attrs = deck.value();
    let sources = attrs
        .attr("data-src")
        .map(split_sources)
        .unwrap_or_default();

    DeckMarkup {
        sources,
        start: attrs.attr("data-start").map(str::to_string),
        inline_cards: deck.select(&DECK_CARD).map(CardMarkup::from_element).collect(),
    }
}

/// Split a comma-separated `data-src` list, dropping blanks.
pub fn split_sources(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn inside_deck(el: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().classes().any(|c| c == "quiz-deck"))
}

/// Pick the card out of a fetched fragment document.
///
/// Prefers `.card.quiz-mcq`/`.card.quiz-num`, then any `.quiz-mcq`/`.quiz-num`,
/// then a plain `.card`.
pub fn extract_fragment_card(document: &str) -> Option<CardMarkup> {
    let doc = Html::parse_document(document);
    doc.select(&STYLED_QUIZ_CARD)
        .next()
        .or_else(|| doc.select(&QUIZ_CARD).next())
        .or_else(|| doc.select(&ANY_CARD).next())
        .map(CardMarkup::from_element)
}

/// Validate a card's markup and build its spec.
pub fn parse_card(html: &str) -> Result<CardSpec, StructuralError> {
    let doc = Html::parse_fragment(html);
    let card = doc.select(&QUIZ_CARD).next().ok_or(StructuralError::NotACard)?;

    match CardKind::from_classes(card.value().classes()) {
        Some(CardKind::Mcq) => parse_mcq(card).map(CardSpec::Mcq),
        Some(CardKind::Numeric) => parse_numeric(card).map(CardSpec::Numeric),
        None => Err(StructuralError::NotACard),
    }
}

fn parse_mcq(card: ElementRef<'_>) -> Result<McqSpec, StructuralError> {
    let choices_box = first(card, &CHOICES).ok_or(StructuralError::MissingChoices)?;
    let choices: Vec<ElementRef<'_>> = card.select(&CHOICE).collect();
    if choices.is_empty() {
        return Err(StructuralError::NoChoiceButtons);
    }
    let controls = required_controls(card)?;

    let raw = choices_box
        .value()
        .attr("data-correct")
        .ok_or(StructuralError::MissingAttribute("data-correct"))?;
    let correct_index = parse_index(raw).ok_or_else(|| StructuralError::InvalidAttribute {
        attribute: "data-correct",
        value: raw.to_string(),
    })?;
    if correct_index >= choices.len() {
        return Err(StructuralError::CorrectIndexOutOfRange {
            index: correct_index,
            count: choices.len(),
        });
    }

    for (position, choice) in choices.iter().enumerate() {
        let declared = choice.value().attr("data-i").and_then(parse_index);
        if declared.is_some_and(|i| i != position) {
            tracing::warn!(position, ?declared, "choice data-i does not match its position");
        }
    }

    let mut snippets = Snippets {
        correct: first(card, &SOLUTION_CORRECT).map(|el| el.inner_html()),
        reveal: first(card, &SOLUTION_SHOW).map(|el| el.inner_html()),
        ..Snippets::default()
    };
    for el in card.select(&SOLUTION_WRONG) {
        match el.value().attr("data-i").map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match parse_index(raw) {
                Some(i) => {
                    snippets.wrong_by_choice.insert(i, el.inner_html());
                }
                None => tracing::warn!(data_i = raw, "ignoring wrong-answer snippet"),
            },
            None => {
                if snippets.wrong.is_none() {
                    snippets.wrong = Some(el.inner_html());
                }
            }
        }
    }

    Ok(McqSpec {
        correct_index,
        choices: choices.iter().map(|el| el.inner_html()).collect(),
        snippets,
        controls,
    })
}

fn parse_numeric(card: ElementRef<'_>) -> Result<NumericSpec, StructuralError> {
    let input = first(card, &INPUT).ok_or(StructuralError::MissingInput)?;
    let controls = required_controls(card)?;
    let attrs = card.value();

    let answer = required_number(attrs.attr("data-answer"), "data-answer")?;
    let tolerance = required_number(attrs.attr("data-tol"), "data-tol")?;
    let decimals = attrs
        .attr("data-decimals")
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .map(|d| d.clamp(0.0, 100.0) as usize)
        .unwrap_or(NumericSpec::DEFAULT_DECIMALS);

    Ok(NumericSpec {
        answer,
        tolerance,
        decimals,
        units: attrs.attr("data-units").unwrap_or_default().to_string(),
        initial_input: input.value().attr("value").unwrap_or_default().to_string(),
        snippets: Snippets {
            correct: first(card, &SOLUTION_CORRECT).map(|el| el.inner_html()),
            wrong: first(card, &SOLUTION_WRONG).map(|el| el.inner_html()),
            reveal: first(card, &SOLUTION_SHOW).map(|el| el.inner_html()),
            ..Snippets::default()
        },
        controls,
    })
}

/// Feedback region plus check and reset are required on every card.
fn required_controls(card: ElementRef<'_>) -> Result<Controls, StructuralError> {
    first(card, &FEEDBACK).ok_or(StructuralError::MissingFeedback)?;
    first(card, &CHECK).ok_or(StructuralError::MissingControl("check"))?;
    first(card, &RESET).ok_or(StructuralError::MissingControl("reset"))?;
    Ok(Controls {
        reveal: first(card, &SHOW).is_some(),
    })
}

fn first<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    el.select(selector).next()
}

fn parse_index(raw: &str) -> Option<usize> {
    raw.trim().parse().ok()
}

fn required_number(raw: Option<&str>, attribute: &'static str) -> Result<f64, StructuralError> {
    let raw = raw.ok_or(StructuralError::MissingAttribute(attribute))?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StructuralError::InvalidAttribute {
            attribute,
            value: raw.to_string(),
        })
}

/// Plain-text view of a card: prompt text and choice labels.
pub fn card_view(html: &str) -> CardView {
    let doc = Html::parse_fragment(html);
    let Some(card) = doc.select(&QUIZ_CARD).next() else {
        return CardView {
            prompt: html_to_text(html),
            choices: Vec::new(),
        };
    };

    let mut prompt = String::new();
    collect_text(card, &mut prompt, true);

    CardView {
        prompt: collapse_whitespace(&prompt),
        choices: card
            .select(&CHOICE)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .collect(),
    }
}

/// Gather the text under `el`. With `prompt_only`, controls, choices and
/// feedback are left out.
fn collect_text(el: ElementRef<'_>, out: &mut String, prompt_only: bool) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let element = child.value();
                let skip = prompt_only
                    && (NON_PROMPT_TAGS.contains(&element.name())
                        || element.classes().any(|c| NON_PROMPT_CLASSES.contains(&c)));
                if skip {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&element.name());
                if block {
                    out.push(' ');
                }
                collect_text(child, out, prompt_only);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Strip tags from an HTML snippet.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let mut text = String::new();
    collect_text(doc.root_element(), &mut text, false);
    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

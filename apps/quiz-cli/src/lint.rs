//! Authoring checks for a quiz page.

use quiz_core::{Card, DeckSource, DeckState, QuizPage};

#[derive(Debug, Default)]
pub struct LintReport {
    pub lines: Vec<String>,
    pub problems: usize,
}

impl LintReport {
    fn ok(&mut self, line: String) {
        self.lines.push(line);
    }

    fn problem(&mut self, line: String) {
        self.problems += 1;
        self.lines.push(line);
    }

    pub fn is_clean(&self) -> bool {
        self.problems == 0
    }
}

/// Check every deck and card of an initialized page.
pub fn lint(page: &QuizPage) -> LintReport {
    let mut report = LintReport::default();

    if page.is_empty() {
        report.problem("no quiz decks or cards found".to_string());
        return report;
    }

    for (i, deck) in page.decks().iter().enumerate() {
        let name = format!("deck {}", i + 1);
        if deck.state() == DeckState::Empty {
            report.problem(format!("{name}: no quiz questions"));
            continue;
        }

        match deck.source() {
            DeckSource::Fetched(urls) if urls.len() > deck.len() => report.problem(format!(
                "{name}: loaded {} of {} fragments",
                deck.len(),
                urls.len()
            )),
            _ => report.ok(format!("{name}: {} cards", deck.len())),
        }

        for (j, card) in deck.cards().iter().enumerate() {
            check_card(&mut report, format!("{name} card {}", j + 1), card);
        }
    }

    for (i, card) in page.cards().iter().enumerate() {
        check_card(&mut report, format!("card {}", i + 1), card);
    }

    report
}

fn check_card(report: &mut LintReport, name: String, card: &Card) {
    match (card.widget(), card.inert_reason()) {
        (Some(widget), _) => report.ok(format!("{name}: ok ({})", widget.kind().class_name())),
        (None, Some(reason)) => report.problem(format!("{name}: inert: {reason}")),
        (None, None) => report.problem(format!("{name}: not initialized")),
    }
}

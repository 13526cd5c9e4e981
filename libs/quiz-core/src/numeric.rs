//! Numeric-answer widget.

use crate::error::Result;
use crate::feedback::{FeedbackRegion, RenderEnv};
use crate::number::{format_fixed, parse_number_loose};
use crate::types::{Key, NumericSpec, Outcome, WidgetEvent};

pub const PROMPT: &str = "Enter your answer, then click <strong>Check</strong>.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericState {
    Empty,
    Checked { value: f64, passed: bool },
    Revealed,
}

#[derive(Debug)]
pub struct NumericWidget {
    spec: NumericSpec,
    input: String,
    input_focused: bool,
    state: NumericState,
    feedback: FeedbackRegion,
}

impl NumericWidget {
    pub fn new(spec: NumericSpec, env: &RenderEnv<'_>) -> Self {
        let mut widget = Self {
            input: spec.initial_input.clone(),
            spec,
            input_focused: false,
            state: NumericState::Empty,
            feedback: FeedbackRegion::default(),
        };
        widget.feedback.render(PROMPT, Outcome::Neutral, env);
        widget
    }

    pub fn state(&self) -> NumericState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn feedback(&self) -> &FeedbackRegion {
        &self.feedback
    }

    pub fn handle(&mut self, event: WidgetEvent, env: &RenderEnv<'_>) -> Result<()> {
        match event {
            WidgetEvent::Input(text) => self.set_input(text),
            WidgetEvent::Check => self.check(env).map(|_| ())?,
            WidgetEvent::Key(Key::Enter) if self.input_focused => self.check(env).map(|_| ())?,
            WidgetEvent::Reveal if self.spec.controls.reveal => self.reveal(env),
            WidgetEvent::Reveal => tracing::debug!("card has no reveal control"),
            WidgetEvent::Reset => self.reset(env),
            WidgetEvent::Select(_) | WidgetEvent::Key(_) => {}
        }
        Ok(())
    }

    /// Type into the input field.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.input_focused = true;
    }

    /// Grade the input. Unparseable input shows a warning and leaves the state alone.
    pub fn check(&mut self, env: &RenderEnv<'_>) -> Result<Outcome> {
        let value = match parse_number_loose(&self.input) {
            Ok(value) => value,
            Err(e) => {
                self.feedback.render(format!("⚠️ {e}"), Outcome::Fail, env);
                return Err(e);
            }
        };

        let passed = (value - self.spec.answer).abs() <= self.spec.tolerance;
        let snippets = &self.spec.snippets;
        let html = if passed {
            snippets.correct.clone().unwrap_or_else(|| {
                format!(
                    "✅ Correct. Your answer {} is within tolerance.",
                    self.math(self.spec.answer)
                )
            })
        } else {
            snippets.wrong.clone().unwrap_or_else(|| {
                format!("❌ Not quite. You entered {}. Try again.", self.math(value))
            })
        };

        let outcome = Outcome::from_passed(passed);
        self.feedback.render(html, outcome, env);
        self.state = NumericState::Checked { value, passed };
        Ok(outcome)
    }

    pub fn reveal(&mut self, env: &RenderEnv<'_>) {
        let html = self
            .spec
            .snippets
            .reveal
            .clone()
            .unwrap_or_else(|| format!("Answer: {}.", self.math(self.spec.answer)));
        self.feedback.render(html, Outcome::Pass, env);
        self.state = NumericState::Revealed;
    }

    pub fn reset(&mut self, env: &RenderEnv<'_>) {
        self.input.clear();
        self.state = NumericState::Empty;
        self.feedback.render(PROMPT, Outcome::Neutral, env);
        self.input_focused = true;
    }

    /// Inline math span with the number and the unit suffix.
    fn math(&self, value: f64) -> String {
        format!(
            "${}{}$",
            format_fixed(value, self.spec.decimals),
            self.spec.units
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use crate::types::{Controls, Snippets};
    use pretty_assertions::assert_eq;

    fn spec() -> NumericSpec {
        NumericSpec {
            answer: 17.3205,
            tolerance: 0.15,
            decimals: 3,
            units: String::new(),
            initial_input: String::new(),
            snippets: Snippets::default(),
            controls: Controls { reveal: true },
        }
    }

    fn check_with(widget: &mut NumericWidget, input: &str) -> Result<Outcome> {
        widget.set_input(input);
        widget.check(&RenderEnv::detached())
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let mut w = NumericWidget::new(spec(), &RenderEnv::detached());

        assert_eq!(check_with(&mut w, "17.45").unwrap(), Outcome::Pass);
        assert_eq!(check_with(&mut w, "17.47").unwrap(), Outcome::Pass);
        assert_eq!(check_with(&mut w, "17.48").unwrap(), Outcome::Fail);
        assert_eq!(check_with(&mut w, "17.18").unwrap(), Outcome::Pass);
        assert_eq!(check_with(&mut w, "17.17").unwrap(), Outcome::Fail);
    }

    #[test]
    fn exact_boundary_passes() {
        let mut s = spec();
        s.answer = 10.0;
        s.tolerance = 0.5;
        let mut w = NumericWidget::new(s, &RenderEnv::detached());

        assert_eq!(check_with(&mut w, "10.5").unwrap(), Outcome::Pass);
        assert_eq!(check_with(&mut w, "9.5").unwrap(), Outcome::Pass);
        assert_eq!(check_with(&mut w, "10.50001").unwrap(), Outcome::Fail);
    }

    #[test]
    fn unparseable_input_keeps_state() {
        let mut w = NumericWidget::new(spec(), &RenderEnv::detached());
        check_with(&mut w, "17.3").unwrap();
        let before = w.state();

        for input in ["", "abc", "m/s", "-"] {
            let err = check_with(&mut w, input).unwrap_err();
            assert!(matches!(err, QuizError::Parse { .. }));
            assert_eq!(w.state(), before);
            assert_eq!(w.feedback().html(), "⚠️ Enter a numeric value.");
        }
    }

    #[test]
    fn default_messages_use_precision_and_units() {
        let mut s = spec();
        s.units = r"\,\mathrm{m/s}".into();
        let mut w = NumericWidget::new(s, &RenderEnv::detached());

        check_with(&mut w, "17.4 m/s").unwrap();
        assert_eq!(
            w.feedback().html(),
            r"✅ Correct. Your answer $17.320\,\mathrm{m/s}$ is within tolerance."
        );

        check_with(&mut w, "3").unwrap();
        assert_eq!(
            w.feedback().html(),
            r"❌ Not quite. You entered $3.000\,\mathrm{m/s}$. Try again."
        );
        assert_eq!(w.state(), NumericState::Checked { value: 3.0, passed: false });
    }

    #[test]
    fn authored_snippets_win() {
        let mut s = spec();
        s.snippets = Snippets {
            correct: Some("nice".into()),
            wrong: Some("see the worked example".into()),
            reveal: Some("$\\sqrt{300}$".into()),
            ..Snippets::default()
        };
        let env = RenderEnv::detached();
        let mut w = NumericWidget::new(s, &env);

        check_with(&mut w, "17.32").unwrap();
        assert_eq!(w.feedback().html(), "nice");
        check_with(&mut w, "1").unwrap();
        assert_eq!(w.feedback().html(), "see the worked example");
        w.reveal(&env);
        assert_eq!(w.feedback().html(), "$\\sqrt{300}$");
    }

    #[test]
    fn reveal_shows_expected_value() {
        let env = RenderEnv::detached();
        let mut w = NumericWidget::new(spec(), &env);

        w.handle(WidgetEvent::Reveal, &env).unwrap();

        assert_eq!(w.feedback().html(), "Answer: $17.320$.");
        assert_eq!(w.feedback().outcome(), Outcome::Pass);
        assert_eq!(w.state(), NumericState::Revealed);
    }

    #[test]
    fn enter_key_checks() {
        let env = RenderEnv::detached();
        let mut w = NumericWidget::new(spec(), &env);

        w.handle(WidgetEvent::Input("17.3".into()), &env).unwrap();
        w.handle(WidgetEvent::Key(Key::Enter), &env).unwrap();

        assert_eq!(w.feedback().outcome(), Outcome::Pass);
        assert!(matches!(w.state(), NumericState::Checked { passed: true, .. }));
    }

    #[test]
    fn enter_without_focus_is_ignored() {
        let mut s = spec();
        s.initial_input = "17.3".into();
        let env = RenderEnv::detached();
        let mut w = NumericWidget::new(s, &env);
        assert!(!w.input_focused());

        w.handle(WidgetEvent::Key(Key::Enter), &env).unwrap();

        assert_eq!(w.state(), NumericState::Empty);
        assert_eq!(w.feedback().html(), PROMPT);

        w.handle(WidgetEvent::Check, &env).unwrap();
        assert!(matches!(w.state(), NumericState::Checked { passed: true, .. }));
    }

    #[test]
    fn reset_clears_input_and_focuses() {
        let env = RenderEnv::detached();
        let mut w = NumericWidget::new(spec(), &env);
        check_with(&mut w, "99").unwrap();

        w.handle(WidgetEvent::Reset, &env).unwrap();

        assert_eq!(w.input(), "");
        assert!(w.input_focused());
        assert_eq!(w.state(), NumericState::Empty);
        assert_eq!(w.feedback().html(), PROMPT);
        assert_eq!(w.feedback().css_class(), None);
    }
}

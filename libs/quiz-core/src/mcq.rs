//! Multiple-choice question widget.

use crate::error::{QuizError, Result};
use crate::feedback::{FeedbackRegion, RenderEnv};
use crate::height_sync::ResizeTrigger;
use crate::types::{ChoiceState, McqSpec, Outcome, ReselectionPolicy, WidgetEvent};

pub const PROMPT: &str = "Pick an option, then click <strong>Check</strong>.";
pub const NO_SELECTION: &str = "⚠️ Pick an option first.";
pub const DEFAULT_CORRECT: &str = "✅ Correct.";
pub const DEFAULT_WRONG: &str = "❌ Not quite. Try another option.";
pub const NO_SOLUTION: &str = "Solution not provided.";

/// Rendered state of one option button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChoiceView {
    pub state: ChoiceState,
    /// `aria-pressed`.
    pub pressed: bool,
}

/// Where the widget is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McqState {
    Unanswered { selected: Option<usize> },
    Answered { selected: usize, correct: bool },
    Revealed,
}

#[derive(Debug)]
pub struct McqWidget {
    spec: McqSpec,
    policy: ReselectionPolicy,
    choices: Vec<ChoiceView>,
    state: McqState,
    feedback: FeedbackRegion,
}

impl McqWidget {
    /// Wire up a validated card and show the neutral prompt.
    pub fn new(spec: McqSpec, policy: ReselectionPolicy, env: &RenderEnv<'_>) -> Self {
        let mut widget = Self {
            choices: vec![ChoiceView::default(); spec.choices.len()],
            spec,
            policy,
            state: McqState::Unanswered { selected: None },
            feedback: FeedbackRegion::default(),
        };
        widget.feedback.render(PROMPT, Outcome::Neutral, env);
        widget
    }

    pub fn state(&self) -> McqState {
        self.state
    }

    pub fn choices(&self) -> &[ChoiceView] {
        &self.choices
    }

    pub fn feedback(&self) -> &FeedbackRegion {
        &self.feedback
    }

    pub fn selected(&self) -> Option<usize> {
        match self.state {
            McqState::Unanswered { selected } => selected,
            McqState::Answered { selected, .. } => Some(selected),
            McqState::Revealed => None,
        }
    }

    /// Dispatch a user event.
    pub fn handle(&mut self, event: WidgetEvent, env: &RenderEnv<'_>) -> Result<()> {
        match event {
            WidgetEvent::Select(index) => self.select_choice(index, env),
            WidgetEvent::Check => self.check(env).map(|_| ())?,
            WidgetEvent::Reveal if self.spec.controls.reveal => self.reveal(env),
            WidgetEvent::Reveal => tracing::debug!("card has no reveal control"),
            WidgetEvent::Reset => self.reset(env),
            WidgetEvent::Input(_) | WidgetEvent::Key(_) => {}
        }
        Ok(())
    }

    pub fn select_choice(&mut self, index: usize, env: &RenderEnv<'_>) {
        if index >= self.choices.len() {
            tracing::warn!(index, count = self.choices.len(), "ignoring unknown choice");
            return;
        }

        let evaluated = matches!(
            self.state,
            McqState::Answered { .. } | McqState::Revealed
        );
        if evaluated && self.policy == ReselectionPolicy::Revert {
            self.feedback.render(PROMPT, Outcome::Neutral, env);
        }

        self.clear_choices();
        self.choices[index] = ChoiceView {
            state: ChoiceState::Selected,
            pressed: true,
        };
        self.state = McqState::Unanswered {
            selected: Some(index),
        };
        env.request_resize(ResizeTrigger::Mutation);
    }

    /// Grade the current selection. Only the selected option is colored.
    pub fn check(&mut self, env: &RenderEnv<'_>) -> Result<Outcome> {
        let Some(selected) = self.selected() else {
            self.feedback.render(NO_SELECTION, Outcome::Fail, env);
            return Err(QuizError::NoSelection);
        };

        let correct = selected == self.spec.correct_index;
        for choice in &mut self.choices {
            if matches!(choice.state, ChoiceState::Correct | ChoiceState::Wrong) {
                choice.state = ChoiceState::Neutral;
            }
        }
        self.choices[selected].state = if correct {
            ChoiceState::Correct
        } else {
            ChoiceState::Wrong
        };

        let snippets = &self.spec.snippets;
        let html = if correct {
            snippets.correct.as_deref().unwrap_or(DEFAULT_CORRECT)
        } else {
            snippets
                .wrong_by_choice
                .get(&selected)
                .or(snippets.wrong.as_ref())
                .map(String::as_str)
                .unwrap_or(DEFAULT_WRONG)
        }
        .to_string();

        let outcome = Outcome::from_passed(correct);
        self.feedback.render(html, outcome, env);
        self.state = McqState::Answered { selected, correct };
        Ok(outcome)
    }

    /// Show the solution: only the correct option is highlighted.
    pub fn reveal(&mut self, env: &RenderEnv<'_>) {
        self.clear_choices();
        if let Some(choice) = self.choices.get_mut(self.spec.correct_index) {
            choice.state = ChoiceState::Correct;
        }
        let html = self
            .spec
            .snippets
            .reveal
            .clone()
            .unwrap_or_else(|| NO_SOLUTION.to_string());
        self.feedback.render(html, Outcome::Pass, env);
        self.state = McqState::Revealed;
    }

    pub fn reset(&mut self, env: &RenderEnv<'_>) {
        self.clear_choices();
        self.state = McqState::Unanswered { selected: None };
        self.feedback.render(PROMPT, Outcome::Neutral, env);
    }

    fn clear_choices(&mut self) {
        self.choices.fill(ChoiceView::default());
    }
}

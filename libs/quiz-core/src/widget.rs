//! Card slots: markup plus the widget wired into it.

use crate::error::{Result, StructuralError};
use crate::feedback::{FeedbackRegion, RenderEnv};
use crate::markup::{parse_card, CardMarkup};
use crate::mcq::McqWidget;
use crate::numeric::NumericWidget;
use crate::types::{CardKind, CardSpec, ReselectionPolicy, WidgetEvent};

/// A live widget of either kind.
#[derive(Debug)]
pub enum Widget {
    Mcq(McqWidget),
    Numeric(NumericWidget),
}

impl Widget {
    pub fn from_spec(spec: CardSpec, policy: ReselectionPolicy, env: &RenderEnv<'_>) -> Self {
        match spec {
            CardSpec::Mcq(spec) => Self::Mcq(McqWidget::new(spec, policy, env)),
            CardSpec::Numeric(spec) => Self::Numeric(NumericWidget::new(spec, env)),
        }
    }

    pub fn kind(&self) -> CardKind {
        match self {
            Self::Mcq(_) => CardKind::Mcq,
            Self::Numeric(_) => CardKind::Numeric,
        }
    }

    pub fn feedback(&self) -> &FeedbackRegion {
        match self {
            Self::Mcq(w) => w.feedback(),
            Self::Numeric(w) => w.feedback(),
        }
    }

    pub fn handle(&mut self, event: WidgetEvent, env: &RenderEnv<'_>) -> Result<()> {
        match self {
            Self::Mcq(w) => w.handle(event, env),
            Self::Numeric(w) => w.handle(event, env),
        }
    }
}

/// One card element on the page or in a deck.
///
/// Wiring happens once, on the first `initialize`. A card whose markup fails
/// validation stays inert and keeps the reason.
#[derive(Debug)]
pub struct Card {
    kind: Option<CardKind>,
    html: String,
    widget: Option<Widget>,
    inert: Option<StructuralError>,
    initialized: bool,
    hidden: bool,
}

impl Card {
    pub fn new(markup: CardMarkup) -> Self {
        Self {
            kind: markup.kind,
            html: markup.html,
            widget: None,
            inert: None,
            initialized: false,
            hidden: false,
        }
    }

    pub fn kind(&self) -> Option<CardKind> {
        self.kind
    }

    /// Card HTML, with math rendered once the card is initialized.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn widget(&self) -> Option<&Widget> {
        self.widget.as_ref()
    }

    pub fn widget_mut(&mut self) -> Option<&mut Widget> {
        self.widget.as_mut()
    }

    /// Why the card could not be wired, if it could not.
    pub fn inert_reason(&self) -> Option<&StructuralError> {
        self.inert.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Validate the markup and wire the widget. Later calls do nothing.
    ///
    /// Returns `true` if this call did the wiring.
    pub fn initialize(&mut self, policy: ReselectionPolicy, env: &RenderEnv<'_>) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;

        match parse_card(&self.html) {
            Ok(spec) => {
                tracing::debug!(kind = spec.kind().class_name(), "quiz card wired");
                self.widget = Some(Widget::from_spec(spec, policy, env));
            }
            Err(e) => {
                tracing::warn!(error = %e, "quiz card left inert");
                self.inert = Some(e);
            }
        }
        self.render_math(env);
        true
    }

    pub fn render_math(&mut self, env: &RenderEnv<'_>) {
        env.render_math(&mut self.html);
    }

    /// Forward an event to the widget. Inert cards ignore events.
    pub fn handle(&mut self, event: WidgetEvent, env: &RenderEnv<'_>) -> Result<()> {
        match self.widget.as_mut() {
            Some(widget) => widget.handle(event, env),
            None => {
                tracing::debug!(?event, "event for inert card ignored");
                Ok(())
            }
        }
    }
}

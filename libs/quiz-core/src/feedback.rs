//! Feedback regions and the rendering environment widgets draw into.

use crate::height_sync::{ResizeNotifier, ResizeTrigger};
use crate::types::Outcome;
use thiserror::Error;

/// Math delimiter pair passed to the math renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub left: &'static str,
    pub right: &'static str,
    pub display: bool,
}

/// Options handed to the math renderer on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathOptions {
    pub delimiters: Vec<Delimiter>,
    pub throw_on_error: bool,
}

impl Default for MathOptions {
    fn default() -> Self {
        Self {
            delimiters: vec![
                Delimiter { left: "$$", right: "$$", display: true },
                Delimiter { left: "\\[", right: "\\]", display: true },
                Delimiter { left: "$", right: "$", display: false },
                Delimiter { left: "\\(", right: "\\)", display: false },
            ],
            throw_on_error: false,
        }
    }
}

#[derive(Debug, Error)]
#[error("math rendering failed: {0}")]
pub struct MathRenderError(pub String);

/// External math typesetter (KaTeX auto-render or similar).
///
/// Renders the math inside `html` in place.
pub trait MathRenderer {
    fn render(&self, html: &mut String, options: &MathOptions) -> Result<(), MathRenderError>;
}

/// Collaborators available while widgets update themselves.
///
/// Both are optional: a page without a math renderer, or one that is not
/// embedded in an iframe, works the same minus those effects.
#[derive(Clone, Copy, Default)]
pub struct RenderEnv<'a> {
    math: Option<&'a dyn MathRenderer>,
    resize: Option<&'a dyn ResizeNotifier>,
}

impl<'a> RenderEnv<'a> {
    /// Environment with no math renderer and no height sync.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_math(mut self, math: &'a dyn MathRenderer) -> Self {
        self.math = Some(math);
        self
    }

    pub fn with_resize(mut self, resize: &'a dyn ResizeNotifier) -> Self {
        self.resize = Some(resize);
        self
    }

    /// Render math inside `html`. Failures are logged and the content is kept.
    pub fn render_math(&self, html: &mut String) {
        let Some(math) = self.math else {
            return;
        };
        if let Err(e) = math.render(html, &MathOptions::default()) {
            tracing::warn!(error = %e, "math rendering failed");
        }
    }

    pub fn request_resize(&self, trigger: ResizeTrigger) {
        if let Some(resize) = self.resize {
            resize.request_resize(trigger);
        }
    }
}

/// The `.feedback` area of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackRegion {
    html: String,
    outcome: Outcome,
}

impl FeedbackRegion {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Class currently applied to the region (`ok`, `bad`, or none).
    pub fn css_class(&self) -> Option<&'static str> {
        self.outcome.css_class()
    }

    /// Replace the content and styling, then typeset math and request a height post.
    pub fn render(&mut self, html: impl Into<String>, outcome: Outcome, env: &RenderEnv<'_>) {
        self.outcome = outcome;
        self.html = html.into();
        env.render_math(&mut self.html);
        env.request_resize(ResizeTrigger::Mutation);
    }
}

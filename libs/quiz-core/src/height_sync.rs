//! Iframe height synchronization.
//!
//! A quiz embedded in an iframe reports its content height to the parent page
//! so the parent can size the iframe without scrollbars:
//!
//! ```text
//! child  -> parent  {"type": "quiz-iframe-height", "height": 812}
//! parent -> child   {"type": "quiz-iframe-request-height"}
//! ```
//!
//! The child side coalesces every resize trigger into at most one post per
//! animation frame. The parent side matches messages to iframes purely by the
//! identity of the sending window.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::Cell;
use uuid::Uuid;

pub const HEIGHT_MESSAGE: &str = "quiz-iframe-height";
pub const REQUEST_HEIGHT_MESSAGE: &str = "quiz-iframe-request-height";

/// Class that marks an iframe as a resizable quiz host.
pub const QUIZ_IFRAME_CLASS: &str = "quiz-iframe";

/// Messages exchanged between a quiz iframe and its parent.
///
/// The serde form is strict: `height` must be a JSON number. Messages posted
/// by other windows go through [`HeightMessage::from_value`], which also
/// accepts numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HeightMessage {
    #[serde(rename = "quiz-iframe-height")]
    Height { height: f64 },
    #[serde(rename = "quiz-iframe-request-height")]
    RequestHeight,
}

impl HeightMessage {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Read a message posted by another window.
    ///
    /// Unknown shapes yield `None`. The height is coerced the way a browser's
    /// `Number()` would (numbers, or strings that read as numbers) and is not
    /// range-checked here; see [`HeightMessage::valid_height`].
    pub fn from_value(data: &Value) -> Option<Self> {
        match data.get("type")?.as_str()? {
            HEIGHT_MESSAGE => Some(Self::Height {
                height: coerce_number(data.get("height")?),
            }),
            REQUEST_HEIGHT_MESSAGE => Some(Self::RequestHeight),
            _ => None,
        }
    }

    /// Height in whole pixels, if this is a height message with a finite positive value.
    pub fn valid_height(&self) -> Option<u32> {
        match self {
            Self::Height { height } if height.is_finite() && *height > 0.0 => {
                Some(height.ceil().min(u32::MAX as f64) as u32)
            }
            _ => None,
        }
    }
}

fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        _ => f64::NAN,
    }
}

/// Why a height post was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTrigger {
    /// Document content changed (feedback, navigation, selection).
    Mutation,
    /// The iframe's own viewport changed.
    WindowResize,
    /// The parent asked for the current height.
    ParentRequest,
    /// Follow-up after load or an interaction, once layout has settled.
    Settle,
}

/// Something that wants to hear about layout changes.
pub trait ResizeNotifier {
    fn request_resize(&self, trigger: ResizeTrigger);
}

/// The parent window as seen from inside the iframe.
pub trait ParentWindow {
    fn post_message(&self, message: &Value, target_origin: &str);
}

/// Child side of the height protocol.
///
/// Holds its own pending-frame flag, so several embedded contexts can run
/// independently.
pub struct HeightSyncChannel<P> {
    parent: Option<P>,
    frame_pending: Cell<bool>,
}

impl<P: ParentWindow> HeightSyncChannel<P> {
    /// Channel for a document running inside an iframe.
    pub fn embedded(parent: P) -> Self {
        Self {
            parent: Some(parent),
            frame_pending: Cell::new(false),
        }
    }

    /// Channel for a top-level document. Every operation is a no-op.
    pub fn top_level() -> Self {
        Self {
            parent: None,
            frame_pending: Cell::new(false),
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.parent.is_some()
    }

    /// Queue the initial post after the document loads.
    pub fn initialize(&self) {
        self.schedule(ResizeTrigger::Settle);
    }

    /// Ask for a post on the next animation frame.
    ///
    /// Returns `true` if a new frame was scheduled, `false` if one was already
    /// pending or the document is not embedded.
    pub fn schedule(&self, trigger: ResizeTrigger) -> bool {
        if !self.is_embedded() {
            return false;
        }
        if self.frame_pending.replace(true) {
            return false;
        }
        tracing::trace!(?trigger, "height post scheduled");
        true
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frame_pending.get()
    }

    /// Run the pending frame callback with the document's current scroll height.
    ///
    /// Posts at most once per scheduled frame and returns the posted message.
    pub fn on_animation_frame(&self, scroll_height: f64) -> Option<HeightMessage> {
        let parent = self.parent.as_ref()?;
        if !self.frame_pending.replace(false) {
            return None;
        }

        let message = HeightMessage::Height {
            height: scroll_height.ceil(),
        };
        tracing::debug!(height = scroll_height.ceil(), "posting iframe height");
        parent.post_message(&message.to_value(), "*");
        Some(message)
    }

    /// Handle a message from the parent window.
    pub fn handle_parent_message(&self, data: &Value) {
        if let Some(HeightMessage::RequestHeight) = HeightMessage::from_value(data) {
            self.schedule(ResizeTrigger::ParentRequest);
        }
    }
}

impl<P: ParentWindow> ResizeNotifier for HeightSyncChannel<P> {
    fn request_resize(&self, trigger: ResizeTrigger) {
        self.schedule(trigger);
    }
}

/// Identity of a browsing context (an iframe's content window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

/// An iframe element on the parent page.
#[derive(Debug, Clone)]
pub struct HostedFrame {
    pub classes: Vec<String>,
    pub content_window: Option<WindowId>,
    height_px: Option<u32>,
}

impl HostedFrame {
    pub fn new(classes: &[&str], content_window: Option<WindowId>) -> Self {
        Self {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            content_window,
            height_px: None,
        }
    }

    /// Iframe marked with the quiz class.
    pub fn quiz(content_window: WindowId) -> Self {
        Self::new(&[QUIZ_IFRAME_CLASS], Some(content_window))
    }

    pub fn is_quiz_frame(&self) -> bool {
        self.classes.iter().any(|c| c == QUIZ_IFRAME_CLASS)
    }

    pub fn height_px(&self) -> Option<u32> {
        self.height_px
    }

    /// Inline style value for the height, e.g. `"813px"`.
    pub fn style_height(&self) -> Option<String> {
        self.height_px.map(|px| format!("{px}px"))
    }
}

/// Parent side of the height protocol.
#[derive(Debug, Default)]
pub struct IframeSizer {
    frames: Vec<HostedFrame>,
}

impl IframeSizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_frame(&mut self, frame: HostedFrame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    pub fn frames(&self) -> &[HostedFrame] {
        &self.frames
    }

    /// Apply a message received from `source`. Returns how many iframes were resized.
    pub fn handle_message(&mut self, source: WindowId, data: &Value) -> usize {
        let Some(height) = HeightMessage::from_value(data)
            .as_ref()
            .and_then(HeightMessage::valid_height)
        else {
            return 0;
        };

        let mut resized = 0;
        for frame in &mut self.frames {
            if frame.is_quiz_frame() && frame.content_window == Some(source) {
                frame.height_px = Some(height);
                resized += 1;
            }
        }
        resized
    }

    /// Height requests for every quiz iframe, e.g. after the parent window resizes.
    pub fn request_heights(&self) -> Vec<(WindowId, Value)> {
        self.frames
            .iter()
            .filter(|f| f.is_quiz_frame())
            .filter_map(|f| f.content_window)
            .map(|w| (w, HeightMessage::RequestHeight.to_value()))
            .collect()
    }
}

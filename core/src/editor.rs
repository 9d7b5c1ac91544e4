use std::sync::Arc;

use assist_protocol::Range;
use tokio::sync::broadcast;

/// Signals observed on the host editor. Fanned out over a broadcast channel
/// so the trigger detector and the model-swap listener each get their own
/// subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    MouseDown,
    /// `target` names the widget element under the pointer, when the host
    /// can tell. Mouse-ups landing on the session's own content widget must
    /// not re-arm the trigger.
    MouseUp { target: Option<String> },
    SelectionChanged,
    /// The editor is about to swap its backing model; any bound session is
    /// invalid from this point.
    WillChangeModel,
}

/// A single replace operation against a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub text: String,
}

/// The editor's text buffer. Lines and columns are 1-based.
pub trait TextModel: Send + Sync {
    fn line_count(&self) -> u32;

    /// One past the last column of `line` (1 for out-of-range lines).
    fn line_max_column(&self, line: u32) -> u32;

    fn get_value(&self) -> String;

    fn get_value_in_range(&self, range: Range) -> String;

    fn set_value(&self, text: &str);

    fn push_edit_operations(&self, edits: Vec<TextEdit>);
}

/// The host editor a handler is contributed to.
pub trait Editor: Send + Sync {
    /// Current selection, `None` when the editor has no cursor.
    fn get_selection(&self) -> Option<Range>;

    fn set_selection(&self, range: Range);

    fn model(&self) -> Option<Arc<dyn TextModel>>;

    /// Pixel height of one rendered line, used to push the content widget
    /// below an overflowing diff view.
    fn line_height(&self) -> u32;

    fn events(&self) -> broadcast::Receiver<EditorEvent>;
}

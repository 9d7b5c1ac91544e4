use std::sync::Arc;

use assist_protocol::ActionSource;
use assist_protocol::Position;
use assist_protocol::Range;

use crate::editor::Editor;
use crate::editor::TextModel;

/// Mouse-up targets reporting this id belong to the session's own content
/// widget; clicks there must not re-arm the auto-show trigger.
pub const CONTENT_WIDGET_ID: &str = "inline-assist-content-widget";

/// A click on one of the content widget's registered actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionClick {
    pub action_id: String,
    pub source: ActionSource,
}

/// The host's original-vs-proposed diff widget, anchored below a selection.
pub trait DiffView: Send + Sync {
    fn create(&self);

    /// `start_line` is 0-based here (one line of context above the
    /// selection, one below); `line_count` is the number of lines to
    /// reveal.
    fn show_by_line(&self, start_line: u32, line_count: u32);

    /// The proposed-edit buffer, available once the widget is ready.
    fn modified_model(&self) -> Option<Arc<dyn TextModel>>;

    fn layout(&self);

    /// Resolves once the widget has built its proposed-edit buffer.
    fn on_ready(&self) -> async_channel::Receiver<()>;

    /// Fires when the rendered diff grows, with its current line count.
    fn on_max_line_count(&self) -> async_channel::Receiver<u32>;

    fn dispose(&self);
}

/// The floating action bar bound to the session's selection.
pub trait ContentWidget: Send + Sync {
    fn show(&self, selection: Range);

    fn set_position(&self, position: Position);

    fn layout(&self);

    /// Push the widget down by `px` pixels, clearing an overflowing diff.
    fn offset_top(&self, px: u32);

    fn on_action_click(&self) -> async_channel::Receiver<ActionClick>;

    fn dispose(&self);
}

/// Creates the per-session widgets. The host wires these to its rendering
/// layer; the orchestrator only drives their lifecycle.
pub trait WidgetFactory: Send + Sync {
    fn create_diff_view(&self, editor: &Arc<dyn Editor>, selection: Range) -> Arc<dyn DiffView>;

    fn create_content_widget(&self, editor: &Arc<dyn Editor>) -> Arc<dyn ContentWidget>;
}

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use assist_core::config::AssistConfig;
use assist_core::config::PreferenceStore;
use assist_core::editor::Editor;
use assist_core::editor::EditorEvent;
use assist_core::editor::TextModel;
use assist_core::model::InMemoryModel;
use assist_core::protocol::EndReport;
use assist_core::protocol::Position;
use assist_core::protocol::Range;
use assist_core::protocol::StartReport;
use assist_core::registry::FeatureRegistry;
use assist_core::session::InlineAssistHandler;
use assist_core::telemetry::RelationId;
use assist_core::telemetry::Reporter;
use assist_core::widget::ActionClick;
use assist_core::widget::ContentWidget;
use assist_core::widget::DiffView;
use assist_core::widget::WidgetFactory;
use tokio::sync::broadcast;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lets every spawned subscription task on the current-thread runtime run
/// to its next await point.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub struct FakeEditor {
    selection: Mutex<Option<Range>>,
    model: Arc<InMemoryModel>,
    events_tx: broadcast::Sender<EditorEvent>,
    line_height: u32,
}

impl FakeEditor {
    pub fn new(text: &str, selection: Option<Range>) -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            selection: Mutex::new(selection),
            model: Arc::new(InMemoryModel::new(text)),
            events_tx,
            line_height: 20,
        })
    }

    pub fn emit(&self, event: EditorEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn value(&self) -> String {
        self.model.get_value()
    }
}

impl Editor for FakeEditor {
    fn get_selection(&self) -> Option<Range> {
        *lock(&self.selection)
    }

    fn set_selection(&self, range: Range) {
        *lock(&self.selection) = Some(range);
    }

    fn model(&self) -> Option<Arc<dyn TextModel>> {
        Some(Arc::clone(&self.model) as Arc<dyn TextModel>)
    }

    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn events(&self) -> broadcast::Receiver<EditorEvent> {
        self.events_tx.subscribe()
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub starts: Mutex<Vec<StartReport>>,
    pub ends: Mutex<Vec<(RelationId, EndReport)>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn starts(&self) -> Vec<StartReport> {
        lock(&self.starts).clone()
    }

    pub fn ends(&self) -> Vec<(RelationId, EndReport)> {
        lock(&self.ends).clone()
    }

    /// End reports carrying a terminal status (success is set).
    pub fn terminal_ends(&self) -> Vec<(RelationId, EndReport)> {
        self.ends()
            .into_iter()
            .filter(|(_, report)| report.success.is_some())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn start(&self, report: StartReport) -> RelationId {
        lock(&self.starts).push(report);
        RelationId::new()
    }

    fn end(&self, relation: &RelationId, report: EndReport) {
        lock(&self.ends).push((relation.clone(), report));
    }
}

pub struct FakeDiffView {
    pub modified: Arc<InMemoryModel>,
    ready_tx: async_channel::Sender<()>,
    ready_rx: async_channel::Receiver<()>,
    max_lines_tx: async_channel::Sender<u32>,
    max_lines_rx: async_channel::Receiver<u32>,
    pub shown: Mutex<Option<(u32, u32)>>,
    pub disposed: AtomicBool,
}

impl FakeDiffView {
    fn new() -> Arc<Self> {
        let (ready_tx, ready_rx) = async_channel::unbounded();
        let (max_lines_tx, max_lines_rx) = async_channel::unbounded();
        Arc::new(Self {
            modified: Arc::new(InMemoryModel::new("")),
            ready_tx,
            ready_rx,
            max_lines_tx,
            max_lines_rx,
            shown: Mutex::new(None),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn emit_max_line_count(&self, count: u32) {
        let _ = self.max_lines_tx.try_send(count);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn shown_at(&self) -> Option<(u32, u32)> {
        *lock(&self.shown)
    }
}

impl DiffView for FakeDiffView {
    fn create(&self) {
        // The fake buffer is ready as soon as the widget exists.
        let _ = self.ready_tx.try_send(());
    }

    fn show_by_line(&self, start_line: u32, line_count: u32) {
        *lock(&self.shown) = Some((start_line, line_count));
    }

    fn modified_model(&self) -> Option<Arc<dyn TextModel>> {
        Some(Arc::clone(&self.modified) as Arc<dyn TextModel>)
    }

    fn layout(&self) {}

    fn on_ready(&self) -> async_channel::Receiver<()> {
        self.ready_rx.clone()
    }

    fn on_max_line_count(&self) -> async_channel::Receiver<u32> {
        self.max_lines_rx.clone()
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}

pub struct FakeContentWidget {
    pub shown: Mutex<Option<Range>>,
    pub position: Mutex<Option<Position>>,
    pub offset: Mutex<Option<u32>>,
    clicks_tx: async_channel::Sender<ActionClick>,
    clicks_rx: async_channel::Receiver<ActionClick>,
    pub disposed: AtomicBool,
}

impl FakeContentWidget {
    fn new() -> Arc<Self> {
        let (clicks_tx, clicks_rx) = async_channel::unbounded();
        Arc::new(Self {
            shown: Mutex::new(None),
            position: Mutex::new(None),
            offset: Mutex::new(None),
            clicks_tx,
            clicks_rx,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn click(&self, click: ActionClick) {
        let _ = self.clicks_tx.try_send(click);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn position(&self) -> Option<Position> {
        *lock(&self.position)
    }

    pub fn offset(&self) -> Option<u32> {
        *lock(&self.offset)
    }
}

impl ContentWidget for FakeContentWidget {
    fn show(&self, selection: Range) {
        *lock(&self.shown) = Some(selection);
    }

    fn set_position(&self, position: Position) {
        *lock(&self.position) = Some(position);
    }

    fn layout(&self) {}

    fn offset_top(&self, px: u32) {
        *lock(&self.offset) = Some(px);
    }

    fn on_action_click(&self) -> async_channel::Receiver<ActionClick> {
        self.clicks_rx.clone()
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}

/// Hands out fakes and keeps every created widget reachable for
/// inspection.
#[derive(Default)]
pub struct FakeWidgetFactory {
    pub diff_views: Mutex<Vec<Arc<FakeDiffView>>>,
    pub content_widgets: Mutex<Vec<Arc<FakeContentWidget>>>,
}

impl FakeWidgetFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn diff_views(&self) -> Vec<Arc<FakeDiffView>> {
        lock(&self.diff_views).clone()
    }

    pub fn content_widgets(&self) -> Vec<Arc<FakeContentWidget>> {
        lock(&self.content_widgets).clone()
    }

    pub fn last_diff_view(&self) -> Arc<FakeDiffView> {
        lock(&self.diff_views).last().cloned().unwrap()
    }

    pub fn last_content_widget(&self) -> Arc<FakeContentWidget> {
        lock(&self.content_widgets).last().cloned().unwrap()
    }
}

impl WidgetFactory for FakeWidgetFactory {
    fn create_diff_view(&self, _editor: &Arc<dyn Editor>, _selection: Range) -> Arc<dyn DiffView> {
        let diff = FakeDiffView::new();
        lock(&self.diff_views).push(Arc::clone(&diff));
        diff as Arc<dyn DiffView>
    }

    fn create_content_widget(&self, _editor: &Arc<dyn Editor>) -> Arc<dyn ContentWidget> {
        let widget = FakeContentWidget::new();
        lock(&self.content_widgets).push(Arc::clone(&widget));
        widget as Arc<dyn ContentWidget>
    }
}

pub struct Harness {
    pub editor: Arc<FakeEditor>,
    pub registry: Arc<FeatureRegistry>,
    pub widgets: Arc<FakeWidgetFactory>,
    pub reporter: Arc<RecordingReporter>,
    pub preferences: Arc<PreferenceStore>,
    pub handler: Arc<InlineAssistHandler>,
}

impl Harness {
    pub fn new(text: &str, selection: Option<Range>) -> Self {
        Self::with_config(text, selection, AssistConfig::default())
    }

    pub fn with_config(text: &str, selection: Option<Range>, config: AssistConfig) -> Self {
        let editor = FakeEditor::new(text, selection);
        let registry = Arc::new(FeatureRegistry::new());
        let widgets = FakeWidgetFactory::new();
        let reporter = RecordingReporter::new();
        let preferences = Arc::new(PreferenceStore::new());
        let handler = InlineAssistHandler::new(
            Arc::clone(&editor) as Arc<dyn Editor>,
            Arc::clone(&registry),
            Arc::clone(&widgets) as Arc<dyn WidgetFactory>,
            Arc::clone(&reporter) as Arc<dyn Reporter>,
            Arc::clone(&preferences),
            config,
        );
        handler.contribute();
        Self {
            editor,
            registry,
            widgets,
            reporter,
            preferences,
            handler,
        }
    }
}

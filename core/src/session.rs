//! The inline assist session orchestrator.
//!
//! One [`InlineAssistHandler`] is contributed per editor. It owns at most
//! one live session at a time and coordinates the trigger detector, the
//! strategy runner, the diff stream applier and the resource groups that
//! make teardown atomic from every exit path.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Instant;

use assist_protocol::ActionSource;
use assist_protocol::ChatStatus;
use assist_protocol::EndReport;
use assist_protocol::Range;
use assist_protocol::StartReport;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::AssistConfig;
use crate::config::PreferenceStore;
use crate::disposables::DisposableGroup;
use crate::editor::Editor;
use crate::editor::EditorEvent;
use crate::editor::TextEdit;
use crate::error::AssistError;
use crate::registry::ActionHandler;
use crate::registry::FeatureRegistry;
use crate::registry::StrategyFn;
use crate::telemetry::RelationId;
use crate::telemetry::Reporter;
use crate::widget::ActionClick;
use crate::widget::ContentWidget;
use crate::widget::DiffView;
use crate::widget::WidgetFactory;

mod applier;
mod runner;
mod trigger;

pub use trigger::TRIGGER_DEBOUNCE;

/// Commands emitted by the session UI (the content widget's buttons).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Accept,
    Discard,
    Regenerate,
    Thumbs { is_like: bool },
}

/// Telemetry context for one strategy invocation.
#[derive(Debug, Clone)]
pub(crate) struct ReportCtx {
    pub(crate) relation_id: RelationId,
    pub(crate) start_time: Instant,
    pub(crate) is_retry: bool,
}

struct SessionState {
    status: ChatStatus,
    in_use: bool,
    cancel: CancellationToken,
    content_widget: Option<Arc<dyn ContentWidget>>,
    diff_view: Option<Arc<dyn DiffView>>,
    /// Lives for the whole visible session; owns `operation` transitively.
    primary: Arc<DisposableGroup>,
    /// Lives for one strategy invocation.
    operation: Arc<DisposableGroup>,
}

impl SessionState {
    fn new() -> Self {
        let primary = Arc::new(DisposableGroup::new());
        let operation = Arc::new(DisposableGroup::new());
        primary.add_child(Arc::clone(&operation));
        Self {
            status: ChatStatus::Ready,
            in_use: false,
            cancel: CancellationToken::new(),
            content_widget: None,
            diff_view: None,
            primary,
            operation,
        }
    }
}

/// Drives a single interactive "rewrite this selection" session bound to
/// one editor. All entry points are infallible from the caller's point of
/// view: precondition misses are skips, strategy failures become the
/// `Error` status.
pub struct InlineAssistHandler {
    editor: Arc<dyn Editor>,
    registry: Arc<FeatureRegistry>,
    widgets: Arc<dyn WidgetFactory>,
    reporter: Arc<dyn Reporter>,
    preferences: Arc<PreferenceStore>,
    config: AssistConfig,
    commands_tx: broadcast::Sender<SessionCommand>,
    /// Subscriptions alive for the whole contribution (trigger detector,
    /// model-swap and code-action listeners), independent of any session.
    contribution: Arc<DisposableGroup>,
    state: Mutex<SessionState>,
}

impl InlineAssistHandler {
    pub fn new(
        editor: Arc<dyn Editor>,
        registry: Arc<FeatureRegistry>,
        widgets: Arc<dyn WidgetFactory>,
        reporter: Arc<dyn Reporter>,
        preferences: Arc<PreferenceStore>,
        config: AssistConfig,
    ) -> Arc<Self> {
        let (commands_tx, _) = broadcast::channel(32);
        Arc::new(Self {
            editor,
            registry,
            widgets,
            reporter,
            preferences,
            config,
            commands_tx,
            contribution: Arc::new(DisposableGroup::new()),
            state: Mutex::new(SessionState::new()),
        })
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> ChatStatus {
        self.state().status
    }

    pub fn is_in_use(&self) -> bool {
        self.state().in_use
    }

    /// Entry point for the widget's accept/discard/regenerate/thumbs
    /// buttons. Commands land on subscriptions wired per invocation; with
    /// no session running they fall on the floor.
    pub fn dispatch(&self, command: SessionCommand) {
        let _ = self.commands_tx.send(command);
    }

    /// Wires the editor-facing subscriptions and returns the group that
    /// tears the whole contribution down.
    pub fn contribute(self: &Arc<Self>) -> Arc<DisposableGroup> {
        // A model swap invalidates the selection the session is bound to.
        let mut events = self.editor.events();
        let this = Arc::clone(self);
        self.contribution.add_task(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(EditorEvent::WillChangeModel) => this.dispose_session(),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));

        // Registered actions can also be launched through code actions.
        let code_actions = self.registry.on_code_action_run();
        let this = Arc::clone(self);
        self.contribution.add_task(tokio::spawn(async move {
            while let Ok(run) = code_actions.recv().await {
                this.editor.set_selection(run.range);
                this.show().await;
                // show() may have rejected (capability off, already in
                // use); only a started session runs the action.
                if !this.is_in_use() {
                    continue;
                }
                this.run_action(ActionClick {
                    action_id: run.action_id,
                    source: ActionSource::CodeAction,
                })
                .await;
            }
        }));

        self.spawn_trigger_detector();

        Arc::clone(&self.contribution)
    }

    /// Visibility toggle sink. Off cancels the in-flight strategy (if any)
    /// and tears the session down unconditionally.
    pub async fn set_visible(self: &Arc<Self>, visible: bool) {
        if visible {
            self.show().await;
        } else {
            let token = self.state().cancel.clone();
            token.cancel();
            self.dispose_session();
        }
    }

    /// Starts a session on the current selection. No-op when the
    /// capability is disabled or a session is already in use; an empty
    /// selection tears down any partial widget state and exits.
    pub async fn show(self: &Arc<Self>) {
        if !self.config.supports_inline_assist {
            tracing::debug!("inline assist capability disabled");
            return;
        }
        if self.state().in_use {
            tracing::debug!("inline assist session already in use");
            return;
        }

        self.dispose_session();

        let selection = self.editor.get_selection();
        let Some(selection) = selection.filter(|s| !s.is_empty()) else {
            tracing::debug!("selection empty, not starting inline assist");
            self.dispose_session();
            return;
        };

        let widget = self.widgets.create_content_widget(&self.editor);
        widget.show(selection);
        let clicks = widget.on_action_click();

        let primary = {
            let mut state = self.state();
            state.in_use = true;
            state.status = ChatStatus::Ready;
            state.cancel = CancellationToken::new();
            state.content_widget = Some(widget);
            let fresh = SessionState::new();
            state.primary = fresh.primary;
            state.operation = fresh.operation;
            Arc::clone(&state.primary)
        };

        let this = Arc::clone(self);
        primary.add_task(tokio::spawn(async move {
            while let Ok(click) = clicks.recv().await {
                // Each run gets its own task: teardown aborts this click
                // loop but never an invocation mid-await, so the invocation
                // always reaches its status conversion and end report.
                let this = Arc::clone(&this);
                tokio::spawn(async move {
                    this.run_action(click).await;
                });
            }
        }));
    }

    /// Dispatches a clicked action to its registered handler.
    pub async fn run_action(self: &Arc<Self>, click: ActionClick) {
        if let Err(err) = self.try_run_action(click).await {
            tracing::debug!("inline assist action skipped: {err}");
        }
    }

    async fn try_run_action(self: &Arc<Self>, click: ActionClick) -> Result<(), AssistError> {
        let ActionClick { action_id, source } = click;
        let handler = self
            .registry
            .editor_handler(&action_id)
            .ok_or_else(|| AssistError::UnknownAction(action_id.clone()))?;
        let action = self
            .registry
            .action(&action_id)
            .ok_or(AssistError::UnknownAction(action_id))?;

        let selection = self
            .editor
            .get_selection()
            .ok_or(AssistError::NoSelection)?;

        match handler {
            ActionHandler::Execute(execute) => {
                // Fire-and-forget editor mutation, no diff preview.
                execute(Arc::clone(&self.editor)).await;
                self.dispose_session();
            }
            ActionHandler::DiffPreview(strategy) => {
                let cross_selection = self.cross_selection(selection)?;
                let relation_id = self.reporter.start(StartReport {
                    name: action.name.clone(),
                    message: action.name,
                    source,
                    run_by_code_action: source.is_code_action(),
                });

                self.run_diff_preview_strategy(
                    Arc::clone(&strategy),
                    cross_selection,
                    relation_id.clone(),
                    false,
                )
                .await;

                self.wire_session_commands(strategy, cross_selection, relation_id);
            }
        }
        Ok(())
    }

    /// Discard/regenerate stay wired for the whole visible session, across
    /// regenerated invocations, so they live in the primary group.
    fn wire_session_commands(
        self: &Arc<Self>,
        strategy: StrategyFn,
        cross_selection: Range,
        relation_id: RelationId,
    ) {
        let mut commands = self.commands_tx.subscribe();
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                match commands.recv().await {
                    Ok(SessionCommand::Discard) => {
                        this.reporter.end(
                            &relation_id,
                            EndReport {
                                message: Some("discard".to_string()),
                                success: Some(true),
                                is_drop: Some(true),
                                ..Default::default()
                            },
                        );
                        this.dispose_session();
                        break;
                    }
                    Ok(SessionCommand::Regenerate) => {
                        this.run_diff_preview_strategy(
                            Arc::clone(&strategy),
                            cross_selection,
                            relation_id.clone(),
                            true,
                        )
                        .await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.state().primary.add_task(task);
    }

    /// The selection widened to whole lines, so the proposed edit always
    /// replaces complete lines.
    fn cross_selection(&self, selection: Range) -> Result<Range, AssistError> {
        let model = self.editor.model().ok_or(AssistError::NoModel)?;
        Ok(Range::new(
            selection.start.line,
            1,
            selection.end.line,
            model.line_max_column(selection.end.line),
        ))
    }

    /// Sets the terminal status of an invocation and emits its one
    /// telemetry end report.
    pub(crate) fn convert_status(
        &self,
        status: ChatStatus,
        ctx: &ReportCtx,
        message: &str,
        is_stop: bool,
    ) {
        self.state().status = status;
        self.reporter.end(
            &ctx.relation_id,
            EndReport {
                message: Some(message.to_string()),
                success: Some(status != ChatStatus::Error),
                replytime: Some(ctx.start_time.elapsed().as_millis() as u64),
                is_stop: is_stop.then_some(true),
                is_retry: ctx.is_retry.then_some(true),
                ..Default::default()
            },
        );
    }

    /// Commits the proposed text over the original cross selection, then
    /// tears down once in-flight layout work has had a chance to finish.
    pub(crate) async fn accept_proposed(&self, relation_id: &RelationId, cross_selection: Range) {
        if self.status() != ChatStatus::Done {
            tracing::debug!("accept ignored outside DONE");
            return;
        }
        self.reporter.end(
            relation_id,
            EndReport {
                message: Some("accept".to_string()),
                success: Some(true),
                is_receive: Some(true),
                ..Default::default()
            },
        );

        let proposed = self
            .state()
            .diff_view
            .as_ref()
            .and_then(|diff| diff.modified_model())
            .map(|model| model.get_value())
            .unwrap_or_default();
        match self.editor.model() {
            Some(model) => model.push_edit_operations(vec![TextEdit {
                range: cross_selection,
                text: proposed,
            }]),
            None => tracing::warn!("accept found no editor model"),
        }

        tokio::task::yield_now().await;
        self.dispose_session();
    }

    /// Atomic teardown from any exit path: widgets, then the primary group
    /// (which takes the operation group with it). Idempotent.
    pub fn dispose_session(&self) {
        let (diff_view, content_widget, primary) = {
            let mut state = self.state();
            state.in_use = false;
            state.status = ChatStatus::Ready;
            (
                state.diff_view.take(),
                state.content_widget.take(),
                Arc::clone(&state.primary),
            )
        };
        if let Some(diff) = diff_view {
            diff.dispose();
        }
        if let Some(widget) = content_widget {
            widget.dispose();
        }
        primary.dispose();
    }
}

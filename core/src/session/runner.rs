use super::*;

use crate::stream::StrategyOutcome;

impl InlineAssistHandler {
    /// Runs one diff-preview strategy invocation. Each invocation starts
    /// from a clean slate: the previous diff view and everything in the
    /// operation group are disposed before the strategy is awaited.
    pub(crate) async fn run_diff_preview_strategy(
        self: &Arc<Self>,
        strategy: StrategyFn,
        cross_selection: Range,
        relation_id: RelationId,
        is_retry: bool,
    ) {
        let (cancel, operation) = {
            let mut state = self.state();
            if let Some(diff) = state.diff_view.take() {
                diff.dispose();
            }
            state.operation.dispose();
            let operation = Arc::new(DisposableGroup::new());
            state.primary.add_child(Arc::clone(&operation));
            state.operation = Arc::clone(&operation);
            state.status = ChatStatus::Thinking;
            (state.cancel.clone(), operation)
        };

        let ctx = ReportCtx {
            relation_id: relation_id.clone(),
            start_time: Instant::now(),
            is_retry,
        };

        if cancel.is_cancelled() {
            self.convert_status(ChatStatus::Ready, &ctx, "abort", true);
            return;
        }

        // The token wins over a strategy that never observes it, so the
        // invocation always reaches its status conversion.
        let outcome = tokio::select! {
            outcome = strategy(Arc::clone(&self.editor), cancel.clone()) => outcome,
            _ = cancel.cancelled() => StrategyOutcome::Cancel("abort".to_string()),
        };
        self.apply_outcome(outcome, cross_selection, &ctx).await;

        // Accept and thumbs bind to this invocation's diff view, so their
        // subscription dies with the operation group.
        let mut commands = self.commands_tx.subscribe();
        let this = Arc::clone(self);
        let accept_relation = relation_id;
        operation.add_task(tokio::spawn(async move {
            loop {
                match commands.recv().await {
                    Ok(SessionCommand::Accept) => {
                        this.accept_proposed(&accept_relation, cross_selection).await;
                        break;
                    }
                    Ok(SessionCommand::Thumbs { is_like }) => {
                        this.reporter.end(
                            &accept_relation,
                            EndReport {
                                is_like: Some(is_like),
                                ..Default::default()
                            },
                        );
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));

        // Keep the content widget clear of a diff view that grows past the
        // end of the buffer.
        let max_lines = {
            let state = self.state();
            state.diff_view.as_ref().map(|diff| diff.on_max_line_count())
        };
        if let Some(max_lines) = max_lines {
            let this = Arc::clone(self);
            operation.add_task(tokio::spawn(async move {
                while let Ok(count) = max_lines.recv().await {
                    this.bump_content_widget(cross_selection, count);
                }
            }));
        }
    }

    /// Pushes the content widget down when the diff view renders at the
    /// last line of the buffer.
    pub(crate) fn bump_content_widget(&self, cross_selection: Range, line_count: u32) {
        let Some(model) = self.editor.model() else {
            return;
        };
        if cross_selection.end.line != model.line_count() {
            return;
        }
        if let Some(widget) = self.state().content_widget.clone() {
            widget.offset_top(self.editor.line_height() * line_count + 12);
            widget.layout();
        }
    }
}

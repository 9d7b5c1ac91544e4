use super::*;

use assist_protocol::Position;
use assist_protocol::StreamEvent;

use crate::stream::StrategyOutcome;

impl InlineAssistHandler {
    /// Turns a strategy outcome into visible diff state. Stream and reply
    /// outcomes feed the diff view's modified buffer; cancel and error
    /// outcomes close the invocation with the matching status.
    pub(crate) async fn apply_outcome(
        self: &Arc<Self>,
        outcome: StrategyOutcome,
        cross_selection: Range,
        ctx: &ReportCtx,
    ) {
        let disposed = {
            let state = self.state();
            state.primary.is_disposed()
        };

        match outcome {
            StrategyOutcome::Cancel(message) => {
                self.convert_status(ChatStatus::Ready, ctx, &message, true);
                return;
            }
            StrategyOutcome::Error(message) if !disposed => {
                self.convert_status(ChatStatus::Error, ctx, &message, false);
                return;
            }
            StrategyOutcome::Stream(controller) if !disposed => {
                let (diff, operation) = self.open_diff_view(cross_selection);
                let this = Arc::clone(self);
                let ctx = ctx.clone();
                let events = controller.into_events();
                operation.add_task(tokio::spawn(async move {
                    if diff.on_ready().recv().await.is_err() {
                        return;
                    }
                    let Some(modified) = diff.modified_model() else {
                        return;
                    };
                    loop {
                        match events.recv().await {
                            Ok(StreamEvent::Data(chunk)) => {
                                if chunk.is_empty() {
                                    continue;
                                }
                                let line = modified.line_count();
                                let column = modified.line_max_column(line);
                                modified.push_edit_operations(vec![TextEdit {
                                    range: Range::new(line, column, line, column),
                                    text: chunk,
                                }]);
                                diff.layout();
                            }
                            Ok(StreamEvent::Error(message)) => {
                                this.convert_status(ChatStatus::Error, &ctx, &message, false);
                                break;
                            }
                            Ok(StreamEvent::Abort) => {
                                this.convert_status(ChatStatus::Ready, &ctx, "abort", true);
                                break;
                            }
                            Ok(StreamEvent::End) => {
                                this.convert_status(ChatStatus::Done, &ctx, "", false);
                                break;
                            }
                            Err(_) => break,
                        }
                    }
                }));
            }
            StrategyOutcome::Reply(reply) if !disposed => {
                self.convert_status(ChatStatus::Done, ctx, "", false);
                let (diff, operation) = self.open_diff_view(cross_selection);
                let answer = match self.editor.model() {
                    Some(model) => reindent(&reply, &model.get_value_in_range(cross_selection)),
                    None => reply,
                };
                operation.add_task(tokio::spawn(async move {
                    if diff.on_ready().recv().await.is_err() {
                        return;
                    }
                    if let Some(modified) = diff.modified_model() {
                        modified.set_value(&answer);
                    }
                    diff.layout();
                }));
            }
            // A teardown raced the strategy; nothing left to show.
            StrategyOutcome::Error(_) | StrategyOutcome::Stream(_) | StrategyOutcome::Reply(_) => {
                self.convert_status(ChatStatus::Ready, ctx, "", true);
                return;
            }
        }

        // The diff view renders below the selection; park the widget on
        // the line after it.
        if let Some(widget) = self.state().content_widget.clone() {
            widget.set_position(Position::new(cross_selection.end.line + 1, 1));
            widget.layout();
        }
    }

    /// Creates the diff view for this invocation, anchored one line past
    /// the cross selection, and records it in session state.
    fn open_diff_view(
        self: &Arc<Self>,
        cross_selection: Range,
    ) -> (Arc<dyn DiffView>, Arc<DisposableGroup>) {
        let diff = self.widgets.create_diff_view(&self.editor, cross_selection);
        diff.create();
        // One context line above and below the selection.
        diff.show_by_line(
            cross_selection.start.line.saturating_sub(1),
            cross_selection.line_span() + 2,
        );
        let mut state = self.state();
        state.diff_view = Some(Arc::clone(&diff));
        (diff, Arc::clone(&state.operation))
    }
}

/// Re-indents a one-shot reply to match the selection it replaces: every
/// reply line gets the leading whitespace of the selection's first line,
/// or two spaces when that line has none.
pub(crate) fn reindent(answer: &str, cross_code: &str) -> String {
    let first_line = cross_code.lines().next().unwrap_or_default();
    let indent: String = first_line
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();
    let indent = if indent.is_empty() {
        "  ".to_string()
    } else {
        indent
    };
    answer
        .split('\n')
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

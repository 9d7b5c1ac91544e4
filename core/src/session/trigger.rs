use super::*;

use std::time::Duration;

use crate::config::INLINE_ASSIST_AUTO_VISIBLE;
use crate::widget::CONTENT_WIDGET_ID;

/// Selection activity quiet period before the widget is offered.
pub const TRIGGER_DEBOUNCE: Duration = Duration::from_millis(100);

impl InlineAssistHandler {
    /// Watches mouse and selection activity and shows the widget once the
    /// activity has been quiet for [`TRIGGER_DEBOUNCE`].
    ///
    /// Mouse-down disarms the detector so a click inside the content
    /// widget never re-triggers it; mouse-up anywhere else re-arms it.
    pub(crate) fn spawn_trigger_detector(self: &Arc<Self>) {
        let mut events = self.editor.events();
        let auto_visible = self
            .preferences
            .watch_bool(INLINE_ASSIST_AUTO_VISIBLE, true);
        let this = Arc::clone(self);
        self.contribution.add_task(tokio::spawn(async move {
            let mut armed = true;
            let mut pending = false;
            let debounce = tokio::time::sleep(TRIGGER_DEBOUNCE);
            tokio::pin!(debounce);
            loop {
                tokio::select! {
                    event = events.recv() => {
                        match event {
                            Ok(EditorEvent::MouseDown) => {
                                armed = false;
                            }
                            Ok(EditorEvent::MouseUp { target }) => {
                                armed = target.as_deref() != Some(CONTENT_WIDGET_ID);
                                pending = true;
                                debounce
                                    .as_mut()
                                    .reset(tokio::time::Instant::now() + TRIGGER_DEBOUNCE);
                            }
                            Ok(EditorEvent::SelectionChanged) => {
                                pending = true;
                                debounce
                                    .as_mut()
                                    .reset(tokio::time::Instant::now() + TRIGGER_DEBOUNCE);
                            }
                            Ok(EditorEvent::WillChangeModel) => {}
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                tracing::warn!("trigger detector lagged {skipped} editor events");
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                    _ = debounce.as_mut(), if pending => {
                        pending = false;
                        if !*auto_visible.borrow() {
                            continue;
                        }
                        if !armed {
                            continue;
                        }
                        if !this.status().accepts_trigger() {
                            continue;
                        }
                        this.show().await;
                    }
                }
            }
        }));
    }
}

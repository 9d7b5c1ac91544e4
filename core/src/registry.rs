use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use assist_protocol::Range;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::editor::Editor;
use crate::stream::StrategyOutcome;

/// An async strategy: given the editor and the session's cancellation
/// token, produce a reply, a live stream, a cancel or an error.
pub type StrategyFn =
    Arc<dyn Fn(Arc<dyn Editor>, CancellationToken) -> BoxFuture<'static, StrategyOutcome> + Send + Sync>;

/// A direct editor mutation with no diff preview.
pub type ExecuteFn = Arc<dyn Fn(Arc<dyn Editor>) -> BoxFuture<'static, ()> + Send + Sync>;

/// What runs when an action is clicked. One closed variant per behavior;
/// an action either mutates the editor directly or previews a diff.
#[derive(Clone)]
pub enum ActionHandler {
    Execute(ExecuteFn),
    DiffPreview(StrategyFn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub name: String,
}

/// A registered action surfaced through a code action provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeActionRun {
    pub action_id: String,
    pub range: Range,
}

/// Maps action ids to their descriptors and handlers, and relays
/// code-action launches to the contributed handler.
pub struct FeatureRegistry {
    actions: Mutex<HashMap<String, ActionDescriptor>>,
    handlers: Mutex<HashMap<String, ActionHandler>>,
    code_action_tx: async_channel::Sender<CodeActionRun>,
    code_action_rx: async_channel::Receiver<CodeActionRun>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        let (code_action_tx, code_action_rx) = async_channel::unbounded();
        Self {
            actions: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
            code_action_tx,
            code_action_rx,
        }
    }

    pub fn register_action(
        &self,
        id: impl Into<String>,
        descriptor: ActionDescriptor,
        handler: ActionHandler,
    ) {
        let id = id.into();
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), descriptor);
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handler);
    }

    pub fn action(&self, id: &str) -> Option<ActionDescriptor> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn editor_handler(&self, id: &str) -> Option<ActionHandler> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Subscription consumed by the contributed handler.
    pub fn on_code_action_run(&self) -> async_channel::Receiver<CodeActionRun> {
        self.code_action_rx.clone()
    }

    /// Entry point for the host's code action provider.
    pub fn dispatch_code_action(&self, run: CodeActionRun) {
        let _ = self.code_action_tx.try_send(run);
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

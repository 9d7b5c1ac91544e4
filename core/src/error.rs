use thiserror::Error;

/// Failures at the orchestrator's internal seams. None of these escape the
/// public entry points; they are logged and turn into skipped work or an
/// `Error` status transition.
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("editor has no attached text model")]
    NoModel,

    #[error("selection is empty or missing")]
    NoSelection,

    #[error("no action registered under `{0}`")]
    UnknownAction(String),
}

//! Data types shared between the inline assist orchestrator and its hosts:
//! the session status enum, 1-based text geometry, live stream events, and
//! the telemetry payloads bracketing a session.

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// Lifecycle status of one inline assist session.
///
/// `Ready` is both the initial state and the abort/reset target. `Done` and
/// `Error` are terminal for a single strategy run but not for the session:
/// regenerate re-enters `Thinking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChatStatus {
    Ready,
    Thinking,
    Done,
    Error,
}

impl ChatStatus {
    /// Terminal for one strategy run (not for the session).
    pub fn is_terminal(self) -> bool {
        matches!(self, ChatStatus::Done | ChatStatus::Error)
    }

    /// Auto-show may only fire while nothing is mid-flight.
    pub fn accepts_trigger(self) -> bool {
        matches!(self, ChatStatus::Ready | ChatStatus::Error)
    }
}

/// 1-based line/column position, matching the host editor's addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A selection in the editor buffer. Start and end are inclusive positions;
/// a range whose start equals its end selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of lines the range touches.
    pub fn line_span(&self) -> u32 {
        self.end.line.saturating_sub(self.start.line) + 1
    }
}

/// One event emitted by a live strategy stream: zero or more `Data`
/// fragments terminated by exactly one of `Error`, `Abort` or `End`.
/// `Data` arriving after a terminal event is dropped by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum StreamEvent {
    Data(String),
    Error(String),
    Abort,
    End,
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Data(_))
    }
}

/// Where an action run originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionSource {
    /// Clicked in the inline content widget.
    Widget,
    /// Surfaced through a code action.
    CodeAction,
}

impl ActionSource {
    pub fn is_code_action(self) -> bool {
        matches!(self, ActionSource::CodeAction)
    }
}

/// Telemetry payload opening a session bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReport {
    pub name: String,
    pub message: String,
    pub source: ActionSource,
    pub run_by_code_action: bool,
}

/// Telemetry payload closing a session bracket. Every field is optional so
/// partial reports (thumbs, discard) carry only what they know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Elapsed milliseconds between the strategy start and its terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replytime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_stop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_retry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_like: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_receive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_drop: Option<bool>,
}

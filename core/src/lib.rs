//! Inline assistive-edit orchestration for a text editor.
//!
//! The entry point is [`session::InlineAssistHandler`]: one handler is
//! contributed per editor and drives a single "rewrite this selection"
//! session at a time, from the debounced trigger through strategy
//! execution, streamed or one-shot diff application, and teardown.
//! Host collaborators (editor, diff view, content widget, telemetry,
//! preferences) are reached through the traits in [`editor`], [`widget`],
//! [`telemetry`] and [`config`].

pub mod config;
pub mod disposables;
pub mod editor;
pub mod error;
pub mod model;
pub mod registry;
pub mod session;
pub mod stream;
pub mod telemetry;
pub mod widget;

pub use assist_protocol as protocol;

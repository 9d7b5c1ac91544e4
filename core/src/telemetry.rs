use std::fmt;

use assist_protocol::EndReport;
use assist_protocol::StartReport;
use uuid::Uuid;

/// Correlation handle spanning a session's start/end report pair. Reused
/// across regenerated invocations of the same session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationId(String);

impl RelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Telemetry sink. `end` may be called more than once per relation id
/// (partial reports for thumbs or discard); the terminal-status report is
/// emitted exactly once per strategy invocation.
pub trait Reporter: Send + Sync {
    fn start(&self, report: StartReport) -> RelationId;

    fn end(&self, relation: &RelationId, report: EndReport);
}

/// Default reporter: correlates the bracket in the tracing output.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn start(&self, report: StartReport) -> RelationId {
        let relation = RelationId::new();
        tracing::info!(
            relation = %relation,
            name = %report.name,
            source = ?report.source,
            "inline assist start"
        );
        relation
    }

    fn end(&self, relation: &RelationId, report: EndReport) {
        tracing::info!(relation = %relation, report = ?report, "inline assist end");
    }
}

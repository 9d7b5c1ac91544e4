use assist_protocol::StreamEvent;

/// What a strategy resolved to. A closed sum type: there is no
/// "unrecognized result" case to classify at runtime.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// A complete reply to preview in one shot.
    Reply(String),
    /// A live stream of partial edits.
    Stream(StreamController),
    /// The strategy observed cancellation and stopped.
    Cancel(String),
    /// The strategy failed.
    Error(String),
}

/// Consumer half of a live edit stream.
#[derive(Debug)]
pub struct StreamController {
    events: async_channel::Receiver<StreamEvent>,
}

/// Producer half handed to the strategy. The first terminal event closes
/// the channel, so stray `Data` sent afterwards is dropped at the source.
#[derive(Debug, Clone)]
pub struct StreamSender {
    tx: async_channel::Sender<StreamEvent>,
}

impl StreamController {
    pub fn channel() -> (StreamSender, StreamController) {
        let (tx, events) = async_channel::unbounded();
        (StreamSender { tx }, StreamController { events })
    }

    pub(crate) fn into_events(self) -> async_channel::Receiver<StreamEvent> {
        self.events
    }
}

impl StreamSender {
    pub fn data(&self, fragment: impl Into<String>) {
        let _ = self.tx.try_send(StreamEvent::Data(fragment.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        let _ = self.tx.try_send(StreamEvent::Error(message.into()));
        self.tx.close();
    }

    pub fn abort(&self) {
        let _ = self.tx.try_send(StreamEvent::Abort);
        self.tx.close();
    }

    pub fn end(&self) {
        let _ = self.tx.try_send(StreamEvent::End);
        self.tx.close();
    }
}

// ── Command dispatch ──
//
// Callers push commands into an unbounded queue from any context; the
// session task is the only consumer and the only writer on the socket.
// Commands leave the queue strictly in FIFO order, one write at a time.

use std::future::Future;

use tokio::sync::mpsc;
use tvremote_api::protocol::RemoteCommand;
use tvremote_api::websocket::SessionTransport;

use crate::error::CoreError;

/// Anything a serialized command can be written to.
pub trait FrameSink {
    /// Frame `command` for this sink. JSON text unless overridden.
    fn encode(&self, command: &RemoteCommand) -> Result<String, tvremote_api::Error> {
        command.to_json()
    }

    /// Write one frame; resolves once the write completed.
    fn send_text(
        &mut self,
        text: String,
    ) -> impl Future<Output = Result<(), tvremote_api::Error>> + Send;
}

impl FrameSink for SessionTransport {
    fn send_text(
        &mut self,
        text: String,
    ) -> impl Future<Output = Result<(), tvremote_api::Error>> + Send {
        SessionTransport::send_text(self, text)
    }
}

/// What happened to one dequeued command.
#[derive(Debug, Clone)]
pub enum Delivery {
    Written(RemoteCommand),
    /// Serialization failed; the command was discarded and the drain
    /// stopped.
    Rejected {
        command: RemoteCommand,
        error: CoreError,
    },
}

/// Producer half. Cloneable, never blocks.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    tx: mpsc::UnboundedSender<RemoteCommand>,
}

impl CommandQueue {
    pub fn enqueue(&self, command: RemoteCommand) -> Result<(), CoreError> {
        self.tx.send(command).map_err(|_| CoreError::NotConnected)
    }
}

/// Consumer half, owned by the session task.
#[derive(Debug)]
pub struct Dispatcher {
    rx: mpsc::UnboundedReceiver<RemoteCommand>,
}

pub fn channel() -> (CommandQueue, Dispatcher) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandQueue { tx }, Dispatcher { rx })
}

impl Dispatcher {
    /// Wait for the next command. Cancel-safe. `None` once every
    /// [`CommandQueue`] is dropped and the queue is empty.
    pub async fn next(&mut self) -> Option<RemoteCommand> {
        self.rx.recv().await
    }

    /// Commands waiting behind the one being delivered.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Close the queue and hand back whatever was never delivered.
    /// Later enqueues fail with [`CoreError::NotConnected`].
    pub fn discard(&mut self) -> Vec<RemoteCommand> {
        self.rx.close();
        std::iter::from_fn(|| self.rx.try_recv().ok()).collect()
    }

    /// Deliver `head` and then the backlog that was queued when the drain
    /// started, back to back. Commands enqueued meanwhile wait for the
    /// next drain.
    ///
    /// A serialization failure discards that command and stops the drain;
    /// a write failure drops the command being written and returns the
    /// error. Either way everything behind it stays queued. Returns the
    /// number of commands written.
    pub async fn drain<S, F>(
        &mut self,
        head: RemoteCommand,
        sink: &mut S,
        mut on_delivery: F,
    ) -> Result<usize, CoreError>
    where
        S: FrameSink,
        F: FnMut(Delivery),
    {
        let backlog = self.rx.len();
        let mut written = 0;
        let mut next = Some(head);
        let mut taken = 0;

        while let Some(command) = next.take() {
            match sink.encode(&command) {
                Ok(json) => {
                    tracing::debug!(command = command.label(), "writing command");
                    sink.send_text(json).await?;
                    written += 1;
                    on_delivery(Delivery::Written(command));
                }
                Err(e) => {
                    tracing::warn!(command = command.label(), error = %e, "dropping unserializable command");
                    on_delivery(Delivery::Rejected {
                        command,
                        error: e.into(),
                    });
                    break;
                }
            }

            if taken < backlog {
                taken += 1;
                next = self.rx.try_recv().ok();
            }
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use tvremote_api::protocol::ControlKey;

    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<String>,
        fail_on: Option<usize>,
        unencodable: Option<ControlKey>,
    }

    impl FrameSink for RecordingSink {
        fn encode(&self, command: &RemoteCommand) -> Result<String, tvremote_api::Error> {
            match self.unencodable {
                Some(key) if command.label() == key.as_str() => {
                    Err(tvremote_api::Error::Serialization("unencodable".into()))
                }
                _ => command.to_json(),
            }
        }

        fn send_text(
            &mut self,
            text: String,
        ) -> impl Future<Output = Result<(), tvremote_api::Error>> + Send {
            let result = if self.fail_on == Some(self.frames.len()) {
                self.fail_on = None;
                Err(tvremote_api::Error::WebSocketWrite("broken pipe".into()))
            } else {
                self.frames.push(text);
                Ok(())
            };
            std::future::ready(result)
        }
    }

    fn key_of(frame: &str) -> String {
        let value: serde_json::Value = serde_json::from_str(frame).unwrap();
        value["params"]["DataOfCmd"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn drains_in_enqueue_order() {
        let (queue, mut dispatcher) = channel();
        for key in [ControlKey::Up, ControlKey::Down, ControlKey::Enter] {
            queue.enqueue(RemoteCommand::key(key)).unwrap();
        }

        let head = dispatcher.next().await.unwrap();
        let mut sink = RecordingSink::default();
        let mut delivered = Vec::new();
        let written = dispatcher
            .drain(head, &mut sink, |d| delivered.push(d))
            .await
            .unwrap();

        assert_eq!(written, 3);
        assert_eq!(
            sink.frames.iter().map(|f| key_of(f)).collect::<Vec<_>>(),
            vec!["KEY_UP", "KEY_DOWN", "KEY_ENTER"]
        );
        assert_eq!(delivered.len(), 3);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[tokio::test]
    async fn drain_is_bounded_by_starting_backlog() {
        let (queue, mut dispatcher) = channel();
        queue.enqueue(RemoteCommand::key(ControlKey::Num1)).unwrap();
        queue.enqueue(RemoteCommand::key(ControlKey::Num2)).unwrap();

        let head = dispatcher.next().await.unwrap();
        let late = queue.clone();
        let mut sink = RecordingSink::default();
        dispatcher
            .drain(head, &mut sink, |_| {
                let _ = late.enqueue(RemoteCommand::key(ControlKey::Num9));
            })
            .await
            .unwrap();

        assert_eq!(sink.frames.len(), 2);
        assert_eq!(dispatcher.pending(), 2);
    }

    #[tokio::test]
    async fn write_failure_drops_only_the_failed_command() {
        let (queue, mut dispatcher) = channel();
        for key in [ControlKey::Red, ControlKey::Green, ControlKey::Blue] {
            queue.enqueue(RemoteCommand::key(key)).unwrap();
        }

        let head = dispatcher.next().await.unwrap();
        let mut sink = RecordingSink {
            fail_on: Some(1),
            ..RecordingSink::default()
        };
        let err = dispatcher.drain(head, &mut sink, |_| {}).await.unwrap_err();
        assert!(matches!(err, CoreError::ConnectionLost { .. }));
        assert_eq!(sink.frames.len(), 1);

        // Blue is still queued for the next connection.
        let head = dispatcher.next().await.unwrap();
        dispatcher.drain(head, &mut sink, |_| {}).await.unwrap();
        assert_eq!(
            sink.frames.iter().map(|f| key_of(f)).collect::<Vec<_>>(),
            vec!["KEY_RED", "KEY_BLUE"]
        );
    }

    #[tokio::test]
    async fn serialization_failure_discards_command_and_stops_drain() {
        let (queue, mut dispatcher) = channel();
        for key in [ControlKey::Up, ControlKey::Mute, ControlKey::Down] {
            queue.enqueue(RemoteCommand::key(key)).unwrap();
        }

        let head = dispatcher.next().await.unwrap();
        let mut sink = RecordingSink {
            unencodable: Some(ControlKey::Mute),
            ..RecordingSink::default()
        };
        let mut delivered = Vec::new();
        let written = dispatcher
            .drain(head, &mut sink, |d| delivered.push(d))
            .await
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(delivered.len(), 2);
        match &delivered[1] {
            Delivery::Rejected { command, error } => {
                assert_eq!(command.label(), "KEY_MUTE");
                assert!(matches!(error, CoreError::Serialization { .. }));
            }
            other => panic!("expected a rejection, got {other:?}"),
        }

        // Down was not touched by the stopped drain.
        assert_eq!(dispatcher.pending(), 1);
        let head = dispatcher.next().await.unwrap();
        dispatcher.drain(head, &mut sink, |_| {}).await.unwrap();
        assert_eq!(
            sink.frames.iter().map(|f| key_of(f)).collect::<Vec<_>>(),
            vec!["KEY_UP", "KEY_DOWN"]
        );
    }

    #[test]
    fn discard_returns_undelivered_and_closes_queue() {
        let (queue, mut dispatcher) = channel();
        queue.enqueue(RemoteCommand::key(ControlKey::Home)).unwrap();
        queue.enqueue(RemoteCommand::left_click()).unwrap();

        let dropped = dispatcher.discard();
        assert_eq!(
            dropped.iter().map(RemoteCommand::label).collect::<Vec<_>>(),
            vec!["KEY_HOME", "LeftClick"]
        );
        assert_eq!(
            queue.enqueue(RemoteCommand::key(ControlKey::Home)),
            Err(CoreError::NotConnected)
        );
    }

    #[test]
    fn enqueue_after_consumer_dropped_is_not_connected() {
        let (queue, dispatcher) = channel();
        drop(dispatcher);
        assert_eq!(
            queue.enqueue(RemoteCommand::left_click()),
            Err(CoreError::NotConnected)
        );
    }
}

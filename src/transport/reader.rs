use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::transport::error::TransportError;
use crate::transport::{RawEvent, RawEventStream};

/// Frames buffered between the network task and the consumer.
pub const CHANNEL_CAPACITY: usize = 64;

type Frame = Result<RawEvent, TransportError>;

/// Consumer end of the reader task. Dropping it, or calling
/// [`EventReceiver::cancel`], aborts the task and with it the connection.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<Frame>,
    task: JoinHandle<()>,
}

/// Moves `stream` onto its own task. Frames arrive in transport order; the
/// bounded channel makes the reader wait instead of dropping.
#[must_use]
pub fn spawn_reader(mut stream: RawEventStream) -> EventReceiver {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let task = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            let terminal = frame.is_err();
            if tx.send(frame).await.is_err() {
                tracing::debug!("event receiver dropped, stopping reader");
                break;
            }
            if terminal {
                break;
            }
        }
    });

    EventReceiver { rx, task }
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    pub fn cancel(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl Drop for EventReceiver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

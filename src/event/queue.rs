use tokio::sync::mpsc;

use super::types::RoomEvent;

/// Event queue buffer size
const QUEUE_SIZE: usize = 1000;

/// Channel between event producers (file watcher, demo) and the app loop,
/// which is the only thing that touches the store.
pub fn create_event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(QUEUE_SIZE);
    (EventSender(tx), EventReceiver(rx))
}

/// Sender side of the event queue
#[derive(Clone)]
pub struct EventSender(pub mpsc::Sender<RoomEvent>);

impl EventSender {
    /// Wait for room in the buffer, then queue `event`. Fails once the
    /// receiver is gone.
    pub async fn send(&self, event: RoomEvent) -> Result<(), mpsc::error::SendError<RoomEvent>> {
        self.0.send(event).await
    }

    /// Raw sender for producers that run on their own task or thread
    pub fn inner(&self) -> mpsc::Sender<RoomEvent> {
        self.0.clone()
    }
}

/// Receiver side of the event queue
pub struct EventReceiver(pub mpsc::Receiver<RoomEvent>);

impl EventReceiver {
    /// Next queued event without waiting. The app loop drains with this
    /// once per frame.
    pub fn try_recv(&mut self) -> Result<RoomEvent, mpsc::error::TryRecvError> {
        self.0.try_recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (tx, mut rx) = create_event_queue();
        tx.send(RoomEvent::Stage).await.unwrap();
        tx.inner().send(RoomEvent::Commit).await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), RoomEvent::Stage);
        assert_eq!(rx.try_recv().unwrap(), RoomEvent::Commit);
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Empty)));

        drop(tx);
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
    }
}

//! Change notifications emitted after successful writes.

use tokio::sync::broadcast;

use super::uri::ContentUri;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcasts the URI of every write to all subscribers.
///
/// Sending never waits: with no subscribers the event is dropped, and a
/// subscriber that falls behind sees `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ContentUri>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentUri> {
        self.sender.subscribe()
    }

    pub fn notify_change(&self, uri: &ContentUri) {
        let receivers = self.sender.send(uri.clone()).unwrap_or(0);
        tracing::trace!(%uri, receivers, "change notified");
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contract::Resource;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn subscribers_receive_changes() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();
        let uri = ContentUri::item("org.example", Resource::Reminder, 4);

        notifier.notify_change(&uri);
        assert_eq!(rx.try_recv().unwrap(), uri);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn notify_without_subscribers_is_harmless() {
        let notifier = ChangeNotifier::new();
        notifier.notify_change(&ContentUri::collection("org.example", Resource::Pain));
    }
}

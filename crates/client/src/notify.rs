//! Transient user-facing notifications raised for failed requests.

use tokio::sync::broadcast;

use crate::error::ApiError;

/// A short-lived message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub status: Option<u16>,
}

impl Notification {
    /// Notification for a normalized error: title keyed by status,
    /// description is the error message.
    #[must_use]
    pub fn from_error(error: &ApiError) -> Self {
        Self {
            title: error.title().to_string(),
            description: error.message.clone(),
            status: error.status,
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::warn!(
            title = %notification.title,
            status = ?notification.status,
            "{}",
            notification.description
        );
    }
}

/// Fans notifications out to any number of subscribers.
///
/// Sending with no subscribers is not an error; the notification is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(32)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_from_error() {
        let error = ApiError::new(Some(401), "Your session has expired. Please sign in again.");
        let notification = Notification::from_error(&error);
        assert_eq!(notification.title, "Session expired");
        assert_eq!(
            notification.description,
            "Your session has expired. Please sign in again."
        );
        assert_eq!(notification.status, Some(401));
    }

    #[test]
    fn test_broadcast_delivers_to_subscribers() {
        let notifier = BroadcastNotifier::new(4);
        let mut rx = notifier.subscribe();
        notifier.notify(Notification::from_error(&ApiError::new(None, "boom")));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.title, "Something went wrong");
        assert_eq!(received.description, "boom");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_silent() {
        let notifier = BroadcastNotifier::default();
        notifier.notify(Notification::from_error(&ApiError::new(Some(404), "gone")));
    }
}

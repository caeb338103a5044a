//! Cart change notification.
//!
//! The notifier replaces the original ad hoc page-wide event broadcast
//! with an explicit listener list owned by the cart store. Delivery is
//! synchronous and in registration order; with no listeners registered a
//! broadcast is simply dropped.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tualmi_core::CartSummary;

/// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&CartSummary) + Send + Sync>;

/// Broadcasts the current cart summary to registered listeners after each
/// successful mutation.
///
/// A panicking listener is caught and logged so later listeners still
/// receive the summary. Listeners must not subscribe or unsubscribe from
/// inside a callback.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns a handle for [`Self::unsubscribe`].
    pub fn subscribe(
        &self,
        listener: impl Fn(&CartSummary) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a previously registered listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Deliver `summary` to every listener, in registration order.
    pub fn notify(&self, summary: &CartSummary) {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        for (id, listener) in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(summary))).is_err() {
                tracing::error!(listener = id.0, "Cart listener panicked during notification");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;

    fn summary(count: u64) -> CartSummary {
        CartSummary {
            count,
            total: Decimal::from(count),
        }
    }

    #[test]
    fn test_delivers_in_registration_order() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            notifier.subscribe(move |_| seen.lock().unwrap().push(label));
        }

        notifier.notify(&summary(1));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_panicking_listener_does_not_block_later_listeners() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        notifier.subscribe(|_| panic!("listener failure"));
        {
            let seen = Arc::clone(&seen);
            notifier.subscribe(move |s| seen.lock().unwrap().push(s.count));
        }

        notifier.notify(&summary(7));
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let id = {
            let seen = Arc::clone(&seen);
            notifier.subscribe(move |s| seen.lock().unwrap().push(s.count))
        };

        notifier.notify(&summary(1));
        notifier.unsubscribe(id);
        notifier.notify(&summary(2));

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_notify_without_listeners_is_dropped() {
        let notifier = ChangeNotifier::new();
        notifier.notify(&summary(3));
    }
}

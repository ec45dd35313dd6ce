//! Subscriber lists for state and pool notifications.

use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

pub(crate) type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle returned on subscribe; pass it to `DaemonClient::unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

pub(crate) struct ObserverRegistry<T: ?Sized> {
    observers: Mutex<Vec<(SubscriptionId, Observer<T>)>>,
}

impl<T: ?Sized> ObserverRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, observer: Observer<T>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.lock().push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Call every observer in subscription order.
    ///
    /// Runs on a snapshot taken outside the lock, so observers may subscribe or
    /// unsubscribe from inside their callback.
    pub(crate) fn notify(&self, value: &T) {
        let snapshot: Vec<Observer<T>> = self
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in snapshot {
            observer(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Observer<T>)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

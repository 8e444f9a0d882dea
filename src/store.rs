//! A small observable value container.
//!
//! [`Store`] wraps a [`tokio::sync::watch`] channel: readers take snapshots
//! with [`read`](Store::read) or subscribe for change notifications, and
//! writers replace the value through a pure transform with
//! [`update`](Store::update). Each update is applied under the channel's lock,
//! so a reader never observes a half-applied transform.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Shared, observable value.
///
/// Cloning a `Store` yields another handle to the same value.
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Store<T> {
    /// Create a store holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the value with `transform(&current)` and notify subscribers.
    pub fn update<F>(&self, transform: F)
    where
        F: FnOnce(&T) -> T,
    {
        self.tx.send_modify(|value| {
            let next = transform(value);
            *value = next;
        });
    }

    /// Overwrite the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receive a notification every time the value changes.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Store<T> {
    /// Snapshot of the current value.
    pub fn read(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &*self.tx.borrow())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn update_applies_transform() {
        let store = Store::new(vec![1, 2]);
        store.update(|v| {
            let mut next = v.clone();
            next.push(3);
            next
        });
        assert_eq!(store.read(), vec![1, 2, 3]);
    }

    #[test]
    fn clones_share_the_value() {
        let a = Store::new(0u32);
        let b = a.clone();
        b.set(7);
        assert_eq!(a.read(), 7);
        assert_eq!(a.with(|v| v * 2), 14);
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let store = Store::new(String::from("idle"));
        let mut rx = store.subscribe();

        store.update(|_| "busy".to_string());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "busy");
    }
}

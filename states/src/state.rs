//! Observable snapshots.
//!
//! A [`Store`] owns exactly one current value of `T`. Writers replace the whole value,
//! readers hold a [`StateReader`] and are told about replacements through a
//! `tokio::sync::watch` channel. The channel keeps only the newest snapshot, so a reader
//! that looks rarely never holds more than one value. Values are shared as `Arc<T>` so a
//! snapshot handed to a reader is never mutated underneath it.

use std::sync::Arc;

use tokio::sync::watch;

/// Single-writer, multi-reader observable value.
#[derive(Debug)]
pub struct Store<T> {
    sender: watch::Sender<Arc<T>>,
    version: u64,
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender, version: 0 }
    }

    /// Returns the current snapshot.
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.sender.borrow())
    }

    /// Number of replacements since construction.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the snapshot wholesale and notifies every live reader.
    ///
    /// Readers that have not looked since the previous replacement lose that value;
    /// only the newest one is kept.
    pub fn replace(&mut self, next: T) -> Arc<T> {
        let snapshot = Arc::new(next);
        self.sender.send_replace(Arc::clone(&snapshot));
        self.version += 1;

        log::trace!(
            target: "qrbolt_states::store",
            "store_replaced version={} subscribers={}",
            self.version,
            self.sender.receiver_count(),
        );

        snapshot
    }

    /// Replaces the snapshot with a modified copy of the current one.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> Arc<T>
    where
        T: Clone,
    {
        let mut next = T::clone(&self.get());
        f(&mut next);
        self.replace(next)
    }

    /// Registers a new reader. The reader only sees replacements made after this call;
    /// use [`Store::get`] for the value at subscription time.
    pub fn subscribe(&mut self) -> StateReader<T> {
        StateReader {
            recv: self.sender.subscribe(),
        }
    }

    /// Live readers. Dropped readers stop counting immediately.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Read-only handle on a [`Store`].
#[derive(Debug)]
pub struct StateReader<T> {
    recv: watch::Receiver<Arc<T>>,
}

impl<T> StateReader<T> {
    /// Returns the newest snapshot if it has not been seen yet.
    pub fn read(&mut self) -> Option<Arc<T>> {
        // An error means the store has been dropped.
        if !self.recv.has_changed().unwrap_or(false) {
            return None;
        }
        Some(Arc::clone(&self.recv.borrow_and_update()))
    }

    /// Waits for the next replacement.
    ///
    /// Returns `None` once the store has been dropped and its last value has been seen.
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        self.recv.changed().await.ok()?;
        Some(Arc::clone(&self.recv.borrow_and_update()))
    }

    /// Unseen snapshots held for this reader: zero or one.
    pub fn pending(&self) -> usize {
        usize::from(self.recv.has_changed().unwrap_or(false))
    }
}

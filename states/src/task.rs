//! Generation-tagged task identity.
//!
//! Asynchronous work started on behalf of a snapshot is tagged with a [`TaskId`]. When a
//! newer snapshot arrives the owner issues a new id from its [`TaskTracker`]; results that
//! come back carrying an older id are stale and must be dropped by the owner.
//!
//! Cancellation is cooperative. [`TaskHandle`] carries a `CancellationToken` from
//! `tokio_util` that work may check before starting, but the generation comparison in
//! [`TaskTracker::is_current`] is what decides whether a result is committed.
//!
//! ```
//! use qrbolt_states::TaskTracker;
//!
//! struct Render;
//!
//! let mut tracker = TaskTracker::for_type::<Render>();
//! let first = tracker.issue();
//! let second = tracker.issue();
//!
//! assert!(first.is_cancelled());
//! assert!(!tracker.is_current(first.id()));
//! assert!(tracker.is_current(second.id()));
//! ```

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

/// Unique identifier for a spawned task.
///
/// Combines the `TypeId` of the owner with a generation counter. Higher generations
/// were issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self { type_id, generation }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle to a spawned task with cooperative cancellation support.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns a clone of the cancellation token to move into the task.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Requests cancellation. The task is not aborted; it has to check the token.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Issues task ids for one owner and remembers which one is current.
#[derive(Debug)]
pub struct TaskTracker {
    type_id: TypeId,
    generation: u64,
    current: Option<TaskHandle>,
}

impl TaskTracker {
    pub fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            generation: 0,
            current: None,
        }
    }

    pub fn for_type<T: 'static>() -> Self {
        Self::new(TypeId::of::<T>())
    }

    /// Supersedes the current task (if any) and returns a handle for a new one.
    pub fn issue(&mut self) -> TaskHandle {
        self.cancel_current();
        self.generation += 1;

        let handle = TaskHandle::new(
            TaskId::new(self.type_id, self.generation),
            CancellationToken::new(),
        );
        self.current = Some(handle.clone());
        handle
    }

    /// Supersedes the current task without starting another one.
    ///
    /// Any result still in flight becomes stale.
    pub fn invalidate(&mut self) {
        self.cancel_current();
        self.generation += 1;
    }

    /// Marks the current task as finished so it no longer counts as in flight.
    ///
    /// Returns `false` (and changes nothing) when `id` is not the current task.
    pub fn complete(&mut self, id: TaskId) -> bool {
        if !self.is_current(id) {
            return false;
        }
        self.current = None;
        true
    }

    /// `true` when `id` was issued by this tracker and nothing has superseded it.
    pub fn is_current(&self, id: TaskId) -> bool {
        id.type_id == self.type_id && id.generation == self.generation
    }

    /// The task that is currently allowed to commit, if one is in flight.
    pub fn current(&self) -> Option<TaskId> {
        self.current.as_ref().map(TaskHandle::id)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn cancel_current(&mut self) {
        if let Some(previous) = self.current.take() {
            log::trace!(
                target: "qrbolt_states::task",
                "task_superseded generation={}",
                previous.id().generation(),
            );
            previous.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owner;
    struct OtherOwner;

    #[test]
    fn task_id_equality() {
        let type_id = TypeId::of::<String>();

        let id1 = TaskId::new(type_id, 1);
        let id2 = TaskId::new(type_id, 1);
        let id3 = TaskId::new(type_id, 2);
        let id4 = TaskId::new(TypeId::of::<i32>(), 1);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3); // Different generation
        assert_ne!(id1, id4); // Different type
    }

    #[test]
    fn task_handle_clones_share_token() {
        let handle1 = TaskHandle::new(
            TaskId::new(TypeId::of::<String>(), 1),
            CancellationToken::new(),
        );
        let handle2 = handle1.clone();
        let token = handle1.cancellation_token();

        handle1.cancel();

        assert!(handle2.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[test]
    fn issue_increments_generation() {
        let mut tracker = TaskTracker::for_type::<Owner>();
        let first = tracker.issue();
        let second = tracker.issue();

        assert_eq!(first.id().generation(), 1);
        assert_eq!(second.id().generation(), 2);
        assert_eq!(tracker.current(), Some(second.id()));
    }

    #[test]
    fn issue_cancels_previous_handle() {
        let mut tracker = TaskTracker::for_type::<Owner>();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!tracker.is_current(first.id()));
        assert!(tracker.is_current(second.id()));
    }

    #[test]
    fn invalidate_makes_in_flight_task_stale() {
        let mut tracker = TaskTracker::for_type::<Owner>();
        let handle = tracker.issue();

        tracker.invalidate();

        assert!(handle.is_cancelled());
        assert!(!tracker.is_current(handle.id()));
        assert!(tracker.current().is_none());
    }

    #[test]
    fn complete_only_clears_the_current_task() {
        let mut tracker = TaskTracker::for_type::<Owner>();
        let stale = tracker.issue();
        let live = tracker.issue();

        assert!(!tracker.complete(stale.id()));
        assert_eq!(tracker.current(), Some(live.id()));

        assert!(tracker.complete(live.id()));
        assert!(tracker.current().is_none());
        // Completed but not superseded: the id is still the newest one.
        assert!(tracker.is_current(live.id()));
        // Completing does not cancel.
        assert!(!live.is_cancelled());
    }

    #[test]
    fn ids_from_other_owners_are_never_current() {
        let mut tracker = TaskTracker::for_type::<Owner>();
        let mut other = TaskTracker::for_type::<OtherOwner>();

        let _mine = tracker.issue();
        let theirs = other.issue();

        assert_eq!(theirs.id().generation(), tracker.generation());
        assert!(!tracker.is_current(theirs.id()));
    }
}

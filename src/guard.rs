use std::sync::{Arc, Mutex, PoisonError};

/// A shared slot that can be revoked from the owning side.
///
/// Background tasks run their callbacks through [`Revocable::with`], which
/// holds the slot lock for the duration of the call. Once [`Revocable::revoke`]
/// has returned, no callback is running and none will run again.
#[derive(Debug)]
pub(crate) struct Revocable<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for Revocable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Revocable<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(value))),
        }
    }

    /// Runs `f` unless the slot has been revoked.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_mut().map(f)
    }

    /// Returns `true` if this call did the revoking.
    pub(crate) fn revoke(&self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.take().is_some()
    }

    pub(crate) fn is_revoked(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

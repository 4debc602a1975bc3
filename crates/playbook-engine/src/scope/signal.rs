use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// Change notification shared by every scope of one execution tree.
///
/// Each scope mutation bumps `epoch`; blocked lookups wait on `changed` until the epoch moves,
/// the deadline passes or the tree is cancelled. `export_gate` makes a broadcast export look
/// atomic to lookups that walk several scopes.
#[derive(Debug, Default)]
pub(crate) struct ChangeSignal {
    epoch: Mutex<u64>,
    changed: Condvar,
    cancelled: AtomicBool,
    export_gate: RwLock<()>,
}

impl ChangeSignal {
    pub(crate) fn epoch(&self) -> u64 {
        *lock(&self.epoch)
    }

    pub(crate) fn notify(&self) {
        let mut epoch = lock(&self.epoch);
        *epoch = epoch.wrapping_add(1);
        self.changed.notify_all();
    }

    /// Returns once the epoch differs from `seen`, the tree is cancelled or `deadline` passes.
    /// Without a deadline only a change or cancellation ends the wait.
    pub(crate) fn wait_past(&self, seen: u64, deadline: Option<Instant>) {
        let mut epoch = lock(&self.epoch);
        while *epoch == seen && !self.is_cancelled() {
            epoch = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }
                    self.changed
                        .wait_timeout(epoch, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .changed
                    .wait(epoch)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn read_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.export_gate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.export_gate
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Pending action queue.
//!
//! This module provides the hand-off point between the remote listener thread
//! and the dispatch loop. Producers on any thread enqueue callables; the
//! dispatch loop takes the whole queue once per tick and runs each entry
//! exactly once, in order.

use std::{
    collections::VecDeque,
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::keymaster::KeyMaster;

/// Work queued for the dispatch loop.
///
/// The callable receives the engine, so it can touch the registry and page
/// state without those ever being shared with the producing thread.
pub type PendingAction = Box<dyn FnOnce(&mut KeyMaster) + Send>;

#[derive(Clone, Default)]
pub struct PendingActions {
    actions: Arc<Mutex<VecDeque<PendingAction>>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, action: impl FnOnce(&mut KeyMaster) + Send + 'static) {
        self.lock().push_back(Box::new(action));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Empties the queue, returning everything that was in it.
    ///
    /// The lock is released before the caller runs the actions, so actions
    /// may enqueue more work; that work waits for the next take.
    pub(crate) fn take_all(&self) -> VecDeque<PendingAction> {
        mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PendingAction>> {
        // A panicking producer cannot leave the deque half-updated.
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PendingActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingActions")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn take_all_empties_the_queue_in_fifo_order() {
        let queue = PendingActions::new();
        queue.enqueue(|_| {});
        queue.enqueue(|_| {});
        queue.enqueue(|_| {});
        assert_eq!(queue.len(), 3);

        let taken = queue.take_all();
        assert_eq!(taken.len(), 3);
        assert!(queue.is_empty());
        assert!(queue.take_all().is_empty());
    }

    #[test]
    fn accepts_work_from_other_threads() {
        let queue = PendingActions::new();

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        queue.enqueue(|_| {});
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().expect("producer thread");
        }

        assert_eq!(queue.take_all().len(), 100);
    }
}

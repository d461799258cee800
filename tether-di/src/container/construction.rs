//! Bookkeeping of bindings that are being constructed
//!
//! Two views are kept. Every thread records the bindings it is currently
//! constructing, so a re-entry on the same thread is reported as a cycle no
//! matter how the nested resolution was reached. Each container additionally
//! records which thread owns the construction of a singleton and which
//! singleton a thread is waiting for, so threads that close a cycle across
//! each other fail instead of waiting forever.

use super::BindingKey;
use crate::error::Error;
use std::{
    cell::RefCell,
    collections::HashMap,
    marker::PhantomData,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

thread_local! {
    /// `(container id, binding)` pairs under construction on this thread, outermost first
    static IN_PROGRESS: RefCell<Vec<(usize, BindingKey)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a binding as being constructed on the current thread until dropped
pub(crate) struct Entered {
    // Must be dropped on the thread that pushed the entry
    _not_send: PhantomData<*const ()>,
}

impl Drop for Entered {
    #[inline]
    fn drop(&mut self) {
        IN_PROGRESS.with_borrow_mut(|stack| {
            stack.pop();
        });
    }
}

/// Pushes `key` onto the current thread's construction stack.
///
/// Fails with [`Error::CyclicDependency`] if the same container is already
/// constructing `key` on this thread.
pub(crate) fn enter(container: usize, key: &BindingKey) -> Result<Entered, Error> {
    IN_PROGRESS.with_borrow_mut(|stack| {
        let repeated = stack
            .iter()
            .position(|(id, entered)| *id == container && entered == key);

        if let Some(start) = repeated {
            let chain = stack[start..]
                .iter()
                .filter(|(id, _)| *id == container)
                .map(|(_, entered)| entered)
                .chain(std::iter::once(key))
                .map(ToString::to_string)
                .collect();
            return Err(cyclic(chain));
        }

        stack.push((container, key.clone()));
        Ok(Entered { _not_send: PhantomData })
    })
}

#[derive(Default)]
struct State {
    /// Singletons under construction and the threads constructing them
    owners: HashMap<BindingKey, ThreadId>,
    /// Threads blocked until a singleton is constructed
    waiting: HashMap<ThreadId, BindingKey>,
}

impl State {
    /// Follows the wait-for edges starting at `owner` of `key`.
    ///
    /// Returns the cycle if they lead back to `current`.
    fn cycle_through(&self, key: &BindingKey, mut owner: ThreadId, current: ThreadId) -> Option<Vec<String>> {
        let mut path = vec![key];
        for _ in 0..=self.waiting.len() {
            if owner == current {
                let closing = path.last().copied()?;
                let chain = std::iter::once(closing)
                    .chain(path)
                    .map(ToString::to_string)
                    .collect();
                return Some(chain);
            }
            let next = self.waiting.get(&owner)?;
            owner = *self.owners.get(next)?;
            path.push(next);
        }
        None
    }
}

/// Per-container coordination of singleton construction
#[derive(Default)]
pub(crate) struct Constructions {
    state: Mutex<State>,
    released: Condvar,
}

/// Exclusive right to construct a singleton, released on drop
pub(crate) struct Claim<'a> {
    constructions: &'a Constructions,
    key: BindingKey,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.constructions.lock().owners.remove(&self.key);
        self.constructions.released.notify_all();
    }
}

impl Constructions {
    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking factory must not wedge the container forever
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the construction of `key` for the current thread.
    ///
    /// Returns `Ok(None)` once `is_ready` reports that another thread has
    /// published the instance. Waits while another thread owns the claim and
    /// fails with [`Error::CyclicDependency`] if that thread is, directly or
    /// through others, waiting for a singleton the current thread constructs.
    pub(crate) fn claim(
        &self,
        key: &BindingKey,
        is_ready: impl Fn() -> bool
    ) -> Result<Option<Claim<'_>>, Error> {
        let current = thread::current().id();
        let mut state = self.lock();
        loop {
            if is_ready() {
                return Ok(None);
            }

            let Some(&owner) = state.owners.get(key) else {
                state.owners.insert(key.clone(), current);
                return Ok(Some(Claim { constructions: self, key: key.clone() }));
            };

            if let Some(chain) = state.cycle_through(key, owner, current) {
                return Err(cyclic(chain));
            }

            state.waiting.insert(current, key.clone());
            state = self.released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            state.waiting.remove(&current);
        }
    }
}

#[inline]
fn cyclic(chain: Vec<String>) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!("cyclic dependency detected: {}", chain.join(" -> "));

    Error::CyclicDependency { chain }
}

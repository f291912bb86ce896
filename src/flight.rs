/// Single-flight execution of an async task
///
/// The first caller starts the task and every caller that arrives while it is
/// running awaits the same shared future instead of starting another one.
/// Success is remembered until [`SingleFlight::reset`]; failure is handed to
/// every waiter and leaves the flight idle so a later call starts over.
use crate::error::{Error, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;

type SharedTask<T> = Shared<BoxFuture<'static, std::result::Result<T, Arc<Error>>>>;

/// Observable state of a [`SingleFlight`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    Idle,
    Running,
    Complete,
}

enum Slot<T: Clone> {
    Idle,
    Running(SharedTask<T>),
    Complete(T),
}

struct Inner<T: Clone> {
    slot: Slot<T>,
    generation: u64,
}

pub struct SingleFlight<T: Clone> {
    inner: Mutex<Inner<T>>,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                slot: Slot::Idle,
                generation: 0,
            }),
        }
    }

    pub fn state(&self) -> FlightState {
        match self.inner.lock().slot {
            Slot::Idle => FlightState::Idle,
            Slot::Running(_) => FlightState::Running,
            Slot::Complete(_) => FlightState::Complete,
        }
    }

    /// Run `task` unless it already completed or is in flight
    ///
    /// `task` is only invoked by the caller that moves the flight out of idle.
    pub async fn run<F>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T>>,
    {
        let (shared, generation) = {
            let mut inner = self.inner.lock();
            let shared = match &inner.slot {
                Slot::Complete(value) => return Ok(value.clone()),
                Slot::Running(shared) => shared.clone(),
                Slot::Idle => {
                    let shared = task().map(|result| result.map_err(Arc::new)).boxed().shared();
                    inner.slot = Slot::Running(shared.clone());
                    shared
                }
            };
            (shared, inner.generation)
        };

        let outcome = shared.await;

        let mut inner = self.inner.lock();
        // A reset while we were waiting owns the slot now.
        if inner.generation == generation && matches!(inner.slot, Slot::Running(_)) {
            inner.slot = match &outcome {
                Ok(value) => Slot::Complete(value.clone()),
                Err(_) => Slot::Idle,
            };
        }
        drop(inner);

        outcome.map_err(Error::Initialization)
    }

    /// Forget any completed or in-flight task
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.slot = Slot::Idle;
        inner.generation = inner.generation.wrapping_add(1);
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

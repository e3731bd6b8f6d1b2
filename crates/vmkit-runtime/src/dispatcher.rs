#![forbid(unsafe_code)]

//! Owning execution context with a run-loop queue.
//!
//! A [`Dispatcher`] is bound to the thread that created it (typically the UI
//! thread). Other threads schedule work through a [`DispatcherHandle`], which
//! implements [`ExecutionContext`]:
//!
//! - called on the owning thread, work runs inline before `invoke` returns;
//! - called anywhere else, work is sent over a channel and runs the next time
//!   the owner calls [`Dispatcher::run_pending`].
//!
//! # Thread Safety
//!
//! `DispatcherHandle` is `Send + Sync + Clone`; each clone holds a sender for
//! the same channel. `Dispatcher` itself is `!Send` so the receiving end can
//! never leave its owning thread.
//!
//! # Failure Modes
//!
//! - Work that fails while draining stops the drain; the error is returned
//!   from `run_pending` and the remaining work stays queued.
//! - After [`shutdown`](Dispatcher::shutdown) (or drop), handles report
//!   `is_available() == false` and `invoke` fails with
//!   [`BindError::ContextUnavailable`].
//!
//! # Example
//!
//! ```
//! use vmkit_core::ExecutionContext;
//! use vmkit_runtime::dispatcher::Dispatcher;
//!
//! let dispatcher = Dispatcher::new();
//! let handle = dispatcher.handle();
//!
//! let worker = std::thread::spawn(move || {
//!     handle.invoke(Box::new(|| Ok(()))).unwrap();
//! });
//! worker.join().unwrap();
//!
//! assert_eq!(dispatcher.run_pending().unwrap(), 1);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread::{self, ThreadId};

use vmkit_core::{BindError, ExecutionContext, Result, WorkItem};

/// Global counter for dispatcher IDs.
static DISPATCHER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: Dispatcher = Dispatcher::new();
}

struct DispatcherState {
    id: u64,
    owner: ThreadId,
    alive: AtomicBool,
    pending: AtomicUsize,
}

/// Run-loop end of an execution context, owned by a single thread.
pub struct Dispatcher {
    rx: mpsc::Receiver<WorkItem>,
    handle: DispatcherHandle,
    _not_send: PhantomData<Rc<()>>,
}

impl Dispatcher {
    /// Create a dispatcher owned by the calling thread.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let state = Arc::new(DispatcherState {
            id: DISPATCHER_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            owner: thread::current().id(),
            alive: AtomicBool::new(true),
            pending: AtomicUsize::new(0),
        });
        Self {
            rx,
            handle: DispatcherHandle { tx, state },
            _not_send: PhantomData,
        }
    }

    /// Handle to the calling thread's dispatcher, creating it on first use.
    #[must_use]
    pub fn current() -> DispatcherHandle {
        CURRENT.with(Dispatcher::handle)
    }

    /// Drain the calling thread's dispatcher. See [`run_pending`](Self::run_pending).
    ///
    /// # Errors
    ///
    /// The first error returned by a queued unit of work.
    pub fn run_current_pending() -> Result<usize> {
        CURRENT.with(Dispatcher::run_pending)
    }

    /// A cloneable, thread-safe handle for scheduling work.
    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Unique ID of this dispatcher.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.handle.state.id
    }

    /// Number of queued units of work not yet run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.handle.state.pending.load(Ordering::SeqCst)
    }

    /// Run every queued unit of work, in the order it was queued.
    ///
    /// Work queued while draining (including by the work itself) is run in the
    /// same call. Returns the number of units run.
    ///
    /// # Errors
    ///
    /// Stops at the first unit that fails and returns its error. Later units
    /// stay queued for the next drain.
    ///
    /// Once shut down, nothing runs: work that slipped in behind
    /// [`shutdown`](Self::shutdown) is discarded instead.
    pub fn run_pending(&self) -> Result<usize> {
        let mut ran = 0;
        while self.handle.is_available()
            && let Ok(work) = self.rx.try_recv()
        {
            self.handle.state.pending.fetch_sub(1, Ordering::SeqCst);
            ran += 1;
            if let Err(err) = work() {
                tracing::warn!(
                    dispatcher = self.id(),
                    error = %err,
                    "dispatched work failed"
                );
                return Err(err);
            }
        }
        if self.is_shut_down() {
            self.shutdown();
        }
        if ran > 0 {
            tracing::trace!(dispatcher = self.id(), ran, "drained dispatcher queue");
        }
        Ok(ran)
    }

    /// Stop accepting work and discard anything still queued.
    ///
    /// Returns the number of discarded units. Idempotent.
    pub fn shutdown(&self) -> usize {
        let was_alive = self.handle.state.alive.swap(false, Ordering::SeqCst);
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            self.handle.state.pending.fetch_sub(1, Ordering::SeqCst);
            discarded += 1;
        }
        if was_alive {
            tracing::debug!(dispatcher = self.id(), discarded, "dispatcher shut down");
        }
        discarded
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        !self.handle.is_available()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("id", &self.id())
            .field("pending", &self.pending())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

/// Thread-safe handle used to schedule work onto a [`Dispatcher`].
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<WorkItem>,
    state: Arc<DispatcherState>,
}

impl DispatcherHandle {
    /// ID of the dispatcher this handle schedules onto.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// Thread that owns the dispatcher.
    #[must_use]
    pub fn owner(&self) -> ThreadId {
        self.state.owner
    }
}

impl ExecutionContext for DispatcherHandle {
    fn invoke(&self, work: WorkItem) -> Result<()> {
        if !self.is_available() {
            return Err(BindError::ContextUnavailable);
        }
        if self.is_owning_context() {
            return work();
        }

        self.state.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(work).map_err(|_| {
            self.state.pending.fetch_sub(1, Ordering::SeqCst);
            BindError::ContextUnavailable
        })
    }

    fn is_available(&self) -> bool {
        self.state.alive.load(Ordering::SeqCst)
    }

    fn is_owning_context(&self) -> bool {
        thread::current().id() == self.state.owner
    }
}

impl fmt::Debug for DispatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherHandle")
            .field("id", &self.state.id)
            .field("available", &self.is_available())
            .finish()
    }
}

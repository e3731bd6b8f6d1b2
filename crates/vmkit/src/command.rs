#![forbid(unsafe_code)]

//! Relay commands for view-models.
//!
//! A [`RelayCommand<P>`] adapts a pair of closures (an action and an optional
//! `can_execute` predicate) to the [`Command`] interface a view binds to.
//!
//! Listeners registered through
//! [`subscribe_can_execute_changed`](Command::subscribe_can_execute_changed)
//! are notified in two ways:
//!
//! - by [`RelayCommand::raise_can_execute_changed`], for that command only;
//! - by [`invalidate_requery_suggested`], for every live listener of every
//!   command in the process (e.g. after focus or selection changes).
//!
//! # Invariants
//!
//! 1. Without a predicate, `can_execute` is always `true`.
//! 2. After [`destroy`](RelayCommand::destroy), `can_execute` is always
//!    `false` and `execute` does nothing.
//! 3. Dropping a listener's [`Subscription`] detaches it from both the command
//!    and the process-wide requery list.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use vmkit::command::{Command, RelayCommand};
//!
//! let clicks = Arc::new(AtomicUsize::new(0));
//! let c = Arc::clone(&clicks);
//! let save = RelayCommand::with_can_execute(
//!     move |_: &()| {
//!         c.fetch_add(1, Ordering::SeqCst);
//!     },
//!     |_| true,
//! );
//!
//! assert!(save.can_execute(&()));
//! save.execute(&());
//! assert_eq!(clicks.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use vmkit_core::Subscription;

/// Callback run when a command's executability may have changed.
pub type CanExecuteHandler = Arc<dyn Fn() + Send + Sync>;

type Action<P> = Arc<dyn Fn(&P) + Send + Sync>;
type Predicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;
type Listeners = Mutex<Vec<(u64, CanExecuteHandler)>>;

/// Global counter for listener IDs.
static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Listeners that also hear process-wide requery requests.
static REQUERY_LISTENERS: Listeners = Mutex::new(Vec::new());

fn lock(listeners: &Listeners) -> MutexGuard<'_, Vec<(u64, CanExecuteHandler)>> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

fn notify(listeners: &Listeners) -> usize {
    let handlers: Vec<CanExecuteHandler> =
        lock(listeners).iter().map(|(_, h)| Arc::clone(h)).collect();
    for handler in &handlers {
        handler();
    }
    handlers.len()
}

/// Ask every command listener in the process to re-query `can_execute`.
///
/// Returns the number of listeners notified.
pub fn invalidate_requery_suggested() -> usize {
    let notified = notify(&REQUERY_LISTENERS);
    tracing::trace!(notified, "requery suggested");
    notified
}

/// Interface a view uses to invoke a command.
pub trait Command<P>: Send + Sync {
    /// Whether the command can run with `parameter`.
    fn can_execute(&self, parameter: &P) -> bool;

    /// Run the command. Callers are expected to check
    /// [`can_execute`](Self::can_execute) first.
    fn execute(&self, parameter: &P);

    /// Register `handler` for executability changes.
    fn subscribe_can_execute_changed(&self, handler: CanExecuteHandler) -> Subscription;
}

struct Actions<P> {
    execute: Action<P>,
    can_execute: Predicate<P>,
}

struct CommandInner<P> {
    actions: Mutex<Actions<P>>,
    listeners: Listeners,
}

/// Command backed by closures.
pub struct RelayCommand<P> {
    inner: Arc<CommandInner<P>>,
}

impl<P> Clone for RelayCommand<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: 'static> RelayCommand<P> {
    /// Command that can always execute.
    pub fn new(execute: impl Fn(&P) + Send + Sync + 'static) -> Self {
        Self::with_can_execute(execute, |_| true)
    }

    /// Command gated by `can_execute`.
    pub fn with_can_execute(
        execute: impl Fn(&P) + Send + Sync + 'static,
        can_execute: impl Fn(&P) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(CommandInner {
                actions: Mutex::new(Actions {
                    execute: Arc::new(execute),
                    can_execute: Arc::new(can_execute),
                }),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    fn actions(&self) -> MutexGuard<'_, Actions<P>> {
        self.inner
            .actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Notify this command's listeners. Returns how many were notified.
    pub fn raise_can_execute_changed(&self) -> usize {
        notify(&self.inner.listeners)
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    /// Disable the command permanently: `execute` becomes a no-op and
    /// `can_execute` always returns `false`.
    pub fn destroy(&self) {
        let mut actions = self.actions();
        actions.execute = Arc::new(|_: &P| {});
        actions.can_execute = Arc::new(|_: &P| false);
        tracing::debug!("relay command destroyed");
    }
}

impl<P: 'static> Command<P> for RelayCommand<P> {
    fn can_execute(&self, parameter: &P) -> bool {
        let predicate = Arc::clone(&self.actions().can_execute);
        predicate(parameter)
    }

    fn execute(&self, parameter: &P) {
        // Released before running so the action may destroy its own command.
        let action = Arc::clone(&self.actions().execute);
        action(parameter);
    }

    fn subscribe_can_execute_changed(&self, handler: CanExecuteHandler) -> Subscription {
        let id = LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, Arc::clone(&handler)));
        lock(&REQUERY_LISTENERS).push((id, handler));

        let weak: Weak<CommandInner<P>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner.listeners).retain(|(listener, _)| *listener != id);
            }
            lock(&REQUERY_LISTENERS).retain(|(listener, _)| *listener != id);
        })
    }
}

impl<P> fmt::Debug for RelayCommand<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayCommand")
            .field("listeners", &lock(&self.inner.listeners).len())
            .finish()
    }
}

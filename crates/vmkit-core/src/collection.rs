#![forbid(unsafe_code)]

//! Container capabilities consumed by the binder.
//!
//! - [`ObservableCollection`]: a source that can be enumerated in order and
//!   emits [`CollectionChange`] notifications to subscribers.
//! - [`TargetCollection`]: a sink supporting append, remove-by-value and
//!   clear. The binder never claims exclusive ownership of a target.
//! - [`Subscription`]: RAII guard that detaches a handler on drop.
//!
//! Enumeration goes through the single [`ObservableCollection::snapshot`]
//! method whatever the backing storage, so call sites never branch on the
//! concrete container type.

use std::fmt;
use std::sync::Arc;

use crate::change::CollectionChange;
use crate::error::Result;

/// Callback invoked for each change notification.
///
/// An error returned by the handler stops delivery of that notification and
/// is returned to the code that mutated the source.
pub type ChangeHandler<T> = Arc<dyn Fn(&CollectionChange<T>) -> Result<()> + Send + Sync>;

/// RAII guard for a registered handler.
///
/// Dropping the guard (or calling [`unsubscribe`](Self::unsubscribe)) detaches
/// the handler before the next notification cycle.
#[must_use = "dropping a subscription detaches its handler"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a detach action.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to detach.
    pub fn empty() -> Self {
        Self { detach: None }
    }

    /// Whether the handler is still attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    /// Detach now. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// A source collection that can be enumerated and observed.
pub trait ObservableCollection<T> {
    /// Current elements in iteration order.
    ///
    /// # Errors
    ///
    /// [`BindError::PoisonedLock`](crate::BindError::PoisonedLock) if the
    /// backing storage is unusable.
    fn snapshot(&self) -> Result<Vec<T>>;

    /// Register `handler` for every subsequent change notification.
    ///
    /// # Errors
    ///
    /// [`BindError::PoisonedLock`](crate::BindError::PoisonedLock) if the
    /// subscriber list is unusable.
    fn subscribe(&self, handler: ChangeHandler<T>) -> Result<Subscription>;
}

/// A collection kept in sync by the binder.
///
/// Operations return `Result` so a target that is itself observable can
/// surface failures from its own subscribers.
pub trait TargetCollection<T>: Send + Sync {
    /// Append `item` at the tail.
    fn append(&self, item: T) -> Result<()>;

    /// Remove the first element equal to `item`. Returns whether one was found.
    fn remove_item(&self, item: &T) -> Result<bool>;

    /// Remove every element.
    fn clear(&self) -> Result<()>;
}

impl<T, C: TargetCollection<T> + ?Sized> TargetCollection<T> for Arc<C> {
    fn append(&self, item: T) -> Result<()> {
        (**self).append(item)
    }

    fn remove_item(&self, item: &T) -> Result<bool> {
        (**self).remove_item(item)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

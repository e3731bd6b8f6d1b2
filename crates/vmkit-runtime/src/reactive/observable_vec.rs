#![forbid(unsafe_code)]

//! A shared, observable list.
//!
//! [`ObservableVec<T>`] is a cloneable handle to a lock-protected `Vec<T>`
//! plus a list of change handlers. Every mutation emits exactly one
//! [`CollectionChange`] describing it.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation.
//! 2. Handlers are notified in registration order.
//! 3. Handlers run after the internal lock is released, so they may read the
//!    list or subscribe further handlers.
//! 4. Dropping a [`Subscription`] removes the handler before the next
//!    notification cycle.
//!
//! # Failure Modes
//!
//! - A handler error stops delivery of that notification and is returned to
//!   the mutating caller. The mutation itself has already been applied.
//! - Positional mutations past the end fail with
//!   [`BindError::IndexOutOfRange`] and emit nothing.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use vmkit_core::{
    BindError, ChangeHandler, CollectionChange, ObservableCollection, Result, Subscription,
    TargetCollection,
};

struct Inner<T> {
    items: Vec<T>,
    version: u64,
    handlers: Vec<(u64, ChangeHandler<T>)>,
    next_handler_id: u64,
}

impl<T> Inner<T> {
    fn handlers(&self) -> Vec<ChangeHandler<T>> {
        self.handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
    }
}

/// Shared list that notifies subscribers of every change.
pub struct ObservableVec<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for ObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> ObservableVec<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a list holding `items`. No notification is emitted.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                items,
                version: 0,
                handlers: Vec::new(),
                next_handler_id: 1,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<T>>> {
        self.inner
            .lock()
            .map_err(|_| BindError::PoisonedLock("observable vec"))
    }

    /// Apply `mutate` under the lock, then publish the change it returns.
    fn commit<R>(
        &self,
        mutate: impl FnOnce(&mut Vec<T>) -> Result<(R, CollectionChange<T>)>,
    ) -> Result<R> {
        self.commit_if(|items| mutate(items).map(|(out, change)| (out, Some(change))))
    }

    /// Like `commit`, but a `None` change means nothing was mutated: the
    /// version stays put and no handler runs.
    fn commit_if<R>(
        &self,
        mutate: impl FnOnce(&mut Vec<T>) -> Result<(R, Option<CollectionChange<T>>)>,
    ) -> Result<R> {
        let (out, notification) = {
            let mut inner = self.lock()?;
            let (out, change) = mutate(&mut inner.items)?;
            let notification = change.map(|change| {
                inner.version += 1;
                (change, inner.handlers())
            });
            (out, notification)
        };
        if let Some((change, handlers)) = notification {
            for handler in handlers {
                handler(&change)?;
            }
        }
        Ok(out)
    }

    /// Append `item` at the end.
    ///
    /// # Errors
    ///
    /// A handler error, or [`BindError::PoisonedLock`].
    pub fn push(&self, item: T) -> Result<()> {
        self.commit(|items| {
            let index = items.len();
            items.push(item.clone());
            Ok(((), CollectionChange::added(vec![item], index)))
        })
    }

    /// Append every item of `iter` as a single notification.
    ///
    /// Does nothing (and emits nothing) when `iter` is empty.
    ///
    /// # Errors
    ///
    /// A handler error, or [`BindError::PoisonedLock`].
    pub fn extend(&self, iter: impl IntoIterator<Item = T>) -> Result<()> {
        let added: Vec<T> = iter.into_iter().collect();
        if added.is_empty() {
            return Ok(());
        }
        self.commit(|items| {
            let index = items.len();
            items.extend(added.iter().cloned());
            Ok(((), CollectionChange::added(added, index)))
        })
    }

    /// Insert `item` at `index`, shifting later elements.
    ///
    /// # Errors
    ///
    /// [`BindError::IndexOutOfRange`] when `index > len`, a handler error, or
    /// [`BindError::PoisonedLock`].
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        self.commit(|items| {
            let len = items.len();
            if index > len {
                return Err(BindError::IndexOutOfRange { index, len });
            }
            items.insert(index, item.clone());
            Ok(((), CollectionChange::added(vec![item], index)))
        })
    }

    /// Remove and return the element at `index`.
    ///
    /// # Errors
    ///
    /// [`BindError::IndexOutOfRange`] when `index >= len`, a handler error, or
    /// [`BindError::PoisonedLock`].
    pub fn remove_at(&self, index: usize) -> Result<T> {
        self.commit(|items| {
            let len = items.len();
            if index >= len {
                return Err(BindError::IndexOutOfRange { index, len });
            }
            let removed = items.remove(index);
            Ok((removed.clone(), CollectionChange::removed(vec![removed], index)))
        })
    }

    /// Overwrite the element at `index`, returning the previous value.
    ///
    /// # Errors
    ///
    /// [`BindError::IndexOutOfRange`] when `index >= len`, a handler error, or
    /// [`BindError::PoisonedLock`].
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        self.commit(|items| {
            let len = items.len();
            let Some(slot) = items.get_mut(index) else {
                return Err(BindError::IndexOutOfRange { index, len });
            };
            let old = std::mem::replace(slot, item.clone());
            let change = CollectionChange::Replaced {
                old_items: vec![old.clone()],
                new_items: vec![item],
                index,
            };
            Ok((old, change))
        })
    }

    /// Move the element at `from` so it ends up at `to`.
    ///
    /// # Errors
    ///
    /// [`BindError::IndexOutOfRange`] when either index is `>= len`, a handler
    /// error, or [`BindError::PoisonedLock`].
    pub fn move_item(&self, from: usize, to: usize) -> Result<()> {
        self.commit(|items| {
            let len = items.len();
            for index in [from, to] {
                if index >= len {
                    return Err(BindError::IndexOutOfRange { index, len });
                }
            }
            let moved = items.remove(from);
            items.insert(to, moved.clone());
            let change = CollectionChange::Moved {
                items: vec![moved],
                old_index: from,
                new_index: to,
            };
            Ok(((), change))
        })
    }

    /// Remove every element and emit a reset.
    ///
    /// # Errors
    ///
    /// A handler error, or [`BindError::PoisonedLock`].
    pub fn clear(&self) -> Result<()> {
        self.commit(|items| {
            items.clear();
            Ok(((), CollectionChange::Reset))
        })
    }

    /// Element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.items.get(index).cloned())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.items.len()).unwrap_or(0)
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutation counter; starts at 0.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.lock().map(|inner| inner.version).unwrap_or(0)
    }

    /// Number of attached handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.handlers.len())
            .unwrap_or(0)
    }

    /// Subscribe a plain closure. See [`ObservableCollection::subscribe`].
    ///
    /// # Errors
    ///
    /// [`BindError::PoisonedLock`].
    pub fn observe(
        &self,
        handler: impl Fn(&CollectionChange<T>) -> Result<()> + Send + Sync + 'static,
    ) -> Result<Subscription> {
        self.subscribe(Arc::new(handler))
    }
}

impl<T: PartialEq + Clone + Send + 'static> ObservableVec<T> {
    /// Remove the first element equal to `item`. Returns whether one was found.
    ///
    /// Emits nothing when no element matches.
    ///
    /// # Errors
    ///
    /// A handler error, or [`BindError::PoisonedLock`].
    pub fn remove_item(&self, item: &T) -> Result<bool> {
        self.commit_if(|items| match items.iter().position(|x| x == item) {
            Some(index) => {
                let removed = items.remove(index);
                Ok((true, Some(CollectionChange::removed(vec![removed], index))))
            }
            None => Ok((false, None)),
        })
    }
}

impl<T: Clone + Send + 'static> ObservableCollection<T> for ObservableVec<T> {
    fn snapshot(&self) -> Result<Vec<T>> {
        Ok(self.lock()?.items.clone())
    }

    fn subscribe(&self, handler: ChangeHandler<T>) -> Result<Subscription> {
        let id = {
            let mut inner = self.lock()?;
            let id = inner.next_handler_id;
            inner.next_handler_id += 1;
            inner.handlers.push((id, handler));
            id
        };

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(shared) = weak.upgrade()
                && let Ok(mut inner) = shared.lock()
            {
                inner.handlers.retain(|(handler_id, _)| *handler_id != id);
            }
        }))
    }
}

impl<T: PartialEq + Clone + Send + 'static> TargetCollection<T> for ObservableVec<T> {
    fn append(&self, item: T) -> Result<()> {
        self.push(item)
    }

    fn remove_item(&self, item: &T) -> Result<bool> {
        ObservableVec::remove_item(self, item)
    }

    fn clear(&self) -> Result<()> {
        ObservableVec::clear(self)
    }
}

impl<T: Clone + Send + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> From<Vec<T>> for ObservableVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.lock() {
            Ok(inner) => f
                .debug_struct("ObservableVec")
                .field("items", &inner.items)
                .field("version", &inner.version)
                .field("subscribers", &inner.handlers.len())
                .finish(),
            Err(_) => f.debug_struct("ObservableVec").finish_non_exhaustive(),
        }
    }
}

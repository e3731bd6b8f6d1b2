#![forbid(unsafe_code)]

//! One-way collection binder.
//!
//! A [`PropertyBinder`] mirrors an observable source collection into a target
//! collection, optionally passing every element through a transform. Target
//! mutations are marshalled onto an [`ExecutionContext`] (usually the UI
//! thread's [`Dispatcher`](crate::dispatcher::Dispatcher)).
//!
//! # Usage
//!
//! ```
//! use vmkit_core::ImmediateContext;
//! use vmkit_runtime::reactive::{ObservableVec, PropertyBinder, SharedVec};
//!
//! let binder = PropertyBinder::new(ImmediateContext).unwrap();
//! let source = ObservableVec::from_vec(vec![1, 2, 3]);
//! let target = SharedVec::new();
//!
//! binder.bind_one_way_with(&source, &target, |x: &i32| x * 10).unwrap();
//! assert_eq!(target.snapshot(), vec![10, 20, 30]);
//!
//! source.push(4).unwrap();
//! source.remove_item(&2).unwrap();
//! assert_eq!(target.snapshot(), vec![10, 30, 40]);
//! ```
//!
//! # Forwarding
//!
//! | Source change | Target effect | Where it runs |
//! |---------------|---------------|---------------|
//! | replay at bind | append each current element | calling thread |
//! | `Added` | append each item, in order | execution context |
//! | `Removed` | remove each item by value, in order | execution context |
//! | `Reset` | clear | calling thread (not scheduled) |
//! | `Reset`, transform mapping | clear (per [`ResetPolicy`](crate::ResetPolicy)) | execution context |
//! | anything else | [`BindError::UnsupportedChange`] | calling thread |
//!
//! # Invariants
//!
//! 1. Replay preserves source order and appends after existing target
//!    contents.
//! 2. Items of a single notification are applied in order within one unit of
//!    work.
//! 3. A transformed binding records source→transformed pairs in its own
//!    mapping; a removal takes the recorded counterpart out of the target.
//! 4. After [`unbind_all`](PropertyBinder::unbind_all) no new notification is
//!    forwarded. Work already queued on the context still runs.
//!
//! # Failure Modes
//!
//! - Removing a source element with no recorded counterpart (removed twice,
//!   or added twice and removed twice) fails with [`BindError::KeyNotFound`].
//! - Errors inside scheduled work surface wherever the context runs it:
//!   returned from `invoke` when inline, from the dispatcher's drain otherwise.
//!
//! # Threading
//!
//! The binder assumes bind calls and source mutations come from one logical
//! owner (or are serialized externally). Only the scheduled forwarding work
//! crosses onto the execution context.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vmkit_core::{
    BindError, ChangeHandler, CollectionChange, ExecutionContext, ObservableCollection, Result,
    Subscription, TargetCollection,
};

use crate::config::BinderConfig;

// ---------------------------------------------------------------------------
// Counterparts: source element to target element bookkeeping
// ---------------------------------------------------------------------------

/// Produces target elements for added sources and finds them again on removal.
trait Counterparts<T, U>: Send + Sync {
    fn insert(&self, item: &T) -> Result<U>;
    fn remove(&self, item: &T) -> Result<U>;
    fn reset(&self) -> Result<()>;
    /// Whether [`reset`](Counterparts::reset) has anything to drop.
    fn clears_on_reset(&self) -> bool;
    fn len(&self) -> usize;
}

/// Elements are copied as-is and removed by value; nothing is recorded.
struct Passthrough;

impl<T: Clone> Counterparts<T, T> for Passthrough {
    fn insert(&self, item: &T) -> Result<T> {
        Ok(item.clone())
    }

    fn remove(&self, item: &T) -> Result<T> {
        Ok(item.clone())
    }

    fn reset(&self) -> Result<()> {
        Ok(())
    }

    fn clears_on_reset(&self) -> bool {
        false
    }

    fn len(&self) -> usize {
        0
    }
}

/// Transforms elements and remembers each source element's counterpart.
struct TransformTable<T, U, F> {
    transform: F,
    references: Mutex<HashMap<T, U>>,
    clear_on_reset: bool,
}

impl<T, U, F> TransformTable<T, U, F> {
    fn references(&self) -> Result<MutexGuard<'_, HashMap<T, U>>> {
        self.references
            .lock()
            .map_err(|_| BindError::PoisonedLock("transform table"))
    }
}

impl<T, U, F> Counterparts<T, U> for TransformTable<T, U, F>
where
    T: Clone + Eq + Hash + Send,
    U: Clone + Send,
    F: Fn(&T) -> U + Send + Sync,
{
    fn insert(&self, item: &T) -> Result<U> {
        let transformed = (self.transform)(item);
        self.references()?.insert(item.clone(), transformed.clone());
        Ok(transformed)
    }

    fn remove(&self, item: &T) -> Result<U> {
        self.references()?.remove(item).ok_or(BindError::KeyNotFound)
    }

    fn reset(&self) -> Result<()> {
        if self.clear_on_reset {
            self.references()?.clear();
        }
        Ok(())
    }

    fn clears_on_reset(&self) -> bool {
        self.clear_on_reset
    }

    fn len(&self) -> usize {
        self.references.lock().map(|refs| refs.len()).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Binding: per-binding state shared with the source handler
// ---------------------------------------------------------------------------

/// Type-erased view of a binding kept in the binder's active list.
trait BindingRecord: Send + Sync {
    fn id(&self) -> u64;
    fn is_transformed(&self) -> bool;
    fn mapped_len(&self) -> usize;
}

struct Binding<T, U, Tgt, M> {
    id: u64,
    transformed: bool,
    context: Arc<dyn ExecutionContext>,
    target: Tgt,
    counterparts: M,
    _types: PhantomData<fn(&T) -> U>,
}

impl<T, U, Tgt, M> Binding<T, U, Tgt, M>
where
    T: Send + 'static,
    U: 'static,
    Tgt: TargetCollection<U> + 'static,
    M: Counterparts<T, U> + 'static,
{
    fn replay(&self, items: &[T]) -> Result<()> {
        for item in items {
            let mapped = self.counterparts.insert(item)?;
            self.target.append(mapped)?;
        }
        Ok(())
    }

    fn forward(self: &Arc<Self>, change: &CollectionChange<T>) -> Result<()>
    where
        T: Clone,
    {
        tracing::trace!(
            binding = self.id,
            action = %change.action(),
            items = change.new_items().len() + change.old_items().len(),
            "forwarding collection change"
        );

        match change {
            CollectionChange::Added { items, .. } => {
                let items = items.clone();
                let this = Arc::clone(self);
                self.context.invoke(Box::new(move || this.replay(&items)))
            }
            CollectionChange::Removed { items, .. } => {
                let items = items.clone();
                let this = Arc::clone(self);
                self.context.invoke(Box::new(move || {
                    for item in &items {
                        let mapped = this.counterparts.remove(item)?;
                        this.target.remove_item(&mapped)?;
                    }
                    Ok(())
                }))
            }
            // The target is cleared directly. The mapping is cleared behind
            // removals already queued, which still need their entries.
            CollectionChange::Reset => {
                self.target.clear()?;
                if !self.counterparts.clears_on_reset() {
                    return Ok(());
                }
                let this = Arc::clone(self);
                self.context
                    .invoke(Box::new(move || this.counterparts.reset()))
            }
            other => {
                tracing::warn!(
                    binding = self.id,
                    action = %other.action(),
                    "unsupported collection change"
                );
                Err(BindError::UnsupportedChange(other.action()))
            }
        }
    }
}

impl<T, U, Tgt, M> BindingRecord for Binding<T, U, Tgt, M>
where
    Tgt: Send + Sync,
    M: Counterparts<T, U>,
{
    fn id(&self) -> u64 {
        self.id
    }

    fn is_transformed(&self) -> bool {
        self.transformed
    }

    fn mapped_len(&self) -> usize {
        self.counterparts.len()
    }
}

/// An attached binding: its source subscription plus its state.
struct ActiveBinding {
    subscription: Subscription,
    record: Arc<dyn BindingRecord>,
}

// ---------------------------------------------------------------------------
// PropertyBinder
// ---------------------------------------------------------------------------

/// Synchronizes source collections into target collections.
///
/// Dropping the binder detaches every binding, as
/// [`unbind_all`](Self::unbind_all) does.
pub struct PropertyBinder {
    context: Arc<dyn ExecutionContext>,
    config: BinderConfig,
    bindings: Mutex<Vec<ActiveBinding>>,
    next_id: AtomicU64,
}

impl PropertyBinder {
    /// Create a binder that marshals target mutations onto `context`.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidArgument`] if the context no longer accepts work.
    pub fn new(context: impl ExecutionContext + 'static) -> Result<Self> {
        Self::with_config(context, BinderConfig::default())
    }

    /// Create a binder with explicit configuration.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidArgument`] if the context no longer accepts work.
    pub fn with_config(
        context: impl ExecutionContext + 'static,
        config: BinderConfig,
    ) -> Result<Self> {
        if !context.is_available() {
            return Err(BindError::InvalidArgument {
                name: "context",
                reason: "execution context may not be absent",
            });
        }
        Ok(Self {
            context: Arc::new(context),
            config,
            bindings: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// The binder's configuration.
    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Mirror `source` into `target` without transforming elements.
    ///
    /// Current source elements are appended to `target` immediately; later
    /// changes are forwarded as described in the module docs.
    ///
    /// # Errors
    ///
    /// Errors from reading the source, appending the replayed elements, or
    /// subscribing.
    pub fn bind_one_way<T, S, Tgt>(&self, source: &S, target: &Tgt) -> Result<()>
    where
        T: Clone + Send + 'static,
        S: ObservableCollection<T> + ?Sized,
        Tgt: TargetCollection<T> + Clone + 'static,
    {
        self.attach(source, target.clone(), Passthrough, false)
    }

    /// Mirror `source` into `target`, storing `transform(element)` instead of
    /// each element.
    ///
    /// # Errors
    ///
    /// Errors from reading the source, appending the replayed elements, or
    /// subscribing.
    pub fn bind_one_way_with<T, U, S, Tgt, F>(
        &self,
        source: &S,
        target: &Tgt,
        transform: F,
    ) -> Result<()>
    where
        T: Clone + Eq + Hash + Send + 'static,
        U: Clone + Send + 'static,
        S: ObservableCollection<T> + ?Sized,
        Tgt: TargetCollection<U> + Clone + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let table = TransformTable {
            transform,
            references: Mutex::new(HashMap::new()),
            clear_on_reset: self.config.clears_transforms_on_reset(),
        };
        self.attach(source, target.clone(), table, true)
    }

    fn attach<T, U, S, Tgt, M>(
        &self,
        source: &S,
        target: Tgt,
        counterparts: M,
        transformed: bool,
    ) -> Result<()>
    where
        T: Clone + Send + 'static,
        U: 'static,
        S: ObservableCollection<T> + ?Sized,
        Tgt: TargetCollection<U> + 'static,
        M: Counterparts<T, U> + 'static,
    {
        let binding = Arc::new(Binding {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            transformed,
            context: Arc::clone(&self.context),
            target,
            counterparts,
            _types: PhantomData,
        });

        let existing = source.snapshot()?;
        binding.replay(&existing)?;

        let handler_binding = Arc::clone(&binding);
        let handler: ChangeHandler<T> =
            Arc::new(move |change: &CollectionChange<T>| handler_binding.forward(change));
        let subscription = source.subscribe(handler)?;

        tracing::debug!(
            binding = binding.id,
            transformed,
            replayed = existing.len(),
            "bound collection"
        );

        self.active().push(ActiveBinding {
            subscription,
            record: binding,
        });
        Ok(())
    }

    fn active(&self) -> MutexGuard<'_, Vec<ActiveBinding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Detach every binding made through this binder, in registration order.
    ///
    /// Calling this with no active bindings is a no-op.
    pub fn unbind_all(&self) {
        let detached: Vec<ActiveBinding> = std::mem::take(&mut *self.active());
        if detached.is_empty() {
            return;
        }
        let count = detached.len();
        for mut binding in detached {
            binding.subscription.unsubscribe();
        }
        tracing::debug!(count, "unbound all collections");
    }

    /// Number of active bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.active().len()
    }

    /// Total source→transformed entries recorded across active bindings.
    #[must_use]
    pub fn transform_entry_count(&self) -> usize {
        self.active().iter().map(|b| b.record.mapped_len()).sum()
    }
}

impl Drop for PropertyBinder {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

impl fmt::Debug for PropertyBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.active();
        let ids: Vec<u64> = bindings.iter().map(|b| b.record.id()).collect();
        let transformed = bindings.iter().filter(|b| b.record.is_transformed()).count();
        f.debug_struct("PropertyBinder")
            .field("bindings", &ids)
            .field("transformed", &transformed)
            .field("config", &self.config)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

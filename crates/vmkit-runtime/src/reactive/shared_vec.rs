#![forbid(unsafe_code)]

//! Plain shared list used as a binding target.
//!
//! [`SharedVec<T>`] emits no notifications. Clones share the same storage, so
//! the binder can write into it from the owning context while other code reads
//! or mutates it independently.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use vmkit_core::{BindError, Result, TargetCollection};

/// Lock-protected list shared between clones.
pub struct SharedVec<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for SharedVec<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> SharedVec<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a list holding `items`.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>> {
        self.items
            .lock()
            .map_err(|_| BindError::PoisonedLock("shared vec"))
    }

    /// Run `f` with mutable access to the underlying vector.
    ///
    /// # Errors
    ///
    /// [`BindError::PoisonedLock`].
    pub fn with<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
        let mut items = self.lock()?;
        Ok(f(&mut items))
    }

    /// Append `item` at the tail.
    ///
    /// # Errors
    ///
    /// [`BindError::PoisonedLock`].
    pub fn push(&self, item: T) -> Result<()> {
        self.with(|items| items.push(item))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> SharedVec<T> {
    /// Copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}

impl<T: PartialEq + Send> TargetCollection<T> for SharedVec<T> {
    fn append(&self, item: T) -> Result<()> {
        self.push(item)
    }

    fn remove_item(&self, item: &T) -> Result<bool> {
        self.with(|items| match items.iter().position(|x| x == item) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        })
    }

    fn clear(&self) -> Result<()> {
        self.with(Vec::clear)
    }
}

impl<T> Default for SharedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for SharedVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.items.lock() {
            Ok(items) => f.debug_tuple("SharedVec").field(&*items).finish(),
            Err(_) => f.debug_tuple("SharedVec").field(&"<poisoned>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_remove_clear() {
        let list = SharedVec::new();
        list.append(1).unwrap();
        list.append(2).unwrap();
        list.append(1).unwrap();

        assert!(list.remove_item(&1).unwrap());
        assert_eq!(list.snapshot(), vec![2, 1]);
        assert!(!list.remove_item(&7).unwrap());

        TargetCollection::clear(&list).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn clones_share_storage() {
        let a = SharedVec::from_vec(vec!["x"]);
        let b = a.clone();
        b.push("y").unwrap();
        assert_eq!(a.snapshot(), vec!["x", "y"]);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn with_gives_mutable_access() {
        let list = SharedVec::from_vec(vec![3, 1, 2]);
        list.with(|items| items.sort()).unwrap();
        assert_eq!(list.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn with_returns_closure_result() {
        let list = SharedVec::from_vec(vec![4, 5]);
        assert_eq!(list.with(|items| items.pop()).unwrap(), Some(5));
        assert_eq!(list.snapshot(), vec![4]);
    }

    #[test]
    fn with_reports_poisoned_lock() {
        let list = SharedVec::from_vec(vec![1]);
        let poisoner = list.clone();
        let _ = std::thread::spawn(move || {
            let _: Result<()> = poisoner.with(|_| panic!("poison the shared vec"));
        })
        .join();

        assert_eq!(
            list.with(|items| items.len()),
            Err(BindError::PoisonedLock("shared vec"))
        );
    }

    #[test]
    fn debug_format() {
        let list = SharedVec::from_vec(vec![1, 2]);
        assert_eq!(format!("{list:?}"), "SharedVec([1, 2])");
    }
}

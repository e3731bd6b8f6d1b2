#![forbid(unsafe_code)]

//! Core vocabulary for vmkit collection bindings.
//!
//! This crate holds no state and spawns no threads. It defines the change
//! notifications that observable collections emit, the capabilities the
//! binder consumes (execution context, source, target) and the shared error
//! type. Concrete implementations live in `vmkit-runtime`.

pub mod change;
pub mod collection;
pub mod context;
pub mod error;

pub use change::{ChangeAction, CollectionChange};
pub use collection::{ChangeHandler, ObservableCollection, Subscription, TargetCollection};
pub use context::{ExecutionContext, ImmediateContext, WorkItem};
pub use error::{BindError, Result};

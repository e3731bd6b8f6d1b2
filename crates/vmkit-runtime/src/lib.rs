#![forbid(unsafe_code)]

//! Runtime pieces for vmkit view-models: the [`Dispatcher`] run-loop queue,
//! observable and shared lists, and the [`PropertyBinder`] that keeps them in
//! sync across threads.
//!
//! [`Dispatcher`]: dispatcher::Dispatcher
//! [`PropertyBinder`]: reactive::PropertyBinder

pub mod config;
pub mod dispatcher;
pub mod reactive;

pub use config::{BinderConfig, ResetPolicy};
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use reactive::{ObservableVec, PropertyBinder, SharedVec};

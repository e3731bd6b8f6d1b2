#![forbid(unsafe_code)]

//! Base view-model owning a collection binder.
//!
//! [`ViewModelBase`] is meant to be embedded in concrete view-models. It
//! creates one [`PropertyBinder`] on the constructing thread's dispatcher, so
//! a view-model built on the UI thread marshals all bound collection changes
//! back to that thread. Dropping the view-model detaches its bindings.

use std::fmt;

use vmkit_core::{ExecutionContext, Result};
use vmkit_runtime::{BinderConfig, Dispatcher, PropertyBinder};

/// Anything exposing a collection binder.
pub trait ViewModel {
    /// The binder used for this view-model's collection bindings.
    fn property_binder(&self) -> &PropertyBinder;
}

/// View-model base holding one [`PropertyBinder`].
pub struct ViewModelBase {
    binder: PropertyBinder,
}

impl ViewModelBase {
    /// Bind to the calling thread's [`Dispatcher`].
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidArgument`](vmkit_core::BindError::InvalidArgument)
    /// if the thread's dispatcher has shut down.
    pub fn new() -> Result<Self> {
        Self::with_context(Dispatcher::current())
    }

    /// Bind to an explicit execution context.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidArgument`](vmkit_core::BindError::InvalidArgument)
    /// if `context` no longer accepts work.
    pub fn with_context(context: impl ExecutionContext + 'static) -> Result<Self> {
        Self::with_config(context, BinderConfig::default())
    }

    /// Bind to an explicit execution context with binder configuration.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidArgument`](vmkit_core::BindError::InvalidArgument)
    /// if `context` no longer accepts work.
    pub fn with_config(
        context: impl ExecutionContext + 'static,
        config: BinderConfig,
    ) -> Result<Self> {
        Ok(Self {
            binder: PropertyBinder::with_config(context, config)?,
        })
    }
}

impl ViewModel for ViewModelBase {
    fn property_binder(&self) -> &PropertyBinder {
        &self.binder
    }
}

impl fmt::Debug for ViewModelBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModelBase")
            .field("binder", &self.binder)
            .finish()
    }
}

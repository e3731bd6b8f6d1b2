#![forbid(unsafe_code)]

//! The execution-context capability.
//!
//! An [`ExecutionContext`] is a handle to the single logical thread (usually a
//! UI run-loop) that owns target collections. Work handed to it either runs
//! inline, when the caller is already on the owning context, or is queued for
//! the owner's run-loop. The caller never waits for queued work.

use std::sync::Arc;

use crate::error::Result;

/// A unit of work scheduled onto an execution context.
pub type WorkItem = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Capability to run work on a designated owning context.
pub trait ExecutionContext: Send + Sync {
    /// Run `work` on the owning context.
    ///
    /// When the caller is on the owning context the work runs before this
    /// returns and its result is returned. Otherwise the work is queued and
    /// `Ok(())` is returned; a later failure surfaces from the owner's
    /// run-loop instead.
    ///
    /// # Errors
    ///
    /// The inline work's own error, or
    /// [`BindError::ContextUnavailable`](crate::BindError::ContextUnavailable)
    /// when the context no longer accepts work.
    fn invoke(&self, work: WorkItem) -> Result<()>;

    /// Whether the context still accepts work.
    fn is_available(&self) -> bool {
        true
    }

    /// Whether the calling thread is the owning context.
    fn is_owning_context(&self) -> bool {
        false
    }
}

impl<C: ExecutionContext + ?Sized> ExecutionContext for Arc<C> {
    fn invoke(&self, work: WorkItem) -> Result<()> {
        (**self).invoke(work)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn is_owning_context(&self) -> bool {
        (**self).is_owning_context()
    }
}

/// Context that runs every unit of work inline on the calling thread.
///
/// Useful for headless view-models and tests where no run-loop exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateContext;

impl ExecutionContext for ImmediateContext {
    fn invoke(&self, work: WorkItem) -> Result<()> {
        work()
    }

    fn is_owning_context(&self) -> bool {
        true
    }
}

#![forbid(unsafe_code)]

//! Observable collections and the one-way collection binder.
//!
//! - [`ObservableVec`]: a shared list that emits a change notification for
//!   every mutation.
//! - [`SharedVec`]: a plain shared list, the usual binding target.
//! - [`PropertyBinder`]: mirrors sources into targets, marshalling target
//!   mutations onto an execution context.
//!
//! # Architecture
//!
//! Containers are `Arc<Mutex<..>>` handles so sources can be mutated on worker
//! threads while targets are written on the owning context. Handlers run
//! outside the container lock; a binder's forwarding work for adds and removes
//! is handed to the context, while resets are applied on the notifying thread.

pub mod binder;
pub mod observable_vec;
pub mod shared_vec;

pub use binder::PropertyBinder;
pub use observable_vec::ObservableVec;
pub use shared_vec::SharedVec;

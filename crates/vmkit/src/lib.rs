#![forbid(unsafe_code)]

//! vmkit public facade.
//!
//! Re-exports the collection binder and its supporting types, and adds the
//! two view-model adapters: [`RelayCommand`](command::RelayCommand) and
//! [`ViewModelBase`](view_model::ViewModelBase).
//!
//! # Example
//!
//! ```
//! use vmkit::prelude::*;
//!
//! struct TodoListViewModel {
//!     base: ViewModelBase,
//!     titles: SharedVec<String>,
//! }
//!
//! impl TodoListViewModel {
//!     fn new(model: &ObservableVec<u32>) -> Result<Self> {
//!         let base = ViewModelBase::new()?;
//!         let titles = SharedVec::new();
//!         base.property_binder()
//!             .bind_one_way_with(model, &titles, |id: &u32| format!("Task #{id}"))?;
//!         Ok(Self { base, titles })
//!     }
//! }
//!
//! let model = ObservableVec::from_vec(vec![1, 2]);
//! let vm = TodoListViewModel::new(&model).unwrap();
//! assert_eq!(vm.titles.snapshot(), vec!["Task #1", "Task #2"]);
//! assert_eq!(vm.base.property_binder().binding_count(), 1);
//! ```

pub mod command;
pub mod view_model;

pub use command::{Command, RelayCommand, invalidate_requery_suggested};
pub use view_model::{ViewModel, ViewModelBase};
pub use vmkit_core::{
    BindError, ChangeAction, CollectionChange, ExecutionContext, ImmediateContext,
    ObservableCollection, Result, Subscription, TargetCollection,
};
pub use vmkit_runtime::{
    BinderConfig, Dispatcher, DispatcherHandle, ObservableVec, PropertyBinder, ResetPolicy,
    SharedVec,
};

/// Everything a view-model usually needs.
pub mod prelude {
    pub use crate::command::{Command, RelayCommand};
    pub use crate::view_model::{ViewModel, ViewModelBase};
    pub use vmkit_core::{
        BindError, CollectionChange, ExecutionContext, ObservableCollection, Result,
        TargetCollection,
    };
    pub use vmkit_runtime::{Dispatcher, ObservableVec, PropertyBinder, SharedVec};
}

#![forbid(unsafe_code)]

//! Binder configuration.
//!
//! With the `serde` feature enabled, [`BinderConfig`] can be deserialized from
//! application settings (e.g. a JSON or TOML file). Missing fields take their
//! defaults.

/// What a reset notification does to a transformed binding's element mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResetPolicy {
    /// Forget every source→transformed entry along with the target contents.
    #[default]
    ClearTransforms,
    /// Keep the mapping; only the target is cleared. Stale entries are
    /// overwritten if the same source element is added again.
    KeepTransforms,
}

/// Configuration for a [`PropertyBinder`](crate::reactive::PropertyBinder).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BinderConfig {
    /// Reset handling for transformed bindings.
    pub reset_policy: ResetPolicy,
}

impl BinderConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reset policy.
    #[must_use]
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    /// Whether a reset should drop the transform mapping.
    #[must_use]
    pub fn clears_transforms_on_reset(&self) -> bool {
        self.reset_policy == ResetPolicy::ClearTransforms
    }
}

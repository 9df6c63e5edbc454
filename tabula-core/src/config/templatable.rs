//! Literal-or-provider configuration values

use alloc::boxed::Box;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer};

/// A configuration value that is either a literal or computed at bind time
///
/// Providers are evaluated once, when the owning config is bound into its
/// settings struct. Nothing re-evaluates them afterwards.
pub enum Templatable<T> {
    /// Literal value
    Static(T),
    /// Computed value
    Provider(Box<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Templatable<T> {
    /// Wrap a provider closure
    pub fn provider(f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Templatable::Provider(Box::new(f))
    }

    /// Evaluate to a plain value
    pub fn value(&self) -> T {
        match self {
            Templatable::Static(value) => value.clone(),
            Templatable::Provider(f) => f(),
        }
    }
}

impl<T> From<T> for Templatable<T> {
    fn from(value: T) -> Self {
        Templatable::Static(value)
    }
}

impl<T: Default> Default for Templatable<T> {
    fn default() -> Self {
        Templatable::Static(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Templatable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Templatable::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Templatable::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Loaded configuration only ever carries literals
#[cfg(feature = "serde")]
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Templatable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Templatable::Static)
    }
}

//! Hook points for observing a configuration.
//!
//! Listeners are injected into a [`Configuration`](crate::Configuration)
//! and invoked only after the corresponding operation succeeded. All
//! methods have empty default bodies so implementors pick the events they
//! care about.

use std::path::Path;

use crate::codec::Format;
use crate::value::TypedValue;

/// Receives notifications about a configuration's lifecycle.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use typecfg::{Configuration, ConfigurationListener, PropertyDefinition, TypedValue};
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl ConfigurationListener for Counter {
///     fn on_property_changed(&self, _key: &str, _value: &TypedValue) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let counter = Arc::new(Counter::default());
/// let mut builder = Configuration::builder();
/// builder.filename("app.cfg").listener(counter.clone());
/// builder.put(PropertyDefinition::builder("n").value(1).build().unwrap()).unwrap();
/// let mut config = builder.build().unwrap();
///
/// config.set_value("n", 2).unwrap();
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub trait ConfigurationListener: Send + Sync {
    /// Called after a property's value was replaced.
    fn on_property_changed(&self, _key: &str, _value: &TypedValue) {}

    /// Called after a file was read and its values committed.
    fn on_loaded(&self, _path: &Path, _format: Format) {}

    /// Called after the configuration was written to `path`.
    fn on_saved(&self, _path: &Path, _format: Format) {}

    /// Called after the configuration file at `path` was removed.
    fn on_deleted(&self, _path: &Path) {}
}

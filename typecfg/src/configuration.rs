//! The schema container.
//!
//! A [`Configuration`] owns an insertion-ordered set of
//! [`PropertyDefinition`]s plus the identity metadata (name, version) and
//! file location used by the codecs. Insertion order is the on-disk order.
//!
//! [`Configuration::get`] hands out a shared borrow of the live property;
//! values change only through [`Configuration::set_value`] or a committed
//! read, both of which notify listeners. [`Configuration::snapshot`] returns
//! an independent deep copy for read-only exposure.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codec::{Format, LoadedValues};
use crate::error::{Error, Result};
use crate::listener::ConfigurationListener;
use crate::property::{validate_key, PropertyDefinition};
use crate::value::TypedValue;

/// An ordered, typed property schema bound to one file.
///
/// # Examples
///
/// ```
/// use typecfg::{Configuration, PropertyDefinition};
///
/// let mut builder = Configuration::builder();
/// builder.name("app").version("1.0").filename("app.json");
/// builder.put(PropertyDefinition::builder("lang").value("EN").build().unwrap()).unwrap();
/// let mut config = builder.build().unwrap();
///
/// config.set_value("lang", "FR").unwrap();
/// assert_eq!(config.get("lang").unwrap().value().as_str().unwrap(), "FR");
/// ```
#[derive(Clone)]
pub struct Configuration {
    name: Option<String>,
    version: Option<String>,
    filename: String,
    pathname: Option<PathBuf>,
    properties: Vec<PropertyDefinition>,
    index: HashMap<String, usize>,
    listeners: Vec<Arc<dyn ConfigurationListener>>,
}

impl Configuration {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Returns the schema name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the schema version, if set.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the directory holding the file, if set.
    #[must_use]
    pub fn pathname(&self) -> Option<&Path> {
        self.pathname.as_deref()
    }

    /// Returns `pathname` joined with `filename`.
    ///
    /// Without a pathname the file name is used as a relative path.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        match &self.pathname {
            Some(dir) => dir.join(&self.filename),
            None => PathBuf::from(&self.filename),
        }
    }

    /// Returns `true` if the configuration file exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the configuration holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns `true` if a property with `key` exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates over properties in schema order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.properties.iter()
    }

    /// Iterates over keys in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(PropertyDefinition::key)
    }

    /// Borrows the live property for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for an empty or blank key, and
    /// [`Error::NotFound`] if no such property exists.
    pub fn get(&self, key: &str) -> Result<&PropertyDefinition> {
        let index = self.position(key)?;
        Ok(&self.properties[index])
    }

    /// Borrows the current value of `key`.
    ///
    /// # Errors
    ///
    /// Same as [`Configuration::get`].
    pub fn value(&self, key: &str) -> Result<&TypedValue> {
        self.get(key).map(PropertyDefinition::value)
    }

    /// Replaces the value of `key` and notifies listeners.
    ///
    /// Listeners are not called if the assignment fails.
    ///
    /// # Errors
    ///
    /// Returns the lookup errors of [`Configuration::get`], or
    /// [`Error::TypeMismatch`] if `raw` has a different type than the
    /// property.
    pub fn set_value(&mut self, key: &str, raw: impl Into<TypedValue>) -> Result<()> {
        let index = self.position(key)?;
        let property = &mut self.properties[index];
        property.set_value(raw)?;
        notify_changed(&self.listeners, property);
        Ok(())
    }

    /// Appends a property.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the key is already present.
    pub fn put(&mut self, property: PropertyDefinition) -> Result<()> {
        if self.index.contains_key(property.key()) {
            return Err(Error::DuplicateKey {
                key: property.key().to_string(),
            });
        }
        self.index
            .insert(property.key().to_string(), self.properties.len());
        self.properties.push(property);
        Ok(())
    }

    /// Removes every property and listener.
    ///
    /// Name, version and file location are kept.
    pub fn clear(&mut self) {
        self.properties.clear();
        self.index.clear();
        self.listeners.clear();
    }

    /// Registers a listener.
    pub fn add_listener(&mut self, listener: Arc<dyn ConfigurationListener>) {
        self.listeners.push(listener);
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns an independent read-only deep copy without listeners.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut inner = self.clone();
        inner.listeners.clear();
        Snapshot { inner }
    }

    /// Applies decoded values in one step.
    ///
    /// Every value is checked before any is written, so either all values
    /// are applied or none are. Listeners see each changed property.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if a key is no longer in the schema, or
    /// [`Error::TypeMismatch`] if a type no longer matches.
    pub fn commit(&mut self, loaded: LoadedValues) -> Result<()> {
        let mut staged = Vec::with_capacity(loaded.len());
        for (key, value) in loaded {
            let index = self.position(&key)?;
            let expected = self.properties[index].tag();
            if expected != value.tag() {
                return Err(Error::TypeMismatch {
                    expected,
                    found: value.tag(),
                });
            }
            staged.push((index, value));
        }

        for (index, value) in staged {
            let property = &mut self.properties[index];
            property.set(value)?;
            notify_changed(&self.listeners, property);
        }
        Ok(())
    }

    pub(crate) fn notify_loaded(&self, path: &Path, format: Format) {
        for listener in &self.listeners {
            listener.on_loaded(path, format);
        }
    }

    pub(crate) fn notify_saved(&self, path: &Path, format: Format) {
        for listener in &self.listeners {
            listener.on_saved(path, format);
        }
    }

    pub(crate) fn notify_deleted(&self, path: &Path) {
        for listener in &self.listeners {
            listener.on_deleted(path);
        }
    }

    fn position(&self, key: &str) -> Result<usize> {
        validate_key(key)?;
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| Error::NotFound {
                key: key.to_string(),
            })
    }
}

fn notify_changed(listeners: &[Arc<dyn ConfigurationListener>], property: &PropertyDefinition) {
    for listener in listeners {
        listener.on_property_changed(property.key(), property.value());
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("path", &self.path())
            .field("properties", &self.properties)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Immutable deep copy of a [`Configuration`].
///
/// Dereferences to the configuration, exposing only its read methods.
#[derive(Debug, Clone)]
pub struct Snapshot {
    inner: Configuration,
}

impl Deref for Snapshot {
    type Target = Configuration;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Builder for creating `Configuration` instances.
///
/// The builder can be reused: [`ConfigurationBuilder::build`] borrows it,
/// and [`ConfigurationBuilder::reset`] returns it to its initial state.
#[derive(Default)]
pub struct ConfigurationBuilder {
    name: Option<String>,
    version: Option<String>,
    filename: Option<String>,
    pathname: Option<PathBuf>,
    properties: Vec<PropertyDefinition>,
    listeners: Vec<Arc<dyn ConfigurationListener>>,
}

impl fmt::Debug for ConfigurationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationBuilder")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("filename", &self.filename)
            .field("pathname", &self.pathname)
            .field("properties", &self.properties)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ConfigurationBuilder {
    /// Sets the schema name written to and checked against file headers.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the schema version written to and checked against file headers.
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the file name.
    pub fn filename(&mut self, filename: impl Into<String>) -> &mut Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the directory holding the file.
    pub fn pathname(&mut self, pathname: impl Into<PathBuf>) -> &mut Self {
        self.pathname = Some(pathname.into());
        self
    }

    /// Registers a listener on the built configuration.
    pub fn listener(&mut self, listener: Arc<dyn ConfigurationListener>) -> &mut Self {
        self.listeners.push(listener);
        self
    }

    /// Appends a property.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if the key was already added; the
    /// builder keeps the first property.
    pub fn put(&mut self, property: PropertyDefinition) -> Result<&mut Self> {
        if self.properties.iter().any(|p| p.key() == property.key()) {
            return Err(Error::DuplicateKey {
                key: property.key().to_string(),
            });
        }
        self.properties.push(property);
        Ok(self)
    }

    /// Builds a configuration from the current builder state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompleteBuilder`] if no file name was set or it
    /// is blank.
    pub fn build(&self) -> Result<Configuration> {
        let filename = self
            .filename
            .as_ref()
            .filter(|f| !f.trim().is_empty())
            .ok_or(Error::IncompleteBuilder {
                target: "configuration",
                field: "filename",
            })?;

        let index = self
            .properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.key().to_string(), i))
            .collect();

        Ok(Configuration {
            name: self.name.clone(),
            version: self.version.clone(),
            filename: filename.clone(),
            pathname: self.pathname.clone(),
            properties: self.properties.clone(),
            index,
            listeners: self.listeners.clone(),
        })
    }

    /// Clears every field so the builder can describe a new configuration.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }
}

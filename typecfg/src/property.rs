//! Property definitions.
//!
//! A [`PropertyDefinition`] pairs an immutable identity (key, description,
//! optional flag, validator) with one mutable [`TypedValue`] slot whose tag
//! is fixed by the default value given to the builder.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::{TypedValue, ValueTag};

/// Predicate over a property's value.
///
/// Validators are shared between deep copies of a configuration, so they
/// must be `Send + Sync`.
pub type Validator = Arc<dyn Fn(&TypedValue) -> bool + Send + Sync>;

/// A named, typed, optionally validated configuration property.
///
/// # Examples
///
/// ```
/// use typecfg::PropertyDefinition;
///
/// let lang = PropertyDefinition::builder("lang")
///     .value("EN")
///     .description("Interface language")
///     .validator(|v| v.as_str().map(|s| s.len() == 2).unwrap_or(false))
///     .build()
///     .unwrap();
///
/// assert_eq!(lang.key(), "lang");
/// assert!(lang.is_valid());
/// ```
#[derive(Clone)]
pub struct PropertyDefinition {
    key: String,
    description: Option<String>,
    optional: bool,
    validator: Option<Validator>,
    value: TypedValue,
}

impl PropertyDefinition {
    /// Creates a new property builder for `key`.
    #[must_use]
    pub fn builder(key: impl Into<String>) -> PropertyBuilder {
        PropertyBuilder {
            key: key.into(),
            description: None,
            optional: false,
            validator: None,
            value: None,
        }
    }

    /// Returns the property key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether absence from a file is acceptable.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the current value.
    #[must_use]
    pub const fn value(&self) -> &TypedValue {
        &self.value
    }

    /// Returns the type fixed for this property.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        self.value.tag()
    }

    /// Returns whether a validator is attached.
    #[must_use]
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Returns `true` if the current value passes the validator.
    ///
    /// Properties without a validator are always valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.accepts(&self.value)
    }

    /// Returns `true` if `candidate` would pass the validator.
    #[must_use]
    pub fn accepts(&self, candidate: &TypedValue) -> bool {
        self.validator.as_ref().map_or(true, |check| check(candidate))
    }

    /// Checks the current value against the validator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProperty`] if the validator rejects the value.
    pub fn validate(&self) -> Result<()> {
        self.check(&self.value)
    }

    pub(crate) fn check(&self, candidate: &TypedValue) -> Result<()> {
        if self.accepts(candidate) {
            Ok(())
        } else {
            Err(Error::InvalidProperty {
                key: self.key.clone(),
                value: candidate.to_text(),
            })
        }
    }

    /// Replaces the value, keeping the property's tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` has a different tag.
    pub fn set(&mut self, value: TypedValue) -> Result<()> {
        self.value.set(value)
    }

    /// Converts `raw` and replaces the value with it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `raw` converts to a different tag.
    pub fn set_value(&mut self, raw: impl Into<TypedValue>) -> Result<()> {
        self.value.set_value(raw)
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("key", &self.key)
            .field("description", &self.description)
            .field("optional", &self.optional)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("value", &self.value)
            .finish()
    }
}

/// Builder for creating `PropertyDefinition` instances.
///
/// A key and a default value are required; everything else is optional.
pub struct PropertyBuilder {
    key: String,
    description: Option<String>,
    optional: bool,
    validator: Option<Validator>,
    value: Option<TypedValue>,
}

impl PropertyBuilder {
    /// Sets the default value, which also fixes the property's type.
    #[must_use]
    pub fn value(mut self, value: impl Into<TypedValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the description written alongside the value.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the property as optional.
    ///
    /// Optional properties may be absent from a file under any read policy.
    #[must_use]
    pub const fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Attaches a validator.
    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&TypedValue) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Builds the property.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the key is empty or blank, and
    /// [`Error::IncompleteBuilder`] if no value was set.
    ///
    /// # Examples
    ///
    /// ```
    /// use typecfg::PropertyDefinition;
    ///
    /// assert!(PropertyDefinition::builder("port").value(8080).build().is_ok());
    /// assert!(PropertyDefinition::builder("port").build().is_err());
    /// assert!(PropertyDefinition::builder(" ").value(8080).build().is_err());
    /// ```
    pub fn build(self) -> Result<PropertyDefinition> {
        validate_key(&self.key)?;
        let value = self.value.ok_or(Error::IncompleteBuilder {
            target: "property",
            field: "value",
        })?;

        Ok(PropertyDefinition {
            key: self.key,
            description: self.description,
            optional: self.optional,
            validator: self.validator,
            value,
        })
    }
}

/// Rejects empty and blank keys.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            reason: "key cannot be empty or only whitespace".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_len(len: usize) -> impl Fn(&TypedValue) -> bool + Send + Sync + 'static {
        move |v| v.as_str().map(|s| s.chars().count() >= len).unwrap_or(false)
    }

    #[test]
    fn test_builder_defaults() {
        let property = PropertyDefinition::builder("lang")
            .value("EN")
            .build()
            .unwrap();
        assert_eq!(property.key(), "lang");
        assert_eq!(property.description(), None);
        assert!(!property.is_optional());
        assert!(!property.has_validator());
        assert_eq!(property.tag(), ValueTag::String);
    }

    #[test]
    fn test_builder_requires_value() {
        let err = PropertyDefinition::builder("lang").build().unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteBuilder {
                field: "value",
                ..
            }
        ));
    }

    #[test]
    fn test_builder_rejects_blank_key() {
        let err = PropertyDefinition::builder("")
            .value(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
    }

    #[test]
    fn test_no_validator_is_valid() {
        let property = PropertyDefinition::builder("n").value(0).build().unwrap();
        assert!(property.is_valid());
        assert!(property.validate().is_ok());
    }

    #[test]
    fn test_validator_gates_value() {
        let mut property = PropertyDefinition::builder("name")
            .value("alice")
            .validator(min_len(3))
            .build()
            .unwrap();
        assert!(property.is_valid());

        property.set_value("ok").unwrap();
        assert!(!property.is_valid());
        assert!(matches!(
            property.validate().unwrap_err(),
            Error::InvalidProperty { ref value, .. } if value == "ok"
        ));
    }

    #[test]
    fn test_accepts_checks_candidate_without_mutation() {
        let property = PropertyDefinition::builder("name")
            .value("alice")
            .validator(min_len(3))
            .build()
            .unwrap();
        assert!(!property.accepts(&TypedValue::from("ab")));
        assert_eq!(property.value().as_str().unwrap(), "alice");
    }

    #[test]
    fn test_set_value_keeps_tag() {
        let mut property = PropertyDefinition::builder("retries")
            .value(3_i32)
            .build()
            .unwrap();
        property.set_value(5_i32).unwrap();
        assert_eq!(property.value().as_int().unwrap(), 5);
        assert!(property.set_value("five").is_err());
        assert_eq!(property.value().as_int().unwrap(), 5);
    }

    #[test]
    fn test_clone_shares_validator() {
        let property = PropertyDefinition::builder("name")
            .value("alice")
            .validator(min_len(3))
            .build()
            .unwrap();
        let copy = property.clone();
        assert!(copy.has_validator());
        assert!(!copy.accepts(&TypedValue::from("x")));
    }

    #[test]
    fn test_debug_hides_validator() {
        let property = PropertyDefinition::builder("name")
            .value("alice")
            .validator(min_len(3))
            .build()
            .unwrap();
        let debug = format!("{property:?}");
        assert!(debug.contains("<fn>"));
        assert!(debug.contains("alice"));
    }
}

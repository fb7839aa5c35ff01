//! Read-time reconciliation of a file's keys against the schema.
//!
//! Every reader reduces its parsed tree to `(key, node)` leaves in file
//! order and calls [`reconcile`]. The order of checks is fixed:
//!
//! 1. a key appearing twice fails with `DuplicateProperty` (any policy);
//! 2. strict: a key the schema lacks fails with `UnknownProperty`;
//! 3. strict: a non-optional schema key the file lacks fails with
//!    `MissingProperty`;
//! 4. each present schema key is decoded (`MalformedProperty`) and then
//!    validated (`InvalidProperty`), in schema order, failing fast.
//!
//! Under the tolerant policy unknown keys are skipped and missing keys keep
//! their in-memory value.

use std::collections::{HashMap, HashSet};

use super::LoadedValues;
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::options::ReadPolicy;
use crate::property::PropertyDefinition;
use crate::value::TypedValue;

/// Reconciles `leaves` with `config` and decodes the matching ones.
pub(crate) fn reconcile<N, F>(
    config: &Configuration,
    leaves: Vec<(String, N)>,
    policy: ReadPolicy,
    mut decode: F,
) -> Result<LoadedValues>
where
    F: FnMut(&PropertyDefinition, &N) -> Result<TypedValue>,
{
    let mut found: HashMap<String, N> = HashMap::with_capacity(leaves.len());
    let mut file_order = Vec::with_capacity(leaves.len());
    for (key, node) in leaves {
        if found.contains_key(&key) {
            return Err(Error::DuplicateProperty { key });
        }
        file_order.push(key.clone());
        found.insert(key, node);
    }

    let expected: HashSet<&str> = config.keys().collect();
    for key in &file_order {
        if !expected.contains(key.as_str()) {
            match policy {
                ReadPolicy::Strict => return Err(Error::UnknownProperty { key: key.clone() }),
                ReadPolicy::Tolerant => log::debug!("ignoring unknown property '{key}'"),
            }
        }
    }

    if policy == ReadPolicy::Strict {
        if let Some(missing) = config
            .properties()
            .find(|p| !p.is_optional() && !found.contains_key(p.key()))
        {
            return Err(Error::MissingProperty {
                key: missing.key().to_string(),
            });
        }
    }

    let mut loaded = LoadedValues::default();
    for property in config.properties() {
        let Some(node) = found.get(property.key()) else {
            log::debug!(
                "property '{}' absent from file, keeping current value",
                property.key()
            );
            continue;
        };

        let value = decode(property, node)?;
        if value.tag() != property.tag() {
            return Err(Error::TypeMismatch {
                expected: property.tag(),
                found: value.tag(),
            });
        }
        if let Err(err) = property.check(&value) {
            log::warn!("{err}");
            return Err(err);
        }
        log::debug!("decoded '{}' = {}", property.key(), value);
        loaded.push(property.key(), value);
    }
    Ok(loaded)
}

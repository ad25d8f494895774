//! Layered settings for schema nodes.
//!
//! Every schema node owns a flattened [`SettingsClass`]: the options,
//! computed attributes and validators declared on the node and all of its
//! ancestors. Invoking a builder constructs a [`Settings`] instance from the
//! parent's resolved options plus the caller's overrides.

mod declaration;

pub use declaration::{ComputedDef, Evaluator, OptionDef, OptionType, SettingsClass, ValidatorDef};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{DefinitionError, Error, KeyError, TypeError, ValidationError};
use crate::logger::{self, Logger};

use declaration::type_name;

/// Resolved, validated option values for one schema node.
///
/// Instances are created every time a builder is invoked and never shared
/// between calls. Apart from the logger slot they are immutable; computed
/// attributes are memoized on first access.
pub struct Settings {
    schema: String,
    class: Arc<SettingsClass>,
    values: Map<String, Value>,
    memo: Mutex<HashMap<String, Value>>,
    logger: RwLock<Option<Arc<dyn Logger>>>,
}

impl Settings {
    /// Builds and validates settings for a node.
    ///
    /// `parent` values are merged with `overrides` key by key (overrides win,
    /// values are not deep-merged). Each declared option is then coerced,
    /// type-checked or defaulted, and finally every validator runs in
    /// declaration order.
    ///
    /// ## Errors
    ///
    /// - [`TypeError`] if `overrides` is not a mapping or a value fails its type
    /// - [`KeyError::MissingOption`] if a required option is absent
    /// - [`ValidationError`] for the first failing validator
    pub fn construct(
        class: &Arc<SettingsClass>,
        schema: &str,
        parent: &Map<String, Value>,
        overrides: Value,
        logger: Option<Arc<dyn Logger>>,
    ) -> Result<Self, Error> {
        let overrides = match overrides {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(TypeError::NotAMapping {
                    schema: schema.to_string(),
                    actual: type_name(&other).to_string(),
                }
                .into())
            }
        };

        let mut values = parent.clone();
        values.extend(overrides);

        for option in class.options() {
            let provided = values
                .remove(option.name())
                .or_else(|| values.remove(option.key()));
            let value = match provided {
                Some(value) if !value.is_null() => Some(option.check(schema, value)?),
                provided => match option.default_value(&values) {
                    Some(default) => Some(option.check(schema, default)?),
                    None if option.is_optional() => provided,
                    None => {
                        return Err(KeyError::MissingOption {
                            option: option.name().to_string(),
                            schema: schema.to_string(),
                        }
                        .into())
                    }
                },
            };
            if let Some(value) = value {
                values.insert(option.key().to_string(), value);
            }
        }

        let settings = Self {
            schema: schema.to_string(),
            class: Arc::clone(class),
            values,
            memo: Mutex::new(HashMap::new()),
            logger: RwLock::new(logger),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), Error> {
        let logger = self.logger();
        for validator in &self.class.validators {
            if (validator.body)(self)? {
                continue;
            }
            let err = ValidationError {
                key: validator.key.clone(),
                schema: self.schema.clone(),
                options: self.values.clone(),
            };
            logger::error(logger.as_ref(), "settings", || err.to_string());
            return Err(err.into());
        }
        logger::debug(logger.as_ref(), "settings", || format!("constructed {self}"));
        Ok(())
    }

    /// Name of the schema node these settings belong to.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The flattened declarations these settings were built from.
    pub fn class(&self) -> &Arc<SettingsClass> {
        &self.class
    }

    /// Option values, including undeclared keys inherited from the parent.
    pub fn options(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns an option or computed attribute.
    ///
    /// A declared option that was omitted reads as `null`.
    ///
    /// ## Errors
    ///
    /// [`DefinitionError::UnknownSetting`] when `name` is neither provided nor
    /// declared, or the error raised by a computed attribute.
    pub fn get(&self, name: &str) -> Result<Value, Error> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }
        if let Some(computed) = self.class.computed(name) {
            if let Some(value) = self.memo().get(name) {
                return Ok(value.clone());
            }
            // The lock is not held while computing: attributes may read
            // other attributes.
            let value = (computed.body)(self)?;
            self.memo()
                .entry(name.to_string())
                .or_insert_with(|| value.clone());
            return Ok(value);
        }
        if self.class.declares(name) {
            return Ok(Value::Null);
        }
        Err(DefinitionError::UnknownSetting {
            schema: self.schema.clone(),
            name: name.to_string(),
        }
        .into())
    }

    /// Returns an option or attribute deserialized into `T`.
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        serde_json::from_value(self.get(name)?).map_err(|e| {
            DefinitionError::SettingType {
                schema: self.schema.clone(),
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Returns an option or attribute rendered as text, for use in paths and
    /// headers. Strings are returned verbatim and `null` renders empty.
    pub fn text(&self, name: &str) -> Result<String, Error> {
        Ok(match self.get(name)? {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// The logger in effect for these settings.
    pub fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.logger
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the logger; the only mutable part of a settings instance.
    pub fn set_logger(&self, logger: Option<Arc<dyn Logger>>) {
        *self.logger.write().unwrap_or_else(PoisonError::into_inner) = logger;
    }

    fn memo(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "settings of {} {}", self.schema, Value::Object(self.values.clone()))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("schema", &self.schema)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

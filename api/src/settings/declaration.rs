//! Option, attribute and validator declarations.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use strum::Display;

use crate::error::{Error, TypeError};
use crate::names;

use super::Settings;

/// A closure evaluated against a settings instance.
pub type Evaluator<T> = Arc<dyn Fn(&Settings) -> Result<T, Error> + Send + Sync>;

type Coercion = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;
type DefaultFn = Arc<dyn Fn(&Map<String, Value>) -> Value + Send + Sync>;

/// Type an option value is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OptionType {
    /// Accepts every value.
    #[default]
    Any,
    /// A JSON string.
    String,
    /// A JSON number without fraction.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl OptionType {
    /// Returns `true` if `value` satisfies this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Describes the JSON type of a value for error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Clone)]
enum DefaultValue {
    Literal(Value),
    Computed(DefaultFn),
}

/// Declaration of a constructor option.
///
/// ## Examples
///
/// ```rust
/// use scoped_api::OptionDef;
///
/// let version = OptionDef::integer().default(1);
/// let token = OptionDef::string().optional();
/// let user = OptionDef::string().alias("login");
/// ```
#[derive(Clone, Default)]
pub struct OptionDef {
    name: String,
    kind: OptionType,
    default: Option<DefaultValue>,
    optional: bool,
    alias: Option<String>,
    coerce: Option<Coercion>,
}

impl OptionDef {
    /// Declares an option of the given type.
    pub fn new(kind: OptionType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Declares an option accepting any value.
    pub fn any() -> Self {
        Self::new(OptionType::Any)
    }

    /// Declares a string option.
    pub fn string() -> Self {
        Self::new(OptionType::String)
    }

    /// Declares an integer option.
    pub fn integer() -> Self {
        Self::new(OptionType::Integer)
    }

    /// Declares a numeric option.
    pub fn number() -> Self {
        Self::new(OptionType::Number)
    }

    /// Declares a boolean option.
    pub fn boolean() -> Self {
        Self::new(OptionType::Boolean)
    }

    /// Declares an array option.
    pub fn array() -> Self {
        Self::new(OptionType::Array)
    }

    /// Declares an object option.
    pub fn object() -> Self {
        Self::new(OptionType::Object)
    }

    /// Allows the option to be omitted.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Uses `value` when the option is omitted.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    /// Computes the value from the options collected so far when omitted.
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Computed(Arc::new(f)));
        self
    }

    /// Stores the value under another name.
    ///
    /// Callers pass the option under its declared name; definitions read it
    /// under the alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Converts the incoming value before it is type-checked.
    pub fn coerce<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.coerce = Some(Arc::new(f));
        self
    }

    pub(crate) fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The declared name, used as the input key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key the value is stored under.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// The declared type.
    pub fn kind(&self) -> OptionType {
        self.kind
    }

    /// Returns `true` if the option may be omitted.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub(crate) fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub(crate) fn default_value(&self, collected: &Map<String, Value>) -> Option<Value> {
        match &self.default {
            Some(DefaultValue::Literal(value)) => Some(value.clone()),
            Some(DefaultValue::Computed(f)) => Some(f(collected)),
            None => None,
        }
    }

    /// Applies the coercion and the type check to a provided value.
    pub(crate) fn check(&self, schema: &str, value: Value) -> Result<Value, Error> {
        let value = match &self.coerce {
            Some(coerce) => coerce(value).map_err(|message| TypeError::Coercion {
                option: self.name.clone(),
                schema: schema.to_string(),
                message,
            })?,
            None => value,
        };
        if value.is_null() && self.optional {
            return Ok(value);
        }
        if !self.kind.accepts(&value) {
            return Err(TypeError::OptionType {
                option: self.name.clone(),
                schema: schema.to_string(),
                expected: self.kind.to_string(),
                actual: type_name(&value).to_string(),
            }
            .into());
        }
        Ok(value)
    }
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("alias", &self.alias)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// A memoized attribute derived from the other settings.
#[derive(Clone)]
pub struct ComputedDef {
    pub(crate) name: String,
    pub(crate) body: Evaluator<Value>,
}

impl fmt::Debug for ComputedDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedDef").field("name", &self.name).finish()
    }
}

/// A predicate run against every constructed settings instance.
#[derive(Clone)]
pub struct ValidatorDef {
    pub(crate) key: String,
    pub(crate) body: Evaluator<bool>,
}

impl fmt::Debug for ValidatorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorDef").field("key", &self.key).finish()
    }
}

/// Option, attribute and validator declarations of one schema node.
///
/// Node-local declarations are collected while the schema is defined, then
/// flattened with every ancestor's declarations when the schema is built.
#[derive(Debug, Clone, Default)]
pub struct SettingsClass {
    pub(crate) options: Vec<OptionDef>,
    pub(crate) computed: Vec<ComputedDef>,
    pub(crate) validators: Vec<ValidatorDef>,
}

impl SettingsClass {
    /// Registers an option; a redeclared name replaces the earlier declaration.
    pub(crate) fn declare_option(&mut self, name: &str, def: OptionDef) -> Result<(), Error> {
        names::validate(name)?;
        if let Some(alias) = def.alias_name() {
            names::validate(alias)?;
        }
        upsert(&mut self.options, def.named(name), |o| o.name.as_str());
        Ok(())
    }

    /// Registers a memoized attribute; a redeclared name replaces the earlier one.
    pub(crate) fn declare_computed<F>(&mut self, name: &str, body: F) -> Result<(), Error>
    where
        F: Fn(&Settings) -> Result<Value, Error> + Send + Sync + 'static,
    {
        names::validate(name)?;
        let def = ComputedDef {
            name: name.to_string(),
            body: Arc::new(body),
        };
        upsert(&mut self.computed, def, |c| c.name.as_str());
        Ok(())
    }

    /// Appends a validator. Validators are never replaced, only added.
    pub(crate) fn declare_validator<F>(&mut self, key: &str, body: F) -> Result<(), Error>
    where
        F: Fn(&Settings) -> Result<bool, Error> + Send + Sync + 'static,
    {
        names::validate(key)?;
        self.validators.push(ValidatorDef {
            key: key.to_string(),
            body: Arc::new(body),
        });
        Ok(())
    }

    /// Flattens `parent` with `own` declarations layered on top.
    pub(crate) fn inherit(parent: &SettingsClass, own: &SettingsClass) -> SettingsClass {
        let mut flat = parent.clone();
        for option in &own.options {
            upsert(&mut flat.options, option.clone(), |o| o.name.as_str());
        }
        for computed in &own.computed {
            upsert(&mut flat.computed, computed.clone(), |c| c.name.as_str());
        }
        flat.validators.extend(own.validators.iter().cloned());
        flat
    }

    /// Iterates over the declared options in evaluation order.
    pub fn options(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.iter()
    }

    /// Iterates over validator keys in evaluation order.
    pub fn validator_keys(&self) -> impl Iterator<Item = &str> {
        self.validators.iter().map(|v| v.key.as_str())
    }

    /// Returns `true` if `name` is a declared option key or attribute.
    pub fn declares(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.key() == name) || self.computed(name).is_some()
    }

    pub(crate) fn computed(&self, name: &str) -> Option<&ComputedDef> {
        self.computed.iter().find(|c| c.name == name)
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, name: impl Fn(&T) -> &str) {
    let position = items.iter().position(|existing| name(existing) == name(&item));
    match position {
        Some(index) => items[index] = item,
        None => items.push(item),
    }
}

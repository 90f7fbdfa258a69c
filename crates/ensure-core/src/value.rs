//! # Dynamic Values
//!
//! `Value` is the runtime value every argument, result, and annotation is
//! expressed in. Each value maps onto exactly one [`TypeRef`] through
//! [`Value::type_of`], which drives the is-instance relation used by
//! validation.
//!
//! ## Printable Forms
//!
//! `repr()` produces the quoting-aware form used in error messages
//! (`'abc'`, `[1, 2]`, `<class 'int'>`). `Display` produces the plain form
//! (`abc`). `Debug` is `repr()`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::callable::{descriptor_get, Callable};
use crate::error::ConfigurationError;
use crate::types::{builtins, TypeRef, TypeRegistry};

/// JSON object key naming the class of an instance.
pub const CLASS_KEY: &str = "__class__";

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(BTreeMap<String, Value>),
    Type(TypeRef),
    Instance(Arc<Instance>),
    Callable(Arc<dyn Callable>),
}

impl Value {
    /// Wrap a callable.
    pub fn callable(callable: impl Callable + 'static) -> Self {
        Self::Callable(Arc::new(callable))
    }

    /// The runtime type of this value.
    pub fn type_of(&self) -> TypeRef {
        let b = builtins();
        match self {
            Self::None => b.none_type.clone(),
            Self::Bool(_) => b.bool.clone(),
            Self::Int(_) => b.int.clone(),
            Self::Float(_) => b.float.clone(),
            Self::Str(_) => b.str.clone(),
            Self::List(_) => b.list.clone(),
            Self::Tuple(_) => b.tuple.clone(),
            Self::Dict(_) => b.dict.clone(),
            Self::Type(_) => b.type_.clone(),
            Self::Instance(instance) => instance.class().clone(),
            Self::Callable(_) => b.function.clone(),
        }
    }

    /// Is-instance-of: the value's type equals `ty` or is a subtype of it.
    pub fn is_instance(&self, ty: &TypeRef) -> bool {
        self.type_of().is_subtype_of(ty)
    }

    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Arc<dyn Callable>> {
        match self {
            Self::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attribute read. Instances bind callables found on their class;
    /// callables answer through [`Callable::get_attr`].
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        match self {
            Self::Instance(instance) => instance.get_attr(name),
            Self::Callable(callable) => callable.get_attr(name),
            Self::Type(ty) => match name {
                "__name__" => Some(Self::Str(ty.name().to_string())),
                "__module__" => Some(ty.module().map_or(Self::None, |m| Self::Str(m.to_string()))),
                _ => ty.class_attr(name),
            },
            _ => None,
        }
    }

    /// Printable form with quoting, used in error messages.
    pub fn repr(&self) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => float_repr(*f),
            Self::Str(s) => quote(s),
            Self::List(items) => format!("[{}]", join_reprs(items)),
            Self::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Self::Tuple(items) => format!("({})", join_reprs(items)),
            Self::Dict(entries) => {
                let body: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", quote(key), value.repr()))
                    .collect();
                format!("{{{}}}", body.join(", "))
            }
            Self::Type(ty) => ty.repr(),
            Self::Instance(instance) => format!("<{} object>", instance.class().qualified_name()),
            Self::Callable(callable) => callable.repr(),
        }
    }

    /// Convert a JSON document into a value.
    ///
    /// Objects carrying a `__class__` key become instances of that
    /// registered class, with the remaining keys as instance attributes.
    pub fn from_json(
        json: &serde_json::Value,
        registry: &TypeRegistry,
    ) -> Result<Value, ConfigurationError> {
        use serde_json::Value as Json;

        Ok(match json {
            Json::Null => Self::None,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::Str(s.clone()),
            Json::Array(items) => Self::List(
                items
                    .iter()
                    .map(|item| Self::from_json(item, registry))
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(map) => {
                let mut entries = BTreeMap::new();
                for (key, item) in map {
                    if key == CLASS_KEY {
                        continue;
                    }
                    entries.insert(key.clone(), Self::from_json(item, registry)?);
                }
                match map.get(CLASS_KEY) {
                    Some(Json::String(class_name)) => {
                        let class = registry.resolve(class_name)?;
                        Self::Instance(Instance::with_attrs(class, entries))
                    }
                    Some(other) => {
                        return Err(ConfigurationError::InvalidClassTag {
                            found: other.to_string(),
                        })
                    }
                    None => Self::Dict(entries),
                }
            }
        })
    }
}

fn float_repr(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{sign}inf")
    } else {
        format!("{f:?}")
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn join_reprs(items: &[Value]) -> String {
    items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            other => f.write_str(&other.repr()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

/// Structural equality for data, identity for instances and callables.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Type(a), Self::Type(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => Arc::ptr_eq(a, b),
            (Self::Callable(a), Self::Callable(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<TypeRef> for Value {
    fn from(ty: TypeRef) -> Self {
        Self::Type(ty)
    }
}

impl From<&TypeRef> for Value {
    fn from(ty: &TypeRef) -> Self {
        Self::Type(ty.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Arc<Instance>> for Value {
    fn from(instance: Arc<Instance>) -> Self {
        Self::Instance(instance)
    }
}

/// An object of a user-declared class.
pub struct Instance {
    class: TypeRef,
    attrs: RwLock<BTreeMap<String, Value>>,
}

impl Instance {
    pub fn new(class: TypeRef) -> Arc<Self> {
        Self::with_attrs(class, BTreeMap::new())
    }

    pub fn with_attrs(class: TypeRef, attrs: BTreeMap<String, Value>) -> Arc<Self> {
        Arc::new(Self {
            class,
            attrs: RwLock::new(attrs),
        })
    }

    pub fn class(&self) -> &TypeRef {
        &self.class
    }

    pub fn set_attr(&self, name: impl Into<String>, value: Value) {
        self.attrs.write().insert(name.into(), value);
    }

    /// Own attributes first, then the class namespace. Callables found on
    /// the class come back bound to this instance.
    pub fn get_attr(self: &Arc<Self>, name: &str) -> Option<Value> {
        if let Some(value) = self.attrs.read().get(name) {
            return Some(value.clone());
        }
        match self.class.class_attr(name)? {
            Value::Callable(function) => {
                let receiver = Value::Instance(Arc::clone(self));
                Some(descriptor_get(function, Some(receiver)))
            }
            other => Some(other),
        }
    }
}

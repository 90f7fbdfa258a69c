//! # Type Objects: Runtime Type Hierarchy
//!
//! Defines `TypeRef`, the runtime type reference every annotation resolves
//! to, and `TypeRegistry`, the name-to-type table used by schema documents.
//!
//! ## Subtype Relation
//!
//! A type is a subtype of another when it is the same type, when one of its
//! declared bases is a subtype, or when it is a subtype of a type that was
//! registered as a *virtual subclass* of the other (the abstract-base-class
//! pattern, e.g. `int` registered under `Number`). Virtual registration is
//! inherited by real subclasses of the registered type.
//!
//! Queries walk each graph once with a visited set, so shared ancestors in
//! diamond hierarchies are not revisited.
//!
//! ## Identity
//!
//! Type identity is pointer identity: two classes with the same name are
//! different types unless they are the same `TypeRef`.
//!
//! ## Class Namespaces and Lifetime
//!
//! A class namespace holds strong references. A method stored on a class
//! whose schema annotates `self` with that class keeps the class alive
//! through its own namespace. Call [`TypeRef::clear_class_attrs`] when the
//! class is retired to release its methods.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};

use crate::error::ConfigurationError;
use crate::value::Value;

/// Serializes virtual-subclass registration so the cycle check and the
/// insert are one step across all types.
static VIRTUAL_REGISTRATION: Mutex<()> = parking_lot::const_mutex(());

/// The data behind a [`TypeRef`].
pub struct TypeObject {
    name: String,
    module: Option<String>,
    bases: Vec<TypeRef>,
    namespace: RwLock<BTreeMap<String, Value>>,
    virtual_subclasses: RwLock<Vec<TypeRef>>,
}

/// Shared, cheaply clonable reference to a runtime type.
#[derive(Clone)]
pub struct TypeRef(Arc<TypeObject>);

impl TypeRef {
    fn root(name: &str) -> Self {
        Self(Arc::new(TypeObject {
            name: name.to_string(),
            module: None,
            bases: Vec::new(),
            namespace: RwLock::new(BTreeMap::new()),
            virtual_subclasses: RwLock::new(Vec::new()),
        }))
    }

    /// Create a new class. An empty `bases` list derives from `object`.
    pub fn new_class(name: impl Into<String>, module: Option<&str>, bases: Vec<TypeRef>) -> Self {
        let bases = if bases.is_empty() {
            vec![builtins().object.clone()]
        } else {
            bases
        };
        Self(Arc::new(TypeObject {
            name: name.into(),
            module: module.map(str::to_string),
            bases,
            namespace: RwLock::new(BTreeMap::new()),
            virtual_subclasses: RwLock::new(Vec::new()),
        }))
    }

    /// Short class name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Defining module, if any. Builtins have none.
    pub fn module(&self) -> Option<&str> {
        self.0.module.as_deref()
    }

    /// `module.Name`, or the bare name for builtins.
    pub fn qualified_name(&self) -> String {
        match &self.0.module {
            Some(module) => format!("{module}.{}", self.0.name),
            None => self.0.name.clone(),
        }
    }

    /// Declared bases, in order.
    pub fn bases(&self) -> &[TypeRef] {
        &self.0.bases
    }

    /// Printable identity used in error messages: `<class 'module.Name'>`.
    pub fn repr(&self) -> String {
        format!("<class '{}'>", self.qualified_name())
    }

    /// True when `self` equals `other`, derives from it, or is covered by
    /// one of its registered virtual subclasses.
    pub fn is_subtype_of(&self, other: &TypeRef) -> bool {
        if self == other {
            return true;
        }
        let targets = other.virtual_closure();
        let mut seen: HashSet<&TypeRef> = HashSet::new();
        let mut pending: Vec<&TypeRef> = vec![self];
        while let Some(ty) = pending.pop() {
            if !seen.insert(ty) {
                continue;
            }
            if targets.contains(ty) {
                return true;
            }
            pending.extend(ty.0.bases.iter());
        }
        false
    }

    /// `self` plus every type registered under it, directly or through
    /// another virtual subclass.
    fn virtual_closure(&self) -> HashSet<TypeRef> {
        let mut closure = HashSet::new();
        let mut pending = vec![self.clone()];
        while let Some(ty) = pending.pop() {
            if closure.contains(&ty) {
                continue;
            }
            // Each lock is read once, and released before the next type.
            pending.extend(ty.0.virtual_subclasses.read().iter().cloned());
            closure.insert(ty);
        }
        closure
    }

    /// Register `subclass` as a virtual subclass of `self`.
    ///
    /// Registering a type that is already a subtype is a no-op. Registering
    /// a supertype of `self` is rejected.
    pub fn register_virtual_subclass(&self, subclass: &TypeRef) -> Result<(), ConfigurationError> {
        let _registration = VIRTUAL_REGISTRATION.lock();
        if subclass.is_subtype_of(self) {
            return Ok(());
        }
        if self.is_subtype_of(subclass) {
            return Err(ConfigurationError::SubtypeCycle {
                subclass: subclass.repr(),
                base: self.repr(),
            });
        }
        tracing::debug!(base = %self.repr(), subclass = %subclass.repr(), "registered virtual subclass");
        self.0.virtual_subclasses.write().push(subclass.clone());
        Ok(())
    }

    /// Store an attribute in this class's own namespace.
    pub fn set_class_attr(&self, name: impl Into<String>, value: Value) {
        self.0.namespace.write().insert(name.into(), value);
    }

    /// Remove every attribute from this class's own namespace and return
    /// how many were held. Releases methods that refer back to the class.
    pub fn clear_class_attrs(&self) -> usize {
        let released = std::mem::take(&mut *self.0.namespace.write());
        tracing::debug!(class = %self.repr(), released = released.len(), "cleared class namespace");
        released.len()
    }

    /// Look up a class attribute along the bases, depth first, left to right.
    pub fn class_attr(&self, name: &str) -> Option<Value> {
        let mut seen: HashSet<&TypeRef> = HashSet::new();
        let mut pending: Vec<&TypeRef> = vec![self];
        while let Some(ty) = pending.pop() {
            if !seen.insert(ty) {
                continue;
            }
            if let Some(value) = ty.0.namespace.read().get(name) {
                return Some(value.clone());
            }
            pending.extend(ty.0.bases.iter().rev());
        }
        None
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

/// The builtin types every value maps onto.
pub struct Builtins {
    pub object: TypeRef,
    pub none_type: TypeRef,
    pub int: TypeRef,
    pub bool: TypeRef,
    pub float: TypeRef,
    pub str: TypeRef,
    pub list: TypeRef,
    pub tuple: TypeRef,
    pub dict: TypeRef,
    pub type_: TypeRef,
    pub function: TypeRef,
    /// Abstract numeric type; `int` and `float` are registered under it.
    pub number: TypeRef,
}

impl Builtins {
    fn new() -> Self {
        let object = TypeRef::root("object");
        let derive = |name: &str, module: Option<&str>, base: &TypeRef| {
            TypeRef(Arc::new(TypeObject {
                name: name.to_string(),
                module: module.map(str::to_string),
                bases: vec![base.clone()],
                namespace: RwLock::new(BTreeMap::new()),
                virtual_subclasses: RwLock::new(Vec::new()),
            }))
        };
        let int = derive("int", None, &object);
        let float = derive("float", None, &object);
        let number = derive("Number", Some("numbers"), &object);
        number.0.virtual_subclasses.write().extend([int.clone(), float.clone()]);
        Self {
            none_type: derive("NoneType", None, &object),
            bool: derive("bool", None, &int),
            str: derive("str", None, &object),
            list: derive("list", None, &object),
            tuple: derive("tuple", None, &object),
            dict: derive("dict", None, &object),
            type_: derive("type", None, &object),
            function: derive("function", None, &object),
            int,
            float,
            number,
            object,
        }
    }

    fn named(&self) -> [(&'static str, &TypeRef); 12] {
        [
            ("object", &self.object),
            ("NoneType", &self.none_type),
            ("int", &self.int),
            ("bool", &self.bool),
            ("float", &self.float),
            ("str", &self.str),
            ("list", &self.list),
            ("tuple", &self.tuple),
            ("dict", &self.dict),
            ("type", &self.type_),
            ("function", &self.function),
            ("Number", &self.number),
        ]
    }
}

/// Process-wide builtin types.
pub fn builtins() -> &'static Builtins {
    static BUILTINS: OnceLock<Builtins> = OnceLock::new();
    BUILTINS.get_or_init(Builtins::new)
}

/// Name-to-type table, seeded with the builtins.
#[derive(Clone)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeRef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry holding only the builtins. `None` is accepted as an alias
    /// for `NoneType`.
    pub fn new() -> Self {
        let mut types: BTreeMap<String, TypeRef> = builtins()
            .named()
            .into_iter()
            .map(|(name, ty)| (name.to_string(), ty.clone()))
            .collect();
        types.insert("None".to_string(), builtins().none_type.clone());
        Self { types }
    }

    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    /// Like [`get`](Self::get), failing with `UnknownType`.
    pub fn resolve(&self, name: &str) -> Result<TypeRef, ConfigurationError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Add an existing type under its short name.
    pub fn register(&mut self, ty: TypeRef) -> Result<(), ConfigurationError> {
        if self.types.contains_key(ty.name()) {
            return Err(ConfigurationError::DuplicateType {
                name: ty.name().to_string(),
            });
        }
        self.types.insert(ty.name().to_string(), ty);
        Ok(())
    }

    /// Create and register a class deriving from the named bases.
    pub fn declare_class(
        &mut self,
        name: &str,
        module: Option<&str>,
        bases: &[&str],
    ) -> Result<TypeRef, ConfigurationError> {
        let bases = bases
            .iter()
            .map(|base| self.resolve(base))
            .collect::<Result<Vec<_>, _>>()?;
        let class = TypeRef::new_class(name, module, bases);
        self.register(class.clone())?;
        tracing::debug!(class = %class.repr(), "declared class");
        Ok(class)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

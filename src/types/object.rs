use std::collections::HashMap;
use std::sync::Arc;

use super::error::EvalError;
use super::value::Value;

/// Late-bound member access capability.
///
/// A host value that implements this opts into dynamic resolution: the
/// evaluator probes these hooks before any structural lookup. Returning
/// `None` means "not handled here" and falls through to the registered
/// member table.
pub trait DynamicAccess: Send + Sync {
    fn try_get_member(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    fn try_get_index(&self, index: &Value) -> Option<Value> {
        let _ = index;
        None
    }

    fn try_invoke_member(&self, name: &str, args: &[Value]) -> Option<Value> {
        let _ = (name, args);
        None
    }
}

type PropertyFn = Arc<dyn Fn() -> Value + Send + Sync>;
type MethodFn = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;
type IndexFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

struct Method {
    name: String,
    arity: usize,
    body: MethodFn,
}

/// Structural member lookup table.
///
/// There is no runtime introspection to lean on, so accessors are registered
/// up front. Method dispatch is by name and argument count only; the first
/// registered entry that matches wins.
#[derive(Default)]
pub(crate) struct MemberTable {
    properties: HashMap<String, PropertyFn>,
    fields: HashMap<String, Value>,
    methods: Vec<Method>,
    indexer: Option<IndexFn>,
}

impl MemberTable {
    /// Property first, field second.
    pub(crate) fn property_or_field(&self, name: &str) -> Option<Value> {
        if let Some(get) = self.properties.get(name) {
            return Some(get());
        }
        self.fields.get(name).cloned()
    }

    pub(crate) fn invoke(&self, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.arity == args.len())
            .map(|m| (m.body)(args))
    }

    pub(crate) fn index(&self, index: &Value) -> Option<Value> {
        self.indexer.as_ref().and_then(|get| get(index))
    }
}

struct ObjectInner {
    members: MemberTable,
    dynamic: Option<Box<dyn DynamicAccess>>,
}

/// Handle to an embedder-supplied object value.
///
/// Cloning shares the underlying state; equality is handle identity.
#[derive(Clone)]
pub struct HostObject {
    inner: Arc<ObjectInner>,
}

impl HostObject {
    #[must_use]
    pub fn builder() -> ObjectBuilder {
        ObjectBuilder {
            members: MemberTable::default(),
            dynamic: None,
        }
    }

    /// An object whose members resolve exclusively through a
    /// [`DynamicAccess`] implementation.
    #[must_use]
    pub fn from_dynamic(dynamic: impl DynamicAccess + 'static) -> Self {
        HostObject::builder().dynamic(dynamic).build()
    }

    pub(crate) fn members(&self) -> &MemberTable {
        &self.inner.members
    }

    pub(crate) fn dynamic(&self) -> Option<&dyn DynamicAccess> {
        self.inner.dynamic.as_deref()
    }

    pub(crate) fn same(&self, other: &HostObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Registration builder for [`HostObject`].
pub struct ObjectBuilder {
    members: MemberTable,
    dynamic: Option<Box<dyn DynamicAccess>>,
}

impl ObjectBuilder {
    #[must_use]
    pub fn property(
        mut self,
        name: &str,
        get: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.members
            .properties
            .insert(name.to_owned(), Arc::new(get));
        self
    }

    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members.fields.insert(name.to_owned(), value.into());
        self
    }

    /// Register a method overload. Dispatch matches `name` plus the number of
    /// call arguments, first registration wins.
    #[must_use]
    pub fn method(
        mut self,
        name: &str,
        arity: usize,
        body: impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        self.members.methods.push(Method {
            name: name.to_owned(),
            arity,
            body: Arc::new(body),
        });
        self
    }

    #[must_use]
    pub fn indexer(mut self, get: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) -> Self {
        self.members.indexer = Some(Arc::new(get));
        self
    }

    #[must_use]
    pub fn dynamic(mut self, dynamic: impl DynamicAccess + 'static) -> Self {
        self.dynamic = Some(Box::new(dynamic));
        self
    }

    #[must_use]
    pub fn build(self) -> HostObject {
        HostObject {
            inner: Arc::new(ObjectInner {
                members: self.members,
                dynamic: self.dynamic,
            }),
        }
    }
}

struct TypeInner {
    name: String,
    members: MemberTable,
}

/// A named type reference: static members with no instance.
///
/// Returned by an object resolver to make `Some.Namespace.Type` usable for
/// static property, field, method, and indexer access.
#[derive(Clone)]
pub struct TypeRef {
    inner: Arc<TypeInner>,
}

impl TypeRef {
    #[must_use]
    pub fn builder(name: &str) -> TypeBuilder {
        TypeBuilder {
            name: name.to_owned(),
            members: MemberTable::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn members(&self) -> &MemberTable {
        &self.inner.members
    }

    pub(crate) fn same(&self, other: &TypeRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Registration builder for [`TypeRef`].
pub struct TypeBuilder {
    name: String,
    members: MemberTable,
}

impl TypeBuilder {
    #[must_use]
    pub fn property(
        mut self,
        name: &str,
        get: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        self.members
            .properties
            .insert(name.to_owned(), Arc::new(get));
        self
    }

    #[must_use]
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members.fields.insert(name.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn method(
        mut self,
        name: &str,
        arity: usize,
        body: impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        self.members.methods.push(Method {
            name: name.to_owned(),
            arity,
            body: Arc::new(body),
        });
        self
    }

    #[must_use]
    pub fn indexer(mut self, get: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) -> Self {
        self.members.indexer = Some(Arc::new(get));
        self
    }

    #[must_use]
    pub fn build(self) -> TypeRef {
        TypeRef {
            inner: Arc::new(TypeInner {
                name: self.name,
                members: self.members,
            }),
        }
    }
}

use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Boxed error returned by constructors and factories
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Injectors are shared between threads, so anything resolvable
/// needs to be Send + Sync + 'static
///
/// Unsized types are allowed, which lets tokens resolve straight to trait objects.
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type erased instance produced by a binding
///
/// Wraps the `Arc<T>` handed out to callers, so every clone points at the same allocation.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<T: ?Sized + Injectable>(instance: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance: Arc::new(instance),
        }
    }

    /// Returns the shared `Arc<T>` or the name of the type actually stored
    pub fn downcast<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match self.instance.downcast_ref::<Arc<T>>() {
            Some(inner) => Ok(inner.clone()),
            None => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

//! The downcast table: native type names mapped to wrapper constructors.
//!
//! Every wrapper defined with the crate's wrapper macro submits a [`WrapperKind`]
//! to an [`inventory`] collection at link time. A [`TypeRegistry`] is an immutable
//! index built from that collection (plus any explicitly registered kinds), and the
//! process-wide registry lives in an [`ArcSwapOption`] slot that is filled exactly
//! once. Readers load a snapshot without locking; lookups never observe a
//! partially built table.

use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use ahash::AHashMap;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::object::{ObjectRef, ObjectType, StaticType};

/// Factory producing the most specific wrapper for a native type.
pub struct WrapperKind {
    /// Native type name this kind constructs wrappers for, e.g. `GtkWindow`.
    pub type_name: &'static str,
    /// Rust type name of the wrapper, for diagnostics.
    pub wrapper_name: &'static str,
    /// Wraps an already acquired reference.
    pub construct: fn(ObjectRef) -> Box<dyn ObjectType>,
}

impl WrapperKind {
    #[must_use]
    pub const fn of<T: StaticType>() -> Self {
        Self {
            type_name: T::TYPE_NAME,
            wrapper_name: T::WRAPPER_NAME,
            construct: construct_boxed::<T>,
        }
    }
}

impl fmt::Debug for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperKind")
            .field("type_name", &self.type_name)
            .field("wrapper_name", &self.wrapper_name)
            .finish_non_exhaustive()
    }
}

fn construct_boxed<T: StaticType>(obj: ObjectRef) -> Box<dyn ObjectType> {
    Box::new(T::from_object_ref(obj))
}

inventory::collect!(WrapperKind);

/// Native type name of the root wrapper used when nothing more specific matches.
pub const FALLBACK_TYPE: &str = "GObject";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("native type {type_name} is registered twice ({first} and {second})")]
    Duplicate {
        type_name: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("registry has no wrapper for the root type {FALLBACK_TYPE}")]
    MissingFallback,
    #[error("the global type registry is already initialized")]
    AlreadyInitialized,
}

/// Immutable mapping from native type names to wrapper kinds.
#[derive(Debug)]
pub struct TypeRegistry {
    by_name: AHashMap<&'static str, &'static WrapperKind>,
    fallback: &'static WrapperKind,
}

impl TypeRegistry {
    #[must_use]
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Registry holding every wrapper linked into the binary.
    pub fn from_inventory() -> Result<Self, RegistryError> {
        Self::builder().with_inventory()?.build()
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&'static WrapperKind> {
        self.by_name.get(type_name).copied()
    }

    #[must_use]
    pub fn fallback(&self) -> &'static WrapperKind {
        self.fallback
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Registered native type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    by_name: AHashMap<&'static str, &'static WrapperKind>,
}

impl TypeRegistryBuilder {
    /// Adds every kind submitted through the inventory collection.
    pub fn with_inventory(mut self) -> Result<Self, RegistryError> {
        for kind in inventory::iter::<WrapperKind> {
            self = self.register(kind)?;
        }
        Ok(self)
    }

    /// Adds one kind. Two kinds for the same native type are rejected.
    pub fn register(mut self, kind: &'static WrapperKind) -> Result<Self, RegistryError> {
        if let Some(first) = self.by_name.insert(kind.type_name, kind) {
            return Err(RegistryError::Duplicate {
                type_name: kind.type_name,
                first: first.wrapper_name,
                second: kind.wrapper_name,
            });
        }
        Ok(self)
    }

    pub fn build(self) -> Result<TypeRegistry, RegistryError> {
        let fallback = self
            .by_name
            .get(FALLBACK_TYPE)
            .copied()
            .ok_or(RegistryError::MissingFallback)?;
        Ok(TypeRegistry {
            by_name: self.by_name,
            fallback,
        })
    }
}

static GLOBAL: LazyLock<ArcSwapOption<TypeRegistry>> = LazyLock::new(ArcSwapOption::empty);
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Installs `registry` as the process-wide registry.
///
/// Fails if a registry was already installed, either by an earlier call or
/// lazily by [`global`].
pub fn init(registry: TypeRegistry) -> Result<Arc<TypeRegistry>, RegistryError> {
    let _guard = INIT_LOCK.lock();
    if GLOBAL.load().is_some() {
        return Err(RegistryError::AlreadyInitialized);
    }
    let registry = Arc::new(registry);
    GLOBAL.store(Some(Arc::clone(&registry)));
    Ok(registry)
}

/// The process-wide registry, built from the inventory on first use.
///
/// # Panics
///
/// Panics if the linked wrappers contain duplicate registrations, which is a
/// build-time mistake rather than a runtime condition.
#[must_use]
pub fn global() -> Arc<TypeRegistry> {
    if let Some(registry) = GLOBAL.load_full() {
        return registry;
    }
    let _guard = INIT_LOCK.lock();
    if let Some(registry) = GLOBAL.load_full() {
        return registry;
    }
    let registry = Arc::new(TypeRegistry::from_inventory().unwrap_or_else(|err| panic!("invalid wrapper registrations: {err}")));
    GLOBAL.store(Some(Arc::clone(&registry)));
    registry
}

/// Clears the process-wide slot.
///
/// Bridges keep their own `Arc` to the registry they were created with, so this
/// only affects bridges created afterwards.
pub fn teardown() -> Option<Arc<TypeRegistry>> {
    let _guard = INIT_LOCK.lock();
    GLOBAL.swap(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_contains_the_core_wrappers() {
        let registry = TypeRegistry::from_inventory().unwrap();
        for name in ["GObject", "GInitiallyUnowned", "GtkWidget", "GtkWindow", "GtkApplication", "GtkTreeStore"] {
            assert!(registry.get(name).is_some(), "{name} missing");
        }
        assert_eq!(registry.fallback().type_name, "GObject");
    }

    #[test]
    fn registering_a_type_twice_fails() {
        static WINDOW_AGAIN: WrapperKind = WrapperKind::of::<crate::gtk::Window>();
        let err = TypeRegistry::builder()
            .with_inventory()
            .unwrap()
            .register(&WINDOW_AGAIN)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { type_name: "GtkWindow", .. }));
    }

    #[test]
    fn registry_without_root_is_rejected() {
        static WINDOW: WrapperKind = WrapperKind::of::<crate::gtk::Window>();
        let err = TypeRegistry::builder().register(&WINDOW).unwrap().build().unwrap_err();
        assert_eq!(err, RegistryError::MissingFallback);
    }
}

//! The process-wide registry lifecycle and extension wrapper kinds.
//!
//! The global slot is shared by the whole test binary, so the lifecycle runs
//! as a single test in a file of its own.

use std::{any::Any, sync::Arc};

use gbridge::{
    Bridge, ObjectExt, ObjectRef, ObjectType, Ownership, RegistryError, StaticType, TypeRegistry, WrapperKind, downcast,
    registry, sim::SimRuntime,
};
use pretty_assertions::assert_eq;

/// Wrapper for a label subclass the crate knows nothing about. Defined by hand
/// so it is not part of the inventory.
#[derive(Debug, Clone)]
struct FancyLabel {
    obj: ObjectRef,
}

impl ObjectType for FancyLabel {
    fn as_object_ref(&self) -> &ObjectRef {
        &self.obj
    }

    fn wrapper_name(&self) -> &'static str {
        Self::WRAPPER_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ObjectType> {
        Box::new(self.clone())
    }

    fn into_object_ref_boxed(self: Box<Self>) -> ObjectRef {
        self.obj
    }
}

impl StaticType for FancyLabel {
    const TYPE_NAME: &'static str = "MyFancyLabel";
    const WRAPPER_NAME: &'static str = "FancyLabel";

    fn from_object_ref(obj: ObjectRef) -> Self {
        Self { obj }
    }

    fn into_object_ref(self) -> ObjectRef {
        self.obj
    }
}

static FANCY_LABEL: WrapperKind = WrapperKind::of::<FancyLabel>();

// ============================================================================
// Lifecycle
// ============================================================================

/// `init` refuses an occupied slot, `teardown` empties it, and bridges keep the
/// registry snapshot they were created with.
#[test]
fn registry_lifecycle_and_extension_kinds() {
    let sim = Arc::new(SimRuntime::new());
    sim.register_type("MyFancyLabel", "GtkLabel").unwrap();

    let lazy = registry::global();
    assert!(lazy.get("MyFancyLabel").is_none());
    let old_bridge = Bridge::new(sim.clone());

    let err = registry::init(TypeRegistry::from_inventory().unwrap()).unwrap_err();
    assert_eq!(err, RegistryError::AlreadyInitialized);

    let removed = registry::teardown().unwrap();
    assert!(Arc::ptr_eq(&removed, &lazy));
    assert!(registry::teardown().is_none());

    let custom = TypeRegistry::builder()
        .with_inventory()
        .unwrap()
        .register(&FANCY_LABEL)
        .unwrap()
        .build()
        .unwrap();
    let installed = registry::init(custom).unwrap();
    assert!(Arc::ptr_eq(&installed, &registry::global()));
    assert_eq!(installed.len(), lazy.len() + 1);

    // new bridges pick up the extension kind
    let new_bridge = Bridge::new(sim.clone());
    let fancy = new_bridge.construct("MyFancyLabel", &[], Ownership::Sink).unwrap();
    assert_eq!(fancy.wrapper_name(), "FancyLabel");
    let fancy = downcast::<FancyLabel>(fancy).unwrap();
    assert_eq!(fancy.ref_count().unwrap(), 1);

    // the earlier bridge still resolves through its own snapshot
    assert!(Arc::ptr_eq(old_bridge.registry(), &lazy));
    let plain = old_bridge.construct("MyFancyLabel", &[], Ownership::Sink).unwrap();
    assert_eq!(plain.wrapper_name(), "Label");

    drop((fancy, plain));
    assert_eq!(sim.stats().live_objects, 0);
    assert!(Arc::ptr_eq(&registry::teardown().unwrap(), &installed));
}

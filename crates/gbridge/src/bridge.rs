//! The bridge: one native runtime, the type registry, and the release queue.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, ThreadId},
};

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    adapter::{Ownership, RefAdapter},
    config::BridgeConfig,
    error::{BridgeError, BridgeResult},
    glib::InitiallyUnowned,
    handle::{NativeHandle, RawHandle, TypeTag, cast},
    native::NativeRuntime,
    object::{ObjectRef, ObjectType, StaticType},
    registry::{self, TypeRegistry, WrapperKind},
    release::{ReleasePolicy, ReleaseQueue},
    value::Value,
};

/// Counters describing reference traffic through a bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// References acquired by wrappers (one per wrapper, including clones).
    pub acquired: usize,
    /// References released on the toolkit thread.
    pub released: usize,
    /// Releases that went through the queue.
    pub deferred: usize,
    /// Releases still waiting in the queue.
    pub pending: usize,
}

impl BridgeStats {
    /// Wrappers currently alive, counting queued releases as already dropped.
    #[must_use]
    pub fn live_wrappers(&self) -> usize {
        self.acquired.saturating_sub(self.released + self.deferred)
    }
}

/// Shared handle to the lifetime bridge.
///
/// Cheap to clone. Every [`ObjectRef`] keeps the bridge (and with it the runtime)
/// alive, so queued releases can always reach the runtime.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    runtime: Arc<dyn NativeRuntime>,
    registry: Arc<TypeRegistry>,
    config: BridgeConfig,
    owner: ThreadId,
    releases: ReleaseQueue,
    type_tags: Mutex<AHashMap<Box<str>, TypeTag>>,
    kinds: Mutex<AHashMap<TypeTag, &'static WrapperKind>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    deferred: AtomicUsize,
}

impl Bridge {
    /// Creates a bridge owned by the calling thread, using the global registry.
    #[must_use]
    pub fn new(runtime: Arc<dyn NativeRuntime>) -> Self {
        Self::with_config(runtime, BridgeConfig::default())
    }

    #[must_use]
    pub fn with_config(runtime: Arc<dyn NativeRuntime>, config: BridgeConfig) -> Self {
        Self::with_registry(runtime, registry::global(), config)
    }

    /// Creates a bridge with an explicit registry.
    ///
    /// The calling thread becomes the toolkit thread: the only thread allowed to
    /// forward calls and to drain releases.
    #[must_use]
    pub fn with_registry(runtime: Arc<dyn NativeRuntime>, registry: Arc<TypeRegistry>, config: BridgeConfig) -> Self {
        debug!(runtime = runtime.name(), kinds = registry.len(), policy = %config.release_policy, "bridge created");
        Self {
            inner: Arc::new(BridgeInner {
                runtime,
                registry,
                config,
                owner: thread::current().id(),
                releases: ReleaseQueue::new(),
                type_tags: Mutex::new(AHashMap::new()),
                kinds: Mutex::new(AHashMap::new()),
                acquired: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
                deferred: AtomicUsize::new(0),
            }),
        }
    }

    #[must_use]
    pub fn runtime(&self) -> &dyn NativeRuntime {
        &*self.inner.runtime
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.inner.registry
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.inner.owner
    }

    /// Asserts in debug builds that the caller is on the toolkit thread.
    pub(crate) fn debug_check_thread(&self) {
        if self.inner.config.debug_thread_checks {
            debug_assert!(
                self.is_owner_thread(),
                "native call forwarded from a thread other than the toolkit thread"
            );
        }
    }

    /// Resolves a native type name, caching the result.
    pub fn type_tag(&self, name: &str) -> BridgeResult<TypeTag> {
        if let Some(tag) = self.inner.type_tags.lock().get(name) {
            return Ok(*tag);
        }
        let tag = self
            .runtime()
            .type_from_name(name)
            .ok_or_else(|| BridgeError::UnknownType(name.to_owned()))?;
        self.inner.type_tags.lock().insert(name.into(), tag);
        Ok(tag)
    }

    /// Acquires one reference on `raw` according to `ownership`.
    ///
    /// A null handle produces a null reference without touching the runtime.
    #[must_use]
    pub fn acquire(&self, raw: Option<RawHandle>, ownership: Ownership) -> ObjectRef {
        let Some(raw) = raw else {
            return ObjectRef::from_parts(None, TypeTag::INVALID, self.clone());
        };
        self.debug_check_thread();
        let runtime = self.runtime();
        RefAdapter::new(runtime).acquire(raw, ownership);
        self.inner.acquired.fetch_add(1, Ordering::Relaxed);
        ObjectRef::from_parts(Some(raw), runtime.type_of(raw), self.clone())
    }

    /// Releases the reference of a dropped wrapper.
    pub(crate) fn release(&self, raw: RawHandle) {
        let immediate = self.inner.config.release_policy == ReleasePolicy::Immediate && self.is_owner_thread();
        if immediate {
            RefAdapter::new(self.runtime()).release(raw);
            self.inner.released.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.releases.push(raw);
            self.inner.deferred.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Runs queued releases on the toolkit thread.
    ///
    /// Returns the number of references released. Called from any other thread
    /// this does nothing and returns zero.
    pub fn drain_releases(&self) -> usize {
        if !self.is_owner_thread() {
            warn!("drain_releases called off the toolkit thread; ignoring");
            return 0;
        }
        let limit = self.inner.config.drain_batch.unwrap_or(usize::MAX);
        let adapter = RefAdapter::new(self.runtime());
        let mut drained = 0;
        while drained < limit {
            let Some(raw) = self.inner.releases.pop() else {
                break;
            };
            adapter.release(raw);
            drained += 1;
        }
        if drained > 0 {
            debug!(drained, remaining = self.inner.releases.len(), "drained releases");
        }
        drained
    }

    #[must_use]
    pub fn pending_releases(&self) -> usize {
        self.inner.releases.len()
    }

    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            acquired: self.inner.acquired.load(Ordering::Relaxed),
            released: self.inner.released.load(Ordering::Relaxed),
            deferred: self.inner.deferred.load(Ordering::Relaxed),
            pending: self.inner.releases.len(),
        }
    }

    /// The most specific registered wrapper kind for a native type.
    ///
    /// Walks the parent chain from `tag` to the nearest type with a registered
    /// wrapper, falling back to the root object wrapper.
    #[must_use]
    pub fn resolve_kind(&self, tag: TypeTag) -> &'static WrapperKind {
        if let Some(kind) = self.inner.kinds.lock().get(&tag) {
            return *kind;
        }
        let runtime = self.runtime();
        let mut current = tag;
        let kind = loop {
            if !current.is_valid() {
                debug!(tag = tag.into_raw(), "no registered wrapper in the type chain; using the root wrapper");
                break self.inner.registry.fallback();
            }
            if let Some(kind) = runtime.type_name(current).and_then(|name| self.inner.registry.get(&name)) {
                if current != tag {
                    debug!(wrapper = kind.wrapper_name, "wrapping unregistered type with its nearest registered ancestor");
                }
                break kind;
            }
            current = runtime.type_parent(current);
        };
        self.inner.kinds.lock().insert(tag, kind);
        kind
    }

    /// Wraps a handle returned by a native call in its most specific wrapper.
    ///
    /// A null handle yields a null root-object wrapper.
    #[must_use]
    pub fn wrap(&self, raw: Option<RawHandle>, ownership: Ownership) -> Box<dyn ObjectType> {
        let obj = self.acquire(raw, ownership);
        let kind = if obj.is_null() {
            self.inner.registry.fallback()
        } else {
            self.resolve_kind(obj.tag())
        };
        (kind.construct)(obj)
    }

    /// Wraps a handle as `T`, checking that the native object derives from `T`.
    ///
    /// The reference is acquired before the check, so on a mismatch the wrapper
    /// is dropped and the reference released again; a `Full` transfer is thereby
    /// never leaked.
    pub fn wrap_as<T: StaticType>(&self, raw: Option<RawHandle>, ownership: Ownership) -> BridgeResult<T> {
        let obj = self.acquire(raw, ownership);
        let target = self.type_tag(T::TYPE_NAME)?;
        cast(self.runtime(), obj.native_handle(), target)?;
        Ok(T::from_object_ref(obj))
    }

    /// Wraps a handle in the wrapper registered for `type_name`, checking that
    /// the native object derives from it.
    ///
    /// Unlike [`wrap`](Self::wrap) the wrapper follows the requested type, not
    /// the object's runtime type.
    pub fn wrap_as_type(
        &self,
        raw: Option<RawHandle>,
        type_name: &str,
        ownership: Ownership,
    ) -> BridgeResult<Box<dyn ObjectType>> {
        let obj = self.acquire(raw, ownership);
        let target = self.type_tag(type_name)?;
        cast(self.runtime(), obj.native_handle(), target)?;
        let kind = self.resolve_kind(target);
        Ok((kind.construct)(obj))
    }

    /// Like [`wrap_as`](Self::wrap_as) but a null handle is a `NullResult`.
    pub fn wrap_non_null<T: StaticType>(&self, raw: Option<RawHandle>, ownership: Ownership) -> BridgeResult<T> {
        if raw.is_none() {
            return Err(BridgeError::null(T::TYPE_NAME));
        }
        self.wrap_as(raw, ownership)
    }

    /// Constructs a native object by type name and wraps it dynamically.
    pub fn construct(
        &self,
        type_name: &str,
        properties: &[(&str, Value)],
        ownership: Ownership,
    ) -> BridgeResult<Box<dyn ObjectType>> {
        let raw = self.construct_raw(type_name, properties)?;
        Ok(self.wrap(Some(raw), ownership))
    }

    /// Like [`construct`](Self::construct) with the ownership mode derived from
    /// the type: `GInitiallyUnowned` descendants are sunk, everything else is
    /// adopted. Toplevels the toolkit already sank thereby gain the wrapper's
    /// own reference.
    pub fn construct_dynamic(&self, type_name: &str, properties: &[(&str, Value)]) -> BridgeResult<Box<dyn ObjectType>> {
        let raw = self.construct_raw(type_name, properties)?;
        let unowned = self.type_tag(InitiallyUnowned::TYPE_NAME)?;
        let ownership = if self.runtime().type_is_a(self.runtime().type_of(raw), unowned) {
            Ownership::Sink
        } else {
            Ownership::Full
        };
        Ok(self.wrap(Some(raw), ownership))
    }

    /// Constructs a `T` with the binding site's fixed ownership mode.
    pub fn construct_with<T: StaticType>(&self, properties: &[(&str, Value)], ownership: Ownership) -> BridgeResult<T> {
        let raw = self.construct_raw(T::TYPE_NAME, properties)?;
        self.wrap_as(Some(raw), ownership)
    }

    fn construct_raw(&self, type_name: &str, properties: &[(&str, Value)]) -> BridgeResult<RawHandle> {
        self.debug_check_thread();
        let tag = self.type_tag(type_name)?;
        let raw = self.runtime().construct(tag, properties)?;
        raw.ok_or_else(|| BridgeError::null(format!("new {type_name}")))
    }

    /// Null-tolerant checked view of a handle, without acquiring a reference.
    pub fn cast_handle(&self, raw: Option<RawHandle>, type_name: &str) -> BridgeResult<NativeHandle> {
        let target = self.type_tag(type_name)?;
        cast(self.runtime(), NativeHandle::capture(self.runtime(), raw), target)
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("runtime", &self.inner.runtime.name())
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Drop for BridgeInner {
    fn drop(&mut self) {
        let pending = self.releases.len();
        if pending == 0 {
            return;
        }
        if thread::current().id() == self.owner {
            let adapter = RefAdapter::new(&*self.runtime);
            while let Some(raw) = self.releases.pop() {
                adapter.release(raw);
            }
            debug!(pending, "drained releases on bridge drop");
            return;
        }
        #[cfg(feature = "ref-count-panic")]
        panic!("bridge dropped off the toolkit thread with {pending} undrained releases");
        #[cfg(not(feature = "ref-count-panic"))]
        warn!(pending, "bridge dropped off the toolkit thread; leaking undrained native references");
    }
}

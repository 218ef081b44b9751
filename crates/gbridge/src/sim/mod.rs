//! An in-process toolkit runtime.
//!
//! [`SimRuntime`] models the parts of GObject and GTK 3 the bridge relies on:
//! reference counts with floating references, the toolkit's own reference on
//! every toplevel window, widget parenting, applications holding their windows,
//! tree models holding their cell objects, and explicit destroy.
//!
//! Handles are addresses into an arena whose slots are never reused. Touching a
//! finalized object panics with `object already freed` instead of silently
//! aliasing a newer object, which turns reference-count bugs into test failures.

mod tree;
mod types;
mod widgets;

use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
};

use ahash::AHashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

pub use self::tree::TREE_DOMAIN;
use self::{
    tree::TreeModel,
    types::{Access, Known, PropKind, PropSpec, TypeTable},
};
use crate::{
    error::NativeError,
    handle::{RawHandle, TypeTag},
    native::NativeRuntime,
    value::{TreeIter, Value},
};

/// Error domain for failures raised by the simulator itself.
pub const SIM_DOMAIN: &str = "gbridge-sim";

/// Error domain for property-system failures.
pub const OBJECT_DOMAIN: &str = "g-object";

const BASE_ADDR: usize = 0x1000;
const SLOT_STRIDE: usize = 0x40;
/// Finalized objects whose reference history is kept; older ones are forgotten.
const RETAINED_FINALIZED_LOGS: usize = 256;

// OBJECT_DOMAIN codes
const UNKNOWN_PROPERTY: i32 = 0;
const NOT_WRITABLE: i32 = 1;
const INVALID_VALUE: i32 = 2;
const NOT_INSTANTIABLE: i32 = 3;

// SIM_DOMAIN codes
const WRONG_INSTANCE: i32 = 1;
const BAD_ARGUMENT: i32 = 2;
const DESTROYED: i32 = 3;
const BAD_TYPE: i32 = 4;

/// One entry of an object's reference history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RefOp {
    Construct,
    Ref,
    /// `ref_sink` that cleared the floating flag.
    Sink,
    Unref,
    Finalize,
}

/// Snapshot of the simulator's object population.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    pub live_objects: usize,
    pub finalized: usize,
    /// Windows the toolkit currently holds a reference on.
    pub toplevels: usize,
    pub objects_by_type: BTreeMap<String, usize>,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    struct WindowFlags: u8 {
        const MAXIMIZED = 1 << 0;
        const ICONIFIED = 1 << 1;
        const FULLSCREEN = 1 << 2;
        const STICKY = 1 << 3;
        const KEEP_ABOVE = 1 << 4;
        const KEEP_BELOW = 1 << 5;
    }
}

#[derive(Debug, Default)]
struct WindowState {
    position: (i32, i32),
    size: Option<(i32, i32)>,
    flags: WindowFlags,
    /// Application window id; 0 until added to an application.
    id: u32,
}

#[derive(Debug, Default)]
struct AppState {
    /// Most recently presented first.
    windows: Vec<RawHandle>,
    accels: IndexMap<String, Vec<String>>,
    inhibitors: Vec<(u32, u32)>,
    next_cookie: u32,
    next_window_id: u32,
}

#[derive(Debug)]
enum Payload {
    Plain,
    Window(WindowState),
    Application(AppState),
    TreeStore(TreeModel),
}

#[derive(Debug)]
struct SimObject {
    tag: TypeTag,
    refcount: u32,
    floating: bool,
    destroyed: bool,
    in_destruction: bool,
    props: AHashMap<&'static str, Value>,
    parent: Option<RawHandle>,
    children: Vec<RawHandle>,
    mapped: bool,
    realized: bool,
    payload: Payload,
}

fn sim_error(code: i32, message: impl Into<String>) -> NativeError {
    NativeError::new(SIM_DOMAIN, code, message)
}

fn object_error(code: i32, message: impl Into<String>) -> NativeError {
    NativeError::new(OBJECT_DOMAIN, code, message)
}

/// Positional call arguments with typed accessors.
struct Args<'a> {
    symbol: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(symbol: &'a str, values: &'a [Value]) -> Self {
        Self { symbol, values }
    }

    fn error(&self, index: usize, what: impl fmt::Display) -> NativeError {
        sim_error(BAD_ARGUMENT, format!("{}: argument {index}: {what}", self.symbol))
    }

    fn value(&self, index: usize) -> Result<&'a Value, NativeError> {
        self.values.get(index).ok_or_else(|| self.error(index, "missing"))
    }

    fn mismatch(&self, index: usize, expected: &str, actual: &Value) -> NativeError {
        self.error(index, format_args!("expected {expected}, found {}", actual.kind_name()))
    }

    fn bool(&self, index: usize) -> Result<bool, NativeError> {
        match self.value(index)? {
            Value::Bool(v) => Ok(*v),
            other => Err(self.mismatch(index, "Bool", other)),
        }
    }

    fn int(&self, index: usize) -> Result<i32, NativeError> {
        match self.value(index)? {
            Value::Int(v) => Ok(*v),
            other => Err(self.mismatch(index, "Int", other)),
        }
    }

    fn uint(&self, index: usize) -> Result<u32, NativeError> {
        match self.value(index)? {
            Value::UInt(v) => Ok(*v),
            other => Err(self.mismatch(index, "UInt", other)),
        }
    }

    fn str(&self, index: usize) -> Result<&'a str, NativeError> {
        match self.value(index)? {
            Value::Str(v) => Ok(v),
            other => Err(self.mismatch(index, "Str", other)),
        }
    }

    fn opt_str(&self, index: usize) -> Result<Option<&'a str>, NativeError> {
        match self.value(index)? {
            Value::Null => Ok(None),
            Value::Str(v) => Ok(Some(v)),
            other => Err(self.mismatch(index, "Str or Null", other)),
        }
    }

    fn object(&self, index: usize) -> Result<Option<RawHandle>, NativeError> {
        match self.value(index)? {
            Value::Null => Ok(None),
            Value::Object(raw) => Ok(Some(*raw)),
            other => Err(self.mismatch(index, "Object or Null", other)),
        }
    }

    fn iter(&self, index: usize) -> Result<Option<TreeIter>, NativeError> {
        match self.value(index)? {
            Value::Null => Ok(None),
            Value::TreeIter(iter) => Ok(Some(*iter)),
            other => Err(self.mismatch(index, "TreeIter or Null", other)),
        }
    }

    fn strv(&self, index: usize) -> Result<&'a [String], NativeError> {
        match self.value(index)? {
            Value::Strv(v) => Ok(v),
            other => Err(self.mismatch(index, "Strv", other)),
        }
    }

    fn ints(&self, index: usize) -> Result<&'a [i32], NativeError> {
        match self.value(index)? {
            Value::IntList(v) => Ok(v),
            other => Err(self.mismatch(index, "IntList", other)),
        }
    }

    fn types(&self, index: usize) -> Result<&'a [TypeTag], NativeError> {
        match self.value(index)? {
            Value::TypeList(v) => Ok(v),
            other => Err(self.mismatch(index, "TypeList", other)),
        }
    }
}

/// Whether `id` is a valid `GApplication` identifier.
fn application_id_is_valid(id: &str) -> bool {
    if id.is_empty() || id.len() > 255 || id.starts_with('.') {
        return false;
    }
    let mut elements = 0;
    for element in id.split('.') {
        elements += 1;
        match element.chars().next() {
            None => return false,
            Some(c) if c.is_ascii_digit() => return false,
            Some(_) => {}
        }
        if !element.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return false;
        }
    }
    elements >= 2
}

struct SimState {
    types: TypeTable,
    known: Known,
    slots: Vec<Option<SimObject>>,
    finalized: usize,
    ref_log: AHashMap<RawHandle, Vec<RefOp>>,
    /// Finalized handles with a log entry, oldest first.
    finalized_logs: VecDeque<RawHandle>,
    /// Windows the toolkit holds a reference on, oldest first.
    toplevels: Vec<RawHandle>,
    focus: Option<RawHandle>,
    active_window: Option<RawHandle>,
    /// Owned by the display; never released.
    screen: Option<RawHandle>,
    next_stamp: u32,
}

impl SimState {
    fn new() -> Self {
        let (types, known) = TypeTable::with_builtins();
        Self {
            types,
            known,
            slots: Vec::new(),
            finalized: 0,
            ref_log: AHashMap::new(),
            finalized_logs: VecDeque::new(),
            toplevels: Vec::new(),
            focus: None,
            active_window: None,
            screen: None,
            next_stamp: 1,
        }
    }

    // arena

    fn slot_index(handle: RawHandle) -> Option<usize> {
        let offset = handle.addr().checked_sub(BASE_ADDR)?;
        (offset % SLOT_STRIDE == 0).then_some(offset / SLOT_STRIDE)
    }

    fn try_obj(&self, handle: RawHandle) -> Option<&SimObject> {
        Self::slot_index(handle).and_then(|i| self.slots.get(i)).and_then(Option::as_ref)
    }

    fn obj(&self, handle: RawHandle) -> &SimObject {
        match Self::slot_index(handle).and_then(|i| self.slots.get(i)) {
            Some(Some(obj)) => obj,
            Some(None) => panic!("object already freed: {handle}"),
            None => panic!("not a simulated object: {handle}"),
        }
    }

    fn obj_mut(&mut self, handle: RawHandle) -> &mut SimObject {
        match Self::slot_index(handle).and_then(|i| self.slots.get_mut(i)) {
            Some(Some(obj)) => obj,
            Some(None) => panic!("object already freed: {handle}"),
            None => panic!("not a simulated object: {handle}"),
        }
    }

    fn type_of(&self, handle: RawHandle) -> TypeTag {
        self.obj(handle).tag
    }

    fn is_a(&self, handle: RawHandle, ancestor: TypeTag) -> bool {
        self.types.is_a(self.type_of(handle), ancestor)
    }

    fn type_name_of(&self, handle: RawHandle) -> &str {
        self.types.name(self.type_of(handle))
    }

    fn live_handles(&self) -> impl Iterator<Item = RawHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()?;
            RawHandle::from_addr(BASE_ADDR + i * SLOT_STRIDE)
        })
    }

    fn log(&mut self, handle: RawHandle, op: RefOp) {
        self.ref_log.entry(handle).or_default().push(op);
    }

    fn alloc(&mut self, tag: TypeTag) -> Option<RawHandle> {
        let handle = RawHandle::from_addr(BASE_ADDR + self.slots.len() * SLOT_STRIDE)?;
        let payload = if self.types.is_a(tag, self.known.window) {
            Payload::Window(WindowState::default())
        } else if self.types.is_a(tag, self.known.g_application) {
            Payload::Application(AppState::default())
        } else if self.types.is_a(tag, self.known.tree_store) {
            let stamp = self.next_stamp;
            self.next_stamp = self.next_stamp.wrapping_add(1);
            Payload::TreeStore(TreeModel::new(stamp))
        } else {
            Payload::Plain
        };
        self.slots.push(Some(SimObject {
            tag,
            refcount: 1,
            floating: self.types.is_a(tag, self.known.initially_unowned),
            destroyed: false,
            in_destruction: false,
            props: AHashMap::new(),
            parent: None,
            children: Vec::new(),
            mapped: false,
            realized: false,
            payload,
        }));
        self.log(handle, RefOp::Construct);
        trace!(%handle, type_name = self.types.name(tag), "construct");
        Some(handle)
    }

    // reference counting

    fn inc(&mut self, handle: RawHandle) {
        self.obj_mut(handle).refcount += 1;
        self.log(handle, RefOp::Ref);
    }

    fn sink(&mut self, handle: RawHandle) {
        let obj = self.obj_mut(handle);
        if obj.floating {
            obj.floating = false;
            self.log(handle, RefOp::Sink);
        } else {
            self.inc(handle);
        }
    }

    fn dec(&mut self, handle: RawHandle) {
        self.log(handle, RefOp::Unref);
        self.unref(handle);
    }

    fn unref(&mut self, handle: RawHandle) {
        let obj = self.obj_mut(handle);
        assert!(obj.refcount > 0, "reference count underflow on {handle}");
        obj.refcount -= 1;
        if obj.refcount == 0 {
            self.finalize(handle);
        }
    }

    fn finalize(&mut self, handle: RawHandle) {
        let Some(obj) = Self::slot_index(handle).and_then(|i| self.slots.get_mut(i)).and_then(Option::take) else {
            return;
        };
        self.finalized += 1;
        self.log(handle, RefOp::Finalize);
        self.finalized_logs.push_back(handle);
        if self.finalized_logs.len() > RETAINED_FINALIZED_LOGS
            && let Some(oldest) = self.finalized_logs.pop_front()
        {
            self.ref_log.remove(&oldest);
        }
        trace!(%handle, type_name = self.types.name(obj.tag), "finalize");
        if self.focus == Some(handle) {
            self.focus = None;
        }
        if self.active_window == Some(handle) {
            self.active_window = None;
        }
        for child in obj.children {
            if let Some(child_obj) = Self::slot_index(child).and_then(|i| self.slots.get_mut(i)).and_then(Option::as_mut) {
                child_obj.parent = None;
            }
            self.dec(child);
        }
        for value in obj.props.into_values() {
            if let Value::Object(held) = value {
                self.dec(held);
            }
        }
        match obj.payload {
            Payload::Application(app) => {
                for window in app.windows {
                    self.dec(window);
                }
            }
            Payload::TreeStore(mut model) => {
                for held in model.clear(0) {
                    self.dec(held);
                }
            }
            Payload::Plain | Payload::Window(_) => {}
        }
    }

    // teardown

    fn destroy(&mut self, handle: RawHandle) {
        {
            let obj = self.obj_mut(handle);
            if obj.destroyed || obj.in_destruction {
                return;
            }
            obj.in_destruction = true;
            // held for the duration of the teardown
            obj.refcount += 1;
        }
        debug!(%handle, type_name = self.type_name_of(handle), "destroy");

        while let Some(child) = self.obj(handle).children.first().copied() {
            self.destroy(child);
            if self.obj(handle).children.first() == Some(&child) {
                self.unparent(child);
            }
        }

        if self.is_a(handle, self.known.window) {
            let dependents: Vec<RawHandle> = self
                .live_handles()
                .filter(|&w| w != handle && self.obj(w).props.get("transient-for") == Some(&Value::Object(handle)))
                .collect();
            for dependent in dependents {
                let destroy_with_parent = self.obj(dependent).props.get("destroy-with-parent") == Some(&Value::Bool(true));
                if destroy_with_parent {
                    self.destroy(dependent);
                } else {
                    self.store_property(dependent, "transient-for", Value::Null);
                }
            }
            self.set_window_application(handle, None);
        }
        let windows = match &self.obj(handle).payload {
            Payload::Application(app) => app.windows.clone(),
            _ => Vec::new(),
        };
        for window in windows {
            self.set_window_application(window, None);
        }

        self.unparent(handle);

        let held: Vec<RawHandle> = self
            .obj_mut(handle)
            .props
            .drain()
            .filter_map(|(_, value)| value.as_object())
            .collect();
        for object in held {
            self.dec(object);
        }
        let stamp = self.next_stamp;
        let released = match &mut self.obj_mut(handle).payload {
            Payload::TreeStore(model) => model.clear(stamp),
            _ => Vec::new(),
        };
        self.next_stamp = self.next_stamp.wrapping_add(1);
        for object in released {
            self.dec(object);
        }

        if self.focus == Some(handle) {
            self.focus = None;
        }
        if self.active_window == Some(handle) {
            self.active_window = None;
        }
        {
            let obj = self.obj_mut(handle);
            obj.destroyed = true;
            obj.in_destruction = false;
            obj.mapped = false;
        }
        if let Some(pos) = self.toplevels.iter().position(|&w| w == handle) {
            self.toplevels.remove(pos);
            self.dec(handle);
        }
        self.unref(handle);
    }

    fn check_alive(&self, handle: RawHandle, operation: &str) -> Result<(), NativeError> {
        if self.obj(handle).destroyed {
            return Err(sim_error(
                DESTROYED,
                format!("{operation}: {} {handle} has been destroyed", self.type_name_of(handle)),
            ));
        }
        Ok(())
    }

    fn require(&self, handle: RawHandle, tag: TypeTag, symbol: &str) -> Result<(), NativeError> {
        if self.is_a(handle, tag) {
            return Ok(());
        }
        Err(sim_error(
            WRONG_INSTANCE,
            format!(
                "{symbol}: instance of type {} is not a {}",
                self.type_name_of(handle),
                self.types.name(tag)
            ),
        ))
    }

    // widget tree

    fn set_parent(&mut self, child: RawHandle, parent: RawHandle) {
        self.sink(child);
        self.obj_mut(child).parent = Some(parent);
        self.obj_mut(parent).children.push(child);
    }

    fn unparent(&mut self, child: RawHandle) {
        let Some(parent) = self.obj(child).parent else {
            return;
        };
        self.obj_mut(parent).children.retain(|&c| c != child);
        let obj = self.obj_mut(child);
        obj.parent = None;
        obj.mapped = false;
        if self.focus == Some(child) {
            self.focus = None;
        }
        self.dec(child);
    }

    fn toplevel_of(&self, widget: RawHandle) -> RawHandle {
        let mut current = widget;
        while let Some(parent) = self.obj(current).parent {
            current = parent;
        }
        current
    }

    fn default_screen(&mut self) -> Option<RawHandle> {
        if self.screen.is_none() {
            self.screen = self.alloc(self.known.screen);
        }
        self.screen
    }

    // applications

    /// `gtk_window_set_application`: moves `window` between applications,
    /// keeping the window's reference on its application and the
    /// application's reference on the window in step.
    fn set_window_application(&mut self, window: RawHandle, application: Option<RawHandle>) {
        let current = self.obj(window).props.get("application").and_then(Value::as_object);
        if current == application {
            return;
        }
        if let Some(old) = current {
            if let Payload::Application(app) = &mut self.obj_mut(old).payload {
                app.windows.retain(|&w| w != window);
            }
            self.obj_mut(window).props.remove("application");
            if self.active_window == Some(window) {
                self.active_window = None;
            }
            if let Payload::Window(state) = &mut self.obj_mut(window).payload {
                state.id = 0;
            }
            self.dec(old);
            self.dec(window);
        }
        if let Some(new) = application {
            self.inc(window);
            self.inc(new);
            let is_app_window = self.is_a(window, self.known.application_window);
            let id = match &mut self.obj_mut(new).payload {
                Payload::Application(app) => {
                    app.windows.insert(0, window);
                    app.next_window_id += 1;
                    app.next_window_id
                }
                _ => 0,
            };
            let obj = self.obj_mut(window);
            obj.props.insert("application", Value::Object(new));
            if let Payload::Window(state) = &mut obj.payload {
                if is_app_window {
                    state.id = id;
                }
            }
        }
    }

    // properties

    fn find_prop(&self, handle: RawHandle, name: &str) -> Result<&'static PropSpec, NativeError> {
        self.types.find_prop(self.type_of(handle), name).ok_or_else(|| {
            object_error(
                UNKNOWN_PROPERTY,
                format!("object class '{}' has no property named '{name}'", self.type_name_of(handle)),
            )
        })
    }

    fn check_value(&self, type_name: &str, spec: &PropSpec, value: &Value) -> Result<(), NativeError> {
        let ok = match (spec.kind, value) {
            (PropKind::Bool, Value::Bool(_))
            | (PropKind::Int, Value::Int(_))
            | (PropKind::UInt, Value::UInt(_))
            | (PropKind::Double, Value::Double(_))
            | (PropKind::Str | PropKind::Object(_), Value::Null)
            | (PropKind::Str, Value::Str(_)) => true,
            (PropKind::Object(expected), Value::Object(raw)) => match (self.try_obj(*raw), self.types.lookup(expected)) {
                (Some(obj), Some(expected)) => self.types.is_a(obj.tag, expected),
                _ => false,
            },
            _ => false,
        };
        if ok {
            return Ok(());
        }
        Err(object_error(
            INVALID_VALUE,
            format!(
                "unable to set property '{}' of type {:?} from value of kind {} on {type_name}",
                spec.name,
                spec.kind,
                value.kind_name()
            ),
        ))
    }

    fn get_property(&mut self, handle: RawHandle, name: &str) -> Result<Option<Value>, NativeError> {
        self.check_alive(handle, "g_object_get_property")?;
        let spec = self.find_prop(handle, name)?;
        if spec.access == Access::Computed {
            return Ok(self.computed_property(handle, spec.name));
        }
        let obj = self.obj(handle);
        Ok(obj.props.get(spec.name).cloned().or_else(|| spec.default.to_value()))
    }

    fn computed_property(&mut self, handle: RawHandle, name: &str) -> Option<Value> {
        match name {
            "parent" => self.obj(handle).parent.map(Value::Object),
            "has-focus" => Some(Value::Bool(self.focus == Some(handle))),
            "is-active" | "has-toplevel-focus" => Some(Value::Bool(self.active_window == Some(handle))),
            "screen" => self.default_screen().map(Value::Object),
            "active-window" => match &self.obj(handle).payload {
                Payload::Application(app) => app.windows.first().copied().map(Value::Object),
                _ => None,
            },
            _ => None,
        }
    }

    fn set_property(&mut self, handle: RawHandle, name: &str, value: Value, constructing: bool) -> Result<(), NativeError> {
        self.check_alive(handle, "g_object_set_property")?;
        let spec = self.find_prop(handle, name)?;
        let type_name = self.type_name_of(handle).to_owned();
        match spec.access {
            Access::Computed => {
                return Err(object_error(
                    NOT_WRITABLE,
                    format!("property '{name}' of object class '{type_name}' is not writable"),
                ));
            }
            Access::ConstructOnly if !constructing => {
                return Err(object_error(
                    NOT_WRITABLE,
                    format!("construct property '{name}' for object '{type_name}' can't be set after construction"),
                ));
            }
            Access::ReadWrite | Access::ConstructOnly => {}
        }
        self.check_value(&type_name, spec, &value)?;
        if spec.name == "application" && self.is_a(handle, self.known.window) {
            self.set_window_application(handle, value.as_object());
            return Ok(());
        }
        self.store_property(handle, spec.name, value);
        Ok(())
    }

    /// Stores a checked value. Object values hold a reference.
    fn store_property(&mut self, handle: RawHandle, name: &'static str, value: Value) {
        if let Value::Object(new) = value {
            self.inc(new);
        }
        let props = &mut self.obj_mut(handle).props;
        let old = if value.is_null() {
            props.remove(name)
        } else {
            props.insert(name, value)
        };
        if let Some(Value::Object(old)) = old {
            self.dec(old);
        }
    }

    // construction

    fn construct(&mut self, tag: TypeTag, properties: &[(&str, Value)]) -> Result<Option<RawHandle>, NativeError> {
        let Some(ty) = self.types.get(tag) else {
            return Err(object_error(NOT_INSTANTIABLE, format!("invalid type tag {}", tag.into_raw())));
        };
        if ty.is_abstract || !self.types.is_a(tag, self.known.object) {
            return Err(object_error(
                NOT_INSTANTIABLE,
                format!("cannot create instance of non-instantiable type '{}'", ty.name),
            ));
        }
        let type_name = ty.name.clone();
        for (name, value) in properties {
            let spec = self.types.find_prop(tag, name).ok_or_else(|| {
                object_error(UNKNOWN_PROPERTY, format!("object class '{type_name}' has no property named '{name}'"))
            })?;
            if spec.access == Access::Computed {
                return Err(object_error(
                    NOT_WRITABLE,
                    format!("property '{name}' of object class '{type_name}' is not writable"),
                ));
            }
            self.check_value(&type_name, spec, value)?;
        }
        if self.types.is_a(tag, self.known.g_application) {
            let id = properties.iter().find(|(name, _)| *name == "application-id").and_then(|(_, v)| v.as_str());
            if id.is_some_and(|id| !application_id_is_valid(id)) {
                debug!(?id, "invalid application id; constructor returns null");
                return Ok(None);
            }
        }
        let Some(handle) = self.alloc(tag) else {
            return Ok(None);
        };
        if self.types.is_a(tag, self.known.window) {
            // the toolkit sinks every toplevel into its window list
            self.obj_mut(handle).floating = false;
            self.toplevels.push(handle);
        }
        for (name, value) in properties {
            self.set_property(handle, name, value.clone(), true)?;
        }
        Ok(Some(handle))
    }

    fn register_type(&mut self, name: &str, parent: &str) -> Result<TypeTag, NativeError> {
        if self.types.lookup(name).is_some() {
            return Err(sim_error(BAD_TYPE, format!("type '{name}' is already registered")));
        }
        let parent_tag = self
            .types
            .lookup(parent)
            .ok_or_else(|| sim_error(BAD_TYPE, format!("parent type '{parent}' is not registered")))?;
        if !self.types.is_a(parent_tag, self.known.object) {
            return Err(sim_error(BAD_TYPE, format!("parent type '{parent}' is not an object type")));
        }
        Ok(self.types.insert(name, parent_tag, false, &[]))
    }

    fn stats(&self) -> SimStats {
        let mut objects_by_type = BTreeMap::new();
        let mut live_objects = 0;
        for obj in self.slots.iter().flatten() {
            live_objects += 1;
            *objects_by_type.entry(self.types.name(obj.tag).to_owned()).or_insert(0) += 1;
        }
        SimStats {
            live_objects,
            finalized: self.finalized,
            toplevels: self.toplevels.len(),
            objects_by_type,
        }
    }
}

/// The simulated toolkit.
///
/// Thread-safe in the sense required by [`NativeRuntime`]: state sits behind a
/// mutex, so the bridge's cross-thread type queries are sound. Reference
/// operations still belong on the toolkit thread like with the real toolkit.
pub struct SimRuntime {
    state: Mutex<SimState>,
}

impl SimRuntime {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::new()),
        }
    }

    /// Registers an object type deriving from `parent`, with no properties of
    /// its own and no wrapper. Wrapping one of its instances resolves to the
    /// nearest ancestor with a registered wrapper.
    pub fn register_type(&self, name: &str, parent: &str) -> Result<TypeTag, NativeError> {
        self.state.lock().register_type(name, parent)
    }

    #[must_use]
    pub fn stats(&self) -> SimStats {
        self.state.lock().stats()
    }

    /// Reference history of one object, oldest first.
    #[must_use]
    pub fn ref_log(&self, handle: RawHandle) -> Vec<RefOp> {
        self.state.lock().ref_log.get(&handle).cloned().unwrap_or_default()
    }

    /// Forgets the reference history of every object, live or finalized.
    pub fn clear_ref_logs(&self) {
        let mut state = self.state.lock();
        state.ref_log.clear();
        state.finalized_logs.clear();
    }

    /// Whether `handle` is still allocated. Never panics.
    #[must_use]
    pub fn is_alive(&self, handle: RawHandle) -> bool {
        self.state.lock().try_obj(handle).is_some()
    }

    /// Windows the toolkit currently holds a reference on.
    #[must_use]
    pub fn toplevels(&self) -> Vec<RawHandle> {
        self.state.lock().toplevels.clone()
    }
}

impl Default for SimRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimRuntime").field("stats", &self.stats()).finish()
    }
}

impl NativeRuntime for SimRuntime {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn type_from_name(&self, name: &str) -> Option<TypeTag> {
        self.state.lock().types.lookup(name)
    }

    fn type_name(&self, tag: TypeTag) -> Option<String> {
        self.state.lock().types.get(tag).map(|t| t.name.clone())
    }

    fn type_parent(&self, tag: TypeTag) -> TypeTag {
        self.state.lock().types.parent(tag)
    }

    fn type_is_a(&self, tag: TypeTag, ancestor: TypeTag) -> bool {
        self.state.lock().types.is_a(tag, ancestor)
    }

    fn type_of(&self, handle: RawHandle) -> TypeTag {
        self.state.lock().type_of(handle)
    }

    fn construct(&self, tag: TypeTag, properties: &[(&str, Value)]) -> Result<Option<RawHandle>, NativeError> {
        self.state.lock().construct(tag, properties)
    }

    fn inc_ref(&self, handle: RawHandle) {
        self.state.lock().inc(handle);
    }

    fn ref_sink(&self, handle: RawHandle) {
        self.state.lock().sink(handle);
    }

    fn dec_ref(&self, handle: RawHandle) {
        self.state.lock().dec(handle);
    }

    fn is_floating(&self, handle: RawHandle) -> bool {
        self.state.lock().obj(handle).floating
    }

    fn ref_count(&self, handle: RawHandle) -> u32 {
        self.state.lock().obj(handle).refcount
    }

    fn get_property(&self, handle: RawHandle, name: &str) -> Result<Option<Value>, NativeError> {
        self.state.lock().get_property(handle, name)
    }

    fn set_property(&self, handle: RawHandle, name: &str, value: Value) -> Result<(), NativeError> {
        self.state.lock().set_property(handle, name, value, false)
    }

    fn destroy(&self, handle: RawHandle) {
        self.state.lock().destroy(handle);
    }

    fn is_destroyed(&self, handle: RawHandle) -> bool {
        self.state.lock().obj(handle).destroyed
    }

    fn call(&self, handle: RawHandle, symbol: &str, args: &[Value]) -> Result<Option<Value>, NativeError> {
        let mut state = self.state.lock();
        state.check_alive(handle, symbol)?;
        widgets::call(&mut state, handle, &Args::new(symbol, args))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn construct(sim: &SimRuntime, type_name: &str) -> RawHandle {
        let tag = sim.type_from_name(type_name).unwrap();
        sim.construct(tag, &[]).unwrap().unwrap()
    }

    #[test]
    fn floating_reference_is_sunk_once() {
        let sim = SimRuntime::new();
        let label = construct(&sim, "GtkLabel");
        assert!(sim.is_floating(label));
        sim.ref_sink(label);
        assert!(!sim.is_floating(label));
        assert_eq!(sim.ref_count(label), 1);
        sim.ref_sink(label);
        assert_eq!(sim.ref_count(label), 2);
        sim.dec_ref(label);
        sim.dec_ref(label);
        assert!(!sim.is_alive(label));
        assert_eq!(
            sim.ref_log(label),
            [
                RefOp::Construct,
                RefOp::Sink,
                RefOp::Ref,
                RefOp::Unref,
                RefOp::Unref,
                RefOp::Finalize
            ]
        );
    }

    #[test]
    #[should_panic(expected = "object already freed")]
    fn use_after_finalize_panics() {
        let sim = SimRuntime::new();
        let menu = construct(&sim, "GMenu");
        sim.dec_ref(menu);
        sim.inc_ref(menu);
    }

    #[test]
    fn slots_are_never_reused() {
        let sim = SimRuntime::new();
        let first = construct(&sim, "GMenu");
        sim.dec_ref(first);
        let second = construct(&sim, "GMenu");
        assert_ne!(first, second);
    }

    #[test]
    fn only_recent_finalized_logs_are_kept() {
        let sim = SimRuntime::new();
        let live = construct(&sim, "GMenu");
        let menus: Vec<_> = (0..=RETAINED_FINALIZED_LOGS).map(|_| construct(&sim, "GMenu")).collect();
        for &menu in &menus {
            sim.dec_ref(menu);
        }
        assert!(sim.ref_log(menus[0]).is_empty());
        assert_eq!(sim.ref_log(menus[1]), [RefOp::Construct, RefOp::Unref, RefOp::Finalize]);
        assert_eq!(sim.ref_log(live), [RefOp::Construct]);

        sim.clear_ref_logs();
        assert!(sim.ref_log(live).is_empty());
        assert!(sim.ref_log(menus[RETAINED_FINALIZED_LOGS]).is_empty());
        sim.inc_ref(live);
        assert_eq!(sim.ref_log(live), [RefOp::Ref]);
    }

    #[test]
    fn windows_start_owned_by_the_toolkit() {
        let sim = SimRuntime::new();
        let window = construct(&sim, "GtkWindow");
        assert!(!sim.is_floating(window));
        assert_eq!(sim.ref_count(window), 1);
        assert_eq!(sim.toplevels(), [window]);
        sim.destroy(window);
        assert!(!sim.is_alive(window));
        assert_eq!(sim.stats().toplevels, 0);
    }

    #[test]
    fn destroy_releases_children() {
        let sim = SimRuntime::new();
        let window = construct(&sim, "GtkWindow");
        let label = construct(&sim, "GtkLabel");
        sim.call(window, "gtk_container_add", &[Value::Object(label)]).unwrap();
        assert!(!sim.is_floating(label));
        sim.inc_ref(label);
        sim.destroy(window);
        assert!(sim.is_destroyed(label));
        assert_eq!(sim.ref_count(label), 1);
        sim.dec_ref(label);
        assert_eq!(sim.stats().live_objects, 0);
    }

    #[test]
    fn application_ids_follow_bus_name_rules() {
        assert!(application_id_is_valid("org.example.App"));
        assert!(application_id_is_valid("org.example-app.my_app"));
        assert!(!application_id_is_valid("noperiod"));
        assert!(!application_id_is_valid(".org.example"));
        assert!(!application_id_is_valid("org..example"));
        assert!(!application_id_is_valid("org.7example"));
        assert!(!application_id_is_valid("org.exa mple"));
        assert!(!application_id_is_valid(""));
    }

    #[test]
    fn unknown_property_is_a_native_error() {
        let sim = SimRuntime::new();
        let menu = construct(&sim, "GMenu");
        let err = sim.get_property(menu, "colour").unwrap_err();
        assert_eq!(err.domain, OBJECT_DOMAIN);
        assert_eq!(err.code, UNKNOWN_PROPERTY);
    }

    #[test]
    fn abstract_types_cannot_be_constructed() {
        let sim = SimRuntime::new();
        let tag = sim.type_from_name("GtkWidget").unwrap();
        assert!(sim.construct(tag, &[]).is_err());
        let tag = sim.type_from_name("gint").unwrap();
        assert!(sim.construct(tag, &[]).is_err());
    }

    #[test]
    fn registered_types_inherit_properties() {
        let sim = SimRuntime::new();
        let tag = sim.register_type("MyFancyLabel", "GtkLabel").unwrap();
        let parent = sim.type_from_name("GtkLabel").unwrap();
        assert_eq!(sim.type_parent(tag), parent);
        let label = sim.construct(tag, &[("label", "hi".into())]).unwrap().unwrap();
        assert!(sim.is_floating(label));
        assert_eq!(sim.get_property(label, "label").unwrap(), Some(Value::from("hi")));
        assert!(sim.register_type("MyFancyLabel", "GtkLabel").is_err());
        assert!(sim.register_type("Other", "NoSuchType").is_err());
    }
}

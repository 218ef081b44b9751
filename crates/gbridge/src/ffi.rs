//! The GObject/GTK 3 backend.
//!
//! Links `libgobject-2.0`, `libgio-2.0`, `libgdk-3` and `libgtk-3`. Properties
//! go through `GValue` conversion driven by each property's `GParamSpec`. Only a
//! fixed set of toolkit symbols with known signatures is forwarded by
//! [`NativeRuntime::call`]; every other symbol is reported as unsupported.

use std::{
    ffi::{CString, c_char, c_void},
    ptr,
    sync::LazyLock,
};

use ahash::AHashSet;
use libc::{c_double, c_float, c_int, c_uint};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{
    error::{BridgeError, NativeError},
    glib::{GList, List},
    handle::{RawHandle, TypeTag},
    marshal::{self, NativeStrv},
    native::NativeRuntime,
    value::Value,
};

/// Error domain for values the backend cannot convert.
pub const GOBJECT_DOMAIN: &str = "gbridge-gobject";

type GType = usize;
type GBoolean = c_int;
type GQuark = u32;

const G_TYPE_BOOLEAN: GType = 5 << 2;
const G_TYPE_INT: GType = 6 << 2;
const G_TYPE_UINT: GType = 7 << 2;
const G_TYPE_INT64: GType = 10 << 2;
const G_TYPE_ENUM: GType = 12 << 2;
const G_TYPE_FLAGS: GType = 13 << 2;
const G_TYPE_FLOAT: GType = 14 << 2;
const G_TYPE_DOUBLE: GType = 15 << 2;
const G_TYPE_STRING: GType = 16 << 2;
const G_TYPE_OBJECT: GType = 20 << 2;

#[repr(C)]
struct GTypeClass {
    g_type: GType,
}

#[repr(C)]
struct GTypeInstance {
    g_class: *mut GTypeClass,
}

#[repr(C)]
struct GObject {
    g_type_instance: GTypeInstance,
    ref_count: c_uint,
    qdata: *mut c_void,
}

#[repr(C)]
struct GParamSpec {
    g_type_instance: GTypeInstance,
    name: *const c_char,
    flags: c_uint,
    value_type: GType,
    owner_type: GType,
}

#[repr(C)]
struct GValue {
    g_type: GType,
    data: [u64; 2],
}

#[repr(C)]
struct GError {
    domain: GQuark,
    code: c_int,
    message: *mut c_char,
}

type WeakNotify = unsafe extern "C" fn(data: *mut c_void, where_the_object_was: *mut c_void);

#[link(name = "glib-2.0")]
unsafe extern "C" {
    fn g_quark_to_string(quark: GQuark) -> *const c_char;
    fn g_error_free(error: *mut GError);
    fn g_list_free(list: *mut GList);
    fn g_strfreev(strv: *mut *mut c_char);
}

#[link(name = "gobject-2.0")]
unsafe extern "C" {
    fn g_type_from_name(name: *const c_char) -> GType;
    fn g_type_name(tag: GType) -> *const c_char;
    fn g_type_parent(tag: GType) -> GType;
    fn g_type_is_a(tag: GType, is_a_type: GType) -> GBoolean;
    fn g_type_fundamental(tag: GType) -> GType;
    fn g_type_class_ref(tag: GType) -> *mut c_void;
    fn g_type_class_unref(class: *mut c_void);

    fn g_object_new_with_properties(
        object_type: GType,
        n_properties: c_uint,
        names: *const *const c_char,
        values: *const GValue,
    ) -> *mut c_void;
    fn g_object_ref(object: *mut c_void) -> *mut c_void;
    fn g_object_ref_sink(object: *mut c_void) -> *mut c_void;
    fn g_object_unref(object: *mut c_void);
    fn g_object_is_floating(object: *mut c_void) -> GBoolean;
    fn g_object_class_find_property(class: *mut c_void, name: *const c_char) -> *mut GParamSpec;
    fn g_object_get_property(object: *mut c_void, name: *const c_char, value: *mut GValue);
    fn g_object_set_property(object: *mut c_void, name: *const c_char, value: *const GValue);
    fn g_object_run_dispose(object: *mut c_void);
    fn g_object_weak_ref(object: *mut c_void, notify: WeakNotify, data: *mut c_void);

    fn g_value_init(value: *mut GValue, tag: GType) -> *mut GValue;
    fn g_value_unset(value: *mut GValue);
    fn g_value_get_boolean(value: *const GValue) -> GBoolean;
    fn g_value_set_boolean(value: *mut GValue, v: GBoolean);
    fn g_value_get_int(value: *const GValue) -> c_int;
    fn g_value_set_int(value: *mut GValue, v: c_int);
    fn g_value_get_uint(value: *const GValue) -> c_uint;
    fn g_value_set_uint(value: *mut GValue, v: c_uint);
    fn g_value_get_int64(value: *const GValue) -> i64;
    fn g_value_set_int64(value: *mut GValue, v: i64);
    fn g_value_get_enum(value: *const GValue) -> c_int;
    fn g_value_set_enum(value: *mut GValue, v: c_int);
    fn g_value_get_flags(value: *const GValue) -> c_uint;
    fn g_value_set_flags(value: *mut GValue, v: c_uint);
    fn g_value_get_float(value: *const GValue) -> c_float;
    fn g_value_set_float(value: *mut GValue, v: c_float);
    fn g_value_get_double(value: *const GValue) -> c_double;
    fn g_value_set_double(value: *mut GValue, v: c_double);
    fn g_value_get_string(value: *const GValue) -> *const c_char;
    fn g_value_set_string(value: *mut GValue, v: *const c_char);
    fn g_value_get_object(value: *const GValue) -> *mut c_void;
    fn g_value_set_object(value: *mut GValue, v: *mut c_void);
}

#[link(name = "gio-2.0")]
unsafe extern "C" {
    fn g_application_get_type() -> GType;
    fn g_menu_model_get_type() -> GType;
    fn g_menu_get_type() -> GType;
}

#[link(name = "gdk-3")]
unsafe extern "C" {
    fn gdk_screen_get_type() -> GType;
}

#[link(name = "gtk-3")]
unsafe extern "C" {
    fn gtk_init_check(argc: *mut c_int, argv: *mut *mut *mut c_char) -> GBoolean;

    fn gtk_widget_get_type() -> GType;
    fn gtk_misc_get_type() -> GType;
    fn gtk_label_get_type() -> GType;
    fn gtk_container_get_type() -> GType;
    fn gtk_bin_get_type() -> GType;
    fn gtk_button_get_type() -> GType;
    fn gtk_window_get_type() -> GType;
    fn gtk_application_window_get_type() -> GType;
    fn gtk_application_get_type() -> GType;
    fn gtk_tree_store_get_type() -> GType;

    fn gtk_widget_destroy(widget: *mut c_void);
    fn gtk_widget_show(widget: *mut c_void);
    fn gtk_widget_hide(widget: *mut c_void);
    fn gtk_widget_show_all(widget: *mut c_void);
    fn gtk_widget_get_toplevel(widget: *mut c_void) -> *mut c_void;
    fn gtk_container_add(container: *mut c_void, widget: *mut c_void);
    fn gtk_container_remove(container: *mut c_void, widget: *mut c_void);
    fn gtk_container_get_children(container: *mut c_void) -> *mut GList;
    fn gtk_window_present(window: *mut c_void);
    fn gtk_window_move(window: *mut c_void, x: c_int, y: c_int);
    fn gtk_window_resize(window: *mut c_void, width: c_int, height: c_int);
    fn gtk_window_get_size(window: *mut c_void, width: *mut c_int, height: *mut c_int);
    fn gtk_window_get_position(window: *mut c_void, x: *mut c_int, y: *mut c_int);
    fn gtk_window_get_screen(window: *mut c_void) -> *mut c_void;
    fn gtk_window_set_icon_from_file(window: *mut c_void, filename: *const c_char, error: *mut *mut GError) -> GBoolean;
    fn gtk_application_add_window(application: *mut c_void, window: *mut c_void);
    fn gtk_application_remove_window(application: *mut c_void, window: *mut c_void);
    fn gtk_application_get_windows(application: *mut c_void) -> *mut GList;
    fn gtk_application_get_accels_for_action(application: *mut c_void, name: *const c_char) -> *mut *mut c_char;
    fn gtk_application_set_accels_for_action(
        application: *mut c_void,
        name: *const c_char,
        accels: *const *const c_char,
    );
}

/// Types registered lazily by their `get_type` function; `g_type_from_name`
/// only knows them once that function ran.
const LAZY_TYPES: &[(&str, unsafe extern "C" fn() -> GType)] = &[
    ("GApplication", g_application_get_type),
    ("GMenuModel", g_menu_model_get_type),
    ("GMenu", g_menu_get_type),
    ("GdkScreen", gdk_screen_get_type),
    ("GtkWidget", gtk_widget_get_type),
    ("GtkMisc", gtk_misc_get_type),
    ("GtkLabel", gtk_label_get_type),
    ("GtkContainer", gtk_container_get_type),
    ("GtkBin", gtk_bin_get_type),
    ("GtkButton", gtk_button_get_type),
    ("GtkWindow", gtk_window_get_type),
    ("GtkApplicationWindow", gtk_application_window_get_type),
    ("GtkApplication", gtk_application_get_type),
    ("GtkTreeStore", gtk_tree_store_get_type),
];

/// Addresses of objects that were explicitly destroyed and not yet finalized.
static DESTROYED: LazyLock<Mutex<AHashSet<usize>>> = LazyLock::new(|| Mutex::new(AHashSet::new()));

unsafe extern "C" fn forget_destroyed(_data: *mut c_void, where_the_object_was: *mut c_void) {
    DESTROYED.lock().remove(&(where_the_object_was as usize));
}

fn conversion_error(message: impl Into<String>) -> NativeError {
    NativeError::new(GOBJECT_DOMAIN, 0, message)
}

fn marshal_error(err: BridgeError) -> NativeError {
    conversion_error(err.to_string())
}

fn c_name(name: &str) -> Result<CString, NativeError> {
    marshal::to_c_string(name).map_err(marshal_error)
}

/// Takes ownership of a `GError` and translates it.
///
/// # Safety
///
/// `error` must be a valid `GError` owned by the caller.
unsafe fn take_error(error: *mut GError) -> NativeError {
    // SAFETY: valid GError per the caller contract; the quark string is static
    let (domain, code, message) = unsafe {
        let domain = marshal::opt_string_from_ptr(g_quark_to_string((*error).domain)).ok().flatten();
        let message = marshal::opt_string_from_ptr((*error).message).ok().flatten();
        (domain, (*error).code, message)
    };
    // SAFETY: owned by us, freed exactly once after its contents were copied
    unsafe { g_error_free(error) };
    NativeError::new(domain.unwrap_or_default(), code, message.unwrap_or_default())
}

/// A `GValue` unset on drop.
struct OwnedValue(GValue);

impl OwnedValue {
    fn new(tag: GType) -> Self {
        let mut value = GValue {
            g_type: 0,
            data: [0; 2],
        };
        // SAFETY: a zeroed GValue is the required state for g_value_init
        unsafe { g_value_init(&raw mut value, tag) };
        Self(value)
    }

    fn as_ptr(&self) -> *const GValue {
        &raw const self.0
    }

    fn as_mut_ptr(&mut self) -> *mut GValue {
        &raw mut self.0
    }

    /// Reads the value as a bridge value; null strings and objects are `None`.
    fn read(&self) -> Result<Option<Value>, NativeError> {
        let ptr = self.as_ptr();
        // SAFETY: the value was initialized with its own type, and each getter
        // matches the fundamental type it is called for
        let value = unsafe {
            match g_type_fundamental(self.0.g_type) {
                G_TYPE_BOOLEAN => Some(Value::Bool(g_value_get_boolean(ptr) != 0)),
                G_TYPE_INT => Some(Value::Int(g_value_get_int(ptr))),
                G_TYPE_UINT => Some(Value::UInt(g_value_get_uint(ptr))),
                G_TYPE_INT64 => Some(Value::Int64(g_value_get_int64(ptr))),
                G_TYPE_ENUM => Some(Value::Int(g_value_get_enum(ptr))),
                G_TYPE_FLAGS => Some(Value::UInt(g_value_get_flags(ptr))),
                G_TYPE_FLOAT => Some(Value::Double(f64::from(g_value_get_float(ptr)))),
                G_TYPE_DOUBLE => Some(Value::Double(g_value_get_double(ptr))),
                G_TYPE_STRING => marshal::opt_string_from_ptr(g_value_get_string(ptr))
                    .map_err(marshal_error)?
                    .map(Value::Str),
                G_TYPE_OBJECT => RawHandle::from_ptr(g_value_get_object(ptr)).map(Value::Object),
                other => {
                    return Err(conversion_error(format!("unsupported value type {other:#x}")));
                }
            }
        };
        Ok(value)
    }

    /// Builds a value of type `tag` from a bridge value.
    fn write(tag: GType, value: &Value) -> Result<Self, NativeError> {
        let mut out = Self::new(tag);
        let ptr = out.as_mut_ptr();
        // SAFETY: `out` was initialized with `tag`, and each setter matches the
        // fundamental type it is called for
        unsafe {
            match (g_type_fundamental(tag), value) {
                (G_TYPE_BOOLEAN, Value::Bool(v)) => g_value_set_boolean(ptr, GBoolean::from(*v)),
                (G_TYPE_INT, Value::Int(v)) => g_value_set_int(ptr, *v),
                (G_TYPE_UINT, Value::UInt(v)) => g_value_set_uint(ptr, *v),
                (G_TYPE_INT64, Value::Int64(v)) => g_value_set_int64(ptr, *v),
                (G_TYPE_ENUM, Value::Int(v)) => g_value_set_enum(ptr, *v),
                (G_TYPE_FLAGS, Value::UInt(v)) => g_value_set_flags(ptr, *v),
                #[expect(clippy::cast_possible_truncation)]
                (G_TYPE_FLOAT, Value::Double(v)) => g_value_set_float(ptr, *v as c_float),
                (G_TYPE_DOUBLE, Value::Double(v)) => g_value_set_double(ptr, *v),
                (G_TYPE_STRING, Value::Str(s)) => {
                    let s = c_name(s)?;
                    // copies the string
                    g_value_set_string(ptr, s.as_ptr());
                }
                (G_TYPE_OBJECT, Value::Object(raw)) => g_value_set_object(ptr, raw.as_ptr()),
                // a freshly initialized value already holds the null string or object
                (G_TYPE_STRING | G_TYPE_OBJECT, Value::Null) => {}
                (fundamental, value) => {
                    return Err(conversion_error(format!(
                        "cannot store a {} in a value of fundamental type {fundamental:#x}",
                        value.kind_name()
                    )));
                }
            }
        }
        Ok(out)
    }
}

impl Drop for OwnedValue {
    fn drop(&mut self) {
        // SAFETY: initialized in `new`, unset exactly once
        unsafe { g_value_unset(self.as_mut_ptr()) };
    }
}

/// Property spec of `name` on an instance or class.
///
/// # Safety
///
/// `class` must point to a live `GObjectClass`.
unsafe fn find_property(class: *mut c_void, name: &str) -> Result<&'static GParamSpec, NativeError> {
    let cname = c_name(name)?;
    // SAFETY: live class per the caller contract; param specs are owned by the class
    // and live as long as the type
    let spec = unsafe { g_object_class_find_property(class, cname.as_ptr()).as_ref() };
    spec.ok_or_else(|| NativeError::new("g-object", 0, format!("object class has no property named '{name}'")))
}

fn class_of(handle: RawHandle) -> *mut c_void {
    // SAFETY: every live GObject starts with its GTypeInstance
    unsafe { (*handle.as_ptr::<GTypeInstance>()).g_class.cast() }
}

fn int_arg(symbol: &str, args: &[Value], index: usize) -> Result<c_int, NativeError> {
    match args.get(index) {
        Some(Value::Int(v)) => Ok(*v),
        _ => Err(conversion_error(format!("{symbol}: argument {index} must be an Int"))),
    }
}

fn str_arg(symbol: &str, args: &[Value], index: usize) -> Result<CString, NativeError> {
    match args.get(index) {
        Some(Value::Str(s)) => c_name(s),
        _ => Err(conversion_error(format!("{symbol}: argument {index} must be a Str"))),
    }
}

fn object_arg(symbol: &str, args: &[Value], index: usize) -> Result<*mut c_void, NativeError> {
    match args.get(index) {
        Some(Value::Object(raw)) => Ok(raw.as_ptr()),
        _ => Err(conversion_error(format!("{symbol}: argument {index} must be an Object"))),
    }
}

fn object_list(addrs: Vec<usize>) -> Value {
    Value::ObjectList(addrs.into_iter().filter_map(RawHandle::from_addr).collect())
}

/// The native toolkit.
///
/// Constructing it initializes GTK on the calling thread, which becomes the
/// toolkit thread; create the [`Bridge`](crate::Bridge) on the same thread.
#[derive(Debug)]
pub struct GObjectRuntime {
    _private: (),
}

impl GObjectRuntime {
    /// Initializes GTK. Fails when no display can be opened.
    pub fn new() -> Result<Self, NativeError> {
        // SAFETY: null argc/argv are explicitly allowed
        let ok = unsafe { gtk_init_check(ptr::null_mut(), ptr::null_mut()) } != 0;
        if !ok {
            return Err(NativeError::new("gtk", 0, "cannot open display"));
        }
        debug!("gtk initialized");
        Ok(Self { _private: () })
    }
}

impl NativeRuntime for GObjectRuntime {
    fn name(&self) -> &'static str {
        "gobject"
    }

    fn type_from_name(&self, name: &str) -> Option<TypeTag> {
        let cname = CString::new(name).ok()?;
        // SAFETY: valid C string
        let tag = unsafe { g_type_from_name(cname.as_ptr()) };
        if tag != 0 {
            return Some(TypeTag::from_raw(tag));
        }
        let (_, get_type) = LAZY_TYPES.iter().find(|(n, _)| *n == name)?;
        // SAFETY: type registration functions take no arguments and are idempotent
        let tag = unsafe { get_type() };
        (tag != 0).then_some(TypeTag::from_raw(tag))
    }

    fn type_name(&self, tag: TypeTag) -> Option<String> {
        if !tag.is_valid() {
            return None;
        }
        // SAFETY: g_type_name returns null for unknown types and a static string otherwise
        unsafe { marshal::opt_string_from_ptr(g_type_name(tag.into_raw())) }.ok().flatten()
    }

    fn type_parent(&self, tag: TypeTag) -> TypeTag {
        // SAFETY: plain type system query
        TypeTag::from_raw(unsafe { g_type_parent(tag.into_raw()) })
    }

    fn type_is_a(&self, tag: TypeTag, ancestor: TypeTag) -> bool {
        // SAFETY: plain type system query
        unsafe { g_type_is_a(tag.into_raw(), ancestor.into_raw()) != 0 }
    }

    fn type_of(&self, handle: RawHandle) -> TypeTag {
        // SAFETY: the class of a live instance is valid
        TypeTag::from_raw(unsafe { (*class_of(handle).cast::<GTypeClass>()).g_type })
    }

    fn construct(&self, tag: TypeTag, properties: &[(&str, Value)]) -> Result<Option<RawHandle>, NativeError> {
        // SAFETY: a class reference keeps the param specs alive while values are built
        let class = unsafe { g_type_class_ref(tag.into_raw()) };
        let built = properties
            .iter()
            .map(|(name, value)| {
                // SAFETY: `class` is referenced above
                let spec = unsafe { find_property(class, name) }?;
                Ok((c_name(name)?, OwnedValue::write(spec.value_type, value)?))
            })
            .collect::<Result<Vec<_>, NativeError>>();
        // SAFETY: paired with g_type_class_ref
        unsafe { g_type_class_unref(class) };
        let built = built?;
        let names: Vec<*const c_char> = built.iter().map(|(name, _)| name.as_ptr()).collect();
        let values: Vec<GValue> = built
            .iter()
            .map(|(_, value)| GValue {
                g_type: value.0.g_type,
                data: value.0.data,
            })
            .collect();
        let n = c_uint::try_from(names.len()).map_err(|_| conversion_error("too many construct properties"))?;
        // SAFETY: `values` are bitwise copies of initialized values still owned by
        // `built`; GObject copies them and never unsets the caller's array
        let object = unsafe { g_object_new_with_properties(tag.into_raw(), n, names.as_ptr(), values.as_ptr()) };
        drop(built);
        Ok(RawHandle::from_ptr(object))
    }

    fn inc_ref(&self, handle: RawHandle) {
        // SAFETY: live object; the adapter pairs this with a dec_ref
        unsafe { g_object_ref(handle.as_ptr()) };
    }

    fn ref_sink(&self, handle: RawHandle) {
        // SAFETY: live object
        unsafe { g_object_ref_sink(handle.as_ptr()) };
    }

    fn dec_ref(&self, handle: RawHandle) {
        // SAFETY: releases a reference the bridge holds
        unsafe { g_object_unref(handle.as_ptr()) };
    }

    fn is_floating(&self, handle: RawHandle) -> bool {
        // SAFETY: live object
        unsafe { g_object_is_floating(handle.as_ptr()) != 0 }
    }

    fn ref_count(&self, handle: RawHandle) -> u32 {
        let object = handle.as_ptr::<GObject>();
        // SAFETY: diagnostic read of a live object's count field
        unsafe { ptr::addr_of!((*object).ref_count).read_volatile() }
    }

    fn get_property(&self, handle: RawHandle, name: &str) -> Result<Option<Value>, NativeError> {
        // SAFETY: the class of a live instance is valid
        let spec = unsafe { find_property(class_of(handle), name) }?;
        let mut value = OwnedValue::new(spec.value_type);
        let cname = c_name(name)?;
        // SAFETY: `value` is initialized with the property's type
        unsafe { g_object_get_property(handle.as_ptr(), cname.as_ptr(), value.as_mut_ptr()) };
        value.read()
    }

    fn set_property(&self, handle: RawHandle, name: &str, value: Value) -> Result<(), NativeError> {
        // SAFETY: the class of a live instance is valid
        let spec = unsafe { find_property(class_of(handle), name) }?;
        let value = OwnedValue::write(spec.value_type, &value)?;
        let cname = c_name(name)?;
        // SAFETY: `value` holds the property's type
        unsafe { g_object_set_property(handle.as_ptr(), cname.as_ptr(), value.as_ptr()) };
        Ok(())
    }

    fn destroy(&self, handle: RawHandle) {
        let object = handle.as_ptr::<c_void>();
        if DESTROYED.lock().insert(handle.addr()) {
            // SAFETY: live object; the notify only touches the static set
            unsafe { g_object_weak_ref(object, forget_destroyed, ptr::null_mut()) };
        }
        // SAFETY: plain type system queries
        let widget = unsafe { g_type_is_a(self.type_of(handle).into_raw(), gtk_widget_get_type()) != 0 };
        trace!(%handle, widget, "destroy");
        // SAFETY: the caller holds a reference, so the object outlives the call
        unsafe {
            if widget {
                gtk_widget_destroy(object);
            } else {
                g_object_run_dispose(object);
            }
        }
    }

    fn is_destroyed(&self, handle: RawHandle) -> bool {
        DESTROYED.lock().contains(&handle.addr())
    }

    fn call(&self, handle: RawHandle, symbol: &str, args: &[Value]) -> Result<Option<Value>, NativeError> {
        let instance = handle.as_ptr::<c_void>();
        // SAFETY: the bridge only forwards symbols for wrappers of the matching
        // type, and every argument is checked against the declared signature
        let result = unsafe {
            match symbol {
                "gtk_widget_show" => {
                    gtk_widget_show(instance);
                    None
                }
                "gtk_widget_hide" => {
                    gtk_widget_hide(instance);
                    None
                }
                "gtk_widget_show_all" => {
                    gtk_widget_show_all(instance);
                    None
                }
                "gtk_widget_get_toplevel" => RawHandle::from_ptr(gtk_widget_get_toplevel(instance)).map(Value::Object),
                "gtk_container_add" => {
                    gtk_container_add(instance, object_arg(symbol, args, 0)?);
                    None
                }
                "gtk_container_remove" => {
                    gtk_container_remove(instance, object_arg(symbol, args, 0)?);
                    None
                }
                "gtk_container_get_children" => {
                    let list = gtk_container_get_children(instance);
                    let children = List::collect_raw(list);
                    // transfer container: the nodes are ours, the widgets are not
                    g_list_free(list);
                    Some(object_list(children))
                }
                "gtk_window_present" => {
                    gtk_window_present(instance);
                    None
                }
                "gtk_window_move" => {
                    gtk_window_move(instance, int_arg(symbol, args, 0)?, int_arg(symbol, args, 1)?);
                    None
                }
                "gtk_window_resize" => {
                    gtk_window_resize(instance, int_arg(symbol, args, 0)?, int_arg(symbol, args, 1)?);
                    None
                }
                "gtk_window_get_size" | "gtk_window_get_position" => {
                    let (mut a, mut b) = (0, 0);
                    if symbol == "gtk_window_get_size" {
                        gtk_window_get_size(instance, &raw mut a, &raw mut b);
                    } else {
                        gtk_window_get_position(instance, &raw mut a, &raw mut b);
                    }
                    Some(Value::IntList(vec![a, b]))
                }
                "gtk_window_get_screen" => RawHandle::from_ptr(gtk_window_get_screen(instance)).map(Value::Object),
                "gtk_window_set_icon_from_file" => {
                    let path = str_arg(symbol, args, 0)?;
                    let mut error: *mut GError = ptr::null_mut();
                    if gtk_window_set_icon_from_file(instance, path.as_ptr(), &raw mut error) == 0 {
                        if error.is_null() {
                            return Err(conversion_error(format!("{symbol} failed without an error record")));
                        }
                        return Err(take_error(error));
                    }
                    None
                }
                "gtk_application_add_window" => {
                    gtk_application_add_window(instance, object_arg(symbol, args, 0)?);
                    None
                }
                "gtk_application_remove_window" => {
                    gtk_application_remove_window(instance, object_arg(symbol, args, 0)?);
                    None
                }
                "gtk_application_get_windows" => {
                    // owned by the application
                    Some(object_list(List::collect_raw(gtk_application_get_windows(instance))))
                }
                "gtk_application_get_accels_for_action" => {
                    let name = str_arg(symbol, args, 0)?;
                    let strv = gtk_application_get_accels_for_action(instance, name.as_ptr());
                    let accels = marshal::strv_to_vec(strv.cast_const().cast(), "accelerators");
                    g_strfreev(strv);
                    Some(Value::Strv(accels.map_err(marshal_error)?))
                }
                "gtk_application_set_accels_for_action" => {
                    let name = str_arg(symbol, args, 0)?;
                    let Some(Value::Strv(accels)) = args.get(1) else {
                        return Err(conversion_error(format!("{symbol}: argument 1 must be a Strv")));
                    };
                    let accels = NativeStrv::new(accels.as_slice()).map_err(marshal_error)?;
                    gtk_application_set_accels_for_action(instance, name.as_ptr(), accels.as_ptr());
                    None
                }
                _ => return Err(NativeError::unsupported(symbol)),
            }
        };
        Ok(result)
    }
}

//! The simulated type system: built-in type tree, property specs and the
//! runtime type table.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{handle::TypeTag, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PropKind {
    Bool,
    Int,
    UInt,
    Double,
    Str,
    /// Object of the named type or one deriving from it.
    Object(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum PropDefault {
    Absent,
    Bool(bool),
    Int(i32),
    UInt(u32),
    Double(f64),
    Str(&'static str),
}

impl PropDefault {
    pub(super) fn to_value(self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Bool(v) => Some(Value::Bool(v)),
            Self::Int(v) => Some(Value::Int(v)),
            Self::UInt(v) => Some(Value::UInt(v)),
            Self::Double(v) => Some(Value::Double(v)),
            Self::Str(v) => Some(Value::Str(v.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Access {
    ReadWrite,
    /// Settable only while constructing.
    ConstructOnly,
    /// Read-only, derived from object state rather than stored.
    Computed,
}

#[derive(Debug)]
pub(super) struct PropSpec {
    pub(super) name: &'static str,
    pub(super) kind: PropKind,
    pub(super) default: PropDefault,
    pub(super) access: Access,
}

const fn rw(name: &'static str, kind: PropKind, default: PropDefault) -> PropSpec {
    PropSpec {
        name,
        kind,
        default,
        access: Access::ReadWrite,
    }
}

const fn computed(name: &'static str, kind: PropKind) -> PropSpec {
    PropSpec {
        name,
        kind,
        default: PropDefault::Absent,
        access: Access::Computed,
    }
}

const fn boolean(name: &'static str, default: bool) -> PropSpec {
    rw(name, PropKind::Bool, PropDefault::Bool(default))
}

const fn int(name: &'static str, default: i32) -> PropSpec {
    rw(name, PropKind::Int, PropDefault::Int(default))
}

const fn string(name: &'static str) -> PropSpec {
    rw(name, PropKind::Str, PropDefault::Absent)
}

const fn object(name: &'static str, type_name: &'static str) -> PropSpec {
    rw(name, PropKind::Object(type_name), PropDefault::Absent)
}

static WIDGET_PROPS: &[PropSpec] = &[
    string("name"),
    string("tooltip-text"),
    boolean("visible", false),
    boolean("sensitive", true),
    boolean("can-focus", false),
    computed("has-focus", PropKind::Bool),
    int("halign", 0),
    int("valign", 0),
    int("margin-top", 0),
    int("margin-bottom", 0),
    boolean("hexpand", false),
    boolean("vexpand", false),
    int("width-request", -1),
    int("height-request", -1),
    boolean("no-show-all", false),
    boolean("app-paintable", false),
    int("events", 0),
    computed("parent", PropKind::Object("GtkContainer")),
];

static MISC_PROPS: &[PropSpec] = &[
    rw("xalign", PropKind::Double, PropDefault::Double(0.5)),
    rw("yalign", PropKind::Double, PropDefault::Double(0.5)),
    int("xpad", 0),
    int("ypad", 0),
];

static LABEL_PROPS: &[PropSpec] = &[rw("label", PropKind::Str, PropDefault::Str(""))];

static CONTAINER_PROPS: &[PropSpec] = &[rw("border-width", PropKind::UInt, PropDefault::UInt(0))];

static BUTTON_PROPS: &[PropSpec] = &[string("label")];

static WINDOW_PROPS: &[PropSpec] = &[
    PropSpec {
        name: "type",
        kind: PropKind::Int,
        default: PropDefault::Int(0),
        access: Access::ConstructOnly,
    },
    string("title"),
    boolean("resizable", true),
    boolean("modal", false),
    int("default-width", -1),
    int("default-height", -1),
    int("window-position", 0),
    object("transient-for", "GtkWindow"),
    boolean("destroy-with-parent", false),
    boolean("hide-titlebar-when-maximized", false),
    boolean("decorated", true),
    boolean("deletable", true),
    boolean("skip-taskbar-hint", false),
    boolean("skip-pager-hint", false),
    boolean("urgency-hint", false),
    boolean("accept-focus", true),
    boolean("focus-on-map", true),
    boolean("mnemonics-visible", true),
    boolean("focus-visible", true),
    object("application", "GtkApplication"),
    computed("screen", PropKind::Object("GdkScreen")),
    computed("is-active", PropKind::Bool),
    computed("has-toplevel-focus", PropKind::Bool),
];

static APPLICATION_WINDOW_PROPS: &[PropSpec] = &[boolean("show-menubar", true)];

static G_APPLICATION_PROPS: &[PropSpec] = &[
    PropSpec {
        name: "application-id",
        kind: PropKind::Str,
        default: PropDefault::Absent,
        access: Access::ConstructOnly,
    },
    rw("flags", PropKind::UInt, PropDefault::UInt(0)),
];

static APPLICATION_PROPS: &[PropSpec] = &[
    object("app-menu", "GMenuModel"),
    object("menubar", "GMenuModel"),
    boolean("register-session", false),
    computed("active-window", PropKind::Object("GtkWindow")),
];

pub(super) struct TypeDef {
    name: &'static str,
    parent: Option<&'static str>,
    is_abstract: bool,
    props: &'static [PropSpec],
}

const fn def(name: &'static str, parent: Option<&'static str>, props: &'static [PropSpec]) -> TypeDef {
    TypeDef {
        name,
        parent,
        is_abstract: false,
        props,
    }
}

const fn abstract_def(name: &'static str, parent: &'static str, props: &'static [PropSpec]) -> TypeDef {
    TypeDef {
        name,
        parent: Some(parent),
        is_abstract: true,
        props,
    }
}

/// Built-in types, parents first.
static BUILTIN_TYPES: &[TypeDef] = &[
    def("gboolean", None, &[]),
    def("gint", None, &[]),
    def("guint", None, &[]),
    def("gint64", None, &[]),
    def("gdouble", None, &[]),
    def("gchararray", None, &[]),
    def("GObject", None, &[]),
    abstract_def("GInitiallyUnowned", "GObject", &[]),
    abstract_def("GtkWidget", "GInitiallyUnowned", WIDGET_PROPS),
    abstract_def("GtkMisc", "GtkWidget", MISC_PROPS),
    def("GtkLabel", Some("GtkMisc"), LABEL_PROPS),
    abstract_def("GtkContainer", "GtkWidget", CONTAINER_PROPS),
    abstract_def("GtkBin", "GtkContainer", &[]),
    def("GtkWindow", Some("GtkBin"), WINDOW_PROPS),
    def("GtkApplicationWindow", Some("GtkWindow"), APPLICATION_WINDOW_PROPS),
    def("GtkButton", Some("GtkBin"), BUTTON_PROPS),
    def("GApplication", Some("GObject"), G_APPLICATION_PROPS),
    def("GtkApplication", Some("GApplication"), APPLICATION_PROPS),
    def("GtkTreeStore", Some("GObject"), &[]),
    def("GdkScreen", Some("GObject"), &[]),
    abstract_def("GMenuModel", "GObject", &[]),
    def("GMenu", Some("GMenuModel"), &[]),
];

#[derive(Debug)]
pub(super) struct SimType {
    pub(super) name: String,
    pub(super) parent: TypeTag,
    pub(super) is_abstract: bool,
    pub(super) props: &'static [PropSpec],
}

/// Tags of the built-in types the runtime dispatches on.
#[derive(Debug, Clone, Copy)]
pub(super) struct Known {
    pub(super) object: TypeTag,
    pub(super) initially_unowned: TypeTag,
    pub(super) widget: TypeTag,
    pub(super) container: TypeTag,
    pub(super) bin: TypeTag,
    pub(super) window: TypeTag,
    pub(super) application_window: TypeTag,
    pub(super) g_application: TypeTag,
    pub(super) application: TypeTag,
    pub(super) tree_store: TypeTag,
    pub(super) screen: TypeTag,
    pub(super) boolean: TypeTag,
    pub(super) int: TypeTag,
    pub(super) uint: TypeTag,
    pub(super) int64: TypeTag,
    pub(super) double: TypeTag,
    pub(super) string: TypeTag,
}

#[derive(Debug)]
pub(super) struct TypeTable {
    types: Vec<SimType>,
    by_name: AHashMap<String, TypeTag>,
}

impl TypeTable {
    pub(super) fn with_builtins() -> (Self, Known) {
        let mut table = Self {
            types: Vec::with_capacity(BUILTIN_TYPES.len()),
            by_name: AHashMap::new(),
        };
        for def in BUILTIN_TYPES {
            let parent = def.parent.and_then(|p| table.lookup(p)).unwrap_or(TypeTag::INVALID);
            table.insert(def.name, parent, def.is_abstract, def.props);
        }
        let tag = |name: &str| table.lookup(name).unwrap_or(TypeTag::INVALID);
        let known = Known {
            object: tag("GObject"),
            initially_unowned: tag("GInitiallyUnowned"),
            widget: tag("GtkWidget"),
            container: tag("GtkContainer"),
            bin: tag("GtkBin"),
            window: tag("GtkWindow"),
            application_window: tag("GtkApplicationWindow"),
            g_application: tag("GApplication"),
            application: tag("GtkApplication"),
            tree_store: tag("GtkTreeStore"),
            screen: tag("GdkScreen"),
            boolean: tag("gboolean"),
            int: tag("gint"),
            uint: tag("guint"),
            int64: tag("gint64"),
            double: tag("gdouble"),
            string: tag("gchararray"),
        };
        (table, known)
    }

    pub(super) fn insert(
        &mut self,
        name: &str,
        parent: TypeTag,
        is_abstract: bool,
        props: &'static [PropSpec],
    ) -> TypeTag {
        self.types.push(SimType {
            name: name.to_owned(),
            parent,
            is_abstract,
            props,
        });
        let tag = TypeTag::from_raw(self.types.len());
        self.by_name.insert(name.to_owned(), tag);
        tag
    }

    pub(super) fn lookup(&self, name: &str) -> Option<TypeTag> {
        self.by_name.get(name).copied()
    }

    pub(super) fn get(&self, tag: TypeTag) -> Option<&SimType> {
        tag.into_raw().checked_sub(1).and_then(|i| self.types.get(i))
    }

    pub(super) fn name(&self, tag: TypeTag) -> &str {
        self.get(tag).map_or("<invalid>", |t| t.name.as_str())
    }

    pub(super) fn parent(&self, tag: TypeTag) -> TypeTag {
        self.get(tag).map_or(TypeTag::INVALID, |t| t.parent)
    }

    /// `tag` followed by its ancestors up to the fundamental type.
    pub(super) fn chain(&self, tag: TypeTag) -> SmallVec<[TypeTag; 8]> {
        let mut chain = SmallVec::new();
        let mut current = tag;
        while self.get(current).is_some() {
            chain.push(current);
            current = self.parent(current);
        }
        chain
    }

    pub(super) fn is_a(&self, tag: TypeTag, ancestor: TypeTag) -> bool {
        ancestor.is_valid() && self.chain(tag).contains(&ancestor)
    }

    pub(super) fn find_prop(&self, tag: TypeTag, name: &str) -> Option<&'static PropSpec> {
        self.chain(tag)
            .into_iter()
            .filter_map(|t| self.get(t))
            .find_map(|t| t.props.iter().find(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_chain() {
        let (table, known) = TypeTable::with_builtins();
        let names: Vec<_> = table
            .chain(known.application_window)
            .into_iter()
            .map(|t| table.name(t).to_owned())
            .collect();
        assert_eq!(
            names,
            [
                "GtkApplicationWindow",
                "GtkWindow",
                "GtkBin",
                "GtkContainer",
                "GtkWidget",
                "GInitiallyUnowned",
                "GObject"
            ]
        );
        assert!(table.is_a(known.window, known.widget));
        assert!(!table.is_a(known.widget, known.window));
        assert!(!table.is_a(known.string, known.object));
    }

    #[test]
    fn properties_are_inherited() {
        let (table, known) = TypeTable::with_builtins();
        assert!(table.find_prop(known.application_window, "tooltip-text").is_some());
        assert!(table.find_prop(known.application_window, "show-menubar").is_some());
        assert!(table.find_prop(known.window, "show-menubar").is_none());
    }
}

//! Widget, container and window behavior through the bridge.

use std::{fs, sync::Arc};

use gbridge::{
    Bridge, BridgeError, NativeRuntime, ObjectType, downcast,
    gtk::{Align, Button, Label, Window, WindowPosition, WindowType, prelude::*},
    sim::{SIM_DOMAIN, SimRuntime},
};
use pretty_assertions::assert_eq;

fn setup() -> (Arc<SimRuntime>, Bridge) {
    let sim = Arc::new(SimRuntime::new());
    let bridge = Bridge::new(sim.clone());
    (sim, bridge)
}

fn native_domain(err: BridgeError) -> String {
    match err {
        BridgeError::Native(err) => err.domain,
        other => panic!("expected a native error, got {other:?}"),
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Unset strings are `NullResult`, empty strings are values.
#[test]
fn absent_and_empty_strings_differ() {
    let (_sim, bridge) = setup();
    let label = Label::new(&bridge, None).unwrap();

    assert!(label.tooltip_text().unwrap_err().is_null_result());
    label.set_tooltip_text(Some("")).unwrap();
    assert_eq!(label.tooltip_text().unwrap(), "");
    label.set_tooltip_text(Some("help")).unwrap();
    assert_eq!(label.tooltip_text().unwrap(), "help");
    label.set_tooltip_text(None).unwrap();
    assert!(label.tooltip_text().unwrap_err().is_null_result());

    assert!(label.name().unwrap_err().is_null_result());
    assert_eq!(label.text().unwrap(), "");

    let button = Button::new(&bridge).unwrap();
    assert!(button.label().unwrap_err().is_null_result());
    let button = Button::with_label(&bridge, "OK").unwrap();
    assert_eq!(button.label().unwrap(), "OK");
}

/// Widget properties start at the toolkit defaults and round-trip.
#[test]
fn widget_properties_round_trip() {
    let (_sim, bridge) = setup();
    let label = Label::new(&bridge, Some("x")).unwrap();

    assert_eq!(label.size_request().unwrap(), (-1, -1));
    assert!(label.is_sensitive().unwrap());
    assert!(!label.is_visible().unwrap());
    assert_eq!(label.halign().unwrap(), Align::Fill);

    label.set_size_request(120, 40).unwrap();
    label.set_halign(Align::Center).unwrap();
    label.set_margin_top(6).unwrap();
    label.set_hexpand(true).unwrap();
    label.add_events(0b0100).unwrap();
    label.add_events(0b0001).unwrap();

    assert_eq!(label.size_request().unwrap(), (120, 40));
    assert_eq!(label.halign().unwrap(), Align::Center);
    assert_eq!(label.margin_top().unwrap(), 6);
    assert!(label.hexpand().unwrap());
    assert!(!label.vexpand().unwrap());
    assert_eq!(label.events().unwrap(), 0b0101);
}

/// Misc alignment and padding round-trip; out of range values are clamped.
#[test]
fn misc_alignment_and_padding() {
    let (_sim, bridge) = setup();
    let label = Label::new(&bridge, Some("x")).unwrap();
    assert_eq!(label.alignment().unwrap(), (0.5, 0.5));
    assert_eq!(label.padding().unwrap(), (0, 0));

    label.set_alignment(0.0, 1.0).unwrap();
    label.set_padding(4, 2).unwrap();
    assert_eq!(label.alignment().unwrap(), (0.0, 1.0));
    assert_eq!(label.padding().unwrap(), (4, 2));

    label.set_alignment(-0.5, 1.5).unwrap();
    label.set_padding(-3, 7).unwrap();
    assert_eq!(label.alignment().unwrap(), (0.0, 1.0));
    assert_eq!(label.padding().unwrap(), (0, 7));
}

// ============================================================================
// Containers
// ============================================================================

/// Children come back wrapped as their most specific registered type.
#[test]
fn container_children_wrap_polymorphically() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let button = Button::with_label(&bridge, "Go").unwrap();
    window.add(&button).unwrap();
    assert_eq!(button.ref_count().unwrap(), 2);

    let children = window.children().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].wrapper_name(), "Button");
    let child = downcast::<Button>(children.into_iter().next().unwrap()).unwrap();
    assert_eq!(child.label().unwrap(), "Go");

    assert_eq!(window.child().unwrap().wrapper_name(), "Button");
    assert_eq!(button.parent().unwrap().wrapper_name(), "Window");
    assert_eq!(button.toplevel().unwrap().wrapper_name(), "Window");

    window.destroy().unwrap();
}

/// An unparented widget has no parent and is its own toplevel.
#[test]
fn unparented_widget_is_its_own_toplevel() {
    let (_sim, bridge) = setup();
    let label = Label::new(&bridge, None).unwrap();
    assert!(label.parent().unwrap_err().is_null_result());
    let top = label.toplevel().unwrap();
    assert_eq!(top.wrapper_name(), "Label");
    assert_eq!(top.as_object_ref().raw(), label.raw());
}

/// A bin holds one child; windows and already-parented widgets are refused.
#[test]
fn container_add_rules_are_enforced() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let other = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let first = Label::new(&bridge, Some("first")).unwrap();
    let second = Label::new(&bridge, Some("second")).unwrap();

    window.add(&first).unwrap();
    assert_eq!(native_domain(window.add(&second).unwrap_err()), SIM_DOMAIN);
    assert_eq!(native_domain(other.add(&first).unwrap_err()), SIM_DOMAIN);
    assert_eq!(native_domain(other.add(&window).unwrap_err()), SIM_DOMAIN);
    assert_eq!(native_domain(first.set_parent(&other).unwrap_err()), SIM_DOMAIN);

    window.remove(&first).unwrap();
    assert!(first.parent().unwrap_err().is_null_result());
    assert!(window.child().unwrap_err().is_null_result());
    assert_eq!(native_domain(window.remove(&first).unwrap_err()), SIM_DOMAIN);

    window.destroy().unwrap();
    other.destroy().unwrap();
}

/// Destroying a container destroys its children and drops its references.
#[test]
fn destroy_releases_children() {
    let (sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let kept = Label::new(&bridge, Some("kept")).unwrap();
    let dropped = Button::new(&bridge).unwrap();
    let dropped_raw = dropped.raw().unwrap();

    let button = dropped.clone();
    window.add(&button).unwrap();
    drop((dropped, button));
    assert!(sim.is_alive(dropped_raw));

    window.destroy().unwrap();
    assert!(!sim.is_alive(dropped_raw));
    assert!(!kept.is_destroyed());
    assert_eq!(kept.ref_count().unwrap(), 1);
}

/// A child kept alive by a wrapper is destroyed with its parent but stays droppable.
#[test]
fn destroyed_child_outlives_its_parent_as_a_husk() {
    let (sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let label = Label::new(&bridge, None).unwrap();
    let raw = label.raw().unwrap();
    window.add(&label).unwrap();

    window.destroy().unwrap();
    assert!(label.is_destroyed());
    assert!(matches!(label.show(), Err(BridgeError::Destroyed { .. })));
    assert_eq!(sim.ref_count(raw), 1);
    drop(label);
    assert!(!sim.is_alive(raw));
}

// ============================================================================
// Visibility, sensitivity and focus
// ============================================================================

/// `show_all` maps the tree but honors `no-show-all`.
#[test]
fn show_all_maps_descendants() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let button = Button::new(&bridge).unwrap();
    let hidden = Label::new(&bridge, None).unwrap();
    hidden.set_no_show_all(true).unwrap();
    window.add(&button).unwrap();
    button.add(&hidden).unwrap();

    window.show_all().unwrap();
    assert!(window.is_visible().unwrap());
    assert!(window.is_mapped().unwrap());
    assert!(window.is_realized().unwrap());
    assert!(button.is_mapped().unwrap());
    assert!(!hidden.is_visible().unwrap());

    window.hide().unwrap();
    assert!(!window.is_visible().unwrap());
    assert!(!window.is_mapped().unwrap());
    assert!(!window.in_destruction().unwrap());

    window.destroy().unwrap();
}

/// Effective sensitivity considers every ancestor.
#[test]
fn sensitivity_is_inherited() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let button = Button::new(&bridge).unwrap();
    window.add(&button).unwrap();

    window.set_sensitive(false).unwrap();
    assert!(button.is_sensitive().unwrap());
    assert!(!button.is_sensitive_effective().unwrap());
    window.set_sensitive(true).unwrap();
    assert!(button.is_sensitive_effective().unwrap());

    window.destroy().unwrap();
}

/// Only focusable widgets take the focus.
#[test]
fn focus_requires_can_focus() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let button = Button::new(&bridge).unwrap();
    window.add(&button).unwrap();

    button.grab_focus().unwrap();
    assert!(!button.is_focus().unwrap());
    assert!(!window.activate_focus().unwrap());

    button.set_can_focus(true).unwrap();
    button.grab_focus().unwrap();
    assert!(button.is_focus().unwrap());
    assert!(button.has_focus().unwrap());
    assert!(window.activate_focus().unwrap());
    assert!(!window.activate_default().unwrap());

    window.remove(&button).unwrap();
    assert!(!button.has_focus().unwrap());
    window.destroy().unwrap();
}

// ============================================================================
// Windows
// ============================================================================

/// Size and position come back as pairs; the default size applies until a resize.
#[test]
fn window_geometry() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    assert_eq!(window.size().unwrap(), (200, 200));
    assert_eq!(window.default_size().unwrap(), (-1, -1));

    window.set_default_size(640, 480).unwrap();
    assert_eq!(window.size().unwrap(), (640, 480));
    window.resize(800, 600).unwrap();
    assert_eq!(window.size().unwrap(), (800, 600));
    assert_eq!(window.allocated_width().unwrap(), 800);
    assert_eq!(native_domain(window.resize(0, 10).unwrap_err()), SIM_DOMAIN);

    window.move_to(10, 20).unwrap();
    assert_eq!(window.position().unwrap(), (10, 20));

    window.set_window_position(WindowPosition::CenterOnParent).unwrap();
    assert_eq!(window.window_position().unwrap(), WindowPosition::CenterOnParent);
    window.destroy().unwrap();
}

/// Window manager hints are independent settings.
#[test]
fn window_hints_are_independent() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    assert!(window.is_decorated().unwrap());
    assert!(window.is_deletable().unwrap());
    assert!(window.accepts_focus().unwrap());
    assert!(window.is_resizable().unwrap());

    window.set_skip_taskbar_hint(true).unwrap();
    assert!(window.skips_taskbar_hint().unwrap());
    assert!(!window.skips_pager_hint().unwrap());
    window.set_skip_pager_hint(true).unwrap();
    window.set_skip_taskbar_hint(false).unwrap();
    assert!(window.skips_pager_hint().unwrap());
    assert!(!window.skips_taskbar_hint().unwrap());

    window.set_modal(true).unwrap();
    window.set_urgency_hint(true).unwrap();
    assert!(window.is_modal().unwrap());
    assert!(window.urgency_hint().unwrap());
    window.destroy().unwrap();
}

/// Maximize, iconify and presenting change window state.
#[test]
fn window_state_changes() {
    let (_sim, bridge) = setup();
    let first = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let second = Window::new(&bridge, WindowType::Toplevel).unwrap();

    first.maximize().unwrap();
    assert!(first.is_maximized().unwrap());
    first.unmaximize().unwrap();
    assert!(!first.is_maximized().unwrap());

    first.iconify().unwrap();
    first.present().unwrap();
    assert!(first.is_visible().unwrap());
    assert!(first.is_active().unwrap());
    assert!(first.has_toplevel_focus().unwrap());

    second.present().unwrap();
    assert!(second.is_active().unwrap());
    assert!(!first.is_active().unwrap());

    first.destroy().unwrap();
    second.destroy().unwrap();
}

/// Transient windows follow their parent's destroy when asked to.
#[test]
fn transient_windows_follow_their_parent() {
    let (_sim, bridge) = setup();
    let parent = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let dialog = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let tooltip = Window::new(&bridge, WindowType::Popup).unwrap();

    assert!(dialog.transient_for().unwrap_err().is_null_result());
    dialog.set_transient_for(Some(&parent)).unwrap();
    dialog.set_destroy_with_parent(true).unwrap();
    tooltip.set_transient_for(Some(&parent)).unwrap();
    assert_eq!(dialog.transient_for().unwrap().raw(), parent.raw());

    parent.destroy().unwrap();
    assert!(dialog.is_destroyed());
    assert!(!tooltip.is_destroyed());
    assert!(tooltip.transient_for().unwrap_err().is_null_result());
    tooltip.destroy().unwrap();
}

/// The screen is shared and only ever borrowed.
#[test]
fn windows_share_the_default_screen() {
    let (_sim, bridge) = setup();
    let a = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let b = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let screen = a.screen().unwrap();
    assert_eq!(b.screen().unwrap().raw(), screen.raw());
    assert_eq!(screen.ref_count().unwrap(), 2);
    assert_eq!(a.property_object("screen").unwrap().wrapper_name(), "Screen");
    a.destroy().unwrap();
    b.destroy().unwrap();
}

/// Icon loading reports the toolkit's error records.
#[test]
fn icon_errors_carry_the_native_record() {
    let (_sim, bridge) = setup();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.png");
    let Err(BridgeError::Native(err)) = window.set_icon_from_file(&missing) else {
        panic!("a missing file cannot be an icon");
    };
    assert_eq!((err.domain.as_str(), err.code), ("g-file-error-quark", 4));
    assert!(err.message.contains("missing.png"));

    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "not an image").unwrap();
    let Err(BridgeError::Native(err)) = window.set_icon_from_file(&notes) else {
        panic!("a text file cannot be an icon");
    };
    assert_eq!((err.domain.as_str(), err.code), ("gdk-pixbuf-error-quark", 3));

    let icon = dir.path().join("icon.png");
    fs::write(&icon, [0x89, b'P', b'N', b'G']).unwrap();
    window.set_icon_from_file(&icon).unwrap();
    window.destroy().unwrap();
}

/// Toolkit symbols the backend does not know are reported, not ignored.
#[test]
fn unknown_symbols_are_unsupported() {
    let (_sim, bridge) = setup();
    let label = Label::new(&bridge, None).unwrap();
    let Err(BridgeError::Native(err)) = label.call("gtk_label_set_ellipsize", &[]) else {
        panic!("the symbol is not simulated");
    };
    assert!(err.is_unsupported());

    let Err(BridgeError::Native(err)) = label.call("gtk_window_present", &[]) else {
        panic!("a label is not a window");
    };
    assert_eq!(err.domain, SIM_DOMAIN);
}

//! Application bookkeeping: windows, ids, inhibitors, menus and accelerators.

use std::sync::Arc;

use gbridge::{
    Bridge, BridgeError, Value,
    gio::{ApplicationFlags, Menu},
    gtk::{Application, ApplicationInhibitFlags, ApplicationWindow, Window, WindowType, prelude::*},
    sim::{SIM_DOMAIN, SimRuntime},
};
use pretty_assertions::assert_eq;

fn setup() -> (Arc<SimRuntime>, Bridge) {
    let sim = Arc::new(SimRuntime::new());
    let bridge = Bridge::new(sim.clone());
    (sim, bridge)
}

fn app(bridge: &Bridge) -> Application {
    Application::new(bridge, Some("org.example.Demo"), ApplicationFlags::NON_UNIQUE).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

/// An invalid application id makes the constructor return null.
#[test]
fn invalid_application_id_is_null_result() {
    let (sim, bridge) = setup();
    for id in ["not an id", "single", "org..example", "1org.example", ""] {
        let err = Application::new(&bridge, Some(id), ApplicationFlags::empty()).unwrap_err();
        assert!(err.is_null_result(), "{id:?} should be rejected, got {err:?}");
    }
    assert_eq!(sim.stats().live_objects, 0);
}

/// Id and flags are readable back; no id is a `NullResult`.
#[test]
fn application_id_and_flags() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);
    assert_eq!(app.application_id().unwrap(), "org.example.Demo");
    assert_eq!(app.flags().unwrap(), ApplicationFlags::NON_UNIQUE);

    let anonymous = Application::new(&bridge, None, ApplicationFlags::empty()).unwrap();
    assert!(anonymous.application_id().unwrap_err().is_null_result());
    assert!(!anonymous.prefers_app_menu().unwrap());
}

// ============================================================================
// Windows
// ============================================================================

/// Application windows get ids in creation order; lookups by unknown id are null.
#[test]
fn application_windows_have_ids() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);
    let main = ApplicationWindow::new(&app).unwrap();
    let prefs = ApplicationWindow::new(&app).unwrap();

    assert_eq!(main.id().unwrap(), 1);
    assert_eq!(prefs.id().unwrap(), 2);
    assert!(main.shows_menubar().unwrap());
    assert_eq!(app.window_by_id(2).unwrap().raw(), prefs.raw());
    assert!(app.window_by_id(9).unwrap_err().is_null_result());
    assert!(app.window_by_id(0).unwrap_err().is_null_result());
    assert_eq!(main.application().unwrap().raw(), app.raw());

    main.destroy().unwrap();
    prefs.destroy().unwrap();
}

/// The window list is most recent first and follows presentation order.
#[test]
fn window_list_tracks_focus_order() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);
    assert!(app.windows().unwrap().is_empty());
    assert!(app.active_window().unwrap_err().is_null_result());

    let first = Window::new(&bridge, WindowType::Toplevel).unwrap();
    let second = Window::new(&bridge, WindowType::Toplevel).unwrap();
    app.add_window(&first).unwrap();
    app.add_window(&second).unwrap();

    let raws = |windows: Vec<Window>| windows.iter().map(|w| w.raw()).collect::<Vec<_>>();
    assert_eq!(raws(app.windows().unwrap()), vec![second.raw(), first.raw()]);
    assert_eq!(app.active_window().unwrap().raw(), second.raw());

    first.present().unwrap();
    assert_eq!(raws(app.windows().unwrap()), vec![first.raw(), second.raw()]);
    assert_eq!(app.property_object("active-window").unwrap().as_object_ref().raw(), first.raw());

    app.remove_window(&first).unwrap();
    assert!(first.application().unwrap_err().is_null_result());
    assert_eq!(raws(app.windows().unwrap()), vec![second.raw()]);

    second.destroy().unwrap();
    assert!(app.windows().unwrap().is_empty());
    first.destroy().unwrap();
}

/// A window keeps its application alive; destroying the window releases it.
#[test]
fn window_keeps_its_application_alive() {
    let (sim, bridge) = setup();
    let app = app(&bridge);
    let app_raw = app.raw().unwrap();
    let window = Window::new(&bridge, WindowType::Toplevel).unwrap();
    window.set_application(Some(&app)).unwrap();
    assert_eq!(app.ref_count().unwrap(), 2);
    assert_eq!(window.ref_count().unwrap(), 3);

    drop(app);
    assert!(sim.is_alive(app_raw));
    assert_eq!(window.application().unwrap().application_id().unwrap(), "org.example.Demo");

    window.destroy().unwrap();
    assert!(!sim.is_alive(app_raw));
    assert_eq!(window.ref_count().unwrap(), 1);
}

/// The toolkit refuses a non-window passed where a window is expected.
#[test]
fn adding_a_non_window_is_refused() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);
    let menu = Menu::new(&bridge).unwrap();
    let Err(BridgeError::Native(err)) = app.call("gtk_application_add_window", &[Value::from_object(menu.raw())]) else {
        panic!("a menu is not a window");
    };
    assert_eq!(err.domain, SIM_DOMAIN);
    assert!(app.windows().unwrap().is_empty());
}

// ============================================================================
// Inhibitors
// ============================================================================

/// Inhibit returns a cookie; empty flags are refused with cookie zero.
#[test]
fn inhibit_and_uninhibit() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);
    let window = ApplicationWindow::new(&app).unwrap();

    let cookie = app
        .inhibit(Some(&window), ApplicationInhibitFlags::LOGOUT | ApplicationInhibitFlags::IDLE, Some("saving"))
        .unwrap();
    assert_ne!(cookie, 0);
    assert!(app.is_inhibited(ApplicationInhibitFlags::IDLE).unwrap());
    assert!(!app.is_inhibited(ApplicationInhibitFlags::SUSPEND).unwrap());

    assert_eq!(app.inhibit(None::<&Window>, ApplicationInhibitFlags::empty(), None).unwrap(), 0);

    app.uninhibit(cookie).unwrap();
    assert!(!app.is_inhibited(ApplicationInhibitFlags::all()).unwrap());
    window.destroy().unwrap();
}

// ============================================================================
// Menus
// ============================================================================

/// Menus are null until set; the application holds a reference on them.
#[test]
fn menus_are_optional() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);
    assert!(app.menubar().unwrap_err().is_null_result());
    assert!(app.app_menu().unwrap_err().is_null_result());
    assert!(app.menu_by_id("menubar").unwrap_err().is_null_result());

    let menu = Menu::new(&bridge).unwrap();
    app.set_menubar(Some(&menu)).unwrap();
    assert_eq!(menu.ref_count().unwrap(), 2);
    assert_eq!(app.menubar().unwrap().raw(), menu.raw());
    assert!(app.app_menu().unwrap_err().is_null_result());

    app.set_menubar(None::<&Menu>).unwrap();
    assert_eq!(menu.ref_count().unwrap(), 1);
}

// ============================================================================
// Accelerators
// ============================================================================

/// Accelerators map both ways and an empty list removes the action.
#[test]
fn accelerators_map_both_ways() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);
    assert!(app.accels_for_action("app.quit").unwrap().is_empty());

    app.set_accels_for_action("app.quit", &["<Control>q", "<Primary>w"]).unwrap();
    app.set_accels_for_action("win.close", &["<Primary>w"]).unwrap();

    assert_eq!(app.accels_for_action("app.quit").unwrap(), vec!["<Control>q", "<Primary>w"]);
    assert_eq!(app.actions_for_accel("<Primary>w").unwrap(), vec!["app.quit", "win.close"]);
    assert_eq!(app.list_action_descriptions().unwrap(), vec!["app.quit", "win.close"]);

    app.set_accels_for_action("app.quit", &[]).unwrap();
    assert_eq!(app.list_action_descriptions().unwrap(), vec!["win.close"]);
    assert!(app.actions_for_accel("<Control>q").unwrap().is_empty());
}

/// Malformed accelerators and empty action names are rejected.
#[test]
fn malformed_accelerators_are_rejected() {
    let (_sim, bridge) = setup();
    let app = app(&bridge);

    let Err(BridgeError::Native(err)) = app.set_accels_for_action("app.quit", &["<Bogus>q"]) else {
        panic!("unknown modifier");
    };
    assert_eq!(err.domain, SIM_DOMAIN);
    assert!(app.accels_for_action("app.quit").unwrap().is_empty());

    assert!(matches!(
        app.set_accels_for_action("", &["<Control>q"]),
        Err(BridgeError::InvalidArgument(_))
    ));
}

/// Every object created in a session is finalized once all wrappers are gone.
#[test]
fn session_teardown_finalizes_everything() {
    let (sim, bridge) = setup();
    {
        let app = app(&bridge);
        let window = ApplicationWindow::new(&app).unwrap();
        let menu = Menu::new(&bridge).unwrap();
        app.set_app_menu(Some(&menu)).unwrap();
        window.present().unwrap();
        window.destroy().unwrap();
    }
    let stats = sim.stats();
    assert_eq!(stats.live_objects, 0, "leaked: {:?}", stats.objects_by_type);
    assert_eq!(stats.toplevels, 0);
}

//! Toolkit symbols: widgets, containers, windows and applications.

use std::path::Path;

use super::{
    AppState, Args, BAD_ARGUMENT, Payload, SimState, WRONG_INSTANCE, WindowFlags, WindowState, sim_error, tree,
    types::PropDefault,
};
use crate::{error::NativeError, handle::RawHandle, value::Value};

const DEFAULT_WINDOW_SIZE: i32 = 200;

/// Extensions the icon loader recognizes as images.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "xpm", "tif", "tiff"];

const ACCEL_MODIFIERS: &[&str] = &[
    "Control", "Ctrl", "Primary", "Shift", "Alt", "Super", "Hyper", "Meta", "Release", "Mod1", "Mod2", "Mod3", "Mod4",
    "Mod5",
];

/// Dispatches a toolkit symbol by family prefix.
pub(super) fn call(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    let symbol = args.symbol;
    let known = state.known;
    if symbol.starts_with("gtk_tree_store_") || symbol.starts_with("gtk_tree_model_") {
        state.require(handle, known.tree_store, symbol)?;
        return tree::call(state, handle, args);
    }
    if symbol.starts_with("gtk_application_window_") {
        state.require(handle, known.application_window, symbol)?;
        return application_window(state, handle, args);
    }
    if symbol.starts_with("gtk_application_") {
        state.require(handle, known.application, symbol)?;
        return application(state, handle, args);
    }
    if symbol.starts_with("gtk_window_") {
        state.require(handle, known.window, symbol)?;
        return window(state, handle, args);
    }
    if symbol.starts_with("gtk_bin_") {
        state.require(handle, known.bin, symbol)?;
        return bin(state, handle, args);
    }
    if symbol.starts_with("gtk_container_") {
        state.require(handle, known.container, symbol)?;
        return container(state, handle, args);
    }
    if symbol.starts_with("gtk_widget_") {
        state.require(handle, known.widget, symbol)?;
        return widget(state, handle, args);
    }
    Err(NativeError::unsupported(symbol))
}

fn required_object(args: &Args<'_>, index: usize) -> Result<RawHandle, NativeError> {
    args.object(index)?.ok_or_else(|| args.error(index, "must not be null"))
}

/// A stored boolean property, or its default.
fn stored_bool(state: &SimState, handle: RawHandle, name: &str) -> bool {
    match state.obj(handle).props.get(name) {
        Some(Value::Bool(v)) => *v,
        _ => state
            .types
            .find_prop(state.type_of(handle), name)
            .is_some_and(|spec| spec.default == PropDefault::Bool(true)),
    }
}

fn stored_int(state: &SimState, handle: RawHandle, name: &str) -> i32 {
    match state.obj(handle).props.get(name) {
        Some(Value::Int(v)) => *v,
        _ => match state.types.find_prop(state.type_of(handle), name).map(|spec| spec.default) {
            Some(PropDefault::Int(v)) => v,
            _ => 0,
        },
    }
}

// widgets

fn set_visible(state: &mut SimState, handle: RawHandle, visible: bool) {
    let mapped = visible
        && match state.obj(handle).parent {
            Some(parent) => state.obj(parent).mapped,
            None => state.is_a(handle, state.known.window),
        };
    let obj = state.obj_mut(handle);
    obj.props.insert("visible", Value::Bool(visible));
    obj.mapped = mapped;
    obj.realized |= mapped;
}

fn show_all(state: &mut SimState, handle: RawHandle) {
    if stored_bool(state, handle, "no-show-all") {
        return;
    }
    set_visible(state, handle, true);
    for child in state.obj(handle).children.clone() {
        show_all(state, child);
    }
}

fn widget(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    let result = match args.symbol {
        "gtk_widget_in_destruction" => Some(Value::Bool(state.obj(handle).in_destruction)),
        "gtk_widget_show" => {
            set_visible(state, handle, true);
            None
        }
        "gtk_widget_hide" => {
            set_visible(state, handle, false);
            None
        }
        "gtk_widget_show_all" => {
            show_all(state, handle);
            None
        }
        "gtk_widget_map" => {
            let visible = stored_bool(state, handle, "visible");
            let obj = state.obj_mut(handle);
            obj.mapped = visible;
            obj.realized |= visible;
            None
        }
        "gtk_widget_unmap" => {
            state.obj_mut(handle).mapped = false;
            None
        }
        "gtk_widget_get_mapped" => Some(Value::Bool(state.obj(handle).mapped)),
        "gtk_widget_get_realized" => Some(Value::Bool(state.obj(handle).realized)),
        "gtk_widget_set_realized" => {
            state.obj_mut(handle).realized = args.bool(0)?;
            None
        }
        "gtk_widget_is_sensitive" => {
            let mut current = Some(handle);
            let mut sensitive = true;
            while let Some(widget) = current {
                sensitive &= stored_bool(state, widget, "sensitive");
                current = state.obj(widget).parent;
            }
            Some(Value::Bool(sensitive))
        }
        "gtk_widget_grab_focus" => {
            if stored_bool(state, handle, "can-focus") {
                state.focus = Some(handle);
            }
            None
        }
        "gtk_widget_is_focus" => Some(Value::Bool(state.focus == Some(handle))),
        "gtk_widget_is_toplevel" => Some(Value::Bool(
            state.is_a(handle, state.known.window) && state.obj(handle).parent.is_none(),
        )),
        "gtk_widget_set_parent" => {
            let parent = required_object(args, 0)?;
            state.require(parent, state.known.widget, args.symbol)?;
            if state.obj(handle).parent.is_some() {
                return Err(args.error(0, "can't set a parent on a widget which already has one"));
            }
            if state.is_a(handle, state.known.window) {
                return Err(args.error(0, "can't set a parent on a toplevel window"));
            }
            state.set_parent(handle, parent);
            None
        }
        "gtk_widget_unparent" => {
            state.unparent(handle);
            None
        }
        "gtk_widget_get_toplevel" => Some(Value::Object(state.toplevel_of(handle))),
        "gtk_widget_get_allocated_width" => Some(Value::Int(allocated_size(state, handle).0)),
        "gtk_widget_get_allocated_height" => Some(Value::Int(allocated_size(state, handle).1)),
        "gtk_widget_queue_draw" => None,
        symbol => return Err(NativeError::unsupported(symbol)),
    };
    Ok(result)
}

fn allocated_size(state: &SimState, handle: RawHandle) -> (i32, i32) {
    if state.is_a(handle, state.known.window) {
        return window_size(state, handle);
    }
    (1, 1)
}

// containers

fn container(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    let result = match args.symbol {
        "gtk_container_add" => {
            let child = required_object(args, 0)?;
            state.require(child, state.known.widget, args.symbol)?;
            if child == handle {
                return Err(args.error(0, "can't add a container to itself"));
            }
            if let Some(parent) = state.obj(child).parent {
                return Err(sim_error(
                    BAD_ARGUMENT,
                    format!(
                        "attempting to add a widget with type {} to a container of type {}, but the widget is already inside a container of type {}",
                        state.type_name_of(child),
                        state.type_name_of(handle),
                        state.type_name_of(parent)
                    ),
                ));
            }
            if state.is_a(child, state.known.window) {
                return Err(args.error(0, "can't add a toplevel window to a container"));
            }
            if let Some(&existing) = state.obj(handle).children.first() {
                if state.is_a(handle, state.known.bin) {
                    return Err(sim_error(
                        BAD_ARGUMENT,
                        format!(
                            "attempting to add a widget with type {} to a {}, but as a GtkBin subclass a {} can only contain one widget at a time; it already contains a widget of type {}",
                            state.type_name_of(child),
                            state.type_name_of(handle),
                            state.type_name_of(handle),
                            state.type_name_of(existing)
                        ),
                    ));
                }
            }
            state.set_parent(child, handle);
            if state.obj(handle).mapped && stored_bool(state, child, "visible") {
                state.obj_mut(child).mapped = true;
            }
            None
        }
        "gtk_container_remove" => {
            let child = required_object(args, 0)?;
            if state.obj(child).parent != Some(handle) {
                return Err(args.error(0, "widget is not a child of this container"));
            }
            state.unparent(child);
            None
        }
        "gtk_container_get_children" => Some(Value::ObjectList(state.obj(handle).children.clone())),
        symbol => return Err(NativeError::unsupported(symbol)),
    };
    Ok(result)
}

fn bin(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    match args.symbol {
        "gtk_bin_get_child" => Ok(state.obj(handle).children.first().copied().map(Value::Object)),
        symbol => Err(NativeError::unsupported(symbol)),
    }
}

// windows

fn window_state(state: &mut SimState, handle: RawHandle) -> Result<&mut WindowState, NativeError> {
    match &mut state.obj_mut(handle).payload {
        Payload::Window(window) => Ok(window),
        _ => Err(sim_error(WRONG_INSTANCE, format!("{handle} carries no window state"))),
    }
}

fn window_size(state: &SimState, handle: RawHandle) -> (i32, i32) {
    if let Payload::Window(WindowState { size: Some(size), .. }) = &state.obj(handle).payload {
        return *size;
    }
    let or_default = |v: i32| if v > 0 { v } else { DEFAULT_WINDOW_SIZE };
    (
        or_default(stored_int(state, handle, "default-width")),
        or_default(stored_int(state, handle, "default-height")),
    )
}

/// Checks that `path` names a readable image file.
fn load_icon(path: &str) -> Result<(), NativeError> {
    let file = Path::new(path);
    if !file.is_file() {
        return Err(NativeError::new(
            "g-file-error-quark",
            4,
            format!("Failed to open file \u{201c}{path}\u{201d}: No such file or directory"),
        ));
    }
    let extension = file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    if !extension.is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str())) {
        return Err(NativeError::new(
            "gdk-pixbuf-error-quark",
            3,
            format!("Couldn\u{2019}t recognize the image file format for file \u{201c}{path}\u{201d}"),
        ));
    }
    Ok(())
}

fn window(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    let result = match args.symbol {
        "gtk_window_move" => {
            let position = (args.int(0)?, args.int(1)?);
            window_state(state, handle)?.position = position;
            None
        }
        "gtk_window_resize" => {
            let (width, height) = (args.int(0)?, args.int(1)?);
            if width <= 0 || height <= 0 {
                return Err(args.error(0, format_args!("size {width}x{height} is not positive")));
            }
            window_state(state, handle)?.size = Some((width, height));
            None
        }
        "gtk_window_get_size" => {
            let (width, height) = window_size(state, handle);
            Some(Value::IntList(vec![width, height]))
        }
        "gtk_window_get_position" => {
            let (x, y) = window_state(state, handle)?.position;
            Some(Value::IntList(vec![x, y]))
        }
        "gtk_window_present" => {
            set_visible(state, handle, true);
            window_state(state, handle)?.flags.remove(WindowFlags::ICONIFIED);
            state.active_window = Some(handle);
            let app = state.obj(handle).props.get("application").and_then(Value::as_object);
            if let Some(app) = app {
                if let Payload::Application(app) = &mut state.obj_mut(app).payload {
                    app.windows.retain(|&w| w != handle);
                    app.windows.insert(0, handle);
                }
            }
            None
        }
        "gtk_window_iconify" => {
            window_state(state, handle)?.flags.set(WindowFlags::ICONIFIED, true);
            None
        }
        "gtk_window_deiconify" => {
            window_state(state, handle)?.flags.set(WindowFlags::ICONIFIED, false);
            None
        }
        "gtk_window_stick" => {
            window_state(state, handle)?.flags.set(WindowFlags::STICKY, true);
            None
        }
        "gtk_window_unstick" => {
            window_state(state, handle)?.flags.set(WindowFlags::STICKY, false);
            None
        }
        "gtk_window_maximize" => {
            window_state(state, handle)?.flags.set(WindowFlags::MAXIMIZED, true);
            None
        }
        "gtk_window_unmaximize" => {
            window_state(state, handle)?.flags.set(WindowFlags::MAXIMIZED, false);
            None
        }
        "gtk_window_is_maximized" => Some(Value::Bool(
            window_state(state, handle)?.flags.contains(WindowFlags::MAXIMIZED),
        )),
        "gtk_window_fullscreen" => {
            window_state(state, handle)?.flags.set(WindowFlags::FULLSCREEN, true);
            None
        }
        "gtk_window_unfullscreen" => {
            window_state(state, handle)?.flags.set(WindowFlags::FULLSCREEN, false);
            None
        }
        "gtk_window_set_keep_above" => {
            let setting = args.bool(0)?;
            let flags = &mut window_state(state, handle)?.flags;
            flags.set(WindowFlags::KEEP_ABOVE, setting);
            if setting {
                flags.remove(WindowFlags::KEEP_BELOW);
            }
            None
        }
        "gtk_window_set_keep_below" => {
            let setting = args.bool(0)?;
            let flags = &mut window_state(state, handle)?.flags;
            flags.set(WindowFlags::KEEP_BELOW, setting);
            if setting {
                flags.remove(WindowFlags::KEEP_ABOVE);
            }
            None
        }
        "gtk_window_activate_focus" => {
            let activated = state
                .focus
                .is_some_and(|focus| focus != handle && state.toplevel_of(focus) == handle);
            Some(Value::Bool(activated))
        }
        // no default widgets
        "gtk_window_activate_default" | "gtk_window_has_group" => Some(Value::Bool(false)),
        "gtk_window_get_screen" => state.default_screen().map(Value::Object),
        "gtk_window_set_icon_from_file" => {
            load_icon(args.str(0)?)?;
            None
        }
        symbol => return Err(NativeError::unsupported(symbol)),
    };
    Ok(result)
}

fn application_window(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    match args.symbol {
        "gtk_application_window_get_id" => Ok(Some(Value::UInt(window_state(state, handle)?.id))),
        symbol => Err(NativeError::unsupported(symbol)),
    }
}

// applications

fn app_state(state: &mut SimState, handle: RawHandle) -> Result<&mut AppState, NativeError> {
    match &mut state.obj_mut(handle).payload {
        Payload::Application(app) => Ok(app),
        _ => Err(sim_error(WRONG_INSTANCE, format!("{handle} carries no application state"))),
    }
}

/// Whether `accel` parses as `<Modifier>...key`.
fn accelerator_is_valid(accel: &str) -> bool {
    let mut rest = accel;
    while let Some(stripped) = rest.strip_prefix('<') {
        let Some((modifier, tail)) = stripped.split_once('>') else {
            return false;
        };
        if !ACCEL_MODIFIERS.iter().any(|m| m.eq_ignore_ascii_case(modifier)) {
            return false;
        }
        rest = tail;
    }
    !rest.is_empty() && !rest.contains(['<', '>'])
}

fn parse_accel<'a>(args: &Args<'_>, index: usize, accel: &'a str) -> Result<&'a str, NativeError> {
    if accelerator_is_valid(accel) {
        Ok(accel)
    } else {
        Err(args.error(index, format_args!("unable to parse accelerator '{accel}'")))
    }
}

fn application(state: &mut SimState, handle: RawHandle, args: &Args<'_>) -> Result<Option<Value>, NativeError> {
    let result = match args.symbol {
        "gtk_application_add_window" => {
            let window = required_object(args, 0)?;
            state.require(window, state.known.window, args.symbol)?;
            state.set_window_application(window, Some(handle));
            None
        }
        "gtk_application_remove_window" => {
            let window = required_object(args, 0)?;
            state.require(window, state.known.window, args.symbol)?;
            if state.obj(window).props.get("application") == Some(&Value::Object(handle)) {
                state.set_window_application(window, None);
            }
            None
        }
        "gtk_application_get_windows" => Some(Value::ObjectList(app_state(state, handle)?.windows.clone())),
        "gtk_application_get_window_by_id" => {
            let id = args.uint(0)?;
            let windows = app_state(state, handle)?.windows.clone();
            windows
                .into_iter()
                .find(|&w| id != 0 && matches!(&state.obj(w).payload, Payload::Window(ws) if ws.id == id))
                .map(Value::Object)
        }
        "gtk_application_get_active_window" => app_state(state, handle)?.windows.first().copied().map(Value::Object),
        "gtk_application_inhibit" => {
            if let Some(window) = args.object(0)? {
                state.require(window, state.known.window, args.symbol)?;
            }
            let flags = args.uint(1)?;
            args.opt_str(2)?;
            let app = app_state(state, handle)?;
            let cookie = if flags == 0 {
                0
            } else {
                app.next_cookie += 1;
                app.inhibitors.push((app.next_cookie, flags));
                app.next_cookie
            };
            Some(Value::UInt(cookie))
        }
        "gtk_application_uninhibit" => {
            let cookie = args.uint(0)?;
            app_state(state, handle)?.inhibitors.retain(|&(c, _)| c != cookie);
            None
        }
        "gtk_application_is_inhibited" => {
            let flags = args.uint(0)?;
            let inhibited = app_state(state, handle)?.inhibitors.iter().any(|&(_, f)| f & flags != 0);
            Some(Value::Bool(inhibited))
        }
        "gtk_application_prefers_app_menu" => Some(Value::Bool(false)),
        "gtk_application_get_menu_by_id" => {
            // no UI resources are loaded, so no menu id ever matches
            args.str(0)?;
            None
        }
        "gtk_application_list_action_descriptions" => {
            Some(Value::Strv(app_state(state, handle)?.accels.keys().cloned().collect()))
        }
        "gtk_application_get_accels_for_action" => {
            let action = args.str(0)?;
            let accels = app_state(state, handle)?.accels.get(action).cloned().unwrap_or_default();
            Some(Value::Strv(accels))
        }
        "gtk_application_set_accels_for_action" => {
            let action = args.str(0)?;
            if action.is_empty() {
                return Err(args.error(0, "detailed action name must not be empty"));
            }
            let accels = args
                .strv(1)?
                .iter()
                .map(|accel| parse_accel(args, 1, accel).map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;
            let app = app_state(state, handle)?;
            if accels.is_empty() {
                app.accels.shift_remove(action);
            } else {
                app.accels.insert(action.to_owned(), accels);
            }
            None
        }
        "gtk_application_get_actions_for_accel" => {
            let accel = parse_accel(args, 0, args.str(0)?)?;
            let actions = app_state(state, handle)?
                .accels
                .iter()
                .filter(|(_, accels)| accels.iter().any(|a| a == accel))
                .map(|(action, _)| action.clone())
                .collect();
            Some(Value::Strv(actions))
        }
        symbol => return Err(NativeError::unsupported(symbol)),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accelerators_parse() {
        assert!(accelerator_is_valid("<Control>q"));
        assert!(accelerator_is_valid("<Primary><Shift>s"));
        assert!(accelerator_is_valid("F1"));
        assert!(!accelerator_is_valid("<Control>"));
        assert!(!accelerator_is_valid("<Bogus>q"));
        assert!(!accelerator_is_valid("<Control q"));
        assert!(!accelerator_is_valid(""));
    }
}

use std::{fs, path::PathBuf, process::ExitCode, sync::Arc, thread, time::Instant};

use clap::{Parser, Subcommand};
use gbridge::{
    Bridge, BridgeConfig, BridgeResult, BridgeStats, NativeRuntime, ReleasePolicy, Value,
    gio::{ApplicationFlags, Menu},
    gtk::{
        Application, ApplicationInhibitFlags, ApplicationWindow, Button, Label, TreeIter, TreeStore, Window,
        WindowType, prelude::*,
    },
    sim::{SimRuntime, SimStats},
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Drives the lifetime bridge through canned toolkit sessions and reports the
/// reference traffic they cause.
#[derive(Debug, Parser)]
#[command(name = "gbridge", version, about)]
struct Cli {
    /// TOML file with bridge settings.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Overrides the release policy from the config file.
    #[arg(long)]
    release_policy: Option<ReleasePolicy>,

    /// Log every reference operation.
    #[arg(long, short)]
    verbose: bool,

    /// Run against the real toolkit instead of the simulator. Needs a display.
    #[cfg(feature = "gobject")]
    #[arg(long)]
    native: bool,

    #[command(subcommand)]
    scenario: Scenario,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Scenario {
    /// Build a window with nested widgets, then destroy it.
    Windows,
    /// Run an application with windows, menus and accelerators.
    Application,
    /// Fill, reorder and clear a tree store.
    TreeStore {
        /// Nesting depth of the generated rows.
        #[arg(long, default_value_t = 3)]
        depth: u32,
    },
    /// Drop wrappers on worker threads and drain them on the toolkit thread.
    Threads {
        #[arg(long, default_value_t = 4)]
        workers: usize,
    },
    /// Every scenario in turn.
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let mut config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(policy) = cli.release_policy {
        config.release_policy = policy;
    }
    debug!(?config, "bridge configuration");

    let (runtime, sim) = match make_runtime(&cli) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(backend = runtime.name(), "runtime ready");
    let bridge = Bridge::with_config(runtime, config);

    let start = Instant::now();
    let result = match cli.scenario {
        Scenario::All => run_all(&bridge),
        scenario => run(&bridge, scenario),
    };
    let elapsed = start.elapsed();

    // the simulator finalizes queued objects only once drained
    let drained = bridge.drain_releases();
    if drained > 0 {
        debug!(drained, "drained queued releases");
    }

    match result {
        Ok(()) => {
            print_bridge_stats(&bridge.stats());
            if let Some(sim) = &sim {
                print_sim_stats(&sim.stats());
            }
            eprintln!("success after: {elapsed:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error after: {elapsed:?}\n{err}");
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("gbridge=trace,info")
        } else {
            EnvFilter::new("warn,gbridge_cli=info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<BridgeConfig, String> {
    let Some(path) = path else {
        return Ok(BridgeConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|err| format!("reading {}: {err}", path.display()))?;
    toml::from_str(&text).map_err(|err| format!("parsing {}: {err}", path.display()))
}

type Runtimes = (Arc<dyn NativeRuntime>, Option<Arc<SimRuntime>>);

fn make_runtime(cli: &Cli) -> Result<Runtimes, String> {
    #[cfg(feature = "gobject")]
    if cli.native {
        let runtime = gbridge::ffi::GObjectRuntime::new().map_err(|err| err.to_string())?;
        return Ok((Arc::new(runtime), None));
    }
    let _ = cli;
    let sim = Arc::new(SimRuntime::new());
    Ok((sim.clone(), Some(sim)))
}

fn run_all(bridge: &Bridge) -> BridgeResult<()> {
    for scenario in [
        Scenario::Windows,
        Scenario::Application,
        Scenario::TreeStore { depth: 3 },
        Scenario::Threads { workers: 4 },
    ] {
        run(bridge, scenario)?;
    }
    Ok(())
}

fn run(bridge: &Bridge, scenario: Scenario) -> BridgeResult<()> {
    info!(?scenario, "running");
    match scenario {
        Scenario::Windows => windows(bridge),
        Scenario::Application => application(bridge),
        Scenario::TreeStore { depth } => tree_store(bridge, depth),
        Scenario::Threads { workers } => threads(bridge, workers),
        Scenario::All => run_all(bridge),
    }
}

fn windows(bridge: &Bridge) -> BridgeResult<()> {
    let window = Window::new(bridge, WindowType::Toplevel)?;
    window.set_title("gbridge")?;
    window.set_default_size(480, 320)?;

    let button = Button::new(bridge)?;
    button.add(&Label::new(bridge, Some("Press me"))?)?;
    window.add(&button)?;
    window.show_all()?;

    for child in window.children()? {
        info!(
            wrapper = child.wrapper_name(),
            native = %child.type_name()?,
            refs = child.ref_count()?,
            "window child"
        );
    }
    let (width, height) = window.default_size()?;
    info!(title = %window.title()?, width, height, "window built");

    window.destroy()?;
    // the wrapper outlives the native widget tree and only rejects further use
    if let Err(err) = window.title() {
        debug!(%err, "destroyed window rejects use");
    }
    Ok(())
}

fn application(bridge: &Bridge) -> BridgeResult<()> {
    let app = Application::new(bridge, Some("org.example.Bridge"), ApplicationFlags::NON_UNIQUE)?;
    let main = ApplicationWindow::new(&app)?;
    let prefs = ApplicationWindow::new(&app)?;
    prefs.set_title("Preferences")?;

    let menu = Menu::new(bridge)?;
    app.set_menubar(Some(&menu))?;
    app.set_accels_for_action("app.quit", &["<Primary>q"])?;
    app.set_accels_for_action("win.close", &["<Primary>w", "Escape"])?;

    main.present()?;
    let cookie = app.inhibit(Some(&main), ApplicationInhibitFlags::LOGOUT, Some("unsaved changes"))?;

    info!(
        id = %app.application_id()?,
        windows = app.windows()?.len(),
        active = main.id()?,
        inhibited = app.is_inhibited(ApplicationInhibitFlags::LOGOUT)?,
        "application running"
    );
    for action in app.list_action_descriptions()? {
        info!(%action, accels = ?app.accels_for_action(&action)?, "accelerator");
    }

    app.uninhibit(cookie)?;
    prefs.destroy()?;
    main.destroy()?;
    match app.active_window() {
        Ok(window) => warn!(?window, "window survived destroy"),
        Err(err) if err.is_null_result() => {}
        Err(err) => return Err(err),
    }
    Ok(())
}

fn tree_store(bridge: &Bridge, depth: u32) -> BridgeResult<()> {
    let store = TreeStore::new(bridge, &["gchararray", "gint", "GObject"])?;
    let marker = Label::new(bridge, Some("marker"))?;

    let mut parent: Option<TreeIter> = None;
    for level in 0..depth {
        for n in 0..3_i32 {
            let row = store.append(parent.as_ref())?;
            store.set(
                &row,
                &[0, 1],
                vec![format!("row {level}.{n}").into(), Value::Int(n)],
            )?;
            if n == 0 {
                store.set_value(&row, 2, Value::from_object(marker.raw()))?;
            }
        }
        store.reorder(parent.as_ref(), &[2, 1, 0])?;
        parent = Some(store.nth_child(parent.as_ref(), 0)?);
    }
    info!(
        top_level = store.n_children(None)?,
        marker_refs = marker.ref_count()?,
        "tree store filled"
    );

    if let Some(deepest) = parent {
        info!(depth = store.iter_depth(&deepest)?, "deepest row");
        store.clear()?;
        debug!(valid = store.iter_is_valid(&deepest)?, "iterator after clear");
    }
    info!(marker_refs = marker.ref_count()?, "tree store cleared");
    Ok(())
}

fn threads(bridge: &Bridge, workers: usize) -> BridgeResult<()> {
    let labels = (0..workers)
        .map(|n| Label::new(bridge, Some(format!("worker {n}").as_str())))
        .collect::<BridgeResult<Vec<_>>>()?;

    let handles: Vec<_> = labels
        .into_iter()
        .map(|label| thread::spawn(move || drop(label)))
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            warn!("worker thread panicked");
        }
    }

    info!(pending = bridge.pending_releases(), "workers dropped their wrappers");
    let drained = bridge.drain_releases();
    info!(drained, "released on the toolkit thread");
    Ok(())
}

fn print_bridge_stats(stats: &BridgeStats) {
    println!("bridge:");
    println!("  acquired:      {}", stats.acquired);
    println!("  released:      {}", stats.released);
    println!("  deferred:      {}", stats.deferred);
    println!("  pending:       {}", stats.pending);
    println!("  live wrappers: {}", stats.live_wrappers());
}

fn print_sim_stats(stats: &SimStats) {
    println!("simulator:");
    println!("  live objects:  {}", stats.live_objects);
    println!("  finalized:     {}", stats.finalized);
    println!("  toplevels:     {}", stats.toplevels);
    for (type_name, count) in &stats.objects_by_type {
        println!("    {type_name}: {count}");
    }
}

use std::path::{Path, PathBuf};
use std::process;
use std::sync::mpsc;

use clap::{Parser, Subcommand};
use notch_dock::actor::config_watcher::ConfigWatcher;
use notch_dock::actor::poller::Poller;
use notch_dock::actor::reactor::replay::{Record, replay};
use notch_dock::actor::reactor::{Event, Reactor};
use notch_dock::common::config::{Config, DEFAULT_CONFIG, config_file};
use notch_dock::common::log;
use notch_dock::model::WindowSummary;
use notch_dock::sys::geometry::{Rect, Size};
use notch_dock::sys::headless::HeadlessHost;
use notch_dock::sys::screen::{DisplayDescriptor, DisplayId, ScreenCache};
use tokio::sync::oneshot;

#[derive(Parser)]
struct Cli {
    /// Disable animations.
    #[arg(long)]
    no_animate: bool,

    /// Record reactor events to the specified file path. Overwrites the file if
    /// exists.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the configuration file and exit.
    Validate,
    /// Replay a file written with --record and print every published window
    /// list as JSON.
    Replay { path: PathBuf },
    /// Print the bundled default configuration.
    DefaultConfig,
}

fn main() {
    sigpipe::reset();
    let opt = Cli::parse();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let config_path = match opt.config.clone().or_else(config_file) {
        Some(path) => path,
        None => exit_with("could not determine the config file location"),
    };

    match &opt.command {
        Some(Commands::DefaultConfig) => print!("{DEFAULT_CONFIG}"),
        Some(Commands::Validate) => validate(&config_path),
        Some(Commands::Replay { path }) => {
            if let Err(e) = replay(path, print_windows) {
                exit_with(format!("replay failed: {e:#}"));
            }
        }
        None => run(&opt, config_path),
    }
}

fn validate(config_path: &Path) {
    let config = match Config::read(config_path) {
        Ok(config) => config,
        Err(e) => exit_with(format!("{e:#}")),
    };
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config validation passed");
        return;
    }
    for issue in issues {
        eprintln!("{issue}");
    }
    process::exit(1);
}

/// Runs the window core against the in-memory host until interrupted, then
/// prints the final window list.
fn run(opt: &Cli, config_path: PathBuf) {
    let mut config = if config_path.exists() {
        match Config::read(&config_path) {
            Ok(config) => config,
            Err(e) => exit_with(format!("{e:#}")),
        }
    } else {
        Config::default()
    };
    for issue in config.validate() {
        eprintln!("config: {issue}");
    }
    config.settings.animate &= !opt.no_animate;

    let record = match Record::new(opt.record.as_deref()) {
        Ok(record) => record,
        Err(e) => exit_with(format!("could not create record file: {e}")),
    };

    let host = HeadlessHost::with_displays(vec![builtin_display()]);
    let displays = ScreenCache::new(host.clone()).refresh();
    let poll_interval = config.hover.poll_interval();

    let (events_tx, _reactor) = match Reactor::spawn(config.clone(), host.collaborators(), record)
    {
        Ok(spawned) => spawned,
        Err(e) => exit_with(format!("could not start reactor: {e}")),
    };
    events_tx.send(Event::DisplaysChanged(displays));
    events_tx.send(Event::CreateWindow { display: None, anchor: None });

    if let Err(e) = Poller::new(Box::new(host.clone()), events_tx.clone(), poll_interval).spawn() {
        exit_with(format!("could not start poller: {e}"));
    }
    if let Err(e) =
        ConfigWatcher::new(events_tx.clone(), &config, config_path, opt.no_animate).spawn()
    {
        eprintln!("config hot reload unavailable: {e}");
    }

    let (stop_tx, stop_rx) = mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        exit_with(format!("error setting Ctrl+C handler: {e}"));
    }
    _ = stop_rx.recv();

    let (tx, rx) = oneshot::channel();
    events_tx.send(Event::QuerySummaries(tx));
    if let Ok(windows) = rx.blocking_recv() {
        print_windows(&windows);
    }
    process::exit(0);
}

fn builtin_display() -> DisplayDescriptor {
    DisplayDescriptor {
        id: DisplayId::new(1),
        frame: Rect::from_xywh(0.0, 0.0, 1512.0, 982.0),
        visible_frame: Rect::from_xywh(0.0, 38.0, 1512.0, 944.0),
        notch: Some(Size::new(185.0, 38.0)),
        name: Some("Built-in Display".to_string()),
    }
}

fn print_windows(windows: &[WindowSummary]) {
    match serde_json::to_string(windows) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("could not serialize window list: {e}"),
    }
}

fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of leaving the other actor threads running.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}

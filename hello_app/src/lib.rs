//! Shared scaffolding for the demo programs
//!
//! Every demo resolves its program name, initializes logging, loads
//! `game_window.toml` if present, runs its body against a GLFW-backed
//! [`WindowSystem`] and shuts the runtime down before exiting.

use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use game_window::foundation::logging;
use game_window::{Config, ConfigError, GameWindow, GridError, GridList, ViewerConfig, WindowError, WindowSystem};
use thiserror::Error;

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "game_window.toml";

const BACKGROUND_WAIT: Duration = Duration::from_millis(100);

/// Demo failures
#[derive(Error, Debug)]
pub enum DemoError {
    /// Bad or unreadable configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Grid construction failed
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// Window could not be used
    #[error("window error: {0}")]
    Window(#[from] WindowError),
}

/// Command line options shared by all demos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Basename of the executable
    pub prog_name: String,
    /// Run the viewer on a worker thread
    pub background: bool,
}

impl Options {
    /// Parse `argv`, including the executable path
    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let prog_name = args
            .next()
            .as_deref()
            .and_then(|path| Path::new(path).file_name())
            .map_or_else(|| "hello_app".to_string(), |name| name.to_string_lossy().into_owned());

        let mut background = false;
        for arg in args {
            match arg.as_str() {
                "--background" | "-b" => background = true,
                other => log::warn!("{prog_name}: ignoring argument {other:?}"),
            }
        }

        Self { prog_name, background }
    }
}

/// Run a demo with default settings
pub fn run<F>(body: F) -> ExitCode
where
    F: FnOnce(GameWindow<'_>) -> Result<(), DemoError>,
{
    run_with(|_| {}, body)
}

/// Run a demo after adjusting the loaded configuration
pub fn run_with<C, F>(configure: C, body: F) -> ExitCode
where
    C: FnOnce(&mut ViewerConfig),
    F: FnOnce(GameWindow<'_>) -> Result<(), DemoError>,
{
    install_panic_hook();
    logging::init();

    let options = Options::parse(std::env::args());
    log::info!("Starting {}", options.prog_name);

    let config = match load_config(configure) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}: {e}", options.prog_name);
            return ExitCode::FAILURE;
        }
    };

    let system = WindowSystem::new(config);
    let result = body(system.init(&options.prog_name, options.background));
    system.exit();

    match result {
        Ok(()) => {
            log::info!("{} finished", options.prog_name);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}: {e}", options.prog_name);
            ExitCode::FAILURE
        }
    }
}

fn load_config(configure: impl FnOnce(&mut ViewerConfig)) -> Result<ViewerConfig, DemoError> {
    let mut config = ViewerConfig::load_or_default(CONFIG_FILE)?;
    configure(&mut config);
    config.validate()?;
    Ok(config)
}

/// Open the window and display `grids`.
///
/// In background mode the worker owns the event loop, so this waits until
/// the user closes the window.
pub fn show(window: GameWindow<'_>, grids: GridList) -> Result<(), DemoError> {
    if !window.open() {
        return Err(WindowError::CreationFailed.into());
    }
    log::info!("{}", window.get_version_string());

    window.view(grids);
    if window.is_background() {
        while window.is_open() {
            thread::sleep(BACKGROUND_WAIT);
        }
    }
    Ok(())
}

/// Log panics and abort instead of unwinding
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        match panic_info.location() {
            Some(location) => log::error!(
                "fatal: {message} at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
            None => log::error!("fatal: {message}"),
        }
        eprintln!("fatal: {message}");
        std::process::abort();
    }));
}

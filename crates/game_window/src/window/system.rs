//! Window system and application handle
//!
//! [`WindowSystem`] owns the single [`WindowController`] of a process and
//! the optional [`BackgroundRunner`]. Applications call
//! [`WindowSystem::init`] and drive the viewer through the returned
//! [`GameWindow`], which routes each call to the runner in background mode
//! and to the controller otherwise.

use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

use super::backend::WindowBackend;
use super::controller::{InterruptHandle, WindowController};
use super::glfw_backend::GlfwBackend;
use super::modules::{InputHandler, RenderModule};
use super::runner::BackgroundRunner;
use crate::config::ViewerConfig;
use crate::foundation::collections::{InputHandlerId, RenderModuleId};
use crate::foundation::logging::thread_label;
use crate::foundation::sync::lock;
use crate::grid::GridList;

/// Controller shared between the caller thread and the background worker
pub type SharedController = Arc<Mutex<WindowController>>;

/// Creates the backend for the controller, called at most once
pub type BackendFactory = Box<dyn Fn() -> Box<dyn WindowBackend> + Send + Sync>;

struct ControllerSlot {
    controller: SharedController,
    interrupt: InterruptHandle,
}

/// Process-wide owner of the viewer
pub struct WindowSystem {
    config: ViewerConfig,
    factory: BackendFactory,
    slot: OnceLock<ControllerSlot>,
    runner: Mutex<Option<Arc<BackgroundRunner>>>,
}

impl WindowSystem {
    /// Window system backed by GLFW
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_backend(config, || Box::new(GlfwBackend::new()))
    }

    /// Window system with a custom backend factory
    pub fn with_backend<F>(config: ViewerConfig, factory: F) -> Self
    where
        F: Fn() -> Box<dyn WindowBackend> + Send + Sync + 'static,
    {
        Self {
            config,
            factory: Box::new(factory),
            slot: OnceLock::new(),
            runner: Mutex::new(None),
        }
    }

    /// Settings the system was created with
    pub const fn config(&self) -> &ViewerConfig {
        &self.config
    }

    fn slot(&self) -> &ControllerSlot {
        self.slot.get_or_init(|| {
            let controller = WindowController::new((self.factory)(), &self.config);
            let interrupt = controller.interrupt_handle();
            ControllerSlot {
                controller: Arc::new(Mutex::new(controller)),
                interrupt,
            }
        })
    }

    /// The process controller, created on first use
    pub fn controller(&self) -> &SharedController {
        &self.slot().controller
    }

    /// Initialize the viewer and return a handle to it.
    ///
    /// Safe to call from several threads at once; exactly one controller is
    /// ever created. `background` selects whether `view()` hands grids to a
    /// worker thread or blocks in an event loop. Switching back to
    /// foreground stops the worker but keeps the window.
    pub fn init(&self, prog_name: &str, background: bool) -> GameWindow<'_> {
        let controller = self.controller();
        lock(controller).init(prog_name);

        let mut runner = lock(&self.runner);
        let previous = if background {
            if runner.is_none() {
                *runner = Some(Arc::new(BackgroundRunner::new(
                    Arc::clone(controller),
                    self.config.poll_interval(),
                )));
            }
            None
        } else {
            runner.take()
        };
        drop(runner);
        if let Some(previous) = previous {
            previous.shutdown();
        }

        log::debug!("constructed game window on {}", thread_label());
        GameWindow { system: self }
    }

    /// Whether `view()` runs on a worker thread
    pub fn is_background(&self) -> bool {
        lock(&self.runner).is_some()
    }

    fn runner(&self) -> Option<Arc<BackgroundRunner>> {
        lock(&self.runner).clone()
    }

    /// Stop the worker, close the window and shut the windowing runtime down.
    pub fn exit(&self) {
        let runner = lock(&self.runner).take();
        if let Some(runner) = runner {
            runner.close();
        }
        if let Some(slot) = self.slot.get() {
            lock(&slot.controller).terminate();
        }
    }
}

impl std::fmt::Debug for WindowSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSystem")
            .field("config", &self.config)
            .field("background", &self.is_background())
            .finish_non_exhaustive()
    }
}

/// Application handle to the viewer
#[derive(Clone, Copy)]
pub struct GameWindow<'a> {
    system: &'a WindowSystem,
}

impl GameWindow<'_> {
    fn controller(&self) -> &SharedController {
        self.system.controller()
    }

    /// Open a window with the configured default size
    pub fn open(&self) -> bool {
        lock(self.controller()).open_default()
    }

    /// Open a window of the given size, or re-arm the existing one
    pub fn open_with_size(&self, width: u32, height: u32) -> bool {
        lock(self.controller()).open(width, height)
    }

    /// Whether a window exists
    pub fn is_open(&self) -> bool {
        lock(self.controller()).is_open()
    }

    /// Display grids.
    ///
    /// In background mode this only schedules a redisplay. In foreground
    /// mode it renders and then runs the event loop until the window is
    /// asked to close or [`Self::interrupt`] is called.
    pub fn view(&self, grids: GridList) {
        match self.system.runner() {
            Some(runner) => runner.view(grids),
            None => self.run_foreground(grids),
        }
    }

    fn run_foreground(&self, grids: GridList) {
        let controller = self.controller();
        {
            let mut ctrl = lock(controller);
            ctrl.view(grids);
            if !ctrl.is_open() {
                return;
            }
            ctrl.clear_should_close();
        }

        let frame = self.system.config.frame_interval();
        loop {
            {
                let mut ctrl = lock(controller);
                ctrl.handle_events();
                if !ctrl.is_open() || ctrl.should_close() || ctrl.is_interrupted() {
                    ctrl.clear_interrupt();
                    break;
                }
            }
            thread::sleep(frame);
        }
    }

    /// Pump and dispatch pending events once
    pub fn handle_events(&self) {
        lock(self.controller()).handle_events();
    }

    /// Close the window, stopping the worker first in background mode
    pub fn close(&self) {
        match self.system.runner() {
            Some(runner) => runner.close(),
            None => lock(self.controller()).close(),
        }
    }

    /// Resize the window if one is open
    pub fn resize(&self, width: u32, height: u32) {
        lock(self.controller()).resize(width, height);
    }

    /// Stop a blocking `view()` running on another thread
    pub fn interrupt(&self) {
        self.interrupt_handle().interrupt();
    }

    /// Handle for interrupting from other threads
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.system.slot().interrupt.clone()
    }

    /// Library, GLFW and OpenGL versions
    pub fn get_version_string(&self) -> String {
        lock(self.controller()).get_version_string()
    }

    /// Register an input handler
    pub fn add_input_handler(&self, handler: impl InputHandler + 'static) -> InputHandlerId {
        lock(self.controller()).add_input_handler(Box::new(handler))
    }

    /// Unregister an input handler
    pub fn remove_input_handler(&self, id: InputHandlerId) -> bool {
        lock(self.controller()).remove_input_handler(id).is_some()
    }

    /// Register a render module
    pub fn add_render_module(&self, module: impl RenderModule + 'static) -> RenderModuleId {
        lock(self.controller()).add_render_module(Box::new(module))
    }

    /// Unregister a render module
    pub fn remove_render_module(&self, id: RenderModuleId) -> bool {
        lock(self.controller()).remove_render_module(id).is_some()
    }

    /// Whether `view()` runs on a worker thread
    pub fn is_background(&self) -> bool {
        self.system.is_background()
    }
}

impl std::fmt::Debug for GameWindow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameWindow").field("system", self.system).finish()
    }
}

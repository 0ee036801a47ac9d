//! # Window Controller
//!
//! Owns the windowing backend and all viewer state: the grids being
//! viewed, the grid in focus, modifier keys, the interrupt flag and the
//! registered extension modules. A process has one controller, created
//! by [`super::WindowSystem`] and shared behind a mutex between the caller
//! thread and the background worker.
//!
//! None of the public operations return errors. Failures are logged and
//! leave the controller in a consistent state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::backend::{CloseSignal, WindowBackend, WindowDescriptor};
use super::events::{KeyCode, WindowEvent};
use super::modules::{EventResponse, GridInfo, InfoModule, InputHandler, RenderModule, ViewState};
use crate::config::{ViewerConfig, WindowSettings};
use crate::foundation::collections::{HandleMap, InputHandlerId, RenderModuleId};
use crate::foundation::logging::thread_label;
use crate::grid::{GridList, LIBRARY_VERSION};

/// Cloneable handle that interrupts a blocking view loop from any thread
///
/// Interrupting never takes the controller lock, so it is safe while
/// another thread holds the controller inside an event loop.
#[derive(Clone)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
    signal: Arc<dyn CloseSignal>,
}

impl InterruptHandle {
    /// Set the interrupt flag and ask the window to close
    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::Release);
        self.signal.request_close();
    }

    /// Whether an interrupt is pending
    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear a pending interrupt
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptHandle")
            .field("interrupted", &self.is_interrupted())
            .finish_non_exhaustive()
    }
}

/// Process-wide viewer state and window lifecycle
pub struct WindowController {
    backend: Box<dyn WindowBackend>,
    settings: WindowSettings,
    did_init: bool,
    prog_name: String,
    interrupt: InterruptHandle,

    grids: GridList,
    grid_idx: usize,
    updates: usize,
    wheel_pos: i32,
    shift_down: bool,
    ctrl_down: bool,
    show_info: bool,
    needs_redisplay: bool,
    info: GridInfo,

    input_handlers: HandleMap<InputHandlerId, Box<dyn InputHandler>>,
    render_modules: HandleMap<RenderModuleId, Box<dyn RenderModule>>,
}

impl WindowController {
    /// Create a controller around a backend. The runtime is not started.
    pub fn new(backend: Box<dyn WindowBackend>, config: &ViewerConfig) -> Self {
        log::debug!("constructing window controller on {}", thread_label());
        let interrupt = InterruptHandle {
            flag: Arc::new(AtomicBool::new(false)),
            signal: backend.close_signal(),
        };
        let mut render_modules: HandleMap<RenderModuleId, Box<dyn RenderModule>> = HandleMap::with_key();
        render_modules.insert(Box::new(InfoModule::new()));

        Self {
            backend,
            settings: config.window.clone(),
            did_init: false,
            prog_name: String::new(),
            interrupt,
            grids: GridList::new(),
            grid_idx: 0,
            updates: 0,
            wheel_pos: 0,
            shift_down: false,
            ctrl_down: false,
            show_info: config.show_info,
            needs_redisplay: false,
            info: GridInfo::default(),
            input_handlers: HandleMap::with_key(),
            render_modules,
        }
    }

    /// Record the program name and start the windowing runtime once.
    ///
    /// Later calls only update the program name. A runtime failure is
    /// logged and leaves the controller uninitialized, so a later call
    /// retries.
    pub fn init(&mut self, prog_name: &str) {
        self.prog_name = prog_name.to_string();
        if self.did_init {
            return;
        }
        match self.backend.init_runtime() {
            Ok(()) => {
                self.did_init = true;
                log::debug!("windowing runtime {} initialized", self.backend.runtime_version());
            }
            Err(e) => log::error!("{}: {e}", self.prog_name),
        }
    }

    /// Whether the runtime has been initialized
    pub const fn is_initialized(&self) -> bool {
        self.did_init
    }

    /// Program name given to [`Self::init`]
    pub fn program_name(&self) -> &str {
        &self.prog_name
    }

    /// `"Grid: x.y.z, GLFW: a.b.c"` plus `", OpenGL: m.n.p"` once initialized.
    ///
    /// Without an open window the OpenGL version comes from a hidden
    /// temporary window.
    pub fn get_version_string(&mut self) -> String {
        let mut version = format!("Grid: {LIBRARY_VERSION}, GLFW: {}", self.backend.runtime_version());
        if self.did_init {
            let context = if self.backend.has_window() {
                self.backend.context_version()
            } else {
                self.backend.probe_context_version()
            };
            if let Some(context) = context {
                version.push_str(&format!(", OpenGL: {context}"));
            }
        }
        version
    }

    /// Open a window with the configured default size
    pub fn open_default(&mut self) -> bool {
        let (width, height) = (self.settings.width, self.settings.height);
        self.open(width, height)
    }

    /// Create the window if none exists, then enable event delivery.
    ///
    /// Returns whether a window is open afterwards. An existing window is
    /// kept and only has its callbacks re-armed.
    pub fn open(&mut self, width: u32, height: u32) -> bool {
        if !self.did_init {
            log::error!("{}: cannot open a window before the runtime is initialized", self.prog_name);
            return false;
        }

        if !self.backend.has_window() {
            let descriptor = WindowDescriptor {
                width,
                height,
                title: self.window_title(),
                pixel_format: self.settings.pixel_format,
            };
            if let Err(e) = self.backend.create_window(&descriptor) {
                log::error!("{}: {e}", self.prog_name);
                return false;
            }
            log::debug!("opened {width}x{height} window on {}", thread_label());
        }

        if let Err(e) = self.backend.enable_callbacks() {
            log::error!("{}: {e}", self.prog_name);
        }
        self.backend.has_window()
    }

    /// Whether a window exists
    pub fn is_open(&self) -> bool {
        self.backend.has_window()
    }

    /// Whether the window has been asked to close
    pub fn should_close(&self) -> bool {
        self.backend.should_close()
    }

    /// Pump pending events, dispatch them, and redisplay if anything asked to.
    pub fn handle_events(&mut self) {
        if !self.backend.has_window() {
            return;
        }
        for event in self.backend.poll_events() {
            self.dispatch(&event);
        }
        if self.needs_redisplay {
            self.redisplay();
        }
    }

    fn dispatch(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::Key { key, action, .. } => {
                if key.is_shift() {
                    self.shift_down = action.is_down();
                } else if key.is_control() {
                    self.ctrl_down = action.is_down();
                } else if action.is_down() {
                    self.key_down(key);
                }
            }
            WindowEvent::Scroll { dy, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let step = dy as i32;
                self.wheel_pos += step;
                self.needs_redisplay = true;
            }
            WindowEvent::Resized { .. } | WindowEvent::Refresh => self.needs_redisplay = true,
            WindowEvent::MouseButton { .. } | WindowEvent::CursorMoved { .. } | WindowEvent::CloseRequested => {}
        }

        for handler in self.input_handlers.values_mut() {
            match handler.handle_event(event) {
                EventResponse::Ignored => {}
                EventResponse::Redisplay => self.needs_redisplay = true,
                EventResponse::Close => self.backend.set_should_close(true),
            }
        }
    }

    fn key_down(&mut self, key: KeyCode) {
        match key {
            KeyCode::Escape => self.backend.set_should_close(true),
            KeyCode::Right => self.step_grid(1),
            KeyCode::Left => self.step_grid(-1),
            KeyCode::Letter('I') => {
                self.show_info = !self.show_info;
                self.needs_redisplay = true;
            }
            _ => {}
        }
    }

    fn step_grid(&mut self, step: isize) {
        let count = self.grids.len();
        if count < 2 {
            return;
        }
        self.grid_idx = self.grid_idx.checked_add_signed(step).map_or(count - 1, |i| i % count);
        self.update_info();
        self.needs_redisplay = true;
    }

    /// Destroy the window if one exists and clear the interrupt flag.
    pub fn close(&mut self) {
        if self.backend.has_window() {
            self.backend.destroy_window();
            log::debug!("closed window on {}", thread_label());
        }
        self.interrupt.clear();
    }

    /// Resize the window; does nothing when no window is open.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.backend.has_window() {
            self.backend.set_size(width, height);
        }
    }

    /// Interrupt a blocking view loop
    pub fn interrupt(&self) {
        self.interrupt.interrupt();
    }

    /// Handle for interrupting without the controller lock
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Whether an interrupt is pending
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_interrupted()
    }

    /// Drop a pending interrupt
    pub fn clear_interrupt(&self) {
        self.interrupt.clear();
    }

    /// Let an open window keep running after an earlier close request
    pub fn clear_should_close(&mut self) {
        if self.backend.has_window() {
            self.backend.set_should_close(false);
        }
    }

    /// Replace the grids being viewed and render them once.
    ///
    /// Focus returns to the first grid.
    pub fn view(&mut self, grids: GridList) {
        self.grids = grids;
        self.grid_idx = 0;
        self.update_info();
        self.redisplay();
    }

    /// Run every render module over the current state and present.
    pub fn redisplay(&mut self) {
        self.needs_redisplay = false;
        self.updates += 1;

        let window_size = self.backend.size();
        let view = ViewState {
            grids: &self.grids,
            grid_index: self.grid_idx,
            update: self.updates,
            show_info: self.show_info,
            wheel_position: self.wheel_pos,
            window_size,
            info: &self.info,
        };
        for module in self.render_modules.values_mut() {
            module.render(&view);
        }

        if self.backend.has_window() {
            self.backend.swap_buffers();
        }
    }

    fn update_info(&mut self) {
        self.info = self
            .grids
            .get(self.grid_idx)
            .map(|grid| GridInfo::describe(grid.as_ref()))
            .unwrap_or_default();
    }

    fn window_title(&self) -> String {
        if self.settings.title.is_empty() {
            self.prog_name.clone()
        } else {
            self.settings.title.clone()
        }
    }

    /// Register an input handler
    pub fn add_input_handler(&mut self, handler: Box<dyn InputHandler>) -> InputHandlerId {
        self.input_handlers.insert(handler)
    }

    /// Unregister an input handler
    pub fn remove_input_handler(&mut self, id: InputHandlerId) -> Option<Box<dyn InputHandler>> {
        self.input_handlers.remove(id)
    }

    /// Register a render module
    pub fn add_render_module(&mut self, module: Box<dyn RenderModule>) -> RenderModuleId {
        self.render_modules.insert(module)
    }

    /// Unregister a render module
    pub fn remove_render_module(&mut self, id: RenderModuleId) -> Option<Box<dyn RenderModule>> {
        self.render_modules.remove(id)
    }

    /// Grids being viewed
    pub fn grids(&self) -> &GridList {
        &self.grids
    }

    /// Index of the grid in focus
    pub const fn grid_index(&self) -> usize {
        self.grid_idx
    }

    /// Number of redisplays so far
    pub const fn update_count(&self) -> usize {
        self.updates
    }

    /// Accumulated vertical scroll
    pub const fn wheel_position(&self) -> i32 {
        self.wheel_pos
    }

    /// Whether a shift key is held
    pub const fn shift_down(&self) -> bool {
        self.shift_down
    }

    /// Whether a control key is held
    pub const fn ctrl_down(&self) -> bool {
        self.ctrl_down
    }

    /// Whether grid information is shown
    pub const fn show_info(&self) -> bool {
        self.show_info
    }

    /// Summary of the grid in focus
    pub const fn grid_info(&self) -> &GridInfo {
        &self.info
    }

    /// Close the window and shut the runtime down. A later
    /// [`Self::init`] starts it again.
    pub fn terminate(&mut self) {
        self.close();
        if self.did_init {
            self.backend.terminate();
            self.did_init = false;
            log::debug!("windowing runtime terminated");
        }
    }
}

impl std::fmt::Debug for WindowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowController")
            .field("prog_name", &self.prog_name)
            .field("did_init", &self.did_init)
            .field("grids", &self.grids.len())
            .field("grid_idx", &self.grid_idx)
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{FloatGrid, GridPtr};
    use crate::window::events::{KeyAction, Modifiers};
    use crate::window::mock::{MockBackend, MockState};
    use std::sync::Mutex;

    fn controller() -> (WindowController, Arc<Mutex<MockState>>) {
        let (backend, state) = MockBackend::new();
        (WindowController::new(Box::new(backend), &ViewerConfig::default()), state)
    }

    fn named_grid(name: &str) -> GridPtr {
        let mut grid = FloatGrid::new(1.0);
        grid.set_name(name);
        grid.into_ptr()
    }

    struct Recorder(Arc<Mutex<Vec<(usize, Option<String>)>>>);

    impl RenderModule for Recorder {
        fn render(&mut self, view: &ViewState<'_>) {
            let name = view.current_grid().map(|g| g.name().to_string());
            self.0.lock().unwrap().push((view.update, name));
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let (mut ctrl, state) = controller();
        ctrl.init("first");
        ctrl.init("second");
        assert!(ctrl.is_initialized());
        assert_eq!(ctrl.program_name(), "second");
        assert_eq!(state.lock().unwrap().init_calls, 1);
    }

    #[test]
    fn test_failed_init_is_retried() {
        let (mut ctrl, state) = controller();
        state.lock().unwrap().fail_init = true;
        ctrl.init("viewer");
        assert!(!ctrl.is_initialized());
        assert!(!ctrl.open(640, 480));

        state.lock().unwrap().fail_init = false;
        ctrl.init("viewer");
        assert!(ctrl.is_initialized());
        assert_eq!(state.lock().unwrap().init_calls, 2);
    }

    #[test]
    fn test_open_twice_keeps_one_window() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        assert!(ctrl.open(640, 480));
        assert!(ctrl.open(320, 200));
        let state = state.lock().unwrap();
        assert_eq!(state.windows_created, 1);
        assert_eq!(state.callbacks_enabled, 2);
        assert_eq!(state.size, Some((640, 480)));
        assert_eq!(state.title, "viewer");
    }

    #[test]
    fn test_open_reports_creation_failure() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        state.lock().unwrap().fail_create = true;
        assert!(!ctrl.open_default());
        assert!(!ctrl.is_open());
    }

    #[test]
    fn test_open_close_scenario() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        assert!(ctrl.open(640, 480));
        assert!(ctrl.is_open());
        ctrl.close();
        assert!(!ctrl.is_open());
        ctrl.close();
        assert_eq!(state.lock().unwrap().windows_destroyed, 1);
    }

    #[test]
    fn test_close_and_resize_without_window() {
        let (mut ctrl, state) = controller();
        ctrl.close();
        ctrl.resize(100, 100);
        ctrl.init("viewer");
        ctrl.resize(100, 100);
        let state = state.lock().unwrap();
        assert_eq!(state.windows_destroyed, 0);
        assert_eq!(state.resizes, 0);
        assert_eq!(state.size, None);
    }

    #[test]
    fn test_resize_open_window() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.open_default();
        ctrl.resize(1024, 768);
        assert_eq!(state.lock().unwrap().size, Some((1024, 768)));
    }

    #[test]
    fn test_version_string_uses_probe_without_window() {
        let (mut ctrl, state) = controller();
        assert_eq!(
            ctrl.get_version_string(),
            format!("Grid: {LIBRARY_VERSION}, GLFW: 3.3.8")
        );

        ctrl.init("viewer");
        assert_eq!(
            ctrl.get_version_string(),
            format!("Grid: {LIBRARY_VERSION}, GLFW: 3.3.8, OpenGL: 4.6.0")
        );
        {
            let state = state.lock().unwrap();
            assert_eq!(state.probe_calls, 1);
            assert_eq!(state.windows_created, 0);
        }

        ctrl.open_default();
        assert!(ctrl.get_version_string().ends_with("OpenGL: 4.6.0"));
        assert_eq!(state.lock().unwrap().probe_calls, 1);
    }

    #[test]
    fn test_view_renders_once_and_resets_focus() {
        let (mut ctrl, _state) = controller();
        let frames = Arc::new(Mutex::new(Vec::new()));
        ctrl.add_render_module(Box::new(Recorder(Arc::clone(&frames))));

        ctrl.view(vec![named_grid("a"), named_grid("b")]);
        assert_eq!(ctrl.update_count(), 1);
        assert_eq!(ctrl.grid_info().name, "a");

        ctrl.view(vec![named_grid("c")]);
        assert_eq!(ctrl.grid_index(), 0);
        assert_eq!(
            *frames.lock().unwrap(),
            vec![(1, Some("a".to_string())), (2, Some("c".to_string()))]
        );
    }

    #[test]
    fn test_arrow_keys_cycle_grids() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.open_default();
        ctrl.view(vec![named_grid("a"), named_grid("b"), named_grid("c")]);

        state.lock().unwrap().push_events([
            WindowEvent::key_press(KeyCode::Left),
            WindowEvent::key_press(KeyCode::Left),
        ]);
        ctrl.handle_events();
        assert_eq!(ctrl.grid_index(), 1);
        assert_eq!(ctrl.grid_info().name, "b");
        assert_eq!(ctrl.update_count(), 2);

        state.lock().unwrap().push_events([WindowEvent::key_press(KeyCode::Right)]);
        ctrl.handle_events();
        assert_eq!(ctrl.grid_index(), 2);
        assert!(state.lock().unwrap().swaps >= 3);
    }

    #[test]
    fn test_escape_and_info_keys() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.open_default();
        assert!(ctrl.show_info());

        state.lock().unwrap().push_events([WindowEvent::key_press(KeyCode::Letter('I'))]);
        ctrl.handle_events();
        assert!(!ctrl.show_info());
        assert!(!ctrl.should_close());

        state.lock().unwrap().push_events([WindowEvent::key_press(KeyCode::Escape)]);
        ctrl.handle_events();
        assert!(ctrl.should_close());
    }

    #[test]
    fn test_modifier_and_wheel_tracking() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.open_default();
        state.lock().unwrap().push_events([
            WindowEvent::Key {
                key: KeyCode::LeftShift,
                action: KeyAction::Press,
                modifiers: Modifiers::SHIFT,
            },
            WindowEvent::key_press(KeyCode::RightControl),
            WindowEvent::Scroll { dx: 0.0, dy: 2.0 },
            WindowEvent::Scroll { dx: 0.0, dy: -1.0 },
        ]);
        ctrl.handle_events();
        assert!(ctrl.shift_down());
        assert!(ctrl.ctrl_down());
        assert_eq!(ctrl.wheel_position(), 1);

        state.lock().unwrap().push_events([WindowEvent::Key {
            key: KeyCode::LeftShift,
            action: KeyAction::Release,
            modifiers: Modifiers::empty(),
        }]);
        ctrl.handle_events();
        assert!(!ctrl.shift_down());
    }

    #[test]
    fn test_input_handler_can_close_window() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.open_default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = ctrl.add_input_handler(Box::new(move |event: &WindowEvent| {
            sink.lock().unwrap().push(*event);
            if matches!(
                event,
                WindowEvent::Key { key: KeyCode::Letter('Q'), action: KeyAction::Press, .. }
            ) {
                EventResponse::Close
            } else {
                EventResponse::Ignored
            }
        }));

        state.lock().unwrap().push_events([WindowEvent::Refresh]);
        ctrl.handle_events();
        assert!(!ctrl.should_close());

        state.lock().unwrap().push_events([WindowEvent::key_press(KeyCode::Letter('Q'))]);
        ctrl.handle_events();
        assert!(ctrl.should_close());
        assert_eq!(seen.lock().unwrap().len(), 2);

        assert!(ctrl.remove_input_handler(id).is_some());
    }

    #[test]
    fn test_handle_events_without_window_does_not_poll() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.handle_events();
        assert_eq!(state.lock().unwrap().poll_calls, 0);
    }

    #[test]
    fn test_interrupt_flags_window_and_close_clears() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.open_default();
        let handle = ctrl.interrupt_handle();
        handle.interrupt();
        assert!(ctrl.is_interrupted());
        assert!(ctrl.should_close());
        assert_eq!(state.lock().unwrap().close_requests, 1);

        ctrl.close();
        assert!(!handle.is_interrupted());
    }

    #[test]
    fn test_terminate_allows_reinit() {
        let (mut ctrl, state) = controller();
        ctrl.init("viewer");
        ctrl.open_default();
        ctrl.terminate();
        assert!(!ctrl.is_initialized());
        assert!(!ctrl.is_open());
        assert_eq!(state.lock().unwrap().terminations, 1);

        ctrl.init("viewer");
        assert!(ctrl.is_initialized());
    }
}

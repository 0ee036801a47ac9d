//! Recording backend for tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use super::backend::{CloseSignal, Version, WindowBackend, WindowDescriptor, WindowError, WindowResult};
use super::events::WindowEvent;

/// Everything the mock has been asked to do
#[derive(Debug, Default)]
pub struct MockState {
    pub initialized: bool,
    pub fail_init: bool,
    pub fail_create: bool,
    pub init_calls: usize,
    pub window: bool,
    pub title: String,
    pub size: Option<(u32, u32)>,
    pub should_close: bool,
    pub windows_created: usize,
    pub windows_destroyed: usize,
    pub callbacks_enabled: usize,
    pub resizes: usize,
    pub swaps: usize,
    pub probe_calls: usize,
    pub close_requests: usize,
    pub terminations: usize,
    pub poll_calls: usize,
    pub poll_threads: Vec<ThreadId>,
    pub pending: VecDeque<WindowEvent>,
}

impl MockState {
    /// Queue events for the next poll
    pub fn push_events(&mut self, events: impl IntoIterator<Item = WindowEvent>) {
        self.pending.extend(events);
    }
}

/// Backend that only records calls
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (Self::with_state(Arc::clone(&state)), state)
    }

    pub const fn with_state(state: Arc<Mutex<MockState>>) -> Self {
        Self { state }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

struct MockCloseSignal(Arc<Mutex<MockState>>);

impl CloseSignal for MockCloseSignal {
    fn request_close(&self) {
        let mut state = self.0.lock().unwrap();
        if state.window {
            state.should_close = true;
            state.close_requests += 1;
        }
    }
}

impl WindowBackend for MockBackend {
    fn init_runtime(&mut self) -> WindowResult<()> {
        let mut state = self.state();
        if state.initialized {
            return Ok(());
        }
        state.init_calls += 1;
        if state.fail_init {
            return Err(WindowError::InitializationFailed);
        }
        state.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    fn runtime_version(&self) -> Version {
        Version::new(3, 3, 8)
    }

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> WindowResult<()> {
        let mut state = self.state();
        if !state.initialized {
            return Err(WindowError::RuntimeUnavailable);
        }
        if state.fail_create {
            return Err(WindowError::CreationFailed);
        }
        state.window = true;
        state.should_close = false;
        state.title.clone_from(&descriptor.title);
        state.size = Some((descriptor.width, descriptor.height));
        state.windows_created += 1;
        Ok(())
    }

    fn enable_callbacks(&mut self) -> WindowResult<()> {
        let mut state = self.state();
        if !state.window {
            return Err(WindowError::NoWindow);
        }
        state.callbacks_enabled += 1;
        Ok(())
    }

    fn destroy_window(&mut self) {
        let mut state = self.state();
        if state.window {
            state.window = false;
            state.size = None;
            state.should_close = false;
            state.windows_destroyed += 1;
        }
    }

    fn has_window(&self) -> bool {
        self.state().window
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut state = self.state();
        state.poll_calls += 1;
        state.poll_threads.push(thread::current().id());
        let events: Vec<_> = state.pending.drain(..).collect();
        if events.contains(&WindowEvent::CloseRequested) {
            state.should_close = true;
        }
        events
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let mut state = self.state();
        if state.window {
            state.size = Some((width, height));
            state.resizes += 1;
        }
    }

    fn size(&self) -> Option<(u32, u32)> {
        self.state().size
    }

    fn set_should_close(&mut self, value: bool) {
        let mut state = self.state();
        if state.window {
            state.should_close = value;
        }
    }

    fn should_close(&self) -> bool {
        let state = self.state();
        state.window && state.should_close
    }

    fn swap_buffers(&mut self) {
        self.state().swaps += 1;
    }

    fn context_version(&self) -> Option<Version> {
        self.state().window.then_some(Version::new(4, 6, 0))
    }

    fn probe_context_version(&mut self) -> Option<Version> {
        let mut state = self.state();
        if !state.initialized {
            return None;
        }
        state.probe_calls += 1;
        Some(Version::new(4, 6, 0))
    }

    fn close_signal(&self) -> Arc<dyn CloseSignal> {
        Arc::new(MockCloseSignal(Arc::clone(&self.state)))
    }

    fn terminate(&mut self) {
        let mut state = self.state();
        state.window = false;
        state.size = None;
        state.initialized = false;
        state.terminations += 1;
    }
}

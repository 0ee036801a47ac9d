//! GLFW window backend
//!
//! GLFW handles cannot leave the thread that created them, while the
//! controller is shared between the caller and the background worker. The
//! backend therefore starts a dedicated `glfw-runtime` thread that owns the
//! [`glfw::Glfw`] instance and the window, and forwards every operation to
//! it over a crossbeam channel. Queries carry a reply channel; fire-and-forget
//! commands do not.
//!
//! Platforms that require GLFW on the main thread (macOS) are not supported
//! by this backend.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use glfw::Context;

use super::backend::{CloseSignal, Version, WindowBackend, WindowDescriptor, WindowError, WindowResult};
use super::events::{KeyAction, KeyCode, Modifiers, MouseButton, WindowEvent};
use crate::config::PixelFormat;
use crate::foundation::logging::thread_label;
use crate::foundation::sync::lock;

enum Command {
    CreateWindow(WindowDescriptor, Sender<WindowResult<()>>),
    EnableCallbacks(Sender<WindowResult<()>>),
    DestroyWindow(Sender<()>),
    HasWindow(Sender<bool>),
    PollEvents(Sender<Vec<WindowEvent>>),
    SetSize(u32, u32),
    Size(Sender<Option<(u32, u32)>>),
    SetShouldClose(bool),
    ShouldClose(Sender<bool>),
    SwapBuffers,
    ContextVersion(Sender<Option<Version>>),
    ProbeContextVersion(Sender<Option<Version>>),
    Terminate,
}

struct Runtime {
    commands: Sender<Command>,
    thread: JoinHandle<()>,
}

#[derive(Default)]
struct GlfwCloseSignal {
    commands: Mutex<Option<Sender<Command>>>,
}

impl CloseSignal for GlfwCloseSignal {
    fn request_close(&self) {
        if let Some(commands) = lock(&self.commands).as_ref() {
            // A closed channel means the runtime is gone and there is no window.
            let _ = commands.send(Command::SetShouldClose(true));
        }
    }
}

/// [`WindowBackend`] running GLFW on its own thread
pub struct GlfwBackend {
    runtime: Option<Runtime>,
    signal: Arc<GlfwCloseSignal>,
}

impl GlfwBackend {
    /// Backend with no runtime started yet
    pub fn new() -> Self {
        Self {
            runtime: None,
            signal: Arc::new(GlfwCloseSignal::default()),
        }
    }

    fn request<R>(&self, make: impl FnOnce(Sender<R>) -> Command) -> WindowResult<R> {
        let runtime = self.runtime.as_ref().ok_or(WindowError::RuntimeUnavailable)?;
        let (reply, response) = channel::bounded(1);
        runtime
            .commands
            .send(make(reply))
            .map_err(|_| WindowError::Disconnected)?;
        response.recv().map_err(|_| WindowError::Disconnected)
    }

    fn send(&self, command: Command) {
        if let Some(runtime) = &self.runtime {
            if runtime.commands.send(command).is_err() {
                log::warn!("GLFW runtime thread is gone");
            }
        }
    }
}

impl Default for GlfwBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowBackend for GlfwBackend {
    fn init_runtime(&mut self) -> WindowResult<()> {
        if self.runtime.is_some() {
            return Ok(());
        }

        let (commands, receiver) = channel::unbounded();
        let (ready, ready_rx) = channel::bounded(1);
        let thread = thread::Builder::new()
            .name("glfw-runtime".to_string())
            .spawn(move || {
                let glfw = match glfw::init(log_glfw_error) {
                    Ok(glfw) => glfw,
                    Err(e) => {
                        log::error!("GLFW initialization failed: {e:?}");
                        let _ = ready.send(Err(WindowError::InitializationFailed));
                        return;
                    }
                };
                let _ = ready.send(Ok(()));
                RuntimeState { glfw, window: None }.run(&receiver);
            })
            .map_err(|e| WindowError::Glfw(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                *lock(&self.signal.commands) = Some(commands.clone());
                self.runtime = Some(Runtime { commands, thread });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(WindowError::Disconnected)
            }
        }
    }

    fn is_initialized(&self) -> bool {
        self.runtime.is_some()
    }

    fn runtime_version(&self) -> Version {
        let v = glfw::get_version();
        Version::new(narrow(v.major), narrow(v.minor), narrow(v.patch))
    }

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> WindowResult<()> {
        self.request(|reply| Command::CreateWindow(descriptor.clone(), reply))?
    }

    fn enable_callbacks(&mut self) -> WindowResult<()> {
        self.request(Command::EnableCallbacks)?
    }

    fn destroy_window(&mut self) {
        if let Err(e) = self.request(Command::DestroyWindow) {
            log::debug!("destroy window: {e}");
        }
    }

    fn has_window(&self) -> bool {
        self.request(Command::HasWindow).unwrap_or(false)
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.request(Command::PollEvents).unwrap_or_default()
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.send(Command::SetSize(width, height));
    }

    fn size(&self) -> Option<(u32, u32)> {
        self.request(Command::Size).ok().flatten()
    }

    fn set_should_close(&mut self, value: bool) {
        self.send(Command::SetShouldClose(value));
    }

    fn should_close(&self) -> bool {
        self.request(Command::ShouldClose).unwrap_or(false)
    }

    fn swap_buffers(&mut self) {
        self.send(Command::SwapBuffers);
    }

    fn context_version(&self) -> Option<Version> {
        self.request(Command::ContextVersion).ok().flatten()
    }

    fn probe_context_version(&mut self) -> Option<Version> {
        self.request(Command::ProbeContextVersion).ok().flatten()
    }

    fn close_signal(&self) -> Arc<dyn CloseSignal> {
        self.signal.clone()
    }

    fn terminate(&mut self) {
        lock(&self.signal.commands).take();
        if let Some(runtime) = self.runtime.take() {
            let _ = runtime.commands.send(Command::Terminate);
            if runtime.thread.join().is_err() {
                log::error!("GLFW runtime thread panicked");
            }
        }
    }
}

impl Drop for GlfwBackend {
    fn drop(&mut self) {
        self.terminate();
    }
}

type EventReceiver = glfw::GlfwReceiver<(f64, glfw::WindowEvent)>;

struct RuntimeState {
    glfw: glfw::Glfw,
    window: Option<(glfw::PWindow, EventReceiver)>,
}

impl RuntimeState {
    fn run(mut self, commands: &Receiver<Command>) {
        log::debug!("GLFW runtime started on {}", thread_label());
        for command in commands {
            if !self.handle(command) {
                break;
            }
        }
        self.window = None;
        log::debug!("GLFW runtime stopped");
    }

    // Replies are dropped silently when the requester has gone away.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::CreateWindow(descriptor, reply) => {
                let _ = reply.send(self.create_window(&descriptor));
            }
            Command::EnableCallbacks(reply) => {
                let _ = reply.send(self.enable_callbacks());
            }
            Command::DestroyWindow(reply) => {
                self.window = None;
                let _ = reply.send(());
            }
            Command::HasWindow(reply) => {
                let _ = reply.send(self.window.is_some());
            }
            Command::PollEvents(reply) => {
                let _ = reply.send(self.poll_events());
            }
            Command::SetSize(width, height) => {
                if let Some((window, _)) = &mut self.window {
                    window.set_size(clamp_i32(width), clamp_i32(height));
                }
            }
            Command::Size(reply) => {
                let size = self.window.as_ref().map(|(window, _)| {
                    let (w, h) = window.get_size();
                    (u32::try_from(w).unwrap_or(0), u32::try_from(h).unwrap_or(0))
                });
                let _ = reply.send(size);
            }
            Command::SetShouldClose(value) => {
                if let Some((window, _)) = &mut self.window {
                    window.set_should_close(value);
                }
            }
            Command::ShouldClose(reply) => {
                let _ = reply.send(self.window.as_ref().is_some_and(|(window, _)| window.should_close()));
            }
            Command::SwapBuffers => {
                if let Some((window, _)) = &mut self.window {
                    window.swap_buffers();
                }
            }
            Command::ContextVersion(reply) => {
                let version = self
                    .window
                    .as_ref()
                    .map(|(window, _)| context_version(window));
                let _ = reply.send(version);
            }
            Command::ProbeContextVersion(reply) => {
                let _ = reply.send(self.probe_context_version());
            }
            Command::Terminate => return false,
        }
        true
    }

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> WindowResult<()> {
        if self.window.is_some() {
            return Ok(());
        }

        self.glfw.default_window_hints();
        apply_pixel_format(&mut self.glfw, descriptor.pixel_format);
        let (mut window, events) = self
            .glfw
            .create_window(
                descriptor.width,
                descriptor.height,
                &descriptor.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or(WindowError::CreationFailed)?;
        window.make_current();
        self.window = Some((window, events));
        Ok(())
    }

    fn enable_callbacks(&mut self) -> WindowResult<()> {
        let (window, _) = self.window.as_mut().ok_or(WindowError::NoWindow)?;
        window.set_key_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);
        window.set_size_polling(true);
        window.set_refresh_polling(true);
        window.set_close_polling(true);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.glfw.poll_events();
        match &self.window {
            Some((_, events)) => glfw::flush_messages(events)
                .filter_map(|(_, event)| translate_event(event))
                .collect(),
            None => Vec::new(),
        }
    }

    fn probe_context_version(&mut self) -> Option<Version> {
        self.glfw.default_window_hints();
        self.glfw.window_hint(glfw::WindowHint::Visible(false));
        let probe = self
            .glfw
            .create_window(100, 100, "version probe", glfw::WindowMode::Windowed);
        self.glfw.default_window_hints();

        let (window, _events) = probe?;
        Some(context_version(&window))
    }
}

fn log_glfw_error(error: glfw::Error, description: String) {
    log::error!("GLFW error {error:?}: {description}");
}

fn apply_pixel_format(glfw: &mut glfw::Glfw, format: PixelFormat) {
    use glfw::WindowHint;

    glfw.window_hint(WindowHint::RedBits(Some(format.red_bits)));
    glfw.window_hint(WindowHint::GreenBits(Some(format.green_bits)));
    glfw.window_hint(WindowHint::BlueBits(Some(format.blue_bits)));
    glfw.window_hint(WindowHint::AlphaBits(Some(format.alpha_bits)));
    glfw.window_hint(WindowHint::DepthBits(Some(format.depth_bits)));
    glfw.window_hint(WindowHint::StencilBits(Some(format.stencil_bits)));
}

fn context_version(window: &glfw::PWindow) -> Version {
    let v = window.get_context_version();
    Version::new(narrow(v.major), narrow(v.minor), narrow(v.patch))
}

fn narrow<T>(n: T) -> u32
where
    u32: TryFrom<T>,
{
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn clamp_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn translate_event(event: glfw::WindowEvent) -> Option<WindowEvent> {
    Some(match event {
        glfw::WindowEvent::Key(key, _, action, mods) => WindowEvent::Key {
            key: key_code(key),
            action: key_action(action),
            modifiers: modifiers(mods),
        },
        glfw::WindowEvent::MouseButton(button, action, mods) => WindowEvent::MouseButton {
            button: mouse_button(button),
            action: key_action(action),
            modifiers: modifiers(mods),
        },
        glfw::WindowEvent::CursorPos(x, y) => WindowEvent::CursorMoved { x, y },
        glfw::WindowEvent::Scroll(dx, dy) => WindowEvent::Scroll { dx, dy },
        glfw::WindowEvent::Size(width, height) => WindowEvent::Resized {
            width: u32::try_from(width).unwrap_or(0),
            height: u32::try_from(height).unwrap_or(0),
        },
        glfw::WindowEvent::Refresh => WindowEvent::Refresh,
        glfw::WindowEvent::Close => WindowEvent::CloseRequested,
        _ => return None,
    })
}

fn key_code(key: glfw::Key) -> KeyCode {
    use glfw::Key;

    match key {
        Key::Escape => KeyCode::Escape,
        Key::Left => KeyCode::Left,
        Key::Right => KeyCode::Right,
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::Space => KeyCode::Space,
        Key::Enter => KeyCode::Enter,
        Key::LeftShift => KeyCode::LeftShift,
        Key::RightShift => KeyCode::RightShift,
        Key::LeftControl => KeyCode::LeftControl,
        Key::RightControl => KeyCode::RightControl,
        other => key_code_from_raw(other as i32),
    }
}

// Letter and digit keys use their ASCII codes.
fn key_code_from_raw(code: i32) -> KeyCode {
    match u8::try_from(code) {
        Ok(c @ b'A'..=b'Z') => KeyCode::Letter(char::from(c)),
        Ok(c @ b'0'..=b'9') => KeyCode::Digit(c - b'0'),
        _ => KeyCode::Other(code),
    }
}

const fn key_action(action: glfw::Action) -> KeyAction {
    match action {
        glfw::Action::Press => KeyAction::Press,
        glfw::Action::Release => KeyAction::Release,
        glfw::Action::Repeat => KeyAction::Repeat,
    }
}

fn mouse_button(button: glfw::MouseButton) -> MouseButton {
    match button {
        glfw::MouseButton::Button1 => MouseButton::Left,
        glfw::MouseButton::Button2 => MouseButton::Right,
        glfw::MouseButton::Button3 => MouseButton::Middle,
        other => MouseButton::Other(other as i32),
    }
}

fn modifiers(mods: glfw::Modifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, mods.contains(glfw::Modifiers::Shift));
    out.set(Modifiers::CONTROL, mods.contains(glfw::Modifiers::Control));
    out.set(Modifiers::ALT, mods.contains(glfw::Modifiers::Alt));
    out.set(Modifiers::SUPER, mods.contains(glfw::Modifiers::Super));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_key_codes() {
        assert_eq!(key_code_from_raw(73), KeyCode::Letter('I'));
        assert_eq!(key_code_from_raw(48), KeyCode::Digit(0));
        assert_eq!(key_code_from_raw(290), KeyCode::Other(290));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(key_code(glfw::Key::Escape), KeyCode::Escape);
        assert_eq!(key_code(glfw::Key::Q), KeyCode::Letter('Q'));
        assert_eq!(key_code(glfw::Key::Num7), KeyCode::Digit(7));
    }

    #[test]
    fn test_event_translation() {
        let event = translate_event(glfw::WindowEvent::Key(
            glfw::Key::Right,
            0,
            glfw::Action::Repeat,
            glfw::Modifiers::Shift | glfw::Modifiers::Control,
        ));
        assert_eq!(
            event,
            Some(WindowEvent::Key {
                key: KeyCode::Right,
                action: KeyAction::Repeat,
                modifiers: Modifiers::SHIFT | Modifiers::CONTROL,
            })
        );
        assert_eq!(
            translate_event(glfw::WindowEvent::Size(-1, 600)),
            Some(WindowEvent::Resized { width: 0, height: 600 })
        );
        assert_eq!(translate_event(glfw::WindowEvent::Focus(true)), None);
    }

    #[test]
    fn test_uninitialized_backend_is_inert() {
        let mut backend = GlfwBackend::new();
        assert!(!backend.is_initialized());
        assert!(!backend.has_window());
        assert!(!backend.should_close());
        assert!(backend.poll_events().is_empty());
        assert_eq!(backend.probe_context_version(), None);
        assert!(matches!(
            backend.create_window(&WindowDescriptor {
                width: 10,
                height: 10,
                title: String::new(),
                pixel_format: PixelFormat::default(),
            }),
            Err(WindowError::RuntimeUnavailable)
        ));
        backend.close_signal().request_close();
        backend.set_size(10, 10);
        backend.terminate();
    }
}

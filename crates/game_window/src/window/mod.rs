//! Viewer window management
//!
//! - [`WindowSystem`] owns the process-wide [`WindowController`] and hands
//!   out [`GameWindow`] handles
//! - [`BackgroundRunner`] drives the viewer from a worker thread
//! - [`WindowBackend`] abstracts the windowing toolkit; [`GlfwBackend`] is
//!   the production implementation
//! - [`InputHandler`] and [`RenderModule`] are the extension points

pub mod backend;
pub mod controller;
pub mod events;
pub mod glfw_backend;
pub mod modules;
pub mod runner;
pub mod system;

#[cfg(test)]
mod mock;

pub use backend::{CloseSignal, Version, WindowBackend, WindowDescriptor, WindowError, WindowResult};
pub use controller::{InterruptHandle, WindowController};
pub use events::{KeyAction, KeyCode, Modifiers, MouseButton, WindowEvent};
pub use glfw_backend::GlfwBackend;
pub use modules::{EventResponse, GridInfo, InfoModule, InputHandler, RenderModule, ViewState};
pub use runner::BackgroundRunner;
pub use system::{BackendFactory, GameWindow, SharedController, WindowSystem};

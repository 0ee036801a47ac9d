//! Backend-agnostic windowing runtime trait
//!
//! The controller talks to the windowing toolkit only through
//! [`WindowBackend`]. The GLFW implementation lives in
//! [`super::glfw_backend`]; tests use a recording mock.

use std::fmt;

use thiserror::Error;

use super::events::WindowEvent;
use crate::config::PixelFormat;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// Runtime failed to initialize
    #[error("windowing runtime initialization failed")]
    InitializationFailed,

    /// Operation needs an initialized runtime
    #[error("windowing runtime is not initialized")]
    RuntimeUnavailable,

    /// Window could not be created
    #[error("window creation failed")]
    CreationFailed,

    /// Operation needs an open window
    #[error("no window is open")]
    NoWindow,

    /// Error reported by GLFW
    #[error("GLFW error: {0}")]
    Glfw(String),

    /// Runtime thread is gone
    #[error("windowing runtime thread disconnected")]
    Disconnected,
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// A `major.minor.patch` version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch level
    pub patch: u32,
}

impl Version {
    /// Create a version
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parameters for a new window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    /// Client width in pixels
    pub width: u32,
    /// Client height in pixels
    pub height: u32,
    /// Title bar text
    pub title: String,
    /// Framebuffer channel depths
    pub pixel_format: PixelFormat,
}

/// Thread-safe request to close the current window
///
/// Must not block on the thread that is pumping events; the interrupt
/// path calls it while another thread may be inside
/// [`WindowBackend::poll_events`].
pub trait CloseSignal: Send + Sync {
    /// Flag the current window, if any, as should-close
    fn request_close(&self);
}

/// A windowing toolkit runtime holding at most one window
///
/// Implementations must be [`Send`] so the controller that owns one can
/// be shared between the caller thread and the background worker.
pub trait WindowBackend: Send {
    /// Initialize the runtime. Calling it again after success is a no-op.
    fn init_runtime(&mut self) -> WindowResult<()>;

    /// Whether [`Self::init_runtime`] has succeeded
    fn is_initialized(&self) -> bool;

    /// Toolkit version, available without initialization
    fn runtime_version(&self) -> Version;

    /// Create the window and make its context current
    fn create_window(&mut self, descriptor: &WindowDescriptor) -> WindowResult<()>;

    /// Turn on delivery of input, resize and refresh events for the window
    fn enable_callbacks(&mut self) -> WindowResult<()>;

    /// Destroy the window if one exists
    fn destroy_window(&mut self);

    /// Whether a window exists
    fn has_window(&self) -> bool;

    /// Process pending toolkit events and return them in arrival order
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Resize the window client area
    fn set_size(&mut self, width: u32, height: u32);

    /// Current client area size
    fn size(&self) -> Option<(u32, u32)>;

    /// Set the window's should-close flag
    fn set_should_close(&mut self, value: bool);

    /// The window's should-close flag, `false` without a window
    fn should_close(&self) -> bool;

    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Context version of the open window
    fn context_version(&self) -> Option<Version>;

    /// Context version of a hidden temporary window, destroyed before returning
    fn probe_context_version(&mut self) -> Option<Version>;

    /// Handle that can flag the window as should-close from any thread
    fn close_signal(&self) -> std::sync::Arc<dyn CloseSignal>;

    /// Destroy the window and shut the runtime down
    fn terminate(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display_and_order() {
        let v = Version::new(3, 3, 8);
        assert_eq!(v.to_string(), "3.3.8");
        assert!(Version::new(4, 1, 0) > v);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(WindowError::NoWindow.to_string(), "no window is open");
        assert_eq!(
            WindowError::Glfw("bad hint".into()).to_string(),
            "GLFW error: bad hint"
        );
    }
}

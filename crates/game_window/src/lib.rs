//! # Game Window
//!
//! A small grid viewer: a process-wide window controller around GLFW, a
//! background runner that redisplays grids from a worker thread, and a
//! minimal sparse voxel grid library to feed it.
//!
//! ## Features
//!
//! - **Single controller**: one [`WindowController`] per [`WindowSystem`], created on first use
//! - **Background mode**: `view()` returns immediately and a worker coalesces redisplays
//! - **Extension points**: [`InputHandler`]s and [`RenderModule`]s registered per window
//! - **Grids**: block-sparse trees, level set spheres and typed metadata
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use game_window::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = WindowSystem::new(ViewerConfig::default());
//!     let window = system.init("viewer", false);
//!
//!     let mut grid = create_level_set_sphere::<f32>(50.0, Vec3::new(1.5, 2.0, 3.0), 0.5, 4.0)?;
//!     grid.set_name("LevelSetSphere");
//!
//!     window.open();
//!     window.view(vec![grid.into_ptr()]);
//!     system.exit();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod foundation;
pub mod grid;
pub mod tools;
pub mod window;

pub use config::{Config, ConfigError, ViewerConfig};
pub use grid::{GridError, GridList, GridPtr};
pub use window::{GameWindow, WindowController, WindowError, WindowSystem};

/// Common imports for viewer users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ViewerConfig},
        foundation::math::{Vec3, Vec3d},
        grid::{
            Coord, FloatGrid, Grid, GridBase, GridClass, GridError, GridList, GridPtr, Int32Grid,
            MetaValue, Transform,
        },
        tools::{create_level_set_sphere, make_sphere, signed_flood_fill},
        window::{
            EventResponse, GameWindow, InputHandler, KeyAction, KeyCode, RenderModule, ViewState,
            WindowError, WindowEvent, WindowSystem,
        },
    };
}

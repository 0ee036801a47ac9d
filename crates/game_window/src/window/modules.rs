//! Extension points for input handling and rendering
//!
//! Applications register [`InputHandler`]s and [`RenderModule`]s with a
//! [`super::GameWindow`]. Handlers see every event after the built-in key
//! bindings have run; render modules are invoked on every redisplay.

use std::fmt;

use super::events::WindowEvent;
use crate::grid::{GridBase, GridPtr};

/// What an input handler wants done after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResponse {
    /// Nothing
    #[default]
    Ignored,
    /// Redraw the current grids
    Redisplay,
    /// Flag the window as should-close
    Close,
}

/// Receives window events
pub trait InputHandler: Send {
    /// Handle one event
    fn handle_event(&mut self, event: &WindowEvent) -> EventResponse;
}

impl<F> InputHandler for F
where
    F: FnMut(&WindowEvent) -> EventResponse + Send,
{
    fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        self(event)
    }
}

/// Draws the current view
pub trait RenderModule: Send {
    /// Render one frame
    fn render(&mut self, view: &ViewState<'_>);
}

/// Human-readable summary of a grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridInfo {
    /// Grid name, or `(unnamed)`
    pub name: String,
    /// Class and value type
    pub grid: String,
    /// Transform description
    pub transform: String,
    /// Voxel statistics and metadata
    pub tree: String,
}

impl GridInfo {
    /// Summarize a grid
    pub fn describe(grid: &dyn GridBase) -> Self {
        let name = if grid.name().is_empty() {
            "(unnamed)".to_string()
        } else {
            grid.name().to_string()
        };

        let mut tree = format!(
            "{} active voxels in {} leaves, bbox {}",
            grid.active_voxel_count(),
            grid.leaf_count(),
            grid.active_bounding_box()
        );
        if !grid.metadata().is_empty() {
            tree.push_str(&format!(", metadata {{{}}}", grid.metadata()));
        }

        Self {
            name,
            grid: format!("{} grid of {}", grid.grid_class(), grid.value_type()),
            transform: grid.transform().to_string(),
            tree,
        }
    }
}

impl fmt::Display for GridInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}; {}; {}", self.name, self.grid, self.transform, self.tree)
    }
}

/// Snapshot of viewer state handed to render modules
#[derive(Debug, Clone, Copy)]
pub struct ViewState<'a> {
    /// Grids being viewed
    pub grids: &'a [GridPtr],
    /// Index of the grid in focus
    pub grid_index: usize,
    /// Redisplays so far, including this one
    pub update: usize,
    /// Whether grid information should be shown
    pub show_info: bool,
    /// Accumulated vertical scroll
    pub wheel_position: i32,
    /// Window client size, if a window is open
    pub window_size: Option<(u32, u32)>,
    /// Summary of the grid in focus
    pub info: &'a GridInfo,
}

impl ViewState<'_> {
    /// Grid in focus
    pub fn current_grid(&self) -> Option<&GridPtr> {
        self.grids.get(self.grid_index)
    }
}

/// Logs the grid in focus on every redisplay while info display is on
#[derive(Debug, Default)]
pub struct InfoModule {
    last_update: Option<usize>,
}

impl InfoModule {
    /// Create the module
    pub const fn new() -> Self {
        Self { last_update: None }
    }
}

impl RenderModule for InfoModule {
    fn render(&mut self, view: &ViewState<'_>) {
        if self.last_update == Some(view.update) {
            return;
        }
        self.last_update = Some(view.update);

        if !view.show_info {
            return;
        }
        if view.grids.is_empty() {
            log::info!("[update {}] no grids to display", view.update);
            return;
        }
        log::info!(
            "[update {}] grid {}/{}: {}",
            view.update,
            view.grid_index + 1,
            view.grids.len(),
            view.info
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Coord, FloatGrid, GridClass};

    #[test]
    fn test_describe_grid() {
        let mut grid = FloatGrid::new(1.0);
        grid.set_grid_class(GridClass::LevelSet);
        grid.accessor().set_value(Coord::new(0, 0, 0), -0.5);
        grid.insert_meta("radius", 2.0_f32);

        let info = GridInfo::describe(&grid);
        assert_eq!(info.name, "(unnamed)");
        assert_eq!(info.grid, "level set grid of float");
        assert!(info.tree.starts_with("1 active voxels in 1 leaves"));
        assert!(info.tree.ends_with("metadata {radius: 2}"));
    }

    #[test]
    fn test_closure_input_handler() {
        let mut seen = 0;
        {
            let mut handler = |_: &WindowEvent| {
                seen += 1;
                EventResponse::Redisplay
            };
            assert_eq!(handler.handle_event(&WindowEvent::Refresh), EventResponse::Redisplay);
        }
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_current_grid() {
        let grids = vec![FloatGrid::default().into_ptr()];
        let info = GridInfo::default();
        let state = ViewState {
            grids: &grids,
            grid_index: 0,
            update: 1,
            show_info: false,
            wheel_position: 0,
            window_size: None,
            info: &info,
        };
        assert!(state.current_grid().is_some());
        let state = ViewState { grid_index: 1, ..state };
        assert!(state.current_grid().is_none());
    }
}

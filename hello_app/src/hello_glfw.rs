//! Bare window that logs key presses until Escape

use std::process::ExitCode;

use game_window::prelude::*;

fn main() -> ExitCode {
    hello_app::run_with(
        |config| {
            config.window.title = "Hello GLFW".to_string();
            config.show_info = false;
        },
        |window| {
            window.add_input_handler(|event: &WindowEvent| {
                if let WindowEvent::Key { key, action: KeyAction::Press, .. } = event {
                    log::info!("key pressed: {key:?}");
                }
                EventResponse::Ignored
            });

            if !window.open_with_size(800, 600) {
                return Err(WindowError::CreationFailed.into());
            }
            // Escape is handled by the viewer itself.
            window.view(GridList::new());
            while window.is_background() && window.is_open() {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            Ok(())
        },
    )
}

//! Level set sphere built in world units

use std::process::ExitCode;

use game_window::prelude::*;

fn main() -> ExitCode {
    hello_app::run(|window| {
        let mut grid = create_level_set_sphere::<f32>(50.0, Vec3::new(1.5, 2.0, 3.0), 0.5, 4.0)?;
        grid.insert_meta("radius", 50.0_f32);
        grid.set_name("LevelSetSphere");

        hello_app::show(window, vec![grid.into_ptr()])
    })
}

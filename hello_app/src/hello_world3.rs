//! Integer grid filled through an accessor

use std::process::ExitCode;

use game_window::prelude::*;

const CUBE_SIZE: i32 = 8;

fn main() -> ExitCode {
    hello_app::run(|window| {
        let mut grid = Int32Grid::default();
        {
            let mut accessor = grid.accessor();
            for i in 0..CUBE_SIZE {
                for j in 0..CUBE_SIZE {
                    for k in 0..CUBE_SIZE {
                        accessor.set_value(Coord::new(i, j, k), 1);
                    }
                }
            }
        }
        grid.set_grid_class(GridClass::LevelSet);
        grid.set_name("Cube");

        hello_app::show(window, vec![grid.into_ptr()])
    })
}

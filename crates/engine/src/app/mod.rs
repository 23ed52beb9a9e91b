mod game;
mod input;
mod loop_runner;
mod rendering;

pub use game::Game;
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{RenderError, Renderer, Viewport};

mod renderer;

pub use renderer::{RenderError, Renderer, Viewport};

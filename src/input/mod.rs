mod handler;

pub use handler::{InputEvent, InputHandler};

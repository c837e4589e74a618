pub mod chat;
pub mod image;
pub mod prompt;

pub use chat::*;
pub use image::*;
pub use prompt::*;

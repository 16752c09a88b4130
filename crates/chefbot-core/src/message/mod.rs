mod content;
mod message;

pub use content::*;
pub use message::{Message, Role};

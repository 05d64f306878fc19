pub mod handlers;
pub mod keysyms;

pub use handlers::{Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding};

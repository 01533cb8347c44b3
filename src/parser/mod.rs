//! ANSI art escape sequence parser
//!
//! A stateful parser that converts CP437 bytes into screen actions.

mod action;
mod state;

pub use action::{Action, ControlCode, CsiAction};
pub use state::Parser;

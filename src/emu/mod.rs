mod chip8;
mod execute;
mod font;
mod framebuffer;
mod keypad;
mod opcode;
mod runner;
mod types;

pub use chip8::*;
pub use font::*;
pub use framebuffer::*;
pub use keypad::*;
pub use opcode::*;
pub use runner::*;
pub use types::*;

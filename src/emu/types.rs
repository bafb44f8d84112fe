/// Outcome of a single CPU step or frame cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chip8Result {
    /// An instruction was executed and the program counter moved.
    Continue,
    /// Fx0A found no pending key press; the same instruction runs again next step.
    WaitingForKey,
    /// The core is paused and no instruction was executed.
    Paused,
    /// No whole frame elapsed, so nothing ran. Only returned by `Chip8Runner::update`.
    Idle,
}

/// Fatal errors raised while loading or executing a program.
///
/// Every execution error pauses the core; only a new `load` clears it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("Stack overflow: attempted to call a subroutine with a full call stack")]
    StackOverflow,

    #[error("Stack underflow: attempted to return from a subroutine with empty call stack")]
    StackUnderflow,

    #[error("Invalid font digit {digit:#04X}, expected 0x0-0xF")]
    InvalidFontDigit { digit: u8 },

    #[error("Unknown instruction: {opcode:#06X}")]
    UnknownInstruction { opcode: u16 },
}

/// Category of a [`Chip8Error`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatalReason {
    RomTooLarge,
    MemoryOutOfBounds,
    StackOverflow,
    StackUnderflow,
    InvalidFontDigit,
    UnknownInstruction,
}

impl Chip8Error {
    pub fn reason(&self) -> FatalReason {
        match self {
            Chip8Error::RomTooLarge { .. } => FatalReason::RomTooLarge,
            Chip8Error::MemoryOutOfBounds { .. } => FatalReason::MemoryOutOfBounds,
            Chip8Error::StackOverflow => FatalReason::StackOverflow,
            Chip8Error::StackUnderflow => FatalReason::StackUnderflow,
            Chip8Error::InvalidFontDigit { .. } => FatalReason::InvalidFontDigit,
            Chip8Error::UnknownInstruction { .. } => FatalReason::UnknownInstruction,
        }
    }
}

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// A type alias for the CHIP-8 display buffer representation
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];

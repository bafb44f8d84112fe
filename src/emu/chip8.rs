use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, error, trace};

use super::{
    Chip8Error, Chip8Result, FONT, FONT_END_ADDRESS, FONT_START_ADDRESS, Framebuffer, Keypad,
    Opcode,
};
use crate::u4;

// Fixed by the CHIP-8 memory map
pub const ROM_START_ADDRESS: usize = 0x200;
pub const MEMORY_SIZE: usize = 4096;
pub const STACK_SIZE: usize = 16;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 5;

/// CHIP-8 virtual machine state
pub struct Chip8 {
    /// 4KB memory array
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// Display buffer: 64x32 monochrome pixels
    pub(crate) framebuffer: Framebuffer,

    /// Program counter: address of the next instruction to execute
    pub(crate) pc: u16,
    /// Index register: used for memory operations
    pub(crate) i: u16,
    /// General-purpose registers V0-VF (VF is used as a flag register)
    pub(crate) v: [u8; 16],
    /// Return addresses, valid up to `stack_len`
    pub(crate) stack: [u16; STACK_SIZE],
    pub(crate) stack_len: usize,

    pub(crate) delay_timer: u8,
    /// Beeps while non-zero
    pub(crate) sound_timer: u8,

    pub(crate) keypad: Keypad,
    /// Set by any fatal error, cleared only by `load`
    pub(crate) paused: bool,

    /// Frames between timer ticks, kept across loads
    speed: u8,
    frame_counter: u8,

    pub(crate) rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a machine whose Cxnn results are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut chip8 = Chip8 {
            memory: [0; MEMORY_SIZE],
            framebuffer: Framebuffer::new(),
            pc: ROM_START_ADDRESS as u16,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_SIZE],
            stack_len: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: Keypad::new(),
            paused: false,
            speed: MIN_SPEED,
            frame_counter: 0,
            rng,
        };
        chip8.reset();
        chip8
    }

    /// Resets all machine state except speed and installs the font set.
    fn reset(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);
        self.framebuffer = Framebuffer::new();
        self.pc = ROM_START_ADDRESS as u16;
        self.i = 0;
        self.v = [0; 16];
        self.stack = [0; STACK_SIZE];
        self.stack_len = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.keypad = Keypad::new();
        self.paused = false;
        self.frame_counter = 0;
    }

    /// Resets the machine and loads a ROM at 0x200.
    ///
    /// An oversized ROM is rejected before anything is reset.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        let max_size = MEMORY_SIZE - ROM_START_ADDRESS;
        if rom.len() > max_size {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max_size,
            });
        }

        self.reset();
        self.memory[ROM_START_ADDRESS..ROM_START_ADDRESS + rom.len()].copy_from_slice(rom);
        debug!("Loaded {} byte ROM at {ROM_START_ADDRESS:#05X}", rom.len());

        Ok(())
    }

    /// Advances one host frame.
    ///
    /// Ticks the timers once every `speed` frames, then runs at most one
    /// instruction unless the machine is paused.
    pub fn cycle(&mut self) -> Result<Chip8Result, Chip8Error> {
        self.frame_counter += 1;
        if self.frame_counter >= self.speed {
            self.frame_counter = 0;
            self.timers_cycle();
        }

        self.step()
    }

    /// Executes a single instruction (fetch, decode, execute).
    ///
    /// A fatal error pauses the machine before it is returned. The failing
    /// instruction leaves memory, registers and PC untouched.
    pub fn step(&mut self) -> Result<Chip8Result, Chip8Error> {
        if self.paused {
            return Ok(Chip8Result::Paused);
        }

        let pc = self.pc;
        let result = self
            .fetch()
            .and_then(|opcode| self.execute(Opcode::decode(opcode)));

        if let Err(e) = &result {
            self.pc = pc;
            self.paused = true;
            error!("Pausing at PC {pc:#06X}: {e}");
        }

        result
    }

    /// Updates the delay and sound timers.
    pub fn timers_cycle(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Returns true if the sound timer is greater than zero, indicating a beep should be played.
    pub fn has_sound(&self) -> bool {
        self.sound_timer > 0
    }

    /// Press a key on the keypad. Indices past 0xF are ignored.
    pub fn press_key(&mut self, index: u8) {
        if let Ok(key) = u4::try_from(index) {
            self.keypad.press(key);
        }
    }

    /// Release a key on the keypad. Indices past 0xF are ignored.
    pub fn release_key(&mut self, index: u8) {
        if let Ok(key) = u4::try_from(index) {
            self.keypad.release(key);
        }
    }

    pub fn speed_up(&mut self) {
        self.set_speed(self.speed.saturating_add(1));
    }

    pub fn speed_down(&mut self) {
        self.set_speed(self.speed.saturating_sub(1));
    }

    /// Sets the number of frames per timer tick, clamped to 1-5.
    pub fn set_speed(&mut self, speed: u8) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        debug!("Speed set to {}", self.speed);
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    /// Stack pointer: index of the top return address, -1 when empty.
    pub fn sp(&self) -> i8 {
        self.stack_len as i8 - 1
    }

    /// Return addresses currently on the stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_len]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// One-line register dump for diagnostics.
    pub fn debug_state(&self) -> String {
        let v = self
            .v
            .iter()
            .map(|r| format!("{r:02X}"))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "V: {v} PC: {:#06X} SP: {} I: {:#06X} ST: {}",
            self.pc,
            self.sp(),
            self.i,
            self.sound_timer
        )
    }

    /// Fetches the next 16-bit opcode from memory.
    fn fetch(&mut self) -> Result<u16, Chip8Error> {
        let high = *self.mem_get(self.pc)?;
        let low = *self.mem_get(self.pc.wrapping_add(1))?;
        let opcode = u16::from_be_bytes([high, low]);

        trace!("{:#06X}: {opcode:04X}", self.pc);
        Ok(opcode)
    }

    /// Helper to get a mutable reference to a memory location with bounds checking.
    pub(crate) fn mem_get(&mut self, addr: u16) -> Result<&mut u8, Chip8Error> {
        self.memory
            .get_mut(addr as usize)
            .ok_or(Chip8Error::MemoryOutOfBounds { address: addr })
    }

    /// Checks that `len` bytes starting at `start` all lie in memory.
    pub(crate) fn check_range(&self, start: u16, len: usize) -> Result<(), Chip8Error> {
        if start as usize + len > MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds { address: start });
        }
        Ok(())
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

use tracing::warn;

use super::{Chip8, Chip8Error, Chip8Result, Framebuffer};

pub const FRAME_HZ: f32 = 60.0;
pub const FRAME_TIME_STEP: f32 = 1.0 / FRAME_HZ;

/// Frames run in one `update` before the backlog is dropped.
const MAX_FRAMES_PER_UPDATE: u32 = 8;

/// Drives a `Chip8` from wall-clock time, one `cycle` per elapsed display frame.
pub struct Chip8Runner {
    chip8: Chip8,
    frame_dt_accumulator: f32,
    frames: u64,
}

impl Chip8Runner {
    pub fn new(chip8: Chip8) -> Self {
        Self {
            chip8,
            frame_dt_accumulator: 0.0,
            frames: 0,
        }
    }

    /// Update emulator by delta time.
    ///
    /// Runs one frame cycle per whole frame contained in the accumulated time
    /// and returns the result of the last one, or `Idle` (`Paused` if the core
    /// is paused) when no frame elapsed. Stops at the first fatal error.
    pub fn update(&mut self, dt: f32) -> Result<Chip8Result, Chip8Error> {
        self.frame_dt_accumulator += dt;

        let mut result = if self.chip8.is_paused() {
            Chip8Result::Paused
        } else {
            Chip8Result::Idle
        };

        let mut ran = 0;
        while self.frame_dt_accumulator >= FRAME_TIME_STEP {
            if ran == MAX_FRAMES_PER_UPDATE {
                // Don't try to catch up after a long stall
                warn!("Dropping {:.3}s of frame backlog", self.frame_dt_accumulator);
                self.frame_dt_accumulator = 0.0;
                break;
            }

            self.frame_dt_accumulator -= FRAME_TIME_STEP;
            result = self.run_frame()?;
            ran += 1;
        }

        Ok(result)
    }

    /// Runs exactly one frame cycle regardless of elapsed time.
    pub fn run_frame(&mut self) -> Result<Chip8Result, Chip8Error> {
        self.frames += 1;
        self.chip8.cycle()
    }

    /// Number of frame cycles run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Returns true if the sound timer is active, indicating a beep should be played.
    pub fn has_sound(&self) -> bool {
        self.chip8.has_sound()
    }

    pub fn press_key(&mut self, index: u8) {
        self.chip8.press_key(index)
    }

    pub fn release_key(&mut self, index: u8) {
        self.chip8.release_key(index)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.chip8.framebuffer()
    }

    pub fn chip8_ref(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(rom: &[u8]) -> Chip8Runner {
        let mut chip8 = Chip8::with_seed(1);
        chip8.load(rom).unwrap();
        Chip8Runner::new(chip8)
    }

    #[test]
    fn runs_one_cycle_per_elapsed_frame() {
        // 7001 repeated: V0 += 1
        let mut runner = runner(&[0x70, 0x01].repeat(16));

        assert_eq!(runner.update(FRAME_TIME_STEP * 0.5), Ok(Chip8Result::Idle));
        assert_eq!(runner.frames(), 0);

        assert_eq!(runner.update(FRAME_TIME_STEP * 3.0), Ok(Chip8Result::Continue));
        assert_eq!(runner.frames(), 3);
        assert_eq!(runner.chip8_ref().v()[0], 3);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut runner = runner(&[0x12, 0x00]);

        runner.update(10.0).unwrap();
        assert_eq!(runner.frames(), MAX_FRAMES_PER_UPDATE as u64);

        runner.update(0.0).unwrap();
        assert_eq!(runner.frames(), MAX_FRAMES_PER_UPDATE as u64);
    }

    #[test]
    fn stops_on_fatal_error() {
        let mut runner = runner(&[0x00, 0xEE]);

        let err = runner.update(FRAME_TIME_STEP * 4.0).unwrap_err();
        assert_eq!(err, Chip8Error::StackUnderflow);
        assert_eq!(runner.frames(), 1);
        assert!(runner.chip8_ref().is_paused());

        assert_eq!(runner.update(FRAME_TIME_STEP).unwrap(), Chip8Result::Paused);
    }
}

use rand::Rng;

use super::{
    Chip8, Chip8Error, Chip8Result, FONT_GLYPH_SIZE, FONT_START_ADDRESS, Opcode, OpcodeALU,
    STACK_SIZE,
};
use crate::u4;

impl Chip8 {
    /// Runs one decoded instruction.
    ///
    /// PC is advanced past the instruction first; jumps overwrite it, skips
    /// add another 2, and a stalled Fx0A rewinds it.
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<Chip8Result, Chip8Error> {
        self.pc = self.pc.wrapping_add(2);

        match opcode {
            Opcode::ClearDisplay => {
                self.framebuffer.clear();
            }
            Opcode::Sys { nnn } | Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::JumpWithOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Opcode::Call { nnn } => {
                if self.stack_len == STACK_SIZE {
                    return Err(Chip8Error::StackOverflow);
                }
                self.stack[self.stack_len] = self.pc;
                self.stack_len += 1;
                self.pc = nnn;
            }
            Opcode::Return => {
                if self.stack_len == 0 {
                    return Err(Chip8Error::StackUnderflow);
                }
                self.stack_len -= 1;
                self.pc = self.stack[self.stack_len];
            }
            Opcode::SkipRegEqualImm { x, nn } => {
                if self.v[x] == nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipRegNotEqualImm { x, nn } => {
                if self.v[x] != nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipRegEqualReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipRegNotEqualReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SetRegImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddRegImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::ALU { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndexReg { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n)?;
            }
            Opcode::SkipIfPressed { x } => {
                if self.keypad.is_pressed(self.v[x]) {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SkipIfNotPressed { x } => {
                if !self.keypad.is_pressed(self.v[x]) {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::WaitForKey { x } => {
                return Ok(self.execute_wait_for_key(x));
            }
            Opcode::ReadDelayTimer { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::SetDelayTimer { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::SetSoundTimer { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::FontChar { x } => {
                let digit = self.v[x];
                if digit > 0x0F {
                    return Err(Chip8Error::InvalidFontDigit { digit });
                }
                self.i = (FONT_START_ADDRESS + digit as usize * FONT_GLYPH_SIZE) as u16;
            }
            Opcode::BCD { x } => {
                self.check_range(self.i, 3)?;

                let value = self.v[x];
                let base = self.i as usize;
                self.memory[base] = value / 100;
                self.memory[base + 1] = (value / 10) % 10;
                self.memory[base + 2] = value % 10;
            }
            Opcode::StoreRegs { x } => {
                let count = usize::from(x) + 1;
                self.check_range(self.i, count)?;

                let base = self.i as usize;
                self.memory[base..base + count].copy_from_slice(&self.v[..count]);
            }
            Opcode::LoadRegs { x } => {
                let count = usize::from(x) + 1;
                self.check_range(self.i, count)?;

                let base = self.i as usize;
                self.v[..count].copy_from_slice(&self.memory[base..base + count]);
            }
            Opcode::Unknown(opcode) => {
                return Err(Chip8Error::UnknownInstruction { opcode });
            }
        };

        Ok(Chip8Result::Continue)
    }

    /// ADD writes its carry after the result; SUB, SUBN and the shifts write
    /// the flag first, so with VF as the destination those keep the result.
    fn execute_alu(&mut self, x: u4, y: u4, op: OpcodeALU) {
        match op {
            OpcodeALU::Set => self.v[x] = self.v[y],
            OpcodeALU::Or => self.v[x] |= self.v[y],
            OpcodeALU::And => self.v[x] &= self.v[y],
            OpcodeALU::Xor => self.v[x] ^= self.v[y],
            OpcodeALU::Add => {
                let (res, overflow) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = overflow.into();
            }
            OpcodeALU::Sub => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[0xF] = (vx > vy).into();
                self.v[x] = vx.wrapping_sub(vy);
            }
            OpcodeALU::SubReverse => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[0xF] = (vy > vx).into();
                self.v[x] = vy.wrapping_sub(vx);
            }
            OpcodeALU::ShiftRight => {
                let vx = self.v[x];
                self.v[0xF] = vx & 1;
                self.v[x] = vx >> 1;
            }
            OpcodeALU::ShiftLeft => {
                let vx = self.v[x];
                self.v[0xF] = (vx >> 7) & 1;
                self.v[x] = vx << 1;
            }
        }
    }

    /// Vx and Vy are read per pixel after VF is cleared, so a sprite
    /// positioned by VF moves as collisions set it.
    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Result<(), Chip8Error> {
        let rows = usize::from(n);
        self.check_range(self.i, rows)?;

        let base = self.i as usize;
        self.v[0xF] = 0;

        for row in 0..rows {
            let sprite_byte = self.memory[base + row];

            for col in 0..8 {
                let bit = (sprite_byte >> (7 - col)) & 1;
                let x_pos = self.v[x] as usize + col;
                let y_pos = self.v[y] as usize + row;

                // Coordinates wrap inside draw_pixel
                if self.framebuffer.draw_pixel(x_pos, y_pos, bit) {
                    self.v[0xF] = 1;
                }
            }
        }

        Ok(())
    }

    fn execute_wait_for_key(&mut self, x: u4) -> Chip8Result {
        match self.keypad.consume_pending_press() {
            Some(key) => {
                self.v[x] = key.into();
                Chip8Result::Continue
            }
            None => {
                // Repeat this instruction until a key is pressed
                self.pc = self.pc.wrapping_sub(2);
                Chip8Result::WaitingForKey
            }
        }
    }
}

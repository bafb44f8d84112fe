use super::{DISPLAY_X, DISPLAY_Y, Display};

/// 64x32 monochrome display, one byte per cell (0 = off, 1 = on), row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    cells: Display<u8>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            cells: [[0; DISPLAY_X]; DISPLAY_Y],
        }
    }

    /// XORs `value` into the cell at (`x`, `y`) and returns true if a lit
    /// pixel was erased.
    ///
    /// Coordinates wrap around the display edges.
    pub fn draw_pixel(&mut self, x: usize, y: usize, value: u8) -> bool {
        let value = value & 1;
        let cell = &mut self.cells[y % DISPLAY_Y][x % DISPLAY_X];

        let collision = *cell & value == 1;
        *cell ^= value;

        collision
    }

    pub fn clear(&mut self) {
        self.cells = [[0; DISPLAY_X]; DISPLAY_Y];
    }

    /// Read-only view of all cells, indexed `[y][x]`.
    pub fn cells(&self) -> &Display<u8> {
        &self.cells
    }

    /// Get the state of a pixel on the display (true = on, false = off).
    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.cells[y][x] != 0
    }

    /// Renders the display as text, one line per row.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((DISPLAY_X + 1) * DISPLAY_Y);
        for row in &self.cells {
            out.extend(row.iter().map(|&c| if c != 0 { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

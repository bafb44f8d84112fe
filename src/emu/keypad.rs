use crate::u4;

/// State of the 16-key hex keypad.
///
/// Besides the currently held keys, the keypad remembers the most recent
/// press until it is consumed by Fx0A.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    /// One bit per key, set while held.
    held: u16,
    pending: Option<u4>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as held and records it as the pending press.
    pub fn press(&mut self, key: u4) {
        self.held |= 1 << u8::from(key);
        self.pending = Some(key);
    }

    /// Marks `key` as released. Other keys and the pending press are untouched.
    pub fn release(&mut self, key: u4) {
        self.held &= !(1 << u8::from(key));
    }

    /// Releases every key and drops the pending press.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns whether the key at `index` is held. Indices past 0xF are never held.
    pub fn is_pressed(&self, index: u8) -> bool {
        index <= 0x0F && self.held & (1 << index) != 0
    }

    /// Returns the last press since the previous call, clearing it.
    pub fn consume_pending_press(&mut self) -> Option<u4> {
        self.pending.take()
    }

    pub fn held_mask(&self) -> u16 {
        self.held
    }
}

//! Rabin-Karp rolling hash over a fixed window.

/// Width of the rolling-hash window in bytes.
pub const WINDOW_SIZE: usize = 48;

/// Odd polynomial base. All arithmetic is modulo 2^64.
const MULTIPLIER: u64 = 0x9e37_79b9_7f4a_7c15;

/// `MULTIPLIER^(WINDOW_SIZE - 1)`, the weight of the byte leaving the window.
const LEAVING_WEIGHT: u64 = pow_multiplier(WINDOW_SIZE as u32 - 1);

const fn pow_multiplier(exp: u32) -> u64 {
    let mut acc = 1u64;
    let mut i = 0;
    while i < exp {
        acc = acc.wrapping_mul(MULTIPLIER);
        i += 1;
    }
    acc
}

/// Rabin-Karp rolling hash over the last [`WINDOW_SIZE`] bytes of a stream.
///
/// The hash of a window `w_0 .. w_{n-1}` (oldest first) is
/// `sum(w_i * MULTIPLIER^(n-1-i)) mod 2^64`. The window starts out as all
/// zeros, which is equivalent to hashing a zero-padded prefix: the hash
/// after the first byte is already well-defined.
///
/// The state is never reset at chunk boundaries — a boundary decision
/// depends only on the window content, which is what lets boundaries
/// re-synchronize after an edit.
#[derive(Debug, Clone)]
pub struct RollingHash {
    window: [u8; WINDOW_SIZE],
    pos: usize,
    hash: u64,
}

impl RollingHash {
    /// Create a hash with an all-zero window.
    pub fn new() -> Self {
        Self {
            window: [0u8; WINDOW_SIZE],
            pos: 0,
            hash: 0,
        }
    }

    /// Slide the window one byte forward and return the updated hash.
    #[inline]
    pub fn push(&mut self, byte: u8) -> u64 {
        let leaving = u64::from(self.window[self.pos]);
        self.hash = self
            .hash
            .wrapping_sub(leaving.wrapping_mul(LEAVING_WEIGHT))
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(u64::from(byte));
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) % WINDOW_SIZE;
        self.hash
    }

    /// The hash of the current window.
    pub fn value(&self) -> u64 {
        self.hash
    }
}

impl Default for RollingHash {
    fn default() -> Self {
        Self::new()
    }
}

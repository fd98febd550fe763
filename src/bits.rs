//! MSB-first bit packing

use alloc::vec::Vec;

/// Destination of a packed bitstream
pub trait BitSink {
    /// Appends the low `count` bits of `value`, most significant bit first.
    ///
    /// `count` must not exceed 128.
    fn put_bits(&mut self, value: u128, count: u32);
}

/// Origin of a packed bitstream
pub trait BitSource {
    /// Reads `count` bits, most significant bit first.
    ///
    /// Returns `None` without consuming anything if fewer than `count` bits remain.
    fn read_bits(&mut self, count: u32) -> Option<u128>;

    /// Number of meaningful bits not yet read
    fn remaining(&self) -> usize;
}

/// Packed bytes plus the exact number of meaningful bits in them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuf {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitBuf {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Zero bits appended to reach the byte boundary
    #[inline]
    pub fn padding_bits(&self) -> usize {
        self.bytes.len() * 8 - self.bit_len
    }

    /// Byte-aligned form, as stored in a file
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    #[inline]
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit_len: 0,
        }
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    #[inline]
    fn push_bit(&mut self, bit: bool) {
        let shift = self.bit_len & 7;
        if shift == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> shift;
            }
        }
        self.bit_len += 1;
    }

    /// The unused low bits of the last byte are left zero.
    #[inline]
    pub fn finish(self) -> BitBuf {
        BitBuf {
            bytes: self.bytes,
            bit_len: self.bit_len,
        }
    }
}

impl BitSink for BitWriter {
    fn put_bits(&mut self, value: u128, count: u32) {
        debug_assert!(count <= 128);
        debug_assert!(count == 128 || value >> count == 0);
        for i in (0..count).rev() {
            self.push_bit((value >> i) & 1 != 0);
        }
    }
}

pub struct BitReader<'a> {
    data: &'a [u8],
    bit_len: usize,
    cursor: usize,
}

impl<'a> BitReader<'a> {
    /// Returns `None` if `bit_len` exceeds the bits available in `data`.
    #[inline]
    pub fn new(data: &'a [u8], bit_len: usize) -> Option<Self> {
        if bit_len > data.len().checked_mul(8)? {
            return None;
        }
        Some(Self {
            data,
            bit_len,
            cursor: 0,
        })
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.bit_len
    }

    /// Whether every bit left in the stream is zero
    pub fn rest_is_zero(&self) -> bool {
        (self.cursor..self.bit_len).all(|pos| !self.bit_at(pos))
    }

    #[inline]
    fn bit_at(&self, pos: usize) -> bool {
        self.data[pos >> 3] & (0x80 >> (pos & 7)) != 0
    }
}

impl BitSource for BitReader<'_> {
    fn read_bits(&mut self, count: u32) -> Option<u128> {
        if count > 128 || self.remaining() < count as usize {
            return None;
        }
        let mut value = 0u128;
        for _ in 0..count {
            value = (value << 1) | self.bit_at(self.cursor) as u128;
            self.cursor += 1;
        }
        Some(value)
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.bit_len - self.cursor
    }
}

use std::{fmt::Display, mem};

use num_traits::PrimInt;

// Bit stream
//------------------------------------------------------------------------------

/// Append only, MSB first bit buffer with a capacity fixed at construction.
#[derive(Debug, Clone)]
pub struct BitStream {
    data: Vec<u8>,
    // Bit length
    len: usize,
    // Max bit capacity
    capacity: usize,
}

impl BitStream {
    pub fn new(capacity: usize) -> Self {
        Self { data: vec![0; (capacity + 7) >> 3], len: 0, capacity }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.len
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..(self.len + 7) >> 3]
    }
}

// Push bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    /// Appends the low `size` bits of `bits`, most significant first.
    pub fn push_bits<T>(&mut self, bits: T, size: usize)
    where
        T: PrimInt + Display,
    {
        let max_bits = mem::size_of::<T>() * 8;
        debug_assert!(size <= max_bits, "Bit count exceeds type width: Size {size}");
        debug_assert!(
            size >= max_bits - bits.leading_zeros() as usize,
            "Bit count shouldn't exceed bit length: Length {size}, Bits {bits}"
        );
        debug_assert!(
            self.len + size <= self.capacity,
            "Insufficient capacity: Capacity {}, Size {}",
            self.capacity,
            self.len + size
        );

        for i in (0..size).rev() {
            self.push((bits >> i) & T::one() == T::one());
        }
    }

    pub fn push(&mut self, bit: bool) {
        debug_assert!(
            self.len < self.capacity,
            "Insufficient capacity: Capacity {}, Size {}",
            self.capacity,
            self.len + 1
        );

        if bit {
            let offset = self.len & 7;
            let pos = self.len >> 3;
            self.data[pos] |= 0b10000000 >> offset;
        }

        self.len += 1;
    }

    /// Moves the cursor to the start of the next byte. Skipped bits stay zero.
    pub fn align_to_byte(&mut self) {
        let offset = self.len & 7;
        if offset > 0 {
            debug_assert!(
                self.len + 8 - offset <= self.capacity,
                "Alignment overflows capacity: Capacity {}, Size {}",
                self.capacity,
                self.len + 8 - offset
            );
            self.len += 8 - offset;
        }
    }

    /// Bits written so far, MSB first per byte.
    #[cfg(test)]
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| (self.data[i >> 3] << (i & 7)) & 0b10000000 != 0)
    }
}

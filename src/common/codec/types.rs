use crate::common::metadata::Version;

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
}

impl Mode {
    /// Narrowest mode able to carry every byte of `data`. Stops scanning as soon as a byte
    /// outside the alphanumeric set is seen.
    pub fn classify(data: &[u8]) -> Mode {
        let mut numeric = true;
        for &b in data {
            if !Self::Alphanumeric.contains(b) {
                return Self::Byte;
            }
            numeric &= Self::Numeric.contains(b);
        }
        if numeric {
            Self::Numeric
        } else {
            Self::Alphanumeric
        }
    }

    #[inline]
    fn numeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Numeric.contains(char), "Invalid numeric data: {char}");
        (char - b'0') as u16
    }

    #[inline]
    fn alphanumeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Alphanumeric.contains(char), "Invalid alphanumeric data: {char}");
        match char {
            b'0'..=b'9' => (char - b'0') as u16,
            b'A'..=b'Z' => (char - b'A' + 10) as u16,
            b' ' => 36,
            b'$' => 37,
            b'%' => 38,
            b'*' => 39,
            b'+' => 40,
            b'-' => 41,
            b'.' => 42,
            b'/' => 43,
            b':' => 44,
            _ => unreachable!("Invalid alphanumeric {char}"),
        }
    }

    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let len = data.len();
        match self {
            Self::Numeric => {
                debug_assert!(len <= 3, "Data is too long for numeric conver: {len}");
                data.iter().fold(0_u16, |n, b| n * 10 + Self::numeric_digit(*b))
            }
            Self::Alphanumeric => {
                debug_assert!(len <= 2, "Data is too long for alphanumeric conver: {len}");
                data.iter().fold(0_u16, |n, b| n * 45 + Self::alphanumeric_digit(*b))
            }
            Self::Byte => {
                debug_assert!(len == 1, "Data is too long for byte conver: {len}");
                data[0] as u16
            }
        }
    }

    pub fn contains(&self, byte: u8) -> bool {
        match self {
            Self::Numeric => byte.is_ascii_digit(),
            Self::Alphanumeric => matches!(
                byte,
                b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':'
            ),
            Self::Byte => true,
        }
    }

    // Bits taken by `len` characters excluding the header
    pub fn encoded_len(&self, len: usize) -> usize {
        match *self {
            Self::Numeric => (len * 10).div_ceil(3),
            Self::Alphanumeric => (len * 11).div_ceil(2),
            Self::Byte => len * 8,
        }
    }
}


// Segment
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Segment<'a> {
    pub mode: Mode,
    pub mode_bits: usize,
    pub len_bits: usize,
    pub data: &'a [u8],
}

impl<'a> Segment<'a> {
    pub fn new(mode: Mode, ver: Version, data: &'a [u8]) -> Self {
        Self { mode, mode_bits: ver.mode_bits(), len_bits: ver.char_cnt_bits(mode), data }
    }

    pub fn bit_len(&self) -> usize {
        self.mode_bits + self.len_bits + self.mode.encoded_len(self.data.len())
    }
}

#[cfg(test)]
mod segment_tests {
    use super::{Mode, Segment};
    use crate::common::metadata::Version;

    #[test]
    fn test_bit_len() {
        let seg = Segment::new(Mode::Alphanumeric, Version(1), b"HELLO WORLD");
        assert_eq!(seg.bit_len(), 4 + 9 + 61);
        let seg = Segment::new(Mode::Byte, Version(10), b"hello");
        assert_eq!(seg.bit_len(), 4 + 16 + 40);
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

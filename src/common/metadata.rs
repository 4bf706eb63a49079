use std::ops::Deref;

use super::codec::Mode;
use super::error::{QRError, QRResult};
use super::mask::MaskPattern;

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct Version(pub(crate) usize);

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Version {
    pub const MAX: Version = Version(40);

    pub fn new(ver: usize) -> QRResult<Self> {
        if (1..=40).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(QRError::InvalidVersion)
        }
    }

    pub fn all() -> impl Iterator<Item = Version> {
        (1..=40).map(Version)
    }

    pub const fn width(self) -> usize {
        (self.0 - 1) * 4 + 21
    }

    pub fn alignment_pattern(self) -> &'static [usize] {
        ALIGNMENT_PATTERN_POSITIONS[self.0 - 1]
    }

    /// Number of modules available for codewords and remainder bits once every function
    /// pattern, format area and version area has been taken out.
    pub const fn raw_data_modules(self) -> usize {
        let v = self.0;
        let mut res = (16 * v + 128) * v + 64;
        if v >= 2 {
            let align = v / 7 + 2;
            res -= (25 * align - 10) * align - 55;
            if v >= 7 {
                res -= 36;
            }
        }
        res
    }

    pub const fn total_codewords(self) -> usize {
        self.raw_data_modules() >> 3
    }

    pub const fn remainder_bits(self) -> usize {
        self.raw_data_modules() & 7
    }

    pub fn ecc_per_block(self, ecl: ECLevel) -> usize {
        ECC_CODEWORDS_PER_BLOCK[ecl as usize][self.0] as usize
    }

    pub fn block_count(self, ecl: ECLevel) -> usize {
        NUM_ERROR_CORRECTION_BLOCKS[ecl as usize][self.0] as usize
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        self.total_codewords() - self.ecc_per_block(ecl) * self.block_count(ecl)
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        self.data_codewords(ecl) << 3
    }

    /// Data codewords per block as `(block1_size, block1_count, block2_size, block2_count)`.
    /// Group 2 blocks hold exactly one more codeword than group 1 blocks; when every block
    /// has the same length `block2_size` and `block2_count` are both zero.
    pub fn data_codewords_per_block(self, ecl: ECLevel) -> (usize, usize, usize, usize) {
        let total = self.total_codewords();
        let blocks = self.block_count(ecl);
        let ecc = self.ecc_per_block(ecl);

        let block2_count = total % blocks;
        let block1_count = blocks - block2_count;
        let block1_size = total / blocks - ecc;
        let block2_size = if block2_count > 0 { block1_size + 1 } else { 0 };

        (block1_size, block1_count, block2_size, block2_count)
    }

    pub const fn mode_bits(self) -> usize {
        4
    }

    pub fn char_cnt_bits(self, mode: Mode) -> usize {
        match (mode, self.0) {
            (Mode::Numeric, 1..=9) => 10,
            (Mode::Alphanumeric, 1..=9) => 9,
            (Mode::Byte, 1..=9) => 8,
            (Mode::Numeric, 10..=26) => 12,
            (Mode::Alphanumeric, 10..=26) => 11,
            (Mode::Byte, 10..=26) => 16,
            (Mode::Numeric, _) => 14,
            (Mode::Alphanumeric, _) => 13,
            (Mode::Byte, _) => 16,
        }
    }

    /// BCH(18, 6) protected version information, only drawn for versions 7 and above.
    pub fn info(self) -> u32 {
        debug_assert!(self.0 >= 7, "Version info is only defined from version 7: {}", self.0);

        let ver = self.0 as u32;
        let mut rem = ver;
        for _ in 0..12 {
            rem = (rem << 1) ^ ((rem >> 11) * VERSION_INFO_GENERATOR);
        }
        (ver << 12) | rem
    }
}

// Error correction level
//------------------------------------------------------------------------------

/// Error correction level. Recovers roughly 7%, 15%, 25% and 30% of damaged codewords
/// respectively.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    // Two bit indicator used inside the format information
    const fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }
}

// Format info
//------------------------------------------------------------------------------

/// BCH(15, 5) protected format information for the given level and mask, already XORed
/// with the fixed format mask.
pub fn format_info(ecl: ECLevel, mask: MaskPattern) -> u32 {
    let data = (ecl.format_bits() << 3) | *mask as u32;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_INFO_GENERATOR);
    }
    ((data << 10) | rem) ^ FORMAT_INFO_MASK
}


// Global constants
//------------------------------------------------------------------------------

static FORMAT_INFO_GENERATOR: u32 = 0b101_0011_0111;

static FORMAT_INFO_MASK: u32 = 0b101_0100_0001_0010;

static VERSION_INFO_GENERATOR: u32 = 0b1_1111_0010_0101;

pub static FORMAT_INFO_BIT_LEN: usize = 15;

pub static VERSION_INFO_BIT_LEN: usize = 18;

// Index: [ec_level][version], version 0 unused
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

// Index: [ec_level][version], version 0 unused
static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23,
        25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

static ALIGNMENT_PATTERN_POSITIONS: [&[usize]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

use std::ops::Deref;

use super::{
    galois::{generator_polynomial, G},
    Block, MAX_EC_SIZE,
};
use crate::common::metadata::{ECLevel, Version};

// Reed-Solomon encoder
//------------------------------------------------------------------------------

impl Block {
    // Remainder of the data polynomial, shifted up by ec_len, divided by the generator
    // polynomial. Written into the tail of the block.
    pub(super) fn compute_ecc(&mut self) {
        let dlen = self.data_len();
        let ec_len = self.ec_len();
        debug_assert!(ec_len <= MAX_EC_SIZE, "Ec length exceeds max: {ec_len}");
        if ec_len == 0 {
            return;
        }

        let gen_poly = generator_polynomial(ec_len);
        let mut rem = [G(0); MAX_EC_SIZE];
        let rem = &mut rem[..ec_len];

        let full = self.full_mut();
        for &b in full[..dlen].iter() {
            let factor = G(b) + rem[0];
            rem.rotate_left(1);
            rem[ec_len - 1] = G(0);
            for (r, &g) in rem.iter_mut().zip(gen_poly.iter()) {
                *r += g * factor;
            }
        }

        for (dst, &r) in full[dlen..].iter_mut().zip(rem.iter()) {
            *dst = r.into();
        }
    }
}

/// Splits the data codewords into blocks per the version's group layout and computes the
/// error correction codewords of each.
pub fn ecc(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<Block> {
    let ec_len = version.ecc_per_block(ec_level);
    blockify(data, version, ec_level)
        .into_iter()
        .map(|b| Block::new(b, b.len() + ec_len))
        .collect::<Vec<_>>()
}

pub fn blockify(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
    let (block1_size, block1_count, block2_size, block2_count) =
        version.data_codewords_per_block(ec_level);

    let total_blocks = block1_count + block2_count;
    let total_block1_size = block1_size * block1_count;
    let total_size = total_block1_size + block2_size * block2_count;

    debug_assert!(
        total_size == data.len(),
        "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
        data.len(),
        total_size
    );

    let mut data_blocks = Vec::with_capacity(total_blocks);
    data_blocks.extend(data[..total_block1_size].chunks(block1_size));
    if block2_size > 0 {
        data_blocks.extend(data[total_block1_size..].chunks(block2_size));
    }
    data_blocks
}

/// Column-major read over the blocks. Shorter blocks drop out once drained.
pub fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
    let mut res = Vec::with_capacity(total_size);
    for i in 0..max_block_size {
        for b in blocks {
            if i < b.len() {
                res.push(b[i]);
            }
        }
    }
    res
}

/// Final codeword sequence: interleaved data codewords followed by interleaved ecc.
pub fn interleave_blocks(blocks: &[Block]) -> Vec<u8> {
    let data = blocks.iter().map(Block::data).collect::<Vec<_>>();
    let ecc = blocks.iter().map(Block::ecc).collect::<Vec<_>>();
    let mut res = interleave(&data);
    res.extend(interleave(&ecc));
    res
}

#[cfg(test)]
mod ec_tests {
    use test_case::test_case;

    use super::{blockify, ecc, interleave, interleave_blocks, Block};
    use crate::common::metadata::{ECLevel, Version};

    #[test_case(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11", b"\xc4#'w\xeb\xd7\xe7\xe2]\x17")]
    #[test_case(b" [\x0bx\xd1r\xdcMC@\xec\x11\xec", b"\xa8H\x16R\xd96\x9c\x00.\x0f\xb4z\x10")]
    #[test_case(b"CUF\x86W&U\xc2w2\x06\x12\x06g&", b"\xd5\xc7\x0b-s\xf7\xf1\xdf\xe5\xf8\x9au\x9aoV\xa1o'")]
    fn test_ecc_per_block(data: &[u8], exp: &[u8]) {
        let blk = Block::new(data, data.len() + exp.len());
        assert_eq!(blk.data(), data);
        assert_eq!(blk.ecc(), exp);
    }

    #[test]
    fn test_ecc_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let blocks = ecc(msg, Version(1), ECLevel::M);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].data(), msg);
        assert_eq!(blocks[0].ecc(), b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17");
    }

    #[test]
    fn test_ecc_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec: [&[u8]; 4] = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let blocks = ecc(msg, Version(5), ECLevel::Q);
        let ecc = blocks.iter().map(Block::ecc).collect::<Vec<_>>();
        assert_eq!(ecc, expected_ec);

        let data = blocks.iter().map(Block::data).collect::<Vec<_>>();
        assert_eq!(data.iter().map(|d| d.len()).collect::<Vec<_>>(), vec![15, 15, 16, 16]);
        assert_eq!(data.concat(), msg);
    }

    #[test]
    fn test_blockify_groups() {
        let ver = Version(5);
        let data = (0..62).collect::<Vec<u8>>();
        let blocks = blockify(&data, ver, ECLevel::Q);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], &data[15..30]);
        assert_eq!(blocks[2], &data[30..46]);
    }

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = interleave(&blocks);
        let exp_interleaved = vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0];
        assert_eq!(interleaved, exp_interleaved);
    }

    #[test]
    fn test_interleave_blocks() {
        let ver = Version(5);
        let data = (0..62).collect::<Vec<u8>>();
        let blocks = ecc(&data, ver, ECLevel::Q);
        let codewords = interleave_blocks(&blocks);
        assert_eq!(codewords.len(), ver.total_codewords());
        assert_eq!(codewords[..8], [0, 15, 30, 46, 1, 16, 31, 47]);
        // Only group 2 blocks contribute the last data column
        assert_eq!(codewords[60..62], [45, 61]);
        assert_eq!(codewords[62], blocks[0].ecc()[0]);
        assert_eq!(codewords[63], blocks[1].ecc()[0]);
    }
}

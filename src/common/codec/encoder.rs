pub use encode::*;

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use tracing::debug;

    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{Mode, Segment};
    use crate::common::error::{QRError, QRResult};
    use crate::common::metadata::{ECLevel, Version};

    use super::writer::{pad_remaining_capacity, push_segment, push_terminator};

    /// Classifies the data, picks the smallest version that fits it and writes the padded
    /// data codewords.
    pub fn encode(data: &[u8], ecl: ECLevel) -> QRResult<(BitStream, Version)> {
        let mode = Mode::classify(data);
        let ver = find_optimal_version(data, mode, ecl)?;
        debug!(?mode, version = *ver, len = data.len(), "Selected mode & version");
        let bs = write_data_codewords(Segment::new(mode, ver, data), ver, ecl);
        Ok((bs, ver))
    }

    pub fn encode_with_version(data: &[u8], ver: Version, ecl: ECLevel) -> QRResult<BitStream> {
        let mode = Mode::classify(data);
        let seg = Segment::new(mode, ver, data);
        if seg.bit_len() > ver.data_bit_capacity(ecl) {
            return Err(QRError::CapacityExceeded);
        }
        debug!(?mode, version = *ver, len = data.len(), "Using requested version");
        Ok(write_data_codewords(seg, ver, ecl))
    }

    pub fn find_optimal_version(data: &[u8], mode: Mode, ecl: ECLevel) -> QRResult<Version> {
        Version::all()
            .find(|&v| Segment::new(mode, v, data).bit_len() <= v.data_bit_capacity(ecl))
            .ok_or(QRError::CapacityExceeded)
    }

    fn write_data_codewords(seg: Segment, ver: Version, ecl: ECLevel) -> BitStream {
        let mut bs = BitStream::new(ver.data_bit_capacity(ecl));
        push_segment(seg, &mut bs);
        push_terminator(&mut bs);
        pad_remaining_capacity(&mut bs);
        debug_assert!(bs.len() == bs.capacity(), "Data codewords not filled: {}", bs.len());
        bs
    }

}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(super) mod writer {
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{Mode, Segment, PADDING_CODEWORDS};

    pub fn push_segment(seg: Segment, out: &mut BitStream) {
        push_header(&seg, out);
        match seg.mode {
            Mode::Numeric => push_numeric_data(seg.data, out),
            Mode::Alphanumeric => push_alphanumeric_data(seg.data, out),
            Mode::Byte => push_byte_data(seg.data, out),
        }
    }

    fn push_header(seg: &Segment, out: &mut BitStream) {
        out.push_bits(seg.mode as u8, seg.mode_bits);
        let char_cnt = seg.data.len();
        debug_assert!(
            char_cnt < (1 << seg.len_bits),
            "Char count exceeds bit length: Char count {char_cnt}, Char count bits {}",
            seg.len_bits
        );
        out.push_bits(char_cnt as u16, seg.len_bits);
    }

    fn push_numeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(3) {
            let len = Mode::Numeric.encoded_len(chunk.len());
            let data = Mode::Numeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_alphanumeric_data(data: &[u8], out: &mut BitStream) {
        for chunk in data.chunks(2) {
            let len = Mode::Alphanumeric.encoded_len(chunk.len());
            let data = Mode::Alphanumeric.encode_chunk(chunk);
            out.push_bits(data, len);
        }
    }

    fn push_byte_data(data: &[u8], out: &mut BitStream) {
        for &b in data {
            out.push_bits(b, 8);
        }
    }

    pub fn push_terminator(out: &mut BitStream) {
        let term_len = std::cmp::min(4, out.remaining());
        out.push_bits(0u8, term_len);
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) {
        out.align_to_byte();
        push_padding_codewords(out);
    }

    fn push_padding_codewords(out: &mut BitStream) {
        let offset = out.len() & 7;
        debug_assert!(
            offset == 0,
            "Bit offset should be zero before padding codewords: {}",
            offset
        );

        let remain_byte_capacity = out.remaining() >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
            out.push_bits(pc, 8);
        });
    }

}

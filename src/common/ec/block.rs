use super::MAX_BLOCK_SIZE;

/// One Reed-Solomon block: data codewords followed by their error correction codewords.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Block {
    data: [u8; MAX_BLOCK_SIZE],
    // Block length
    len: usize,
    // Data length
    dlen: usize,
}

impl Block {
    /// Copies `raw` in and computes `len - raw.len()` error correction codewords.
    pub fn new(raw: &[u8], len: usize) -> Self {
        let dlen = raw.len();
        debug_assert!(
            dlen <= len && len <= MAX_BLOCK_SIZE,
            "Invalid block dimensions: Data len {dlen}, Block len {len}"
        );
        let mut data = [0u8; MAX_BLOCK_SIZE];
        data[..dlen].copy_from_slice(raw);
        let mut block = Self { data, len, dlen };
        block.compute_ecc();
        block
    }

    pub fn ec_len(&self) -> usize {
        self.len - self.dlen
    }

    pub fn data_len(&self) -> usize {
        self.dlen
    }

    #[cfg(test)]
    pub fn full(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub(super) fn full_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.dlen]
    }

    pub fn ecc(&self) -> &[u8] {
        &self.data[self.dlen..self.len]
    }
}

//! Sequential byte readers over contiguous and scattered input.

/// Read-only sequential byte source with a cumulative offset.
pub trait ByteReader {
    /// Current byte without advancing.
    fn peek(&mut self) -> Option<u8>;

    /// Current byte, advancing the cursor.
    fn take(&mut self) -> Option<u8>;

    /// Cumulative byte offset since the start of the input.
    fn tell(&self) -> usize;
}

/// Reader over one contiguous block.
#[derive(Debug)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl ByteReader for SliceReader<'_> {
    fn peek(&mut self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn take(&mut self) -> Option<u8> {
        let byte = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    fn tell(&self) -> usize {
        self.pos
    }
}

/// Reader over an ordered span of non-contiguous byte blocks.
///
/// The cursor is a `(block index, intra-block offset)` pair that rolls over
/// to the next block at each boundary; empty blocks are skipped. The reader
/// is strictly sequential and read-only.
#[derive(Debug)]
pub struct ChunkReader<'a> {
    blocks: &'a [&'a [u8]],
    block: usize,
    offset: usize,
    consumed: usize,
    total: usize,
}

impl<'a> ChunkReader<'a> {
    #[must_use]
    pub fn new(blocks: &'a [&'a [u8]]) -> Self {
        let total = blocks.iter().map(|b| b.len()).sum();
        Self {
            blocks,
            block: 0,
            offset: 0,
            consumed: 0,
            total,
        }
    }

    /// Bytes not yet taken.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total - self.consumed
    }

    fn skip_exhausted_blocks(&mut self) {
        while self.block < self.blocks.len() && self.offset >= self.blocks[self.block].len() {
            self.block += 1;
            self.offset = 0;
        }
    }
}

impl ByteReader for ChunkReader<'_> {
    fn peek(&mut self) -> Option<u8> {
        self.skip_exhausted_blocks();
        self.blocks.get(self.block)?.get(self.offset).copied()
    }

    fn take(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.offset += 1;
        self.consumed += 1;
        Some(byte)
    }

    fn tell(&self) -> usize {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn chunk_reader_rolls_over_boundaries() {
        let blocks: [&[u8]; 4] = [b"ab", b"", b"c", b"de"];
        let mut reader = ChunkReader::new(&blocks);
        assert_eq!(reader.remaining(), 5);

        let mut seen = Vec::new();
        while let Some(byte) = reader.take() {
            seen.push(byte);
        }
        assert_eq!(seen, b"abcde");
        assert_eq!(reader.tell(), 5);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.peek(), None);
    }

    #[test]
    fn peek_does_not_advance() {
        let blocks: [&[u8]; 2] = [b"x", b"y"];
        let mut reader = ChunkReader::new(&blocks);
        assert_eq!(reader.peek(), Some(b'x'));
        assert_eq!(reader.peek(), Some(b'x'));
        assert_eq!(reader.tell(), 0);
        assert_eq!(reader.take(), Some(b'x'));
        assert_eq!(reader.peek(), Some(b'y'));
        assert_eq!(reader.tell(), 1);
    }
}

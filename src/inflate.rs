//! Dynamic-Huffman deflate block decoding (RFC 1951).
//!
//! `Inflater` owns one decode session: the bit cursor, the growing output
//! buffer and the block counter. Every block runs through an explicit
//! state machine — read the 3-bit header, rebuild the two working trees
//! from the transmitted code lengths, then decode literals and
//! back-references until the end-of-block symbol. Back-reference copies go
//! byte by byte because the source range may overlap the bytes the copy
//! itself appends (distance=1 reproduces a repeating byte).

use crate::bits::BitReader;
use crate::codelen;
use crate::error::{UngzError, UngzResult};
use crate::huffman::HuffmanTree;

/// End-of-block symbol in the literal/length alphabet.
const END_OF_BLOCK: u16 = 256;

/// Dynamic Huffman block type (BTYPE bits).
const BLOCK_TYPE_DYNAMIC: u8 = 2;

/// Number of literal/length codes.
const NUM_LITLEN_CODES: usize = 286;

/// Number of distance codes.
const NUM_DIST_CODES: usize = 30;

/// Base match lengths for symbols 257..=285.
static LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits read after each length symbol.
static LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distances for distance symbols 0..=29.
static DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits read after each distance symbol.
static DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Per-block decode state. One instance per block, consumed on `Done`.
enum BlockState {
    ReadHeader,
    ReadDynamicTables {
        final_block: bool,
    },
    DecodeSymbols {
        final_block: bool,
        litlen: HuffmanTree,
        dist: HuffmanTree,
    },
    Done {
        final_block: bool,
    },
}

/// One deflate decode session over a byte slice.
pub struct Inflater<'a> {
    reader: BitReader<'a>,
    output: Vec<u8>,
    blocks: usize,
}

impl<'a> Inflater<'a> {
    /// Decoder over `data`, which must start at the first block header bit.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BitReader::new(data),
            output: Vec::new(),
            blocks: 0,
        }
    }

    /// Same, preallocating `size_hint` output bytes (the container's ISIZE
    /// field, when the caller has one).
    pub fn with_size_hint(data: &'a [u8], size_hint: usize) -> Self {
        Self {
            reader: BitReader::new(data),
            output: Vec::with_capacity(size_hint),
            blocks: 0,
        }
    }

    /// Decode blocks until the final-block flag is seen.
    pub fn decode_to_end(&mut self) -> UngzResult<()> {
        loop {
            let final_block = self.decode_block()?;
            self.blocks += 1;
            if final_block {
                return Ok(());
            }
        }
    }

    /// Decode a single block; returns its BFINAL flag.
    pub fn decode_block(&mut self) -> UngzResult<bool> {
        let mut state = BlockState::ReadHeader;
        loop {
            state = match state {
                BlockState::ReadHeader => {
                    let final_block = self.reader.read_bit()? == 1;
                    let btype = self.reader.read_bits(2)? as u8;
                    if btype != BLOCK_TYPE_DYNAMIC {
                        return Err(UngzError::UnsupportedBlockType {
                            btype,
                            block: self.blocks + 1,
                        });
                    }
                    BlockState::ReadDynamicTables { final_block }
                }
                BlockState::ReadDynamicTables { final_block } => {
                    let (litlen, dist) = self.read_dynamic_tables()?;
                    BlockState::DecodeSymbols {
                        final_block,
                        litlen,
                        dist,
                    }
                }
                BlockState::DecodeSymbols {
                    final_block,
                    mut litlen,
                    mut dist,
                } => {
                    self.decode_symbols(&mut litlen, &mut dist)?;
                    BlockState::Done { final_block }
                }
                BlockState::Done { final_block } => return Ok(final_block),
            };
        }
    }

    /// Read HLIT/HDIST/HCLEN and rebuild the two working trees from the
    /// transmitted code-length sequence.
    fn read_dynamic_tables(&mut self) -> UngzResult<(HuffmanTree, HuffmanTree)> {
        let hlit = self.reader.read_bits(5)? as usize + 257;
        let hdist = self.reader.read_bits(5)? as usize + 1;
        let hclen = self.reader.read_bits(4)? as usize + 4;

        if hlit > NUM_LITLEN_CODES {
            return Err(UngzError::MalformedHuffmanCode("too many literal/length codes"));
        }
        if hdist > NUM_DIST_CODES {
            return Err(UngzError::MalformedHuffmanCode("too many distance codes"));
        }

        let mut codelen_tree = codelen::read_code_length_tree(&mut self.reader, hclen)?;
        let lengths =
            codelen::read_length_table(&mut self.reader, &mut codelen_tree, hlit + hdist)?;

        let litlen = HuffmanTree::from_lengths(&lengths[..hlit])?;
        let dist = HuffmanTree::from_lengths(&lengths[hlit..])?;
        Ok((litlen, dist))
    }

    /// The literal/back-reference loop, until end-of-block.
    fn decode_symbols(
        &mut self,
        litlen: &mut HuffmanTree,
        dist: &mut HuffmanTree,
    ) -> UngzResult<()> {
        loop {
            let symbol = litlen.decode_symbol(&mut self.reader)?;
            if symbol < END_OF_BLOCK {
                self.output.push(symbol as u8);
            } else if symbol == END_OF_BLOCK {
                return Ok(());
            } else {
                let code = (symbol - 257) as usize;
                let length = LENGTH_BASE[code] as usize
                    + self.reader.read_bits(LENGTH_EXTRA_BITS[code] as u32)? as usize;

                let dist_code = dist.decode_symbol(&mut self.reader)? as usize;
                let distance = DISTANCE_BASE[dist_code] as usize
                    + self.reader.read_bits(DISTANCE_EXTRA_BITS[dist_code] as u32)? as usize;

                self.copy_back_reference(distance, length)?;
            }
        }
    }

    /// Copy `length` bytes from `distance` back, one byte at a time: the
    /// source range may include bytes this same copy appends.
    fn copy_back_reference(&mut self, distance: usize, length: usize) -> UngzResult<()> {
        if distance > self.output.len() {
            return Err(UngzError::InvalidBackReference {
                distance,
                available: self.output.len(),
            });
        }
        for _ in 0..length {
            let byte = self.output[self.output.len() - distance];
            self.output.push(byte);
        }
        Ok(())
    }

    /// Bytes decoded so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Blocks fully decoded so far.
    pub fn blocks_decoded(&self) -> usize {
        self.blocks
    }

    /// Consume the session, returning the decoded bytes.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }
}

//! The code-length meta-alphabet (RFC 1951 §3.2.7).
//!
//! A dynamic block describes its two working alphabets with a third,
//! 19-symbol alphabet whose own code lengths arrive as 3-bit fields in a
//! fixed permutation order. Symbols 0..15 are literal lengths; 16, 17 and
//! 18 are run-length codes. The literal/length and distance tables are
//! transmitted as one concatenated sequence, so a run may span the
//! boundary between them.

use crate::bits::BitReader;
use crate::error::{UngzError, UngzResult};
use crate::huffman::HuffmanTree;

/// Order in which the 19 code-length code lengths are transmitted.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Size of the code-length alphabet.
pub const CODE_LENGTH_SYMBOLS: usize = 19;

/// Read `hclen` 3-bit lengths and build the meta-alphabet decode tree.
/// Symbols past `hclen` in the permutation order keep length 0.
pub fn read_code_length_tree(reader: &mut BitReader, hclen: usize) -> UngzResult<HuffmanTree> {
    debug_assert!(hclen <= CODE_LENGTH_SYMBOLS);
    let mut lengths = [0u8; CODE_LENGTH_SYMBOLS];
    for &symbol in CODE_LENGTH_ORDER.iter().take(hclen) {
        lengths[symbol] = reader.read_bits(3)? as u8;
    }
    HuffmanTree::from_lengths(&lengths)
}

/// Decode `count` code lengths using the meta-alphabet tree.
///
/// This expands the run-length codes: 16 repeats the previous length 3-6
/// times, 17 emits 3-10 zeros, 18 emits 11-138 zeros. The caller passes
/// the combined literal/length + distance count and splits the result.
pub fn read_length_table(
    reader: &mut BitReader,
    tree: &mut HuffmanTree,
    count: usize,
) -> UngzResult<Vec<u8>> {
    let mut lengths: Vec<u8> = Vec::with_capacity(count);
    while lengths.len() < count {
        let symbol = tree.decode_symbol(reader)?;
        let (value, run) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                let prev = *lengths.last().ok_or(UngzError::InvalidRunLengthContext)?;
                (prev, 3 + reader.read_bits(2)? as usize)
            }
            17 => (0, 3 + reader.read_bits(3)? as usize),
            18 => (0, 11 + reader.read_bits(7)? as usize),
            _ => {
                return Err(UngzError::MalformedHuffmanCode(
                    "code length symbol out of range",
                ))
            }
        };
        if lengths.len() + run > count {
            return Err(UngzError::RunLengthOverflow);
        }
        for _ in 0..run {
            lengths.push(value);
        }
    }
    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::{assign_codes, CanonicalCode};
    use crate::test_utils::BitWriter;

    /// Length table giving every listed symbol the same code length.
    fn meta_lengths(symbols: &[usize], len: u8) -> [u8; CODE_LENGTH_SYMBOLS] {
        let mut lengths = [0u8; CODE_LENGTH_SYMBOLS];
        for &symbol in symbols {
            lengths[symbol] = len;
        }
        lengths
    }

    fn meta_codes(lengths: &[u8; CODE_LENGTH_SYMBOLS]) -> Vec<Option<CanonicalCode>> {
        assign_codes(lengths).unwrap()
    }

    #[test]
    fn lengths_are_read_in_permuted_order() {
        // hclen = 4 covers permutation entries 16, 17, 18 and 0; giving all
        // four length 2 yields canonical codes 0→00, 16→01, 17→10, 18→11.
        let mut w = BitWriter::new();
        for _ in 0..4 {
            w.write_bits(2, 3);
        }
        let codes = meta_codes(&meta_lengths(&[0, 16, 17, 18], 2));
        w.write_code(codes[0].unwrap());
        w.write_code(codes[17].unwrap());
        let data = w.finish();
        let mut reader = BitReader::new(&data);

        let mut tree = read_code_length_tree(&mut reader, 4).unwrap();
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), 0);
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), 17);
    }

    #[test]
    fn run_codes_expand_to_zeros() {
        let lengths = meta_lengths(&[0, 16, 17, 18], 2);
        let codes = meta_codes(&lengths);
        let mut tree = HuffmanTree::from_lengths(&lengths).unwrap();

        // 17 (3+1 zeros), 18 (11+0 zeros), then two literal zeros.
        let mut w = BitWriter::new();
        w.write_code(codes[17].unwrap());
        w.write_bits(1, 3);
        w.write_code(codes[18].unwrap());
        w.write_bits(0, 7);
        w.write_code(codes[0].unwrap());
        w.write_code(codes[0].unwrap());
        let data = w.finish();
        let mut reader = BitReader::new(&data);

        let table = read_length_table(&mut reader, &mut tree, 17).unwrap();
        assert_eq!(table, vec![0u8; 17]);
    }

    #[test]
    fn repeat_code_copies_previous_length() {
        let lengths = meta_lengths(&[0, 5, 16, 18], 2);
        let codes = meta_codes(&lengths);
        let mut tree = HuffmanTree::from_lengths(&lengths).unwrap();

        // 5, then 16 repeating it 3 times.
        let mut w = BitWriter::new();
        w.write_code(codes[5].unwrap());
        w.write_code(codes[16].unwrap());
        w.write_bits(0, 2);
        let data = w.finish();
        let mut reader = BitReader::new(&data);

        let table = read_length_table(&mut reader, &mut tree, 4).unwrap();
        assert_eq!(table, vec![5, 5, 5, 5]);
    }

    #[test]
    fn repeat_with_no_previous_length_is_rejected() {
        let lengths = meta_lengths(&[0, 16, 17, 18], 2);
        let codes = meta_codes(&lengths);
        let mut tree = HuffmanTree::from_lengths(&lengths).unwrap();

        let mut w = BitWriter::new();
        w.write_code(codes[16].unwrap());
        w.write_bits(0, 2);
        let data = w.finish();
        let mut reader = BitReader::new(&data);

        assert!(matches!(
            read_length_table(&mut reader, &mut tree, 4),
            Err(UngzError::InvalidRunLengthContext)
        ));
    }

    #[test]
    fn run_past_the_end_of_the_table_is_rejected() {
        let lengths = meta_lengths(&[0, 16, 17, 18], 2);
        let codes = meta_codes(&lengths);
        let mut tree = HuffmanTree::from_lengths(&lengths).unwrap();

        // 11 zeros into a 4-entry table.
        let mut w = BitWriter::new();
        w.write_code(codes[18].unwrap());
        w.write_bits(0, 7);
        let data = w.finish();
        let mut reader = BitReader::new(&data);

        assert!(matches!(
            read_length_table(&mut reader, &mut tree, 4),
            Err(UngzError::RunLengthOverflow)
        ));
    }
}
